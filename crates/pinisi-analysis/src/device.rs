//! Device classification from browser user-agent strings
//!
//! Classification is a three-step lookup:
//!
//! 1. [`browser_to_os`]: user agent → specific OS (`"Windows 7"`, `"Android 4"`, ...)
//! 2. [`os_to_generic`]: specific OS → OS family (`"Windows"`, `"Android"`, ...)
//! 3. [`is_mobile`]: OS family → mobile flag
//!
//! Rules are ordered, case-insensitive substring checks; the first match
//! wins. An agent matching no rule is an error. The cleaning pass decides
//! whether that error is fatal (see
//! [`UnknownAgentPolicy`](crate::cleaning::UnknownAgentPolicy)).

use crate::point::Device;

/// Category recorded for agents that match no rule when tagging is enabled.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DeviceError {
    #[display("unknown agent string: {agent}")]
    UnknownAgent { agent: String },
    #[display("unknown os: {os}")]
    UnknownOs { os: String },
}

const OS_RULES: &[(&[&str], &str)] = &[
    (&["ubuntu"], "Ubuntu"),
    (&["windows phone 8"], "Windows Phone 8"),
    (&["windows nt 10"], "Windows 10"),
    (&["windows nt 6.2", "windows nt 6.3"], "Windows 8"),
    (&["windows nt 6.1"], "Windows 7"),
    (&["windows nt 6.0"], "Windows Vista"),
    (&["windows nt 5"], "Windows XP"),
    (&["intel mac os x"], "OS X"),
];

const IPHONE_MARKERS: &[&str] = &["cpu iphone", "wp-iphone"];
const IPHONE_RULES: &[(&str, &str)] = &[
    ("os 9", "iPhone iOS 9"),
    ("os 8", "iPhone iOS 8"),
    ("os 7", "iPhone iOS 7"),
];

const ANDROID_RULES: &[(&str, &str)] = &[
    ("android 5", "Android 5"),
    ("android 4", "Android 4"),
    ("android 3", "Android 3"),
    ("android 2", "Android 2"),
];

const GENERIC_RULES: &[(&str, &str)] = &[
    ("ubuntu", "Ubuntu"),
    ("linux", "Linux"),
    ("android", "Android"),
    ("os x", "OS X"),
    ("ios", "iOS"),
    ("windows phone", "Windows Phone"),
    ("windows", "Windows"),
];

const MOBILE_FAMILIES: &[&str] = &["android", "ios", "windows phone"];

/// Specific operating system named by a browser user agent.
///
/// ```
/// use pinisi_analysis::device::browser_to_os;
///
/// let agent = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36";
/// assert_eq!(browser_to_os(agent).unwrap(), "Windows 7");
/// assert!(browser_to_os("curl/7.47.0").is_err());
/// ```
pub fn browser_to_os(agent: &str) -> Result<&'static str, DeviceError> {
    let lower = agent.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if let Some(&(_, os)) = OS_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| has(n)))
    {
        return Ok(os);
    }

    // An iPhone agent with an unrecognized iOS version does not fall through
    // to the Android and Linux rules.
    let unknown = || DeviceError::UnknownAgent {
        agent: agent.to_owned(),
    };
    if IPHONE_MARKERS.iter().any(|n| has(n)) {
        return IPHONE_RULES
            .iter()
            .find(|(needle, _)| has(needle))
            .map(|(_, os)| *os)
            .ok_or_else(unknown);
    }

    if let Some(&(_, os)) = ANDROID_RULES.iter().find(|(needle, _)| has(needle)) {
        return Ok(os);
    }
    if has("android") {
        return Ok(if has("tablet") {
            "Android tablet"
        } else {
            "Android"
        });
    }
    if has("linux") {
        return Ok("Other Linux");
    }
    Err(unknown())
}

/// OS family of a specific OS name.
///
/// ```
/// use pinisi_analysis::device::os_to_generic;
///
/// assert_eq!(os_to_generic("Windows Phone 8").unwrap(), "Windows Phone");
/// assert_eq!(os_to_generic("iPhone iOS 9").unwrap(), "iOS");
/// ```
pub fn os_to_generic(os: &str) -> Result<&'static str, DeviceError> {
    let lower = os.to_lowercase();
    GENERIC_RULES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, generic)| *generic)
        .ok_or_else(|| DeviceError::UnknownOs { os: os.to_owned() })
}

/// Whether an OS family is a mobile platform.
#[must_use]
pub fn is_mobile(os_generic: &str) -> bool {
    let lower = os_generic.to_lowercase();
    MOBILE_FAMILIES.contains(&lower.as_str())
}

/// Full classification of a browser agent.
pub fn classify(agent: &str) -> Result<Device, DeviceError> {
    let os = browser_to_os(agent)?;
    let os_generic = os_to_generic(os)?;
    Ok(Device {
        os: os.to_owned(),
        os_generic: os_generic.to_owned(),
        is_mobile: is_mobile(os_generic),
    })
}

/// Classification recorded for an unrecognized agent.
#[must_use]
pub fn unknown_device() -> Device {
    Device {
        os: UNKNOWN.to_owned(),
        os_generic: UNKNOWN.to_owned(),
        is_mobile: false,
    }
}
