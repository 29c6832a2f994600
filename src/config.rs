use crate::errors::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// The recognized browser identifier strings. These are the de facto
/// configuration API of the harness: anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowserId {
    Chrome,
    Firefox,
    InternetExplorer,
    Safari,
    SauceGridChrome31,
    LocalGridChrome,
    LocalGridFirefox,
}

impl BrowserId {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserId::Chrome => "chrome",
            BrowserId::Firefox => "firefox",
            BrowserId::InternetExplorer => "ie",
            BrowserId::Safari => "safari",
            BrowserId::SauceGridChrome31 => "saucegridchrome31",
            BrowserId::LocalGridChrome => "localgridchrome",
            BrowserId::LocalGridFirefox => "localgridfirefox",
        }
    }

    /// Profile lookup. `PROFILES` is ordered to match the enum discriminants;
    /// the alignment is asserted by a test.
    pub fn profile(&self) -> &'static BrowserProfile {
        &PROFILES[*self as usize]
    }
}

impl FromStr for BrowserId {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chrome" => Ok(BrowserId::Chrome),
            "firefox" => Ok(BrowserId::Firefox),
            "ie" => Ok(BrowserId::InternetExplorer),
            "safari" => Ok(BrowserId::Safari),
            "saucegridchrome31" => Ok(BrowserId::SauceGridChrome31),
            "localgridchrome" => Ok(BrowserId::LocalGridChrome),
            "localgridfirefox" => Ok(BrowserId::LocalGridFirefox),
            other => Err(HarnessError::UnknownBrowser(other.to_string())),
        }
    }
}

impl fmt::Display for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of how a browser identifier is obtained: whether it
/// needs a grid hub, hosted-service credentials, and (for local sessions)
/// which driver binary listens on which conventional port. Adding a browser
/// is a new table row, not a new code branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserProfile {
    pub id: BrowserId,
    /// W3C `browserName` capability value.
    pub browser_name: &'static str,
    pub requires_grid: bool,
    pub requires_credentials: bool,
    /// Conventional localhost port of the matching driver binary.
    pub local_port: Option<u16>,
    pub driver_binary: Option<&'static str>,
}

pub const PROFILES: [BrowserProfile; 7] = [
    BrowserProfile {
        id: BrowserId::Chrome,
        browser_name: "chrome",
        requires_grid: false,
        requires_credentials: false,
        local_port: Some(9515),
        driver_binary: Some("chromedriver"),
    },
    BrowserProfile {
        id: BrowserId::Firefox,
        browser_name: "firefox",
        requires_grid: false,
        requires_credentials: false,
        local_port: Some(4444),
        driver_binary: Some("geckodriver"),
    },
    BrowserProfile {
        id: BrowserId::InternetExplorer,
        browser_name: "internet explorer",
        requires_grid: false,
        requires_credentials: false,
        local_port: Some(5555),
        driver_binary: Some("IEDriverServer"),
    },
    BrowserProfile {
        id: BrowserId::Safari,
        browser_name: "safari",
        requires_grid: false,
        requires_credentials: false,
        local_port: Some(4445),
        driver_binary: Some("safaridriver"),
    },
    BrowserProfile {
        id: BrowserId::SauceGridChrome31,
        browser_name: "chrome",
        requires_grid: true,
        requires_credentials: true,
        local_port: None,
        driver_binary: None,
    },
    BrowserProfile {
        id: BrowserId::LocalGridChrome,
        browser_name: "chrome",
        requires_grid: true,
        requires_credentials: false,
        local_port: None,
        driver_binary: None,
    },
    BrowserProfile {
        id: BrowserId::LocalGridFirefox,
        browser_name: "firefox",
        requires_grid: true,
        requires_credentials: false,
        local_port: None,
        driver_binary: None,
    },
];

/// Immutable input bundle for one test session. The `is_grid`/`is_sauce`
/// flags are intentionally absent: they are derived during capability
/// resolution, never set by the caller.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub test_name: String,
    pub browser: BrowserId,
    pub app_url: Option<Url>,
    /// Raw hub URL as supplied; may embed `User`/`Key` credential
    /// placeholders that resolution substitutes.
    pub hub_url: Option<String>,
    pub sauce_user: Option<String>,
    pub sauce_key: Option<String>,
}

impl SessionConfig {
    pub fn new(test_name: impl Into<String>, browser: BrowserId) -> Self {
        Self {
            test_name: test_name.into(),
            browser,
            app_url: None,
            hub_url: None,
            sauce_user: None,
            sauce_key: None,
        }
    }

    /// The hub URL, treating a blank string the same as an unset one.
    pub fn hub_url(&self) -> Option<&str> {
        self.hub_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_browser_strings() {
        assert_eq!("chrome".parse::<BrowserId>().unwrap(), BrowserId::Chrome);
        assert_eq!("ie".parse::<BrowserId>().unwrap(), BrowserId::InternetExplorer);
        assert_eq!(
            "saucegridchrome31".parse::<BrowserId>().unwrap(),
            BrowserId::SauceGridChrome31
        );
    }

    #[test]
    fn rejects_unknown_browser_strings() {
        for bad in ["phantomjs", "gridchrome32", "", "Chrome"] {
            match bad.parse::<BrowserId>() {
                Err(HarnessError::UnknownBrowser(s)) => assert_eq!(s, bad),
                other => panic!("expected UnknownBrowser for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn profile_table_matches_enum_order() {
        for (idx, profile) in PROFILES.iter().enumerate() {
            assert_eq!(profile.id as usize, idx, "row {idx} out of order");
            assert_eq!(profile.id.profile(), profile);
        }
    }

    #[test]
    fn grid_profiles_have_no_local_endpoint() {
        for profile in PROFILES.iter().filter(|p| p.requires_grid) {
            assert!(profile.local_port.is_none());
            assert!(profile.driver_binary.is_none());
        }
    }

    #[test]
    fn sauce_profile_requires_credentials() {
        assert!(BrowserId::SauceGridChrome31.profile().requires_credentials);
        assert!(!BrowserId::LocalGridChrome.profile().requires_credentials);
    }

    #[test]
    fn blank_hub_url_reads_as_unset() {
        let mut cfg = SessionConfig::new("t", BrowserId::LocalGridChrome);
        assert_eq!(cfg.hub_url(), None);
        cfg.hub_url = Some("   ".to_string());
        assert_eq!(cfg.hub_url(), None);
        cfg.hub_url = Some("http://hub:4444/wd/hub".to_string());
        assert_eq!(cfg.hub_url(), Some("http://hub:4444/wd/hub"));
    }
}
