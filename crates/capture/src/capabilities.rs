//! What the capturing surface is, as far as capture strategies care.
//!
//! Detection is a pure function of the user agent string; the strategies themselves
//! are picked from the resulting [`Capabilities`] record in [`crate::strategy`].

use core::fmt;
use geometry::RectangleSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chrome,
    Edge,
    Firefox,
    Safari,
    InternetExplorer,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
    Unknown,
}

impl PlatformKind {
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Android | Self::Ios)
    }
}

/// Browser and platform parsed out of a user agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent {
    pub browser: BrowserKind,
    pub browser_major: Option<u32>,
    pub platform: PlatformKind,
    pub os_major: Option<u32>,
}

/// Leading decimal digits following the first occurrence of `marker`.
fn version_after(user_agent: &str, marker: &str) -> Option<u32> {
    let start = user_agent.find(marker)? + marker.len();
    let digits: String = user_agent
        .get(start..)?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn parse_platform(user_agent: &str) -> (PlatformKind, Option<u32>) {
    if ["iPhone", "iPad", "iPod"]
        .iter()
        .any(|device| user_agent.contains(device))
    {
        (PlatformKind::Ios, version_after(user_agent, "OS "))
    } else if user_agent.contains("Android") {
        (PlatformKind::Android, version_after(user_agent, "Android "))
    } else if user_agent.contains("Windows") {
        (PlatformKind::Windows, version_after(user_agent, "Windows NT "))
    } else if user_agent.contains("Mac OS X") {
        (PlatformKind::MacOs, version_after(user_agent, "Mac OS X "))
    } else if user_agent.contains("Linux") {
        (PlatformKind::Linux, None)
    } else {
        (PlatformKind::Unknown, None)
    }
}

fn first_version(user_agent: &str, markers: &[&str]) -> Option<u32> {
    markers
        .iter()
        .find_map(|marker| version_after(user_agent, marker))
}

fn parse_browser(user_agent: &str) -> (BrowserKind, Option<u32>) {
    if user_agent.contains("Edg/") || user_agent.contains("Edge/") {
        (BrowserKind::Edge, first_version(user_agent, &["Edg/", "Edge/"]))
    } else if user_agent.contains("Firefox/") || user_agent.contains("FxiOS/") {
        (BrowserKind::Firefox, first_version(user_agent, &["Firefox/", "FxiOS/"]))
    } else if user_agent.contains("Chrome/") || user_agent.contains("CriOS/") {
        (BrowserKind::Chrome, first_version(user_agent, &["Chrome/", "CriOS/"]))
    } else if user_agent.contains("Safari/") {
        (BrowserKind::Safari, version_after(user_agent, "Version/"))
    } else if user_agent.contains("Trident/") || user_agent.contains("MSIE ") {
        (BrowserKind::InternetExplorer, first_version(user_agent, &["MSIE ", "rv:"]))
    } else {
        (BrowserKind::Unknown, None)
    }
}

impl UserAgent {
    /// Parse a user agent string. Unrecognised parts come back as `Unknown`.
    pub fn parse(user_agent: &str) -> Self {
        let (platform, os_major) = parse_platform(user_agent);
        let (browser, browser_major) = parse_browser(user_agent);
        Self {
            browser,
            browser_major,
            platform,
            os_major,
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.browser)?;
        if let Some(major) = self.browser_major {
            write!(f, " {major}")?;
        }
        write!(f, " on {:?}", self.platform)?;
        if let Some(major) = self.os_major {
            write!(f, " {major}")?;
        }
        Ok(())
    }
}

/// Everything strategy selection needs to know about the capturing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub user_agent: UserAgent,
    pub device_pixel_ratio: f64,
    /// Viewport in layout pixels.
    pub viewport_size: RectangleSize,
    /// Physical screen in device pixels, when the surface reports it.
    pub screen_size: Option<RectangleSize>,
    pub is_mobile: bool,
}

impl Capabilities {
    /// Capabilities of a surface; mobile is inferred from the platform.
    pub fn new(user_agent: &str, device_pixel_ratio: f64, viewport_size: RectangleSize) -> Self {
        let user_agent = UserAgent::parse(user_agent);
        let is_mobile = user_agent.platform.is_mobile();
        Self {
            user_agent,
            device_pixel_ratio,
            viewport_size,
            screen_size: None,
            is_mobile,
        }
    }

    #[must_use]
    pub const fn with_screen_size(mut self, screen_size: RectangleSize) -> Self {
        self.screen_size = Some(screen_size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 11_0 like Mac OS X) AppleWebKit/604.1.38 (KHTML, like Gecko) Version/11.0 Mobile/15A372 Safari/604.1";
    const MAC_SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";
    const WINDOWS_FIREFOX: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0";
    const ANDROID_CHROME: &str = "Mozilla/5.0 (Linux; Android 9; Pixel 3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Mobile Safari/537.36";
    const WINDOWS_EDGE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 Edg/119.0.2151.97";
    const IE11: &str = "Mozilla/5.0 (Windows NT 6.1; Trident/7.0; rv:11.0) like Gecko";

    /// Common user agents are recognised with their major versions.
    ///
    /// # Panics
    /// Panics if a user agent is misparsed.
    #[test]
    fn parses_common_agents() {
        let iphone = UserAgent::parse(IPHONE_SAFARI);
        assert_eq!(
            (iphone.browser, iphone.browser_major, iphone.platform, iphone.os_major),
            (BrowserKind::Safari, Some(11), PlatformKind::Ios, Some(11))
        );

        let mac = UserAgent::parse(MAC_SAFARI);
        assert_eq!(
            (mac.browser, mac.browser_major, mac.platform, mac.os_major),
            (BrowserKind::Safari, Some(17), PlatformKind::MacOs, Some(10))
        );

        let firefox = UserAgent::parse(WINDOWS_FIREFOX);
        assert_eq!(
            (firefox.browser, firefox.browser_major, firefox.platform),
            (BrowserKind::Firefox, Some(120), PlatformKind::Windows)
        );

        let android = UserAgent::parse(ANDROID_CHROME);
        assert_eq!(
            (android.browser, android.platform, android.os_major),
            (BrowserKind::Chrome, PlatformKind::Android, Some(9))
        );

        assert_eq!(UserAgent::parse(WINDOWS_EDGE).browser, BrowserKind::Edge);
        let ie = UserAgent::parse(IE11);
        assert_eq!((ie.browser, ie.browser_major), (BrowserKind::InternetExplorer, Some(11)));
    }

    /// Garbage yields unknowns rather than an error.
    ///
    /// # Panics
    /// Panics if unknown input is classified.
    #[test]
    fn unknown_agent() {
        let agent = UserAgent::parse("curl/8.4.0");
        assert_eq!(agent.browser, BrowserKind::Unknown);
        assert_eq!(agent.platform, PlatformKind::Unknown);
        assert_eq!(agent.to_string(), "Unknown on Unknown");
    }

    /// Mobile is inferred from the platform.
    ///
    /// # Panics
    /// Panics if the mobile flag is wrong.
    #[test]
    fn mobile_flag() {
        assert!(Capabilities::new(IPHONE_SAFARI, 2.0, RectangleSize::new(375, 553)).is_mobile);
        assert!(!Capabilities::new(WINDOWS_FIREFOX, 1.0, RectangleSize::new(1280, 800)).is_mobile);
    }
}
