//! Picks capture strategies from a [`Capabilities`] record.

use crate::capabilities::{BrowserKind, Capabilities, PlatformKind};
use crate::config::StitchMode;
use crate::device::{DeviceSignature, crop_region_for};
use crate::normalize::{
    ContextBasedScaleProvider, CutProvider, FirefoxRegionCompensation, FixedCutProvider,
    NullCutProvider, NullRegionCompensation, NullScaleProvider, RegionPositionCompensation,
    SafariRegionCompensation, ScaleProvider,
};
use crate::position::{CssTranslatePositionProvider, PositionProvider, ScrollPositionProvider};
use crate::script::ScriptExecutor;
use geometry::RectangleSize;
use log::debug;
use std::rc::Rc;

/// Firefox releases before this one place regions correctly on scaled displays.
const FIREFOX_COMPENSATION_SINCE: u32 = 48;

/// Position provider for `mode`, scoped to `element` when given.
pub fn position_provider_for(
    mode: StitchMode,
    executor: Rc<dyn ScriptExecutor>,
    element: Option<&str>,
) -> Box<dyn PositionProvider> {
    match (mode, element) {
        (StitchMode::Scroll, None) => Box::new(ScrollPositionProvider::document(executor)),
        (StitchMode::Scroll, Some(selector)) => {
            Box::new(ScrollPositionProvider::element(executor, selector))
        }
        (StitchMode::Css, None) => Box::new(CssTranslatePositionProvider::document(executor)),
        (StitchMode::Css, Some(selector)) => {
            Box::new(CssTranslatePositionProvider::element(executor, selector))
        }
    }
}

/// Scale provider for a surface whose outermost document is `entire_size` large.
pub fn scale_provider_for(caps: &Capabilities, entire_size: RectangleSize) -> Box<dyn ScaleProvider> {
    if (caps.device_pixel_ratio - 1.0).abs() < f64::EPSILON && !caps.is_mobile {
        return Box::new(NullScaleProvider);
    }
    Box::new(ContextBasedScaleProvider::new(
        entire_size,
        caps.viewport_size,
        caps.device_pixel_ratio,
        caps.is_mobile,
    ))
}

/// Cut provider removing known device chrome, if any.
pub fn cut_provider_for(caps: &Capabilities) -> Box<dyn CutProvider> {
    let known = match (caps.user_agent.platform, caps.screen_size, caps.user_agent.os_major) {
        (PlatformKind::Ios, Some(screen), Some(os_major)) => {
            let signature = DeviceSignature::new(screen, caps.viewport_size, os_major);
            crop_region_for(&signature).map(|content| (screen, content))
        }
        _ => None,
    };
    if let Some((screen, content)) = known {
        debug!("Known device chrome for {}: keeping {content}", caps.user_agent);
        return Box::new(FixedCutProvider::keeping(screen, content));
    }
    Box::new(NullCutProvider)
}

/// Region position correction for the surface's browser.
pub fn region_compensation_for(caps: &Capabilities) -> Box<dyn RegionPositionCompensation> {
    let agent = &caps.user_agent;
    match agent.browser {
        BrowserKind::Firefox
            if agent
                .browser_major
                .is_some_and(|major| major >= FIREFOX_COMPENSATION_SINCE) =>
        {
            Box::new(FirefoxRegionCompensation)
        }
        BrowserKind::Safari if agent.platform == PlatformKind::MacOs => {
            Box::new(SafariRegionCompensation)
        }
        _ => Box::new(NullRegionCompensation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::testing::RecordingExecutor;
    use geometry::{Location, Region};
    use image::RgbaImage;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 11_0 like Mac OS X) AppleWebKit/604.1.38 (KHTML, like Gecko) Version/11.0 Mobile/15A372 Safari/604.1";
    const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";
    const OLD_FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:45.0) Gecko/20100101 Firefox/45.0";

    /// Known iOS devices get their chrome cut; everything else gets the null cut.
    ///
    /// # Panics
    /// Panics if the wrong cut provider is selected.
    #[test]
    fn cut_selection() {
        let iphone = Capabilities::new(IPHONE, 2.0, RectangleSize::new(375, 553))
            .with_screen_size(RectangleSize::new(750, 1334));
        let cut = cut_provider_for(&iphone);
        assert!(!cut.is_null());
        let raw = RgbaImage::new(750, 1334);
        assert_eq!(cut.cut(raw).dimensions(), (750, 1106));

        let unknown_screen = Capabilities::new(IPHONE, 2.0, RectangleSize::new(375, 553))
            .with_screen_size(RectangleSize::new(640, 1136));
        assert!(cut_provider_for(&unknown_screen).is_null());
        assert!(cut_provider_for(&Capabilities::new(FIREFOX, 1.0, RectangleSize::new(800, 600))).is_null());
    }

    /// Unit-ratio desktops skip scaling.
    ///
    /// # Panics
    /// Panics if the wrong scale provider is selected.
    #[test]
    fn scale_selection() {
        let desktop = Capabilities::new(FIREFOX, 1.0, RectangleSize::new(800, 600));
        assert!(scale_provider_for(&desktop, RectangleSize::new(800, 2000)).is_null());
        let retina = Capabilities::new(FIREFOX, 2.0, RectangleSize::new(800, 600));
        let mut provider = scale_provider_for(&retina, RectangleSize::new(800, 2000));
        provider.update_scale_ratio(1600);
        assert!((provider.scale_ratio() - 0.5).abs() < f64::EPSILON);
    }

    /// Firefox compensation depends on the release.
    ///
    /// # Panics
    /// Panics if the wrong compensation is selected.
    #[test]
    fn compensation_selection() {
        let region = Region::new(0, 10, 5, 5);
        let recent = region_compensation_for(&Capabilities::new(FIREFOX, 2.0, RectangleSize::new(800, 600)));
        assert_eq!(recent.compensate(region, 2.0, 0).top(), 9);
        let old = region_compensation_for(&Capabilities::new(OLD_FIREFOX, 2.0, RectangleSize::new(800, 600)));
        assert_eq!(old.compensate(region, 2.0, 0).top(), 10);
    }

    /// Each stitch mode maps to its provider.
    ///
    /// # Panics
    /// Panics if the provider does not use the expected mechanism.
    #[test]
    #[allow(clippy::unwrap_used, reason = "Test code may use unwrap for simplicity")]
    fn position_selection() {
        let executor = Rc::new(RecordingExecutor::default());
        let mut css = position_provider_for(StitchMode::Css, Rc::clone(&executor) as Rc<dyn ScriptExecutor>, None);
        css.set_position(Location::new(0, 10)).unwrap();
        assert!(executor.last_script().contains("translate(0px, -10px)"));
        let mut scroll =
            position_provider_for(StitchMode::Scroll, Rc::clone(&executor) as Rc<dyn ScriptExecutor>, Some("#feed"));
        scroll.set_position(Location::new(0, 10)).unwrap();
        assert!(executor.last_script().contains("el.scrollTop = 10"));
    }
}
