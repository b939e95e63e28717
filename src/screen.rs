use anyhow::{anyhow, Result};
use screenshots::Screen;

use crate::error::BoxError;
use crate::geometry::{DisplayRect, VirtualScreen};

/// Source of connected display geometry.
pub trait DisplayGeometryProvider {
    fn displays(&self) -> Result<Vec<DisplayRect>>;
}

/// Displays as reported by the `screenshots` backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDisplays;

impl DisplayGeometryProvider for SystemDisplays {
    fn displays(&self) -> Result<Vec<DisplayRect>> {
        let screens = Screen::all()?;
        Ok(screens.iter().map(display_rect).collect())
    }
}

pub(crate) fn display_rect(screen: &Screen) -> DisplayRect {
    let info = &screen.display_info;
    DisplayRect {
        left: info.x,
        top: info.y,
        width: info.width,
        height: info.height,
        scale_factor: info.scale_factor,
        is_primary: info.is_primary,
    }
}

/// Reads the live display layout and returns its bounding box. Never cached:
/// monitors may be rearranged between runs.
pub fn query_virtual_screen<P>(provider: &P) -> std::result::Result<VirtualScreen, BoxError>
where
    P: DisplayGeometryProvider + ?Sized,
{
    let displays = provider.displays()?;
    let screen = VirtualScreen::bounding(displays.iter().copied())
        .ok_or_else(|| anyhow!("no displays found"))?;
    log::debug!("virtual screen {} from {} display(s)", screen, displays.len());
    Ok(screen)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDisplays(Vec<DisplayRect>);

    impl DisplayGeometryProvider for FixedDisplays {
        fn displays(&self) -> Result<Vec<DisplayRect>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenDisplays;

    impl DisplayGeometryProvider for BrokenDisplays {
        fn displays(&self) -> Result<Vec<DisplayRect>> {
            Err(anyhow!("display server unreachable"))
        }
    }

    fn rect(left: i32, top: i32, width: u32, height: u32) -> DisplayRect {
        DisplayRect {
            left,
            top,
            width,
            height,
            scale_factor: 1.5,
            is_primary: false,
        }
    }

    #[test]
    fn virtual_screen_spans_all_displays() {
        let provider = FixedDisplays(vec![rect(0, 0, 1920, 1080), rect(-800, 0, 800, 600)]);
        let screen = query_virtual_screen(&provider).unwrap();
        assert_eq!(screen, VirtualScreen::new(-800, 0, 2720, 1080));
    }

    #[test]
    fn no_displays_is_a_query_failure() {
        let err = query_virtual_screen(&FixedDisplays(Vec::new())).unwrap_err();
        assert!(err.to_string().contains("no displays"));
        assert!(query_virtual_screen(&BrokenDisplays).is_err());
    }
}
