use anyhow::{anyhow, Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use screenshots::Screen;

use super::PixelGrabber;
use crate::geometry::{DisplayRect, Region};
use crate::screen::display_rect;

/// Grabs regions through the `screenshots` backend. A region spanning several
/// displays is stitched together from one capture per display; pixels not
/// covered by any display stay black.
#[derive(Debug, Default)]
pub struct ScreenGrabber;

impl PixelGrabber for ScreenGrabber {
    fn grab(&mut self, region: Region) -> Result<RgbaImage> {
        let screens = Screen::all()?;
        let displays: Vec<DisplayRect> = screens.iter().map(display_rect).collect();

        let tiles = tiles(region, &displays);
        if tiles.is_empty() {
            return Err(anyhow!("region {} does not overlap any display", region));
        }

        let mut canvas = RgbaImage::new(region.width as u32, region.height as u32);
        for (i, tile) in tiles {
            let display = &displays[i];
            let mut part = screens[i]
                .capture_area(
                    tile.left - display.left,
                    tile.top - display.top,
                    tile.width as u32,
                    tile.height as u32,
                )
                .with_context(|| {
                    format!(
                        "capturing {} on display at ({}, {})",
                        tile, display.left, display.top
                    )
                })?;

            // Backends that capture at backing-store resolution return
            // scale_factor times the requested size.
            let size = (tile.width as u32, tile.height as u32);
            if part.dimensions() != size {
                log::debug!(
                    "resizing {}x{} capture to {}x{} (scale {})",
                    part.width(),
                    part.height(),
                    size.0,
                    size.1,
                    display.scale_factor
                );
                part = imageops::resize(&part, size.0, size.1, FilterType::Triangle);
            }

            imageops::replace(
                &mut canvas,
                &part,
                (tile.left - region.left) as i64,
                (tile.top - region.top) as i64,
            );
        }
        Ok(canvas)
    }
}

/// Part of `region` covered by each display, paired with the display index.
fn tiles(region: Region, displays: &[DisplayRect]) -> Vec<(usize, Region)> {
    displays
        .iter()
        .enumerate()
        .filter_map(|(i, d)| region.intersection(&d.as_region()).map(|tile| (i, tile)))
        .collect()
}
