pub mod grabber;

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use image::{DynamicImage, RgbaImage};
use rdev::Key;

use crate::error::{CaptureError, PageStage};
use crate::geometry::{validate, Region, VirtualScreen};

/// Grabs raw pixels for a region of the virtual screen.
pub trait PixelGrabber {
    /// Must return an image of exactly `region.width` x `region.height`.
    fn grab(&mut self, region: Region) -> Result<RgbaImage>;
}

/// Synthesizes key presses for the focused window.
pub trait InputInjector {
    fn press_key(&mut self, key: Key) -> Result<()>;
}

/// Settings for one capture run.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub region: Region,
    pub pages: u32,
    pub key: Key,
    /// Pause between the key press and the grab, for the target to redraw.
    pub wait: Duration,
    /// Pause before the first page so the operator can focus the target.
    pub start_delay: Duration,
    pub output_dir: PathBuf,
}

impl CaptureSession {
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("images")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Validating,
    Running { index: u32 },
    Completed { pages: u32 },
    /// Validation or output directory setup failed; nothing was captured.
    Aborted,
    /// Page `index` failed; pages before it are on disk.
    Failed { index: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// Written files in creation order.
    pub pages: Vec<PathBuf>,
}

/// `page_0001.png`, `page_0002.png`, ...
pub fn page_file_name(index: u32) -> String {
    format!("page_{:04}.png", index)
}

/// Press, wait, grab, write, strictly in sequence for every page.
pub struct CaptureLoop<G, K> {
    grabber: G,
    injector: K,
    state: CaptureState,
}

impl<G: PixelGrabber, K: InputInjector> CaptureLoop<G, K> {
    pub fn new(grabber: G, injector: K) -> Self {
        Self {
            grabber,
            injector,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn into_parts(self) -> (G, K) {
        (self.grabber, self.injector)
    }

    /// Validates the region against `screen`, then captures `session.pages`
    /// pages. An invalid region aborts before any key is sent or file is
    /// written. A failing page stops the run; earlier pages stay on disk and
    /// files from older runs with the same numbers are overwritten.
    pub fn run(
        &mut self,
        session: &CaptureSession,
        screen: VirtualScreen,
    ) -> Result<CaptureReport, CaptureError> {
        self.state = CaptureState::Validating;
        if let Err(e) = validate(session.region, screen) {
            self.state = CaptureState::Aborted;
            return Err(e.into());
        }

        let images_dir = session.images_dir();
        if let Err(source) = fs::create_dir_all(&images_dir) {
            self.state = CaptureState::Aborted;
            return Err(CaptureError::OutputDir {
                path: images_dir,
                source,
            });
        }

        log::info!(
            "capturing {} page(s) of {} with {:?}, wait {:?}",
            session.pages,
            session.region,
            session.key,
            session.wait
        );

        if !session.start_delay.is_zero() {
            println!(
                "Switch to the target window. Starting in {:.1} seconds...",
                session.start_delay.as_secs_f32()
            );
            thread::sleep(session.start_delay);
        }

        let mut report = CaptureReport::default();
        for index in 1..=session.pages {
            self.state = CaptureState::Running { index };
            match self.capture_page(session, &images_dir, index) {
                Ok(path) => {
                    println!("Captured page {} -> {}", index, path.display());
                    report.pages.push(path);
                }
                Err(e) => {
                    self.state = CaptureState::Failed { index };
                    return Err(e);
                }
            }
        }

        self.state = CaptureState::Completed {
            pages: session.pages,
        };
        Ok(report)
    }

    fn capture_page(
        &mut self,
        session: &CaptureSession,
        images_dir: &Path,
        index: u32,
    ) -> Result<PathBuf, CaptureError> {
        let fail = move |stage: PageStage| {
            move |e: anyhow::Error| CaptureError::Page {
                index,
                stage,
                source: e.into(),
            }
        };

        self.injector
            .press_key(session.key)
            .map_err(fail(PageStage::KeyPress))?;

        thread::sleep(session.wait);

        let region = session.region;
        let pixels = self
            .grabber
            .grab(region)
            .and_then(|img| {
                let expected = (region.width as u32, region.height as u32);
                if img.dimensions() != expected {
                    return Err(anyhow!(
                        "backend returned {}x{}, expected {}x{}",
                        img.width(),
                        img.height(),
                        expected.0,
                        expected.1
                    ));
                }
                Ok(img)
            })
            .map_err(fail(PageStage::Grab))?;

        let rgb = DynamicImage::ImageRgba8(pixels).to_rgb8();
        let path = images_dir.join(page_file_name(index));
        rgb.save(&path)
            .map_err(|e| fail(PageStage::Write)(anyhow::Error::new(e)))?;

        log::debug!("page {} written to {}", index, path.display());
        Ok(path)
    }
}
