use std::time::Duration;

use anyhow::Result;
use image::{Rgba, RgbaImage};
use page_capture::capture::{CaptureLoop, CaptureState, InputInjector, PixelGrabber};
use page_capture::config::AppConfig;
use page_capture::error::{CaptureError, RegionError};
use page_capture::geometry::{DisplayRect, Point, Region};
use page_capture::picker::{pick_region, PointerButton, PointerEvent};
use page_capture::screen::{query_virtual_screen, DisplayGeometryProvider};
use rdev::Key;

/// Primary 1920x1080 with a 1280x1024 monitor to its left.
struct DualMonitors;

impl DisplayGeometryProvider for DualMonitors {
    fn displays(&self) -> Result<Vec<DisplayRect>> {
        Ok(vec![
            DisplayRect {
                left: 0,
                top: 0,
                width: 1920,
                height: 1080,
                scale_factor: 1.0,
                is_primary: true,
            },
            DisplayRect {
                left: -1280,
                top: 0,
                width: 1280,
                height: 1024,
                scale_factor: 1.25,
                is_primary: false,
            },
        ])
    }
}

struct GrayGrabber {
    grabbed: Vec<Region>,
}

impl PixelGrabber for GrayGrabber {
    fn grab(&mut self, region: Region) -> Result<RgbaImage> {
        self.grabbed.push(region);
        Ok(RgbaImage::from_pixel(
            region.width as u32,
            region.height as u32,
            Rgba([128, 128, 128, 255]),
        ))
    }
}

#[derive(Default)]
struct Keys(Vec<Key>);

impl InputInjector for Keys {
    fn press_key(&mut self, key: Key) -> Result<()> {
        self.0.push(key);
        Ok(())
    }
}

fn click(x: i32, y: i32) -> [PointerEvent; 2] {
    let press = PointerEvent {
        position: Point::new(x, y),
        button: PointerButton::Primary,
        pressed: true,
    };
    [press, PointerEvent { pressed: false, ..press }]
}

#[test]
fn picked_region_on_left_monitor_is_captured() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("config.json");

    // Bottom-right clicked first; order does not matter.
    let events = click(-300, 700).into_iter().chain(click(-1100, 150));
    let region = pick_region(events, |_| {}).region().unwrap();
    assert_eq!(region, Region::new(-1100, 150, 800, 550));

    let config = AppConfig {
        region: Some(region),
        pages: 3,
        wait_ms: 0,
        start_delay_ms: 0,
        output_dir: tmp.path().join("output"),
        ..AppConfig::default()
    };
    config.save(&config_path).unwrap();

    let session = AppConfig::load(&config_path)
        .unwrap()
        .capture_session()
        .unwrap();
    assert_eq!(session.wait, Duration::ZERO);

    let screen = query_virtual_screen(&DualMonitors).unwrap();
    let mut capture = CaptureLoop::new(GrayGrabber { grabbed: Vec::new() }, Keys::default());
    let report = capture.run(&session, screen).unwrap();

    assert_eq!(capture.state(), CaptureState::Completed { pages: 3 });
    let names: Vec<_> = report
        .pages
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["page_0001.png", "page_0002.png", "page_0003.png"]);
    for page in &report.pages {
        assert_eq!(image::image_dimensions(page).unwrap(), (800, 550));
    }

    let (grabber, keys) = capture.into_parts();
    assert_eq!(grabber.grabbed, vec![region; 3]);
    assert_eq!(keys.0, vec![Key::PageDown; 3]);
}

#[test]
fn region_picked_under_other_scaling_is_rejected_before_capture() {
    let tmp = tempfile::tempdir().unwrap();
    let config = AppConfig {
        // Starts 120px left of the leftmost monitor.
        region: Some(Region::new(-1400, 0, 600, 1000)),
        start_delay_ms: 0,
        output_dir: tmp.path().join("output"),
        ..AppConfig::default()
    };
    let session = config.capture_session().unwrap();
    let screen = query_virtual_screen(&DualMonitors).unwrap();

    let mut capture = CaptureLoop::new(GrayGrabber { grabbed: Vec::new() }, Keys::default());
    let err = capture.run(&session, screen).unwrap_err();

    match err {
        CaptureError::Region(RegionError::OutOfBounds { region, screen }) => {
            assert_eq!(region, Region::new(-1400, 0, 600, 1000));
            assert_eq!(screen.left, -1280);
            assert_eq!(screen.width, 3200);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(capture.state(), CaptureState::Aborted);
    assert!(!tmp.path().join("output").exists());
}
