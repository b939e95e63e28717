use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::{Region, VirtualScreen};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("region width/height must be positive: {region}")]
    Empty { region: Region },

    #[error(
        "region is outside the virtual screen\nregion={region}\nvirtual_screen={screen}\n\
         if display scaling is enabled, re-pick the region with this build so both tools agree on coordinates"
    )]
    OutOfBounds {
        region: Region,
        screen: VirtualScreen,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected LEFT,TOP,WIDTH,HEIGHT: {0}")]
pub struct ParseRegionError(pub(crate) String);

/// Step of a page iteration that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStage {
    KeyPress,
    Grab,
    Write,
}

impl fmt::Display for PageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageStage::KeyPress => "key press",
            PageStage::Grab => "screen grab",
            PageStage::Write => "image write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to query display geometry")]
    DisplayQuery(#[source] BoxError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("failed to create output directory {}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("page {index} failed during {stage}")]
    Page {
        index: u32,
        stage: PageStage,
        #[source]
        source: BoxError,
    },
}

impl CaptureError {
    /// Index of the last page that was fully written before the failure.
    pub fn last_completed(&self) -> Option<u32> {
        match self {
            CaptureError::Page { index, .. } => index.checked_sub(1).filter(|i| *i > 0),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PickError {
    #[error("failed to query display geometry")]
    DisplayQuery(#[source] BoxError),

    #[error("pointer listener failed: {0}")]
    Listener(String),
}
