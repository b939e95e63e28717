//! Region picking and timed page capture for multi-monitor desktops.
//!
//! `pick` turns two clicks into a [`geometry::Region`]; `capture` validates
//! that region against the live [`geometry::VirtualScreen`] and replays a
//! key-press-then-grab loop into numbered PNG files.

pub mod capture;
pub mod config;
pub mod dpi;
pub mod error;
pub mod geometry;
pub mod input;
pub mod picker;
pub mod screen;
