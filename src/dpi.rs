//! Process DPI awareness.
//!
//! On Windows with display scaling, an unaware process receives scaled
//! coordinates from the pointer hook while the capture backend works in
//! physical pixels. Both subcommands call [`ensure_dpi_awareness`] before
//! reading any coordinate so the picked region and the captured region agree.

use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpiAwareness {
    /// Per-monitor v2: physical pixels on every monitor.
    Precise,
    /// System-wide awareness only; monitors with a different scale than the
    /// primary may report approximate coordinates.
    Legacy,
    /// No awareness mode could be set.
    Unavailable,
    /// Platform does not scale coordinates per process.
    NotApplicable,
}

impl fmt::Display for DpiAwareness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DpiAwareness::Precise => "per-monitor v2",
            DpiAwareness::Legacy => "legacy system-aware",
            DpiAwareness::Unavailable => "unavailable",
            DpiAwareness::NotApplicable => "not applicable",
        };
        f.write_str(name)
    }
}

static AWARENESS: OnceLock<DpiAwareness> = OnceLock::new();

/// Requests the most precise awareness mode once per process and logs the
/// outcome. Later calls return the first result.
pub fn ensure_dpi_awareness() -> DpiAwareness {
    *AWARENESS.get_or_init(|| {
        let mode = probe();
        match mode {
            DpiAwareness::Precise | DpiAwareness::NotApplicable => {
                log::debug!("dpi awareness: {}", mode)
            }
            DpiAwareness::Legacy => log::warn!(
                "dpi awareness: {} (coordinates on differently scaled monitors may be off)",
                mode
            ),
            DpiAwareness::Unavailable => log::warn!(
                "dpi awareness: {} (coordinates may be scaled; out-of-bounds checks still apply)",
                mode
            ),
        }
        mode
    })
}

#[cfg(windows)]
fn probe() -> DpiAwareness {
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };
    use windows::Win32::UI::WindowsAndMessaging::SetProcessDPIAware;

    unsafe {
        if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_ok() {
            return DpiAwareness::Precise;
        }
        if SetProcessDPIAware().as_bool() {
            DpiAwareness::Legacy
        } else {
            DpiAwareness::Unavailable
        }
    }
}

#[cfg(not(windows))]
fn probe() -> DpiAwareness {
    DpiAwareness::NotApplicable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_return_first_outcome() {
        let first = ensure_dpi_awareness();
        assert_eq!(ensure_dpi_awareness(), first);
    }

    #[cfg(not(windows))]
    #[test]
    fn non_windows_is_a_no_op() {
        assert_eq!(ensure_dpi_awareness(), DpiAwareness::NotApplicable);
    }
}
