#[cfg(windows)]
pub mod win32;

use glam::IVec2;

/// Global cursor position in physical screen pixels.
///
/// Only Win32 exposes this to a window that never receives pointer events;
/// elsewhere the caller gets `None` and skips the tick.
pub fn cursor_pos() -> Option<IVec2> {
    #[cfg(windows)]
    {
        win32::cursor_pos()
    }
    #[cfg(not(windows))]
    {
        None
    }
}

/// Whether the global quit key is held.
pub fn quit_requested() -> bool {
    #[cfg(windows)]
    {
        win32::is_escape_pressed()
    }
    #[cfg(not(windows))]
    {
        false
    }
}
