use glam::IVec2;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::Graphics::Dwm::DwmSetWindowAttribute;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTONULL,
};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetWindowLongPtrW, SetWindowLongPtrW, SetWindowPos, GWL_EXSTYLE,
    SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW,
};

use crate::geometry::Rect;

/// Extract the Win32 HWND from a winit window.
pub fn get_hwnd(window: &winit::window::Window) -> HWND {
    let handle = window.window_handle().expect("window handle unavailable");
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => HWND(h.hwnd.get() as *mut core::ffi::c_void),
        _ => panic!("expected Win32 window handle"),
    }
}

/// Apply overlay window styles: no activation, no taskbar button, no DWM
/// border or backdrop.
pub unsafe fn make_overlay(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    log::debug!("Window ex-style before: 0x{:08X}", style);

    // WS_EX_LAYERED would add a GDI backing surface that fights the
    // DirectComposition visual wgpu presents through.
    const WS_EX_LAYERED: isize = 0x00080000;
    const WS_EX_NOREDIRECTIONBITMAP: isize = 0x00200000;

    let new_style = (style & !WS_EX_LAYERED)
        | WS_EX_NOACTIVATE.0 as isize
        | WS_EX_TOOLWINDOW.0 as isize
        | WS_EX_NOREDIRECTIONBITMAP;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_style);

    log::debug!("Window ex-style after:  0x{:08X}", new_style);

    // Make DWM pick up the new styles now rather than on the next resize.
    let _ = SetWindowPos(
        hwnd,
        HWND::default(),
        0,
        0,
        0,
        0,
        SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    );

    // (attribute, value) pairs:
    // NCRENDERING_POLICY = DISABLED, WINDOW_CORNER_PREFERENCE = DONOTROUND,
    // BORDER_COLOR = COLOR_NONE, SYSTEMBACKDROP_TYPE = NONE.
    let attrs: [(i32, u32); 4] = [(2, 2), (33, 1), (34, 0xFFFFFFFE), (38, 1)];
    for (attr, value) in attrs {
        let _ = DwmSetWindowAttribute(
            hwnd,
            windows::Win32::Graphics::Dwm::DWMWINDOWATTRIBUTE(attr),
            &value as *const u32 as *const core::ffi::c_void,
            4,
        );
    }
}

/// Set up the window as a transparent, click-through, always-on-top overlay.
pub fn setup_overlay(window: &winit::window::Window) {
    if let Err(e) = window.set_cursor_hittest(false) {
        log::warn!("Click-through unavailable: {e}");
    }

    let hwnd = get_hwnd(window);
    unsafe {
        make_overlay(hwnd);
    }

    log::info!("Win32 overlay setup complete (click-through + toolwindow)");
}

/// Global cursor position in physical screen pixels.
pub fn cursor_pos() -> Option<IVec2> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point) }.ok()?;
    Some(IVec2::new(point.x, point.y))
}

/// Work area (screen minus taskbar) of the monitor whose bounds are `monitor`.
pub fn work_area(monitor: Rect) -> Option<Rect> {
    let centre = POINT {
        x: monitor.left + monitor.width / 2,
        y: monitor.top + monitor.height / 2,
    };

    unsafe {
        let hmon = MonitorFromPoint(centre, MONITOR_DEFAULTTONULL);
        if hmon.0.is_null() {
            return None;
        }

        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !GetMonitorInfoW(hmon, &mut info).as_bool() {
            return None;
        }

        let r = info.rcWork;
        Some(Rect::new(r.left, r.top, r.right - r.left, r.bottom - r.top))
    }
}

/// Check if the ESC key is currently pressed (works regardless of window focus).
pub fn is_escape_pressed() -> bool {
    // VK_ESCAPE = 0x1B. High bit set = key is currently down.
    unsafe { GetAsyncKeyState(0x1B) & (0x8000u16 as i16) != 0 }
}
