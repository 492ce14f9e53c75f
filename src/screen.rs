use glam::IVec2;
use winit::event_loop::ActiveEventLoop;

use crate::geometry::Rect;

/// Source of screen geometry for window placement.
///
/// The screen is picked by its full bounds; the rectangle handed back is its
/// *visible* area, i.e. minus any taskbar or dock where the platform can tell
/// us about one.
pub trait ScreenLayout {
    /// Visible area of the screen whose bounds contain `p`, if any.
    fn screen_at(&self, p: IVec2) -> Option<Rect>;

    /// Visible area of the primary screen, used when the cursor is off every
    /// screen.
    fn primary(&self) -> Option<Rect>;

    /// Screen containing `p`, falling back to the primary screen.
    fn resolve(&self, p: IVec2) -> Option<Rect> {
        self.screen_at(p).or_else(|| self.primary())
    }
}

/// One attached screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    /// Full monitor rectangle, taskbar included.
    pub bounds: Rect,
    /// Part of `bounds` not covered by the taskbar.
    pub work_area: Rect,
}

impl Monitor {
    pub const fn new(bounds: Rect, work_area: Rect) -> Self {
        Self { bounds, work_area }
    }
}

impl From<Rect> for Monitor {
    /// A monitor with nothing reserved.
    fn from(bounds: Rect) -> Self {
        Self::new(bounds, bounds)
    }
}

/// Snapshot of the attached screens.
#[derive(Debug, Clone, Default)]
pub struct MonitorLayout {
    pub screens: Vec<Monitor>,
    pub primary: Option<usize>,
}

impl MonitorLayout {
    /// Collect monitor geometry from winit. Cheap enough to call every tick.
    ///
    /// On Windows each monitor also records its work area so the sprite sits
    /// on top of the taskbar instead of behind it.
    pub fn from_event_loop(event_loop: &ActiveEventLoop) -> Self {
        let primary_handle = event_loop.primary_monitor();
        let mut primary = None;
        let mut screens = Vec::new();

        for monitor in event_loop.available_monitors() {
            let pos = monitor.position();
            let size = monitor.size();
            let bounds = Rect::new(pos.x, pos.y, size.width as i32, size.height as i32);

            #[cfg(windows)]
            let work_area = crate::platform::win32::work_area(bounds).unwrap_or(bounds);
            #[cfg(not(windows))]
            let work_area = bounds;

            if primary_handle.as_ref() == Some(&monitor) {
                primary = Some(screens.len());
            }
            screens.push(Monitor::new(bounds, work_area));
        }

        // Some platforms (Wayland) never report a primary monitor.
        if primary.is_none() && !screens.is_empty() {
            primary = Some(0);
        }

        Self { screens, primary }
    }
}

impl ScreenLayout for MonitorLayout {
    fn screen_at(&self, p: IVec2) -> Option<Rect> {
        self.screens
            .iter()
            .find(|m| m.bounds.contains(p))
            .map(|m| m.work_area)
    }

    fn primary(&self) -> Option<Rect> {
        self.primary
            .and_then(|i| self.screens.get(i))
            .map(|m| m.work_area)
    }
}

#[cfg(test)]
impl MonitorLayout {
    pub(crate) fn new(screens: Vec<Monitor>, primary: Option<usize>) -> Self {
        Self { screens, primary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1920x1080 primary and 1280x1024 secondary, each with a bottom taskbar.
    fn dual() -> MonitorLayout {
        MonitorLayout::new(
            vec![
                Monitor::new(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040)),
                Monitor::new(Rect::new(1920, 0, 1280, 1024), Rect::new(1920, 0, 1280, 984)),
            ],
            Some(0),
        )
    }

    #[test]
    fn resolves_containing_screen() {
        let layout = dual();
        assert_eq!(layout.resolve(IVec2::new(2000, 500)), Some(layout.screens[1].work_area));
        assert_eq!(layout.resolve(IVec2::new(10, 10)), Some(layout.screens[0].work_area));
    }

    #[test]
    fn cursor_over_secondary_taskbar_stays_on_that_screen() {
        let layout = dual();
        let p = IVec2::new(2500, 1000);
        assert!(!layout.screens[1].work_area.contains(p));
        assert_eq!(layout.screen_at(p), Some(layout.screens[1].work_area));
    }

    #[test]
    fn falls_back_to_primary_off_screen() {
        let layout = MonitorLayout::new(dual().screens, Some(1));
        assert_eq!(layout.screen_at(IVec2::new(-500, -500)), None);
        assert_eq!(layout.resolve(IVec2::new(-500, -500)), Some(layout.screens[1].work_area));
    }

    #[test]
    fn empty_layout_resolves_nothing() {
        let layout = MonitorLayout::default();
        assert_eq!(layout.resolve(IVec2::ZERO), None);
    }
}
