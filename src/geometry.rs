use glam::{IVec2, UVec2};

/// Axis-aligned screen rectangle in physical pixels.
/// `right()` and `bottom()` are exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }
}

/// Top-left corner for a window of `size` that follows `cursor_x` along the
/// bottom of `screen`. The window is centred on the cursor, then clamped so
/// it never leaves the screen horizontally. A screen narrower than the
/// window pins it to the left edge.
pub fn place_window(screen: &Rect, size: UVec2, cursor_x: i32, bottom_margin: i32) -> IVec2 {
    let w = size.x as i32;
    let h = size.y as i32;

    let x = cursor_x - w / 2;
    let x = screen.left.max(x.min(screen.right() - w));
    let y = screen.bottom() - h - bottom_margin;

    IVec2::new(x, y)
}
