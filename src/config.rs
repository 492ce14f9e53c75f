//! Fixed tuning for the runner. Nothing here is read at runtime.

/// Cursor poll period (milliseconds).
pub const POLL_MS: u32 = 30;
/// Slow-movement duration before switching to the idle animation (milliseconds).
pub const IDLE_AFTER_MS: u32 = 600;
/// Horizontal cursor travel per poll (px) above which the sprite runs.
pub const SPEED_THRESHOLD: i32 = 6;
/// Gap between the sprite's feet and the bottom of the visible screen area (px).
pub const BOTTOM_MARGIN: i32 = 6;
/// Scale applied to every decoded frame at load time.
pub const SCALE_FACTOR: f32 = 0.7;

/// Asset file names, resolved next to the executable.
pub const RUN_ASSET: &str = "sonic_run.gif";
pub const IDLE_ASSET: &str = "sonic_idle.gif";

/// Window title (never visible, but shows up in window enumerations).
pub const APP_NAME: &str = "Taskbar Runner";

/// How the idle animation is presented once bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleMode {
    /// Idle loops like the run animation.
    Looping,
    /// Idle is pinned to its first frame.
    Static,
}

/// How the idle cooldown counter starts after a fast tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStart {
    /// First slow tick sets the counter to 1, later ticks add `POLL_MS`.
    /// Idle lands one tick later than plain accumulation.
    Sentinel,
    /// Every slow tick adds `POLL_MS`.
    Accumulate,
}

pub const IDLE_MODE: IdleMode = IdleMode::Looping;
pub const COOLDOWN_START: CooldownStart = CooldownStart::Sentinel;

/// Tuning bundle handed to the follower. Tests build their own.
#[derive(Debug, Clone, Copy)]
pub struct FollowConfig {
    pub poll_ms: u32,
    pub idle_after_ms: u32,
    pub speed_threshold: i32,
    pub bottom_margin: i32,
    pub idle_mode: IdleMode,
    pub cooldown_start: CooldownStart,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            poll_ms: POLL_MS,
            idle_after_ms: IDLE_AFTER_MS,
            speed_threshold: SPEED_THRESHOLD,
            bottom_margin: BOTTOM_MARGIN,
            idle_mode: IDLE_MODE,
            cooldown_start: COOLDOWN_START,
        }
    }
}
