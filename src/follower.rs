use std::time::Duration;

use glam::{IVec2, UVec2};
use image::RgbaImage;

use crate::anim::{AnimationAsset, AnimationPlayer};
use crate::config::{CooldownStart, FollowConfig, IdleMode};
use crate::geometry;
use crate::screen::ScreenLayout;

/// Which animation the sprite is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Running,
    Idle,
}

/// What the host should do after a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Window size to apply (current frame size).
    pub size: Option<UVec2>,
    /// Window top-left to apply. `None` means leave it where it is.
    pub position: Option<IVec2>,
    /// Facing or bound animation changed; the surface needs a redraw.
    pub repaint: bool,
    /// State entered on this tick, if any.
    pub entered: Option<DisplayState>,
}

/// The whole runner: animation binding, cursor-velocity state machine and
/// window placement. Owned by the event loop, driven by [`Self::on_tick`].
pub struct SpriteFollower {
    cfg: FollowConfig,
    run: Option<AnimationPlayer>,
    idle: Option<AnimationPlayer>,
    bound: Option<DisplayState>,
    last_cursor: IVec2,
    /// Milliseconds of slow movement since the last fast tick.
    cooldown_ms: u32,
    mirrored: bool,
}

impl SpriteFollower {
    /// Take ownership of the assets and bind idle if there is one.
    pub fn new(
        cfg: FollowConfig,
        run: Option<AnimationAsset>,
        idle: Option<AnimationAsset>,
        cursor: IVec2,
    ) -> Self {
        let idle_animated = cfg.idle_mode == IdleMode::Looping;
        let idle = idle.map(|a| AnimationPlayer::new(a, idle_animated));
        let bound = idle.as_ref().map(|_| DisplayState::Idle);

        Self {
            cfg,
            run: run.map(|a| AnimationPlayer::new(a, true)),
            idle,
            bound,
            last_cursor: cursor,
            cooldown_ms: 0,
            mirrored: false,
        }
    }

    pub fn bound(&self) -> Option<DisplayState> {
        self.bound
    }

    pub fn mirrored(&self) -> bool {
        self.mirrored
    }

    fn player(&self, state: DisplayState) -> Option<&AnimationPlayer> {
        match state {
            DisplayState::Running => self.run.as_ref(),
            DisplayState::Idle => self.idle.as_ref(),
        }
    }

    fn player_mut(&mut self, state: DisplayState) -> Option<&mut AnimationPlayer> {
        match state {
            DisplayState::Running => self.run.as_mut(),
            DisplayState::Idle => self.idle.as_mut(),
        }
    }

    /// Player for the bound animation.
    pub fn bound_player(&self) -> Option<&AnimationPlayer> {
        self.bound.and_then(|s| self.player(s))
    }

    /// Frame to paint right now. Safe to call at any time.
    pub fn current_frame(&self) -> Option<&RgbaImage> {
        self.bound_player().map(AnimationPlayer::current)
    }

    /// Window size the current frame needs.
    pub fn frame_size(&self) -> Option<UVec2> {
        self.bound_player().map(AnimationPlayer::size)
    }

    /// Advance the bound animation. Returns true if its frame changed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        match self.bound {
            Some(state) => self
                .player_mut(state)
                .is_some_and(|p| p.advance(dt)),
            None => false,
        }
    }

    /// Time until the bound animation shows its next frame.
    pub fn time_to_next_frame(&self) -> Option<Duration> {
        self.bound_player().and_then(AnimationPlayer::time_to_next_frame)
    }

    /// Where the window belongs for a cursor at `cursor`. `None` when nothing
    /// is bound or no screen can be resolved.
    pub fn placement(&self, cursor: IVec2, screens: &impl ScreenLayout) -> Option<IVec2> {
        let size = self.frame_size()?;
        let screen = screens.resolve(cursor)?;
        Some(geometry::place_window(
            &screen,
            size,
            cursor.x,
            self.cfg.bottom_margin,
        ))
    }

    /// Bind `state`'s animation. A no-op when it is already bound or its
    /// asset is missing. Returns true if the binding changed.
    fn play(&mut self, state: DisplayState) -> bool {
        if self.bound == Some(state) {
            return false;
        }
        let Some(player) = self.player_mut(state) else {
            return false;
        };
        player.restart();
        self.bound = Some(state);
        log::debug!("Sprite now {:?}", state);
        true
    }

    fn bump_cooldown(&mut self) {
        self.cooldown_ms = match self.cfg.cooldown_start {
            CooldownStart::Sentinel if self.cooldown_ms == 0 => 1,
            _ => self.cooldown_ms.saturating_add(self.cfg.poll_ms),
        };
    }

    /// One poll of the cursor.
    pub fn on_tick(&mut self, cursor: IVec2, screens: &impl ScreenLayout) -> TickOutcome {
        let mut out = TickOutcome {
            size: self.frame_size(),
            ..Default::default()
        };

        let dx = cursor.x - self.last_cursor.x;

        if dx != 0 {
            self.mirrored = dx < 0;
            out.repaint = true;
        }

        let target = if dx.abs() > self.cfg.speed_threshold {
            self.cooldown_ms = 0;
            Some(DisplayState::Running)
        } else {
            self.bump_cooldown();
            (self.cooldown_ms >= self.cfg.idle_after_ms).then_some(DisplayState::Idle)
        };

        if let Some(state) = target {
            if self.play(state) {
                out.entered = Some(state);
                out.repaint = true;
                out.size = self.frame_size();
            }
        }

        out.position = self.placement(cursor, screens);
        self.last_cursor = cursor;
        out
    }
}

#[cfg(test)]
impl SpriteFollower {
    fn cooldown_ms(&self) -> u32 {
        self.cooldown_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::tests::solid_asset;
    use crate::geometry::Rect;
    use crate::screen::{Monitor, MonitorLayout};

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1040);

    fn layout() -> MonitorLayout {
        MonitorLayout::new(vec![SCREEN.into()], Some(0))
    }

    fn run_asset() -> AnimationAsset {
        solid_asset("run", (70, 50), 4, 60)
    }

    fn idle_asset() -> AnimationAsset {
        solid_asset("idle", (40, 56), 3, 200)
    }

    fn follower_at(x: i32) -> SpriteFollower {
        SpriteFollower::new(
            FollowConfig::default(),
            Some(run_asset()),
            Some(idle_asset()),
            IVec2::new(x, 500),
        )
    }

    fn at(x: i32) -> IVec2 {
        IVec2::new(x, 500)
    }

    #[test]
    fn starts_idle_with_idle_frame_size() {
        let f = follower_at(100);
        assert_eq!(f.bound(), Some(DisplayState::Idle));
        assert_eq!(f.frame_size(), Some(UVec2::new(40, 56)));
        assert!(!f.mirrored());
        assert_eq!(
            f.placement(at(100), &layout()),
            Some(IVec2::new(80, 1040 - 56 - 6))
        );
    }

    #[test]
    fn run_left_then_idle_scenario() {
        let screens = layout();
        let mut f = follower_at(100);

        let out = f.on_tick(at(120), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Running));
        assert_eq!(out.entered, Some(DisplayState::Running));
        assert_eq!(out.size, Some(UVec2::new(70, 50)));
        assert!(!f.mirrored());

        let out = f.on_tick(at(90), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Running));
        assert_eq!(out.entered, None);
        assert!(f.mirrored());

        let mut idle_tick = None;
        for i in 1..=25 {
            f.on_tick(at(90), &screens);
            assert!(f.mirrored());
            if idle_tick.is_none() && f.bound() == Some(DisplayState::Idle) {
                idle_tick = Some(i);
            }
        }
        // One tick of sentinel offset on top of 600 / 30.
        assert_eq!(idle_tick, Some(21));
    }

    #[test]
    fn plain_accumulation_idles_on_twentieth_tick() {
        let cfg = FollowConfig {
            cooldown_start: CooldownStart::Accumulate,
            ..FollowConfig::default()
        };
        let screens = layout();
        let mut f = SpriteFollower::new(cfg, Some(run_asset()), Some(idle_asset()), at(0));
        f.on_tick(at(50), &screens);

        for _ in 0..19 {
            f.on_tick(at(50), &screens);
            assert_eq!(f.bound(), Some(DisplayState::Running));
        }
        f.on_tick(at(50), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Idle));
        assert_eq!(f.cooldown_ms(), 600);
    }

    #[test]
    fn fast_ticks_always_run() {
        let screens = layout();
        let mut f = follower_at(0);
        let mut x = 0;
        for step in [7, -7, 30, -200, 8, 1000, -9] {
            x += step;
            f.on_tick(at(x), &screens);
            assert_eq!(f.bound(), Some(DisplayState::Running));
            assert_eq!(f.cooldown_ms(), 0);
            assert_eq!(f.mirrored(), step < 0);
        }
    }

    #[test]
    fn threshold_distance_is_slow() {
        let screens = layout();
        let mut f = follower_at(0);
        f.on_tick(at(6), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Idle));
        assert_eq!(f.cooldown_ms(), 1);
        f.on_tick(at(0), &screens);
        assert_eq!(f.cooldown_ms(), 31);
        assert!(f.mirrored());
    }

    #[test]
    fn slow_jitter_still_reaches_idle() {
        let screens = layout();
        let mut f = follower_at(500);
        f.on_tick(at(600), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Running));

        let mut x = 600;
        for i in 0..21 {
            x += if i % 2 == 0 { 5 } else { -3 };
            f.on_tick(at(x), &screens);
        }
        assert_eq!(f.bound(), Some(DisplayState::Idle));
    }

    #[test]
    fn zero_delta_keeps_facing() {
        let screens = layout();
        let mut f = follower_at(300);
        f.on_tick(at(250), &screens);
        assert!(f.mirrored());

        let out = f.on_tick(at(250), &screens);
        assert!(f.mirrored());
        assert!(!out.repaint);

        f.on_tick(at(251), &screens);
        assert!(!f.mirrored());
    }

    #[test]
    fn vertical_motion_is_ignored() {
        let screens = layout();
        let mut f = follower_at(300);
        f.on_tick(IVec2::new(300, 0), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Idle));
        assert!(!f.mirrored());
    }

    #[test]
    fn window_stays_on_screen_for_any_cursor() {
        let screens = layout();
        let mut f = follower_at(0);
        for x in [-1_000_000, -50, 0, 17, 960, 1900, 1919, 5000, 1_000_000] {
            let out = f.on_tick(at(x), &screens);
            let size = out.size.unwrap();
            let pos = out.position.unwrap();
            assert!(pos.x >= SCREEN.left, "x={x}");
            assert!(pos.x <= SCREEN.right() - size.x as i32, "x={x}");
            assert_eq!(pos.y, SCREEN.bottom() - size.y as i32 - 6);
        }
    }

    #[test]
    fn follows_cursor_onto_second_screen() {
        let second = Rect::new(1920, 0, 1280, 984);
        let screens = MonitorLayout::new(vec![SCREEN.into(), second.into()], Some(0));
        let mut f = follower_at(1800);

        let out = f.on_tick(IVec2::new(2500, 300), &screens);
        let pos = out.position.unwrap();
        assert_eq!(pos, IVec2::new(2500 - 35, 984 - 50 - 6));
    }

    #[test]
    fn stays_on_second_screen_over_its_taskbar() {
        let primary = Monitor::new(Rect::new(0, 0, 1920, 1080), SCREEN);
        let second = Monitor::new(Rect::new(1920, 0, 1280, 1024), Rect::new(1920, 0, 1280, 984));
        let screens = MonitorLayout::new(vec![primary, second], Some(0));
        let mut f = follower_at(2400);

        let out = f.on_tick(IVec2::new(2500, 1000), &screens);
        let pos = out.position.unwrap();
        assert!(pos.x >= 1920, "jumped to primary: {pos:?}");
        assert_eq!(pos, IVec2::new(2500 - 35, 984 - 50 - 6));
    }

    #[test]
    fn no_screens_skips_placement() {
        let mut f = follower_at(0);
        let out = f.on_tick(at(100), &MonitorLayout::default());
        assert_eq!(out.position, None);
        assert_eq!(f.bound(), Some(DisplayState::Running));
    }

    #[test]
    fn already_running_does_not_restart() {
        let screens = layout();
        let mut f = follower_at(0);
        f.on_tick(at(100), &screens);
        assert!(f.advance(Duration::from_millis(130)));
        assert_eq!(f.bound_player().unwrap().frame_index(), 2);

        let out = f.on_tick(at(200), &screens);
        assert_eq!(out.entered, None);
        assert_eq!(f.bound_player().unwrap().frame_index(), 2);
    }

    #[test]
    fn missing_idle_never_binds() {
        let screens = layout();
        let mut f = SpriteFollower::new(FollowConfig::default(), Some(run_asset()), None, at(0));
        assert_eq!(f.bound(), None);
        assert!(f.current_frame().is_none());
        assert_eq!(f.on_tick(at(0), &screens).position, None);

        f.on_tick(at(100), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Running));

        for _ in 0..40 {
            f.on_tick(at(100), &screens);
        }
        // Idle has nothing to show, so the run animation stays up.
        assert_eq!(f.bound(), Some(DisplayState::Running));
    }

    #[test]
    fn no_assets_draws_nothing() {
        let screens = layout();
        let mut f = SpriteFollower::new(FollowConfig::default(), None, None, at(0));
        for x in [0, 100, 100, -400] {
            let out = f.on_tick(at(x), &screens);
            assert_eq!(out.entered, None);
            assert_eq!(out.size, None);
        }
        assert!(f.current_frame().is_none());
        assert!(!f.advance(Duration::from_secs(1)));
        assert_eq!(f.time_to_next_frame(), None);
    }

    #[test]
    fn missing_run_keeps_idle() {
        let screens = layout();
        let mut f = SpriteFollower::new(FollowConfig::default(), None, Some(idle_asset()), at(0));
        let out = f.on_tick(at(500), &screens);
        assert_eq!(f.bound(), Some(DisplayState::Idle));
        assert_eq!(out.entered, None);
        assert!(out.repaint);
    }

    #[test]
    fn static_idle_holds_first_frame() {
        let cfg = FollowConfig {
            idle_mode: IdleMode::Static,
            ..FollowConfig::default()
        };
        let mut f = SpriteFollower::new(cfg, Some(run_asset()), Some(idle_asset()), at(0));
        assert!(!f.advance(Duration::from_secs(3)));
        assert_eq!(f.bound_player().unwrap().frame_index(), 0);
        assert_eq!(f.time_to_next_frame(), None);

        let mut looping = follower_at(0);
        assert!(looping.advance(Duration::from_millis(250)));
        assert_eq!(looping.bound_player().unwrap().frame_index(), 1);
    }
}
