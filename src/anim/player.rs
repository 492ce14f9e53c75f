use std::time::Duration;

use glam::UVec2;
use image::RgbaImage;

use super::AnimationAsset;

/// Playhead over an owned [`AnimationAsset`].
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    asset: AnimationAsset,
    frame: usize,
    /// Time spent on the current frame.
    elapsed: Duration,
    /// `false` pins the playhead to frame 0.
    animated: bool,
}

impl AnimationPlayer {
    pub fn new(asset: AnimationAsset, animated: bool) -> Self {
        Self {
            asset,
            frame: 0,
            elapsed: Duration::ZERO,
            animated,
        }
    }

    pub fn current(&self) -> &RgbaImage {
        &self.asset.frame(self.frame).image
    }

    pub fn size(&self) -> UVec2 {
        let (w, h) = self.current().dimensions();
        UVec2::new(w, h)
    }

    /// Jump back to the first frame.
    pub fn restart(&mut self) {
        self.frame = 0;
        self.elapsed = Duration::ZERO;
    }

    fn plays(&self) -> bool {
        self.animated && self.asset.frame_count() > 1
    }

    /// Advance by `dt`. Returns true if the visible frame changed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.plays() {
            return false;
        }

        let start = self.frame;
        self.elapsed += dt;

        // A whole loop lands on the same frame; skip it after a long stall.
        let cycle = self.asset.cycle();
        if self.elapsed >= cycle {
            let rem = self.elapsed.as_nanos() % cycle.as_nanos();
            self.elapsed = Duration::from_nanos(rem as u64);
        }

        while self.elapsed >= self.asset.frame(self.frame).delay {
            self.elapsed -= self.asset.frame(self.frame).delay;
            self.frame = (self.frame + 1) % self.asset.frame_count();
        }

        self.frame != start
    }

    /// Time until the next frame change, or `None` for a still image.
    pub fn time_to_next_frame(&self) -> Option<Duration> {
        if !self.plays() {
            return None;
        }
        Some(
            self.asset
                .frame(self.frame)
                .delay
                .saturating_sub(self.elapsed),
        )
    }
}

#[cfg(test)]
impl AnimationPlayer {
    pub(crate) fn frame_index(&self) -> usize {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::tests::solid_asset;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn advances_on_frame_delay() {
        let mut p = AnimationPlayer::new(solid_asset("run", (4, 4), 3, 100), true);
        assert!(!p.advance(ms(60)));
        assert_eq!(p.frame_index(), 0);
        assert_eq!(p.time_to_next_frame(), Some(ms(40)));

        assert!(p.advance(ms(60)));
        assert_eq!(p.frame_index(), 1);
        assert_eq!(p.time_to_next_frame(), Some(ms(80)));
    }

    #[test]
    fn loops_back_to_start() {
        let mut p = AnimationPlayer::new(solid_asset("run", (4, 4), 3, 100), true);
        p.advance(ms(250));
        assert_eq!(p.frame_index(), 2);
        p.advance(ms(50));
        assert_eq!(p.frame_index(), 0);
    }

    #[test]
    fn long_stall_skips_whole_loops() {
        let mut p = AnimationPlayer::new(solid_asset("run", (4, 4), 4, 100), true);
        p.advance(ms(10 * 400 + 150));
        assert_eq!(p.frame_index(), 1);
        assert_eq!(p.time_to_next_frame(), Some(ms(50)));
    }

    #[test]
    fn still_player_never_moves() {
        let mut p = AnimationPlayer::new(solid_asset("idle", (4, 4), 5, 100), false);
        assert!(!p.advance(ms(10_000)));
        assert_eq!(p.frame_index(), 0);
        assert_eq!(p.time_to_next_frame(), None);

        let mut single = AnimationPlayer::new(solid_asset("one", (4, 4), 1, 100), true);
        assert!(!single.advance(ms(500)));
        assert_eq!(single.time_to_next_frame(), None);
    }

    #[test]
    fn restart_rewinds() {
        let mut p = AnimationPlayer::new(solid_asset("run", (6, 2), 3, 100), true);
        p.advance(ms(230));
        p.restart();
        assert_eq!(p.frame_index(), 0);
        assert_eq!(p.time_to_next_frame(), Some(ms(100)));
        assert_eq!(p.size(), UVec2::new(6, 2));
    }
}
