use std::sync::Arc;
use std::time::Duration;

use glam::{IVec2, UVec2};
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::anim;
use crate::config::{self, FollowConfig};
use crate::follower::{SpriteFollower, TickOutcome};
use crate::platform;
use crate::render::GpuState;
use crate::screen::MonitorLayout;

/// Cursor poll period.
const TICK_PERIOD: Duration = Duration::from_millis(config::POLL_MS as u64);
/// How often to log tick stats (seconds).
const STATS_LOG_INTERVAL: f64 = 60.0;

// ---------------------------------------------------------------------------
// Tick stats
// ---------------------------------------------------------------------------

struct TickStats {
    tick_count: u64,
    last_log_time: Instant,
    ticks_since_log: u32,
    transitions_since_log: u32,
    skipped_since_log: u32,
    tick_time_sum: f64,
    tick_time_max: f64,
}

impl TickStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            last_log_time: Instant::now(),
            ticks_since_log: 0,
            transitions_since_log: 0,
            skipped_since_log: 0,
            tick_time_sum: 0.0,
            tick_time_max: 0.0,
        }
    }

    fn record(&mut self, elapsed: f64, outcome: Option<&TickOutcome>) {
        self.tick_count += 1;
        self.ticks_since_log += 1;
        self.tick_time_sum += elapsed;
        self.tick_time_max = self.tick_time_max.max(elapsed);
        match outcome {
            Some(out) if out.entered.is_some() => self.transitions_since_log += 1,
            Some(_) => {}
            None => self.skipped_since_log += 1,
        }

        let since = self.last_log_time.elapsed().as_secs_f64();
        if since >= STATS_LOG_INTERVAL {
            let avg_us = self.tick_time_sum / self.ticks_since_log as f64 * 1_000_000.0;
            log::debug!(
                "Ticks: {} | transitions: {} | skipped: {} | avg: {:.1}us | max: {:.1}us | total ticks: {}",
                self.ticks_since_log,
                self.transitions_since_log,
                self.skipped_since_log,
                avg_us,
                self.tick_time_max * 1_000_000.0,
                self.tick_count,
            );
            self.last_log_time = Instant::now();
            self.ticks_since_log = 0;
            self.transitions_since_log = 0;
            self.skipped_since_log = 0;
            self.tick_time_sum = 0.0;
            self.tick_time_max = 0.0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,

    follower: SpriteFollower,

    // Scheduling
    next_tick: Instant,
    last_advance: Instant,

    // Last geometry pushed to the window
    window_size: UVec2,
    window_pos: Option<IVec2>,

    stats: TickStats,
    warned_no_cursor: bool,

    /// Set when startup fails inside the event loop; returned from `run`.
    fatal: Option<Box<dyn std::error::Error>>,
}

impl App {
    fn new(follower: SpriteFollower) -> Self {
        let now = Instant::now();
        Self {
            window: None,
            gpu: None,
            follower,
            next_tick: now + TICK_PERIOD,
            last_advance: now,
            window_size: UVec2::ONE,
            window_pos: None,
            stats: TickStats::new(),
            warned_no_cursor: false,
            fatal: None,
        }
    }

    /// Push size/position to the window when they changed.
    fn apply_geometry(&mut self, size: Option<UVec2>, position: Option<IVec2>) {
        let Some(window) = &self.window else {
            return;
        };

        if let Some(size) = size {
            if size != self.window_size {
                log::debug!("Window resized to {}x{}", size.x, size.y);
                let _ = window.request_inner_size(PhysicalSize::new(size.x, size.y));
                self.window_size = size;
            }
        }

        if let Some(pos) = position {
            if Some(pos) != self.window_pos {
                window.set_outer_position(PhysicalPosition::new(pos.x, pos.y));
                self.window_pos = Some(pos);
            }
        }
    }

    /// Poll the cursor and run the follower. Returns true if a redraw is due.
    fn tick(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let start = Instant::now();

        let Some(cursor) = platform::cursor_pos() else {
            if !self.warned_no_cursor {
                log::warn!("Global cursor position unavailable on this platform; sprite will not follow");
                self.warned_no_cursor = true;
            }
            self.stats.record(start.elapsed().as_secs_f64(), None);
            return false;
        };

        let screens = MonitorLayout::from_event_loop(event_loop);
        let out = self.follower.on_tick(cursor, &screens);
        self.apply_geometry(out.size, out.position);

        self.stats.record(start.elapsed().as_secs_f64(), Some(&out));
        out.repaint
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let size = self.follower.frame_size().unwrap_or(UVec2::ONE);
        let cursor = platform::cursor_pos().unwrap_or(IVec2::ZERO);
        let screens = MonitorLayout::from_event_loop(event_loop);
        let position = self.follower.placement(cursor, &screens);

        // Start hidden so DWM doesn't cache stale frame state before our
        // overlay style changes take effect.
        let mut attrs = WindowAttributes::default()
            .with_title(config::APP_NAME)
            .with_decorations(false)
            .with_resizable(false)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(size.x, size.y));

        if let Some(pos) = position {
            attrs = attrs.with_position(PhysicalPosition::new(pos.x, pos.y));
        }

        // No with_transparent(true) on Windows: WS_EX_LAYERED conflicts with
        // DirectComposition; transparency comes from the swapchain alpha.
        #[cfg(not(windows))]
        {
            attrs = attrs.with_transparent(true);
        }

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create overlay window: {e}");
                self.fatal = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        #[cfg(windows)]
        platform::win32::setup_overlay(&window);
        #[cfg(not(windows))]
        {
            if let Err(e) = window.set_cursor_hittest(false) {
                log::warn!("Click-through unavailable: {e}");
            }
        }

        log::info!(
            "Overlay window created: {}x{} at {:?}",
            size.x,
            size.y,
            position,
        );

        match GpuState::new(window.clone()) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                log::error!("GPU init failed: {e}");
                self.fatal = Some(e.into());
                event_loop.exit();
                return;
            }
        }
        log::info!("wgpu + sprite pipeline initialized");

        self.window_size = size;
        self.window_pos = position;
        let now = Instant::now();
        self.next_tick = now + TICK_PERIOD;
        self.last_advance = now;
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));

        window.set_visible(true);
        window.request_redraw();

        self.window = Some(window);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Window is click-through so it never gets keyboard focus.
        if platform::quit_requested() {
            log::info!("ESC pressed, exiting");
            event_loop.exit();
            return;
        }

        if self.window.is_none() {
            return;
        }

        let now = Instant::now();
        let mut redraw = self.follower.advance(now.duration_since(self.last_advance));
        self.last_advance = now;

        if now >= self.next_tick {
            redraw |= self.tick(event_loop);
            // No catch-up after a stall; resume the cadence from now.
            self.next_tick += TICK_PERIOD;
            if self.next_tick <= now {
                self.next_tick = now + TICK_PERIOD;
            }
        }

        if redraw {
            if let Some(w) = &self.window {
                w.request_redraw();
            }
        }

        let mut deadline = self.next_tick;
        if let Some(wait) = self.follower.time_to_next_frame() {
            deadline = deadline.min(now + wait);
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.update_sprite(self.follower.current_frame(), self.follower.mirrored());
                    gpu.render_frame();
                }
            }
            _ => {}
        }
    }
}

/// Entry point: load sprites, create event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = anim::asset_dir();
    let run = anim::load_optional(&dir.join(config::RUN_ASSET), config::SCALE_FACTOR);
    let idle = anim::load_optional(&dir.join(config::IDLE_ASSET), config::SCALE_FACTOR);
    if run.is_none() && idle.is_none() {
        log::warn!(
            "No sprite assets in {}; overlay will stay empty",
            dir.display()
        );
    }

    let cursor = platform::cursor_pos().unwrap_or(IVec2::ZERO);
    let follower = SpriteFollower::new(FollowConfig::default(), run, idle, cursor);
    log::info!("Sprite starts as {:?}", follower.bound());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(follower);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.fatal.take() {
        return Err(e);
    }
    Ok(())
}
