//! Cooperative frame scheduler.
//!
//! The host owns the animation-frame source (`requestAnimationFrame` in the
//! browser) and calls [`Scheduler::frame`] from it. Each frame advances the
//! game by the clamped delta, forwards new achievements to the notifier, and
//! autosaves on a fixed cadence.

use tracing::debug;

use super::save::SaveManager;
use super::EggEmpire;
use crate::storage::SaveStorage;
use crate::time::{self, FrameClock};

/// Token for a pending frame registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub u64);

/// Host hook that schedules the next frame callback.
pub trait FrameRequester {
    fn request(&mut self) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

/// What one frame did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Seconds simulated, after clamping.
    pub delta: f64,
    /// Achievements unlocked this frame.
    pub unlocked: Vec<String>,
    /// Whether an autosave was written.
    pub saved: bool,
}

type Notifier = Box<dyn FnMut(&[String])>;

pub struct Scheduler<R: FrameRequester, S: SaveStorage> {
    requester: R,
    saves: SaveManager<S>,
    clock: FrameClock,
    pending: Option<FrameHandle>,
    /// Frame-clock ms of the last autosave (or of `start`).
    last_autosave: f64,
    notifier: Option<Notifier>,
    wall_clock: fn() -> u64,
    frame_clock: fn() -> f64,
}

impl<R: FrameRequester, S: SaveStorage> Scheduler<R, S> {
    pub fn new(requester: R, saves: SaveManager<S>) -> Self {
        let clock = FrameClock::new(saves.config().max_frame_delta_secs);
        Self {
            requester,
            saves,
            clock,
            pending: None,
            last_autosave: 0.0,
            notifier: None,
            wall_clock: time::wall_clock_ms,
            frame_clock: time::frame_clock_ms,
        }
    }

    /// Called with the ids unlocked in a frame, never with an empty slice.
    pub fn with_notifier(mut self, notifier: impl FnMut(&[String]) + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Source of save timestamps. Defaults to [`time::wall_clock_ms`].
    pub fn with_wall_clock(mut self, wall_clock: fn() -> u64) -> Self {
        self.wall_clock = wall_clock;
        self
    }

    /// Source of frame timestamps for [`Scheduler::start_now`] and
    /// [`Scheduler::frame_now`]. Defaults to [`time::frame_clock_ms`].
    pub fn with_frame_clock(mut self, frame_clock: fn() -> f64) -> Self {
        self.frame_clock = frame_clock;
        self
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn saves(&self) -> &SaveManager<S> {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut SaveManager<S> {
        &mut self.saves
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    /// Begin requesting frames. A second call while running does nothing.
    pub fn start(&mut self, now_ms: f64, game: &mut EggEmpire) {
        if self.is_running() {
            return;
        }
        self.clock.reset(now_ms);
        self.last_autosave = now_ms;
        game.state_mut().last_tick_time = now_ms;
        self.pending = Some(self.requester.request());
        debug!(now_ms, "scheduler started");
    }

    /// [`Scheduler::start`] at the current frame-clock time.
    pub fn start_now(&mut self, game: &mut EggEmpire) {
        let now = (self.frame_clock)();
        self.start(now, game);
    }

    /// Cancel the pending frame, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.requester.cancel(handle);
            debug!("scheduler stopped");
        }
    }

    /// Run one frame at `now_ms` (frame clock). A stopped scheduler does
    /// nothing and does not re-register.
    pub fn frame(&mut self, now_ms: f64, game: &mut EggEmpire) -> FrameReport {
        if !self.is_running() {
            return FrameReport::default();
        }

        let delta = self.clock.update(now_ms);
        {
            let state = game.state_mut();
            state.last_tick_time = now_ms;
            state.total_play_time += delta;
        }

        let unlocked = game.tick(delta);
        if !unlocked.is_empty() {
            if let Some(notify) = self.notifier.as_mut() {
                notify(&unlocked);
            }
        }

        let mut saved = false;
        if now_ms - self.last_autosave > self.saves.config().autosave_interval_ms as f64 {
            saved = self.save_now(game);
            self.last_autosave = now_ms;
            debug!(saved, "autosave");
        }

        self.pending = Some(self.requester.request());
        FrameReport {
            delta,
            unlocked,
            saved,
        }
    }

    /// [`Scheduler::frame`] at the current frame-clock time. Hosts whose frame
    /// callback carries no timestamp call this.
    pub fn frame_now(&mut self, game: &mut EggEmpire) -> FrameReport {
        let now = (self.frame_clock)();
        self.frame(now, game)
    }

    /// Save immediately with a wall-clock timestamp.
    pub fn save_now(&mut self, game: &mut EggEmpire) -> bool {
        let now = (self.wall_clock)();
        self.saves.save(game.state_mut(), now)
    }
}
