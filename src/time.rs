//! Time sources and the clamped frame-delta clock.
//!
//! The host calls the scheduler once per animation frame with a timestamp
//! from `performance.now()`. FrameClock turns consecutive timestamps into a
//! delta in seconds, clamped so a backgrounded tab cannot replay minutes of
//! production in one frame.

pub struct FrameClock {
    /// Largest delta a single frame may report (seconds)
    max_delta_secs: f64,
    /// Timestamp of the last update (ms), None until the first frame
    last_timestamp: Option<f64>,
}

impl FrameClock {
    pub fn new(max_delta_secs: f64) -> Self {
        Self {
            max_delta_secs,
            last_timestamp: None,
        }
    }

    /// Make `now_ms` the reference point; the next frame measures from here.
    pub fn reset(&mut self, now_ms: f64) {
        self.last_timestamp = Some(now_ms);
    }

    /// Feed a frame timestamp (ms). Returns the clamped delta in seconds.
    ///
    /// The first frame after construction returns 0. Clock skew backwards
    /// also returns 0.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            Some(prev) => ((now_ms - prev) / 1000.0).clamp(0.0, self.max_delta_secs),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        if delta.is_finite() {
            delta
        } else {
            0.0
        }
    }
}

/// Milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn wall_clock_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn wall_clock_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// High-resolution frame timestamp (`performance.now()`), 0 if unavailable.
#[cfg(target_arch = "wasm32")]
pub fn frame_clock_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

/// Monotonic ms since the first call in this process.
#[cfg(not(target_arch = "wasm32"))]
pub fn frame_clock_ms() -> f64 {
    static ORIGIN: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    ORIGIN.get_or_init(std::time::Instant::now).elapsed().as_secs_f64() * 1000.0
}
