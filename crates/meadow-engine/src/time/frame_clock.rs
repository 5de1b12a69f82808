use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Time elapsed since the clock was started, in seconds.
    ///
    /// Never clamped and never smoothed: this is the value shaders animate with.
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Two quantities are tracked:
/// - `elapsed`: seconds since `start`, monotonic, unclamped
/// - `dt`: seconds since the previous tick, clamped to avoid pathological values
///   when the application is paused by the debugger, minimized, or stalls
///
/// A clock that was never started starts itself on the first tick.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Option<Instant>,
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new, unstarted clock with default clamps.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates an unstarted clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            origin: None,
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Returns `true` once `start`/`start_at` (or the first tick) has run.
    pub fn is_started(&self) -> bool {
        self.origin.is_some()
    }

    /// Starts (or restarts) the clock at the current instant.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Starts (or restarts) the clock at `origin`.
    pub fn start_at(&mut self, origin: Instant) {
        self.origin = Some(origin);
        self.last = Some(origin);
        self.frame_index = 0;
    }

    /// Seconds elapsed between the clock origin and `now`.
    ///
    /// Returns `0.0` for an unstarted clock or for instants before the origin.
    pub fn elapsed_at(&self, now: Instant) -> f32 {
        self.origin
            .map_or(0.0, |origin| now.saturating_duration_since(origin).as_secs_f32())
    }

    /// Advances the clock to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now` and returns a new `FrameTime`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        if self.origin.is_none() {
            self.start_at(now);
        }

        let last = self.last.unwrap_or(now);
        let dt = now
            .saturating_duration_since(last)
            .clamp(self.dt_min, self.dt_max);

        self.last = Some(now);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed_at(now),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── elapsed ───────────────────────────────────────────────────────────

    #[test]
    fn elapsed_is_exact_seconds_since_origin() {
        let origin = Instant::now();
        let mut clock = FrameClock::new();
        clock.start_at(origin);

        let ft = clock.tick_at(origin + Duration::from_millis(1500));
        assert_eq!(ft.elapsed, 1.5);
    }

    #[test]
    fn elapsed_is_not_clamped_after_a_stall() {
        let origin = Instant::now();
        let mut clock = FrameClock::new();
        clock.start_at(origin);

        let ft = clock.tick_at(origin + Duration::from_secs(10));
        assert_eq!(ft.elapsed, 10.0);
        assert_eq!(ft.dt, 0.25);
    }

    #[test]
    fn unstarted_clock_starts_on_first_tick() {
        let mut clock = FrameClock::new();
        assert!(!clock.is_started());

        let ft = clock.tick();
        assert!(clock.is_started());
        assert_eq!(ft.elapsed, 0.0);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn instants_before_origin_saturate_to_zero() {
        let origin = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::new();
        clock.start_at(origin);
        assert_eq!(clock.elapsed_at(Instant::now()), 0.0);
    }

    // ── frame index ───────────────────────────────────────────────────────

    #[test]
    fn frame_index_increments_per_tick_and_resets_on_start() {
        let origin = Instant::now();
        let mut clock = FrameClock::new();
        clock.start_at(origin);

        assert_eq!(clock.tick_at(origin).frame_index, 0);
        assert_eq!(clock.tick_at(origin + Duration::from_millis(16)).frame_index, 1);

        clock.start_at(origin);
        assert_eq!(clock.tick_at(origin).frame_index, 0);
    }
}
