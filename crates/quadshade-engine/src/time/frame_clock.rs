use std::time::{Duration, Instant};

/// Weight of the newest sample in the smoothed frame time.
const SMOOTHING: f32 = 0.1;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Exponentially smoothed `dt`, in seconds. Stable enough to print.
    pub smoothed_dt: f32,

    /// Seconds since the clock was created.
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Frame counter; `0` on the first tick, then `+1` per tick.
    pub frame_index: u64,
}

impl FrameTime {
    /// Frames per second derived from the smoothed frame time.
    #[inline]
    pub fn fps(&self) -> f32 {
        if self.smoothed_dt > 0.0 { 1.0 / self.smoothed_dt } else { 0.0 }
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is
/// paused by the debugger, minimized, or stalls. Elapsed time is not clamped.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    smoothed_dt: Option<f32>,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0.1 ms .. 250 ms).
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frame_index: 0,
            smoothed_dt: None,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    /// Resets the delta baseline without touching elapsed time or the counter.
    ///
    /// Call after the loop was suspended so the next `dt` does not span the gap.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();
        self.last = now;

        let smoothed = match self.smoothed_dt {
            Some(prev) => prev + (dt - prev) * SMOOTHING,
            None => dt,
        };
        self.smoothed_dt = Some(smoothed);

        let ft = FrameTime {
            dt,
            smoothed_dt: smoothed,
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
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

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn frame_index_advances_by_one_per_tick() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let indices: Vec<u64> = (1..=5).map(|i| clock.tick_at(t0 + ms(16 * i)).frame_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(clock.frame_count(), 5);
    }

    #[test]
    fn dt_and_elapsed_follow_the_timestamps() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        clock.tick_at(t0 + ms(10));
        let ft = clock.tick_at(t0 + ms(30));
        assert!((ft.dt - 0.020).abs() < 1e-6);
        assert!((ft.elapsed - 0.030).abs() < 1e-6);
    }

    #[test]
    fn dt_is_clamped_but_elapsed_is_not() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let ft = clock.tick_at(t0 + Duration::from_secs(3));
        assert_eq!(ft.dt, 0.25);
        assert!((ft.elapsed - 3.0).abs() < 1e-6);

        // Same instant again: minimum clamp.
        let ft = clock.tick_at(t0 + Duration::from_secs(3));
        assert!((ft.dt - 0.0001).abs() < 1e-9);
    }

    #[test]
    fn smoothing_moves_a_tenth_toward_new_samples() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let first = clock.tick_at(t0 + ms(20));
        assert!((first.smoothed_dt - 0.020).abs() < 1e-6);

        let second = clock.tick_at(t0 + ms(30));
        // 0.020 + (0.010 - 0.020) * 0.1
        assert!((second.smoothed_dt - 0.019).abs() < 1e-6);
        assert!((second.fps() - 1.0 / 0.019).abs() < 0.01);
    }
}
