/// Fixed timestep accumulator.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Clamp a variable frame delta before it reaches the physics step.
/// Returns `None` for deltas that must not be stepped (zero, negative, NaN).
pub fn clamp_frame_dt(frame_dt: f32, max_dt: f32) -> Option<f32> {
    if frame_dt.is_finite() && frame_dt > 0.0 {
        Some(frame_dt.min(max_dt))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0 / 60.0);
        assert_eq!(steps, 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(0.008); // half a frame
        assert_eq!(steps, 0);
        let steps = ts.accumulate(0.010); // over one frame total
        assert_eq!(steps, 1);
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0);
        assert_eq!(steps, 10);
    }

    #[test]
    fn frame_hitch_is_clamped() {
        assert_eq!(clamp_frame_dt(0.5, 0.1), Some(0.1));
        assert_eq!(clamp_frame_dt(0.016, 0.1), Some(0.016));
    }

    #[test]
    fn unsteppable_deltas_are_rejected() {
        assert_eq!(clamp_frame_dt(0.0, 0.1), None);
        assert_eq!(clamp_frame_dt(-0.2, 0.1), None);
        assert_eq!(clamp_frame_dt(f32::NAN, 0.1), None);
    }
}
