use serde::{Deserialize, Serialize};

/// Seconds of invulnerability granted by each successful hit.
pub const INVULNERABILITY_SECONDS: f32 = 1.0;

/// Hit points with a post-hit invulnerability window.
///
/// `current` never exceeds `max` and never goes below zero. Death is simply
/// `current == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
    invulnerable_for: f32,
}

impl Health {
    /// Full health. A zero maximum is raised to one.
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            invulnerable_for: 0.0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn invulnerable_for(&self) -> f32 {
        self.invulnerable_for
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Subtract `amount` unless invulnerable. Returns whether damage landed.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        self.current = self.current.saturating_sub(amount);
        self.invulnerable_for = INVULNERABILITY_SECONDS;
        true
    }

    /// Count the invulnerability window down toward zero.
    pub fn tick(&mut self, dt: f32) {
        self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);
    }

    /// Full health, no invulnerability.
    pub fn reset(&mut self) {
        self.current = self.max;
        self.invulnerable_for = 0.0;
    }

    /// Restore a saved value, clamped to `max`.
    pub fn set_current(&mut self, value: u32) {
        self.current = value.min(self.max);
    }
}
