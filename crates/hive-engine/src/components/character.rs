use serde::{Deserialize, Serialize};

/// Movement and ground-detection constants for one controlled entity.
/// Values are in presentation units (pixels, pixels/second) and were tuned
/// for roughly 50-unit tall sprites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTuning {
    /// Horizontal speed while a direction is held.
    pub move_speed: f32,
    /// Vertical velocity set on jump. Negative is up.
    pub jump_velocity: f32,
    /// Half-width of the vertical band around a surface top that counts as grounded.
    pub ground_check_distance: f32,
    /// Band multiplier for bodies that are not marked standable.
    pub non_standable_tolerance_scale: f32,
    /// Largest upward speed that still allows grounding.
    pub max_rising_speed: f32,
    /// Snap window `[min, max]` on `surface_top - feet`; negative means penetration.
    pub snap_window_min: f32,
    pub snap_window_max: f32,
    /// Treat every other body as ground, not just standable ones.
    pub stand_on_any_body: bool,
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self {
            move_speed: 250.0,
            jump_velocity: -550.0,
            ground_check_distance: 50.0,
            non_standable_tolerance_scale: 1.5,
            max_rising_speed: 0.5,
            snap_window_min: -2.0,
            snap_window_max: 10.0,
            stand_on_any_body: false,
        }
    }
}

/// Per-entity character state, updated by `systems::character`.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterController {
    pub tuning: CharacterTuning,
    pub(crate) grounded: bool,
    pub(crate) facing_left: bool,
    pub(crate) moving: bool,
    pub(crate) last_vx: Option<f32>,
}

impl CharacterController {
    pub fn new(tuning: CharacterTuning) -> Self {
        Self {
            tuning,
            grounded: false,
            facing_left: false,
            moving: false,
            last_vx: None,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Flip flag for rendering; keeps the last direction while idle.
    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new(CharacterTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_fills_missing_fields() {
        let tuning: CharacterTuning = serde_json::from_str(r#"{ "move_speed": 300 }"#).unwrap();
        assert_eq!(tuning.move_speed, 300.0);
        assert_eq!(tuning.jump_velocity, -550.0);
        assert_eq!(tuning.snap_window_max, 10.0);
        assert!(!tuning.stand_on_any_body);
    }

    #[test]
    fn new_controller_is_airborne_facing_right() {
        let controller = CharacterController::default();
        assert!(!controller.is_grounded());
        assert!(!controller.facing_left());
        assert!(!controller.is_moving());
    }
}
