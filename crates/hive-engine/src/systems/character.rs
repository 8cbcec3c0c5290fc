//! Character control: ground detection, snapping, horizontal movement,
//! jumping and world-bound clamping.
//!
//! Ground detection walks every other body in spawn order and stops at the
//! first qualifying surface; it does not compare distances across
//! candidates. This is O(n) per controlled entity and fine for the few
//! hundred entities a level holds.

use glam::Vec2;

use crate::api::types::{EntityId, Rect};
use crate::components::character::{CharacterController, CharacterTuning};
use crate::components::entity::Marker;
use crate::core::body::Body;
use crate::core::physics::PhysicsWorld;
use crate::core::scene::Scene;
use crate::input::queue::{Action, InputState};

/// What a character wants to do this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl CharacterIntent {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            left: input.is_down(Action::MoveLeft),
            right: input.is_down(Action::MoveRight),
            jump: input.is_down(Action::Jump),
        }
    }
}

/// The surface a character was found standing on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub entity: EntityId,
    /// `surface_top - feet`; negative when the character has sunk in.
    pub gap: f32,
    pub surface_top: f32,
    pub standable: bool,
}

/// Update every character. The player follows `input`; everyone else idles
/// but still lands, snaps and stays inside the world.
pub fn update_characters(
    scene: &mut Scene,
    physics: &mut PhysicsWorld,
    input: &InputState,
    player: Option<EntityId>,
    world_width: f32,
) {
    let ids = scene.ids_with(Marker::Character).to_vec();
    let player_intent = CharacterIntent::from_input(input);
    for id in ids {
        let intent = if Some(id) == player {
            player_intent
        } else {
            CharacterIntent::default()
        };
        update_character(scene, physics, id, intent, world_width);
    }
}

/// One controller tick for `id`. Missing body or controller is a no-op.
pub fn update_character(
    scene: &mut Scene,
    physics: &mut PhysicsWorld,
    id: EntityId,
    intent: CharacterIntent,
    world_width: f32,
) {
    let Some((body, mut controller)) = scene
        .get(id)
        .and_then(|e| Some((e.body?, e.character.clone()?)))
    else {
        return;
    };
    if !body.is_valid(physics) {
        return;
    }
    let tuning = controller.tuning;

    let ground = find_ground(scene, physics, id, &body, &tuning);
    controller.grounded = ground.is_some();

    if let Some(ground) = ground {
        let in_window = (tuning.snap_window_min..=tuning.snap_window_max).contains(&ground.gap);
        if ground.standable && in_window {
            body.set_y(physics, ground.surface_top - body.height() / 2.0);
            body.set_vy(physics, 0.0);
        }
    }

    let vx = match (intent.left, intent.right) {
        (true, false) => -tuning.move_speed,
        (false, true) => tuning.move_speed,
        _ => 0.0,
    };
    controller.moving = vx != 0.0;
    if intent.left != intent.right {
        controller.facing_left = intent.left;
    }
    if controller.last_vx != Some(vx) || body.vx(physics) != vx {
        body.set_vx(physics, vx);
    }

    if controller.grounded && intent.jump {
        body.set_vy(physics, tuning.jump_velocity);
        controller.grounded = false;
    }

    let clamped = clamp_to_world(physics, &body, world_width);
    controller.last_vx = Some(if clamped { 0.0 } else { vx });

    if let Some(entity) = scene.get_mut(id) {
        entity.character = Some(controller);
    }
}

/// First body in spawn order the character counts as standing on.
pub fn find_ground(
    scene: &Scene,
    physics: &PhysicsWorld,
    id: EntityId,
    body: &Body,
    tuning: &CharacterTuning,
) -> Option<Ground> {
    if body.vy(physics) < -tuning.max_rising_speed {
        return None;
    }
    let rect = body.rect(physics);
    let feet = rect.bottom();

    for candidate in scene.with_marker(Marker::Body) {
        if candidate.id == id {
            continue;
        }
        let standable = candidate.is_standable();
        if !standable && !tuning.stand_on_any_body {
            continue;
        }
        let Some(surface) = candidate.body.map(|b| b.rect(physics)) else {
            continue;
        };
        if !rect.overlaps_horizontally(&surface) {
            continue;
        }

        let tolerance = if standable {
            tuning.ground_check_distance
        } else {
            tuning.ground_check_distance * tuning.non_standable_tolerance_scale
        };
        let gap = surface.top() - feet;
        if (-tolerance..=tolerance).contains(&gap) {
            return Some(Ground {
                entity: candidate.id,
                gap,
                surface_top: surface.top(),
                standable,
            });
        }
    }
    None
}

/// Push the body back inside `[0, world_width]`, zeroing horizontal velocity.
/// Returns whether it had to move.
pub fn clamp_to_world(physics: &mut PhysicsWorld, body: &Body, world_width: f32) -> bool {
    let rect: Rect = body.rect(physics);
    let half = body.width() / 2.0;
    let x = if rect.left() < 0.0 {
        half
    } else if rect.right() > world_width {
        world_width - half
    } else {
        return false;
    };
    body.set_x(physics, x);
    let vy = body.vy(physics);
    body.set_velocity(physics, Vec2::new(0.0, vy));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;
    use crate::core::body::{BodyDesc, ColliderMaterial};
    use crate::core::coords::CoordSpace;

    struct Fixture {
        scene: Scene,
        physics: PhysicsWorld,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                physics: PhysicsWorld::new(Vec2::ZERO, CoordSpace::new(600.0)),
            }
        }

        fn spawn(&mut self, entity: Entity, desc: BodyDesc) -> (EntityId, Body) {
            let body = Body::create(&mut self.physics, &desc, ColliderMaterial::default());
            let id = self.scene.spawn(entity.with_body(body)).unwrap();
            body.attach_entity(&mut self.physics, id);
            (id, body)
        }

        /// Ground 400 wide, top edge at y = 500.
        fn ground(&mut self) -> EntityId {
            let id = self.scene.allocate_id();
            self.spawn(
                Entity::new(id).with_tag("ground").standable(),
                BodyDesc::fixed(Vec2::new(400.0, 50.0)).with_position(Vec2::new(200.0, 525.0)),
            )
            .0
        }

        fn player(&mut self, pos: Vec2, width: f32) -> (EntityId, Body) {
            let id = self.scene.allocate_id();
            self.spawn(
                Entity::new(id)
                    .with_tag("player")
                    .with_character(CharacterController::default()),
                BodyDesc::dynamic(Vec2::new(width, 50.0))
                    .with_position(pos)
                    .with_fixed_rotation(true),
            )
        }

        fn tick(&mut self, id: EntityId, intent: CharacterIntent) {
            update_character(&mut self.scene, &mut self.physics, id, intent, 5000.0);
        }

        fn controller(&self, id: EntityId) -> &CharacterController {
            self.scene.get(id).unwrap().character.as_ref().unwrap()
        }
    }

    #[test]
    fn snaps_onto_standable_surface_inside_window() {
        let mut f = Fixture::new();
        f.ground();
        // Feet at 495, five above the ground's top edge.
        let (id, body) = f.player(Vec2::new(200.0, 470.0), 50.0);

        f.tick(id, CharacterIntent::default());

        assert!(f.controller(id).is_grounded());
        assert_eq!(body.rect(&f.physics).bottom(), 500.0);
        assert_eq!(body.vy(&f.physics), 0.0);
    }

    #[test]
    fn does_not_snap_outside_window() {
        let mut f = Fixture::new();
        f.ground();
        // Feet at 450, fifty above the ground.
        let (id, body) = f.player(Vec2::new(200.0, 425.0), 50.0);

        f.tick(id, CharacterIntent::default());

        assert!(f.controller(id).is_grounded());
        assert_eq!(body.y(&f.physics), 425.0);
    }

    #[test]
    fn rising_fast_is_not_grounded() {
        let mut f = Fixture::new();
        f.ground();
        let (id, body) = f.player(Vec2::new(200.0, 470.0), 50.0);
        body.set_vy(&mut f.physics, -100.0);

        f.tick(id, CharacterIntent::default());

        assert!(!f.controller(id).is_grounded());
        assert_eq!(body.y(&f.physics), 470.0);
    }

    #[test]
    fn slight_upward_jitter_still_grounds() {
        let mut f = Fixture::new();
        f.ground();
        let (id, body) = f.player(Vec2::new(200.0, 470.0), 50.0);
        body.set_vy(&mut f.physics, -0.25);

        f.tick(id, CharacterIntent::default());
        assert!(f.controller(id).is_grounded());
    }

    #[test]
    fn needs_horizontal_overlap() {
        let mut f = Fixture::new();
        f.ground();
        // Ground spans x in [0, 400]; player spans [425, 475].
        let (id, _) = f.player(Vec2::new(450.0, 470.0), 50.0);
        f.tick(id, CharacterIntent::default());
        assert!(!f.controller(id).is_grounded());
    }

    #[test]
    fn non_standable_bodies_only_count_when_permissive() {
        let mut f = Fixture::new();
        let crate_id = f.scene.allocate_id();
        f.spawn(
            Entity::new(crate_id).with_tag("crate"),
            BodyDesc::fixed(Vec2::new(100.0, 50.0)).with_position(Vec2::new(200.0, 525.0)),
        );
        let (id, body) = f.player(Vec2::new(200.0, 410.0), 50.0);

        f.tick(id, CharacterIntent::default());
        assert!(!f.controller(id).is_grounded());

        if let Some(c) = f.scene.get_mut(id).and_then(|e| e.character.as_mut()) {
            c.tuning.stand_on_any_body = true;
        }
        // Gap of 65: beyond 50, inside 50 * 1.5.
        f.tick(id, CharacterIntent::default());
        assert!(f.controller(id).is_grounded());
        // Never snapped onto a non-standable body.
        assert_eq!(body.y(&f.physics), 410.0);
    }

    #[test]
    fn first_candidate_in_spawn_order_wins() {
        let mut f = Fixture::new();
        let high_id = f.scene.allocate_id();
        let (high, _) = f.spawn(
            Entity::new(high_id).standable(),
            BodyDesc::fixed(Vec2::new(100.0, 20.0)).with_position(Vec2::new(200.0, 530.0)),
        );
        f.ground();
        let (id, body) = f.player(Vec2::new(200.0, 470.0), 50.0);

        let tuning = f.controller(id).tuning;
        let ground = find_ground(&f.scene, &f.physics, id, &body, &tuning).unwrap();
        assert_eq!(ground.entity, high);
        assert_eq!(ground.surface_top, 520.0);
    }

    #[test]
    fn horizontal_input_sets_speed_and_facing() {
        let mut f = Fixture::new();
        let (id, body) = f.player(Vec2::new(200.0, 100.0), 50.0);

        f.tick(id, CharacterIntent { left: true, ..Default::default() });
        assert_eq!(body.vx(&f.physics), -250.0);
        assert!(f.controller(id).facing_left());
        assert!(f.controller(id).is_moving());

        f.tick(id, CharacterIntent::default());
        assert_eq!(body.vx(&f.physics), 0.0);
        assert!(f.controller(id).facing_left(), "facing survives release");
        assert!(!f.controller(id).is_moving());

        f.tick(id, CharacterIntent { left: true, right: true, jump: false });
        assert_eq!(body.vx(&f.physics), 0.0);

        f.tick(id, CharacterIntent { right: true, ..Default::default() });
        assert_eq!(body.vx(&f.physics), 250.0);
        assert!(!f.controller(id).facing_left());
    }

    #[test]
    fn jump_only_when_grounded() {
        let mut f = Fixture::new();
        f.ground();
        let (id, body) = f.player(Vec2::new(200.0, 470.0), 50.0);
        let jump = CharacterIntent { jump: true, ..Default::default() };

        f.tick(id, jump);
        assert_eq!(body.vy(&f.physics), -550.0);
        assert!(!f.controller(id).is_grounded());

        // Still rising: no second jump, velocity untouched.
        body.set_vy(&mut f.physics, -300.0);
        f.tick(id, jump);
        assert_eq!(body.vy(&f.physics), -300.0);
    }

    #[test]
    fn clamps_left_edge() {
        let mut f = Fixture::new();
        let (id, body) = f.player(Vec2::new(-40.0, 100.0), 100.0);

        f.tick(id, CharacterIntent { left: true, ..Default::default() });

        assert_eq!(body.x(&f.physics), 50.0);
        assert_eq!(body.rect(&f.physics).left(), 0.0);
        assert_eq!(body.vx(&f.physics), 0.0);
    }

    #[test]
    fn clamps_right_edge() {
        let mut f = Fixture::new();
        let (id, body) = f.player(Vec2::new(4990.0, 100.0), 100.0);

        f.tick(id, CharacterIntent { right: true, ..Default::default() });

        assert_eq!(body.x(&f.physics), 4950.0);
        assert_eq!(body.vx(&f.physics), 0.0);
    }

    #[test]
    fn missing_components_are_ignored() {
        let mut f = Fixture::new();
        let id = f.scene.allocate_id();
        f.scene.spawn(Entity::new(id)).unwrap();
        f.tick(id, CharacterIntent { jump: true, ..Default::default() });
        f.tick(EntityId::new(77, 0), CharacterIntent::default());
    }

    #[test]
    fn only_player_receives_input() {
        let mut f = Fixture::new();
        let (player, player_body) = f.player(Vec2::new(100.0, 100.0), 50.0);
        let (npc, npc_body) = f.player(Vec2::new(300.0, 100.0), 50.0);
        let mut input = InputState::default();
        input.apply(crate::input::queue::InputEvent::KeyDown { key_code: 68 });

        update_characters(&mut f.scene, &mut f.physics, &input, Some(player), 5000.0);

        assert_eq!(player_body.vx(&f.physics), 250.0);
        assert_eq!(npc_body.vx(&f.physics), 0.0);
        assert!(!f.controller(npc).is_moving());
    }
}
