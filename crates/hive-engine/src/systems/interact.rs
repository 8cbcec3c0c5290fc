//! Key pickup/carry and door opening by proximity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, Rect};
use crate::components::entity::Marker;
use crate::core::physics::PhysicsWorld;
use crate::core::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractConfig {
    /// Slack added to each side of the player's rect when touching a key.
    pub pickup_margin: f32,
    /// Gap between the top of the player and the bottom of a carried key.
    pub carry_gap: f32,
    /// Slack added to each side of the player's rect when touching a door.
    pub door_margin: f32,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            pickup_margin: 5.0,
            carry_gap: 10.0,
            door_margin: 30.0,
        }
    }
}

fn player_rect(
    scene: &Scene,
    physics: &PhysicsWorld,
    player: Option<EntityId>,
) -> Option<(EntityId, Rect)> {
    let id = player?;
    let body = scene.get(id)?.body?;
    Some((id, body.rect(physics)))
}

/// Pick up, carry and drop keys.
///
/// While `pickup_held`, a key touching the player attaches to it. Attached
/// keys are pinned above the player's head every following tick with zero
/// velocity. Releasing the input drops every carried key where it is.
pub fn update_keys(
    scene: &mut Scene,
    physics: &mut PhysicsWorld,
    player: Option<EntityId>,
    pickup_held: bool,
    config: &InteractConfig,
) {
    let Some((player, player_rect)) = player_rect(scene, physics, player) else {
        return;
    };
    let reach = player_rect.inflate(config.pickup_margin);

    let keys = scene.ids_with(Marker::Key).to_vec();
    for id in keys {
        let Some(entity) = scene.get_mut(id) else {
            continue;
        };
        let (Some(body), Some(key)) = (entity.body, entity.key.as_mut()) else {
            continue;
        };

        if !pickup_held {
            if key.held {
                key.held = false;
                key.carrier = None;
                log::info!("{id} dropped");
            }
            continue;
        }

        if key.held {
            if key.carrier != Some(player) {
                continue;
            }
            let center = player_rect.center();
            let y = player_rect.top() - config.carry_gap - body.height() / 2.0;
            body.set_position(physics, Vec2::new(center.x, y));
            body.set_velocity(physics, Vec2::ZERO);
        } else if body.rect(physics).overlaps(&reach) {
            key.held = true;
            key.carrier = Some(player);
            log::info!("{id} picked up by {player}");
        }
    }
}

/// Whether any key in the scene is currently held.
pub fn any_key_held(scene: &Scene) -> bool {
    scene
        .with_marker(Marker::Key)
        .any(|e| e.key.as_ref().is_some_and(|k| k.held))
}

/// Open the first closed door the player touches while a key is held.
/// Returns the level the opened door leads to.
pub fn update_doors(
    scene: &mut Scene,
    physics: &PhysicsWorld,
    player: Option<EntityId>,
    config: &InteractConfig,
) -> Option<String> {
    let (_, player_rect) = player_rect(scene, physics, player)?;
    if !any_key_held(scene) {
        return None;
    }
    let reach = player_rect.inflate(config.door_margin);

    let doors = scene.ids_with(Marker::Door).to_vec();
    for id in doors {
        let Some(entity) = scene.get_mut(id) else {
            continue;
        };
        let (Some(body), Some(door)) = (entity.body, entity.door.as_mut()) else {
            continue;
        };
        if door.open || !body.rect(physics).overlaps(&reach) {
            continue;
        }
        door.open = true;
        log::info!("{id} opened, next level {}", door.next_level);
        return Some(door.next_level.clone());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;
    use crate::components::interact::{DoorComponent, KeyComponent};
    use crate::core::body::{Body, BodyDesc, ColliderMaterial};
    use crate::core::coords::CoordSpace;

    struct Fixture {
        scene: Scene,
        physics: PhysicsWorld,
        player: EntityId,
        config: InteractConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = Scene::new();
            let mut physics = PhysicsWorld::new(Vec2::ZERO, CoordSpace::new(600.0));
            let player = spawn(
                &mut scene,
                &mut physics,
                Entity::new,
                Vec2::new(100.0, 300.0),
                50.0,
            );
            Self {
                scene,
                physics,
                player,
                config: InteractConfig::default(),
            }
        }

        fn key(&mut self, pos: Vec2) -> EntityId {
            spawn(
                &mut self.scene,
                &mut self.physics,
                |id| Entity::new(id).with_key(KeyComponent::new()),
                pos,
                20.0,
            )
        }

        fn door(&mut self, pos: Vec2) -> EntityId {
            spawn(
                &mut self.scene,
                &mut self.physics,
                |id| Entity::new(id).with_door(DoorComponent::new("assets/level3.json")),
                pos,
                60.0,
            )
        }

        fn keys(&mut self, held: bool) {
            update_keys(&mut self.scene, &mut self.physics, Some(self.player), held, &self.config);
        }

        fn doors(&mut self) -> Option<String> {
            update_doors(&mut self.scene, &self.physics, Some(self.player), &self.config)
        }

        fn key_state(&self, id: EntityId) -> &KeyComponent {
            self.scene.get(id).unwrap().key.as_ref().unwrap()
        }
    }

    fn spawn(
        scene: &mut Scene,
        physics: &mut PhysicsWorld,
        build: impl FnOnce(EntityId) -> Entity,
        pos: Vec2,
        size: f32,
    ) -> EntityId {
        let body = Body::create(
            physics,
            &BodyDesc::dynamic(Vec2::splat(size)).with_position(pos),
            ColliderMaterial::default(),
        );
        let id = scene.allocate_id();
        scene.spawn(build(id).with_body(body)).unwrap()
    }

    #[test]
    fn key_within_margin_is_picked_up_then_carried() {
        let mut f = Fixture::new();
        // Player spans x [75, 125]; key spans [128, 148], inside the 5 unit margin.
        let key = f.key(Vec2::new(138.0, 300.0));

        f.keys(true);
        assert!(f.key_state(key).held);
        assert_eq!(f.key_state(key).carrier, Some(f.player));

        f.keys(true);
        let body = f.scene.get(key).unwrap().body.unwrap();
        // Player top is 275; gap 10; key half height 10.
        assert_eq!(body.position(&f.physics), Vec2::new(100.0, 255.0));
        assert_eq!(body.velocity(&f.physics), Vec2::ZERO);
    }

    #[test]
    fn key_out_of_reach_stays_put() {
        let mut f = Fixture::new();
        let key = f.key(Vec2::new(200.0, 300.0));
        f.keys(true);
        assert!(!f.key_state(key).held);
    }

    #[test]
    fn key_needs_pickup_input() {
        let mut f = Fixture::new();
        let key = f.key(Vec2::new(110.0, 300.0));
        f.keys(false);
        assert!(!f.key_state(key).held);
    }

    #[test]
    fn releasing_input_drops_key() {
        let mut f = Fixture::new();
        let key = f.key(Vec2::new(110.0, 300.0));
        f.keys(true);
        f.keys(true);
        f.keys(false);
        assert!(!f.key_state(key).held);
        assert_eq!(f.key_state(key).carrier, None);

        let body = f.scene.get(key).unwrap().body.unwrap();
        assert_eq!(body.position(&f.physics), Vec2::new(100.0, 255.0));
    }

    #[test]
    fn door_needs_a_held_key() {
        let mut f = Fixture::new();
        let door = f.door(Vec2::new(150.0, 300.0));
        assert_eq!(f.doors(), None);
        assert!(!f.scene.get(door).unwrap().door.as_ref().unwrap().open);
    }

    #[test]
    fn door_opens_once_with_key_and_proximity() {
        let mut f = Fixture::new();
        f.key(Vec2::new(110.0, 300.0));
        // Door spans x [175, 235]; player reaches 125 + 30 = 155. Too far.
        let door = f.door(Vec2::new(205.0, 300.0));
        f.keys(true);
        assert_eq!(f.doors(), None);

        let player_body = f.scene.get(f.player).unwrap().body.unwrap();
        player_body.set_x(&mut f.physics, 130.0);
        assert_eq!(f.doors().as_deref(), Some("assets/level3.json"));
        assert!(f.scene.get(door).unwrap().door.as_ref().unwrap().open);

        // Already open: no second transition.
        assert_eq!(f.doors(), None);
    }

    #[test]
    fn missing_player_is_a_no_op() {
        let mut f = Fixture::new();
        let key = f.key(Vec2::new(110.0, 300.0));
        update_keys(&mut f.scene, &mut f.physics, None, true, &f.config);
        assert!(!f.key_state(key).held);
        assert_eq!(update_doors(&mut f.scene, &f.physics, None, &f.config), None);
    }
}
