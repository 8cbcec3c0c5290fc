//! Hazard motion: homing toward a target and bouncing inside the world.

use glam::Vec2;

use crate::components::entity::Marker;
use crate::core::physics::PhysicsWorld;
use crate::core::scene::Scene;

/// Point every homing body at its target and turn it to face it.
/// Returns how many bodies were steered.
pub fn update_homing(scene: &Scene, physics: &mut PhysicsWorld) -> usize {
    let mut steered = 0;
    for entity in scene.with_marker(Marker::Homing) {
        let (Some(homing), Some(body)) = (&entity.homing, entity.body) else {
            continue;
        };
        let Some(target) = homing.target else {
            continue;
        };
        let Some(target_body) = scene.get(target).and_then(|t| t.body) else {
            log::trace!("{} lost its target {target}", entity.id);
            continue;
        };
        if !body.is_valid(physics) || !target_body.is_valid(physics) {
            continue;
        }

        let delta = target_body.position(physics) - body.position(physics);
        let distance = delta.length();
        if distance <= homing.arrive_distance {
            body.set_velocity(physics, Vec2::ZERO);
        } else {
            body.set_velocity(physics, delta / distance * homing.speed);
            body.set_angle(physics, delta.y.atan2(delta.x).to_degrees());
        }
        steered += 1;
    }
    steered
}

/// Push bouncing bodies back inside `[0, world_width] x [0, world_height]`,
/// turning the velocity on each axis they crossed back inward.
/// Returns how many bodies were reflected.
pub fn update_bounce(scene: &Scene, physics: &mut PhysicsWorld, world_width: f32) -> usize {
    let world = Vec2::new(world_width, physics.space().height());
    let mut reflected = 0;
    for entity in scene.with_marker(Marker::Bounce) {
        let Some(body) = entity.body.filter(|b| b.is_valid(physics)) else {
            continue;
        };
        let half = body.size() * 0.5;
        let mut pos = body.position(physics);
        let mut vel = body.velocity(physics);
        let mut hit = false;

        for axis in 0..2 {
            if pos[axis] < half[axis] {
                pos[axis] = half[axis];
                vel[axis] = vel[axis].abs();
                hit = true;
            } else if pos[axis] > world[axis] - half[axis] {
                pos[axis] = world[axis] - half[axis];
                vel[axis] = -vel[axis].abs();
                hit = true;
            }
        }

        if hit {
            body.set_position(physics, pos);
            body.set_velocity(physics, vel);
            reflected += 1;
        }
    }
    reflected
}
