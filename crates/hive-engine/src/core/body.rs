//! A box-shaped rigid body seen through presentation space.
//!
//! [`Body`] is a plain handle pair plus the fixed size and the coordinate
//! space captured at creation. The rapier body itself lives in
//! [`PhysicsWorld`]; every accessor takes the world and goes through the
//! Y flip exactly once. Operations on a released body are silent no-ops and
//! getters return defaults.

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, Rect};
use crate::core::coords::CoordSpace;
use crate::core::physics::{encode_user_data, PhysicsWorld};

/// The kind of rigid body. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    #[default]
    Dynamic,
    Fixed,
    Kinematic,
}

impl BodyKind {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Fixed => RigidBodyType::Fixed,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.6,
            density: 1.0,
        }
    }
}

/// Builder for describing a body before creation. Position is the center
/// in presentation space, rotation is in degrees (positive = clockwise).
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, size: Vec2) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            size,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity_scale: if kind == BodyKind::Dynamic { 1.0 } else { 0.0 },
            fixed_rotation: kind != BodyKind::Dynamic,
        }
    }

    pub fn dynamic(size: Vec2) -> Self {
        Self::new(BodyKind::Dynamic, size)
    }

    pub fn fixed(size: Vec2) -> Self {
        Self::new(BodyKind::Fixed, size)
    }

    pub fn kinematic(size: Vec2) -> Self {
        Self::new(BodyKind::Kinematic, size)
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }
}

/// Handle pair stored on an entity, plus the immutable extents.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub(crate) body_handle: RigidBodyHandle,
    pub(crate) collider_handle: ColliderHandle,
    size: Vec2,
    kind: BodyKind,
    space: CoordSpace,
}

impl Body {
    /// Create a rigid body with one cuboid collider sized `desc.size`.
    /// Every collider reports begin/end contacts.
    pub fn create(world: &mut PhysicsWorld, desc: &BodyDesc, material: ColliderMaterial) -> Body {
        let space = world.space();
        let pos = space.point_to_physics(desc.position);
        let vel = space.vector_to_physics(desc.velocity);

        let rb = RigidBodyBuilder::new(desc.kind.to_rapier())
            .translation(vector![pos.x, pos.y])
            .rotation(space.angle_to_physics(desc.rotation))
            .linvel(vector![vel.x, vel.y])
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .build();
        let body_handle = world.bodies.insert(rb);

        let collider = ColliderBuilder::cuboid(desc.size.x * 0.5, desc.size.y * 0.5)
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle =
            world
                .colliders
                .insert_with_parent(collider, body_handle, &mut world.bodies);

        Body {
            body_handle,
            collider_handle,
            size: desc.size,
            kind: desc.kind,
            space,
        }
    }

    /// Whether the underlying rapier body still exists.
    pub fn is_valid(&self, world: &PhysicsWorld) -> bool {
        world.bodies.get(self.body_handle).is_some()
    }

    /// Store the back-reference used by contact, ray and query lookups.
    /// Call once the entity id is final.
    pub fn attach_entity(&self, world: &mut PhysicsWorld, id: EntityId) {
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            rb.user_data = encode_user_data(id);
        }
    }

    /// Release the rapier body and its collider. Safe to repeat.
    pub fn destroy(&self, world: &mut PhysicsWorld) {
        world.remove_body(self.body_handle);
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn world_height(&self) -> f32 {
        self.space.height()
    }

    // -- position --

    pub fn position(&self, world: &PhysicsWorld) -> Vec2 {
        world
            .bodies
            .get(self.body_handle)
            .map(|rb| {
                let t = rb.translation();
                self.space.point_to_presentation(Vec2::new(t.x, t.y))
            })
            .unwrap_or(Vec2::ZERO)
    }

    pub fn x(&self, world: &PhysicsWorld) -> f32 {
        self.position(world).x
    }

    pub fn y(&self, world: &PhysicsWorld) -> f32 {
        self.position(world).y
    }

    /// Move the body, keeping its rotation.
    pub fn set_position(&self, world: &mut PhysicsWorld, pos: Vec2) {
        let p = self.space.point_to_physics(pos);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            let mut iso = *rb.position();
            iso.translation.vector = vector![p.x, p.y];
            rb.set_position(iso, true);
        }
    }

    pub fn set_x(&self, world: &mut PhysicsWorld, x: f32) {
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            let mut iso = *rb.position();
            iso.translation.vector.x = x;
            rb.set_position(iso, true);
        }
    }

    pub fn set_y(&self, world: &mut PhysicsWorld, y: f32) {
        let py = self.space.to_physics_y(y);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            let mut iso = *rb.position();
            iso.translation.vector.y = py;
            rb.set_position(iso, true);
        }
    }

    // -- velocity --

    pub fn velocity(&self, world: &PhysicsWorld) -> Vec2 {
        world
            .bodies
            .get(self.body_handle)
            .map(|rb| {
                let v = rb.linvel();
                self.space.vector_to_presentation(Vec2::new(v.x, v.y))
            })
            .unwrap_or(Vec2::ZERO)
    }

    pub fn vx(&self, world: &PhysicsWorld) -> f32 {
        self.velocity(world).x
    }

    pub fn vy(&self, world: &PhysicsWorld) -> f32 {
        self.velocity(world).y
    }

    pub fn set_velocity(&self, world: &mut PhysicsWorld, vel: Vec2) {
        let v = self.space.vector_to_physics(vel);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            rb.set_linvel(vector![v.x, v.y], true);
        }
    }

    pub fn set_vx(&self, world: &mut PhysicsWorld, vx: f32) {
        let vy = self.vy(world);
        self.set_velocity(world, Vec2::new(vx, vy));
    }

    pub fn set_vy(&self, world: &mut PhysicsWorld, vy: f32) {
        let vx = self.vx(world);
        self.set_velocity(world, Vec2::new(vx, vy));
    }

    // -- rotation --

    /// Angle in degrees, positive = visually clockwise.
    pub fn angle(&self, world: &PhysicsWorld) -> f32 {
        world
            .bodies
            .get(self.body_handle)
            .map(|rb| self.space.angle_to_presentation(rb.rotation().angle()))
            .unwrap_or(0.0)
    }

    pub fn set_angle(&self, world: &mut PhysicsWorld, degrees: f32) {
        let radians = self.space.angle_to_physics(degrees);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            rb.set_rotation(Rotation::new(radians), true);
        }
    }

    // -- forces and impulses (all wake the body) --

    pub fn apply_force(&self, world: &mut PhysicsWorld, force: Vec2, point: Vec2) {
        let f = self.space.vector_to_physics(force);
        let p = self.space.point_to_physics(point);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            rb.add_force_at_point(vector![f.x, f.y], point![p.x, p.y], true);
        }
    }

    pub fn apply_force_to_center(&self, world: &mut PhysicsWorld, force: Vec2) {
        let f = self.space.vector_to_physics(force);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            rb.add_force(vector![f.x, f.y], true);
        }
    }

    pub fn apply_impulse(&self, world: &mut PhysicsWorld, impulse: Vec2, point: Vec2) {
        let i = self.space.vector_to_physics(impulse);
        let p = self.space.point_to_physics(point);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            rb.apply_impulse_at_point(vector![i.x, i.y], point![p.x, p.y], true);
        }
    }

    pub fn apply_impulse_to_center(&self, world: &mut PhysicsWorld, impulse: Vec2) {
        let i = self.space.vector_to_physics(impulse);
        if let Some(rb) = world.bodies.get_mut(self.body_handle) {
            rb.apply_impulse(vector![i.x, i.y], true);
        }
    }

    /// Axis-aligned bounds centered on the body: `{x - w/2, y - h/2, w, h}`.
    pub fn rect(&self, world: &PhysicsWorld) -> Rect {
        let pos = self.position(world);
        Rect::new(
            pos.x - self.size.x / 2.0,
            pos.y - self.size.y / 2.0,
            self.size.x,
            self.size.y,
        )
    }
}
