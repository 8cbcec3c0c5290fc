use glam::Vec2;
use rapier2d::prelude::*;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::api::error::EngineError;
use crate::api::types::{EntityId, Rect};
use crate::core::coords::CoordSpace;

/// Solver iterations per `step` call.
pub const SUBSTEPS: usize = 4;

/// Approach speed (units/s) at which a new contact also reports a hit.
pub const DEFAULT_HIT_SPEED: f32 = 100.0;

/// Ticks a ray/query debug record stays visible.
pub const DEFAULT_DEBUG_TTL: u32 = 30;

// Bit 64 marks a body that carries an entity; a zero user_data means "none".
const ENTITY_TAG: u128 = 1 << 64;

pub(crate) fn encode_user_data(id: EntityId) -> u128 {
    ENTITY_TAG | id.to_raw() as u128
}

pub(crate) fn decode_user_data(data: u128) -> Option<EntityId> {
    if data & ENTITY_TAG == 0 {
        None
    } else {
        Some(EntityId::from_raw(data as u64))
    }
}

fn vec2_to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn na_to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Two entities whose colliders started or stopped touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
}

impl CollisionPair {
    /// The other side of the pair, if `id` takes part in it.
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.entity_a == id {
            Some(self.entity_b)
        } else if self.entity_b == id {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

/// A new contact whose approach speed crossed the hit threshold. Informational.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactHit {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// Relative speed of the two bodies just before the step.
    pub speed: f32,
}

/// Contact events produced by a single step, already resolved to entities.
#[derive(Debug, Clone, Default)]
pub struct ContactEvents {
    pub begin: Vec<CollisionPair>,
    pub end: Vec<CollisionPair>,
    pub hits: Vec<ContactHit>,
}

impl ContactEvents {
    pub fn clear(&mut self) {
        self.begin.clear();
        self.end.clear();
        self.hits.clear();
    }

}

/// Nearest ray hit, in presentation space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    pub normal: Vec2,
    /// 0 at the ray origin, 1 at its target.
    pub fraction: f32,
    pub entity: EntityId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DebugShape {
    Ray { from: Vec2, to: Vec2, hit: Option<Vec2> },
    Query { rect: Rect },
}

/// A recent ray cast or AABB query, kept for overlay drawing until `ttl` runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugRecord {
    pub shape: DebugShape,
    pub ttl: u32,
}

// ---------------------------------------------------------------------------
// Event collector
// ---------------------------------------------------------------------------

/// A collision event with the relative speed of its two bodies when the
/// narrow phase reported it, before the solver resolves the contact.
struct CollectedEvent {
    event: CollisionEvent,
    approach_speed: f32,
}

struct DirectEventCollector {
    collisions: Mutex<Vec<CollectedEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollectedEvent> {
        self.collisions
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let approach_speed = match event {
            CollisionEvent::Started(h1, h2, _) => relative_speed(bodies, colliders, h1, h2),
            CollisionEvent::Stopped(..) => 0.0,
        };
        if let Ok(mut events) = self.collisions.lock() {
            events.push(CollectedEvent {
                event,
                approach_speed,
            });
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Hits are derived from begin events; force events are never enabled.
    }
}

fn relative_speed(
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    h1: ColliderHandle,
    h2: ColliderHandle,
) -> f32 {
    let velocity = |h: ColliderHandle| {
        colliders
            .get(h)
            .and_then(|c| c.parent())
            .and_then(|parent| bodies.get(parent))
            .map(|rb| *rb.linvel())
            .unwrap_or_else(Vector::zeros)
    };
    (velocity(h1) - velocity(h2)).norm()
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Owns the rapier pipeline and answers ray/AABB queries in presentation space.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    space: CoordSpace,
    hit_speed: f32,
    debug_ttl: u32,
    debug_records: Vec<DebugRecord>,
}

impl PhysicsWorld {
    /// Create a world whose gravity is given in presentation space
    /// (positive Y pulls down, e.g. `Vec2::new(0.0, 980.0)`).
    pub fn new(gravity: Vec2, space: CoordSpace) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(SUBSTEPS).unwrap_or(NonZeroUsize::MIN);
        Self {
            gravity: vec2_to_na(space.vector_to_physics(gravity)),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            space,
            hit_speed: DEFAULT_HIT_SPEED,
            debug_ttl: DEFAULT_DEBUG_TTL,
            debug_records: Vec::new(),
        }
    }

    pub fn with_hit_speed(mut self, speed: f32) -> Self {
        self.hit_speed = speed;
        self
    }

    pub fn with_debug_ttl(mut self, ticks: u32) -> Self {
        self.debug_ttl = ticks;
        self
    }

    pub fn space(&self) -> CoordSpace {
        self.space
    }

    pub fn hit_speed(&self) -> f32 {
        self.hit_speed
    }

    /// Gravity in presentation space.
    pub fn gravity(&self) -> Vec2 {
        self.space.vector_to_presentation(na_to_vec2(&self.gravity))
    }

    /// Release a body and its collider. Returns `false` if it was already gone.
    pub(crate) fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Advance the simulation by `dt` seconds and collect the resolved
    /// contact events of this step into `events`.
    pub fn step_into(&mut self, dt: f32, events: &mut ContactEvents) -> Result<(), EngineError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(EngineError::InvalidTimestep { dt });
        }
        self.integration_parameters.dt = dt;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        for collected in self.event_collector.drain_collisions() {
            match collected.event {
                CollisionEvent::Started(h1, h2, _) => {
                    match (self.collider_to_entity(h1), self.collider_to_entity(h2)) {
                        (Some(a), Some(b)) => {
                            events.begin.push(CollisionPair {
                                entity_a: a,
                                entity_b: b,
                            });
                            let speed = collected.approach_speed;
                            if speed >= self.hit_speed {
                                events.hits.push(ContactHit {
                                    entity_a: a,
                                    entity_b: b,
                                    speed,
                                });
                            }
                        }
                        _ => log::trace!("begin contact without entity on both sides, skipped"),
                    }
                }
                CollisionEvent::Stopped(h1, h2, flags) => {
                    // A collider removed mid-step reports its end with a dead handle.
                    if flags.contains(CollisionEventFlags::REMOVED)
                        || !self.colliders.contains(h1)
                        || !self.colliders.contains(h2)
                    {
                        log::trace!("end contact on a removed collider, skipped");
                        continue;
                    }
                    if let (Some(a), Some(b)) =
                        (self.collider_to_entity(h1), self.collider_to_entity(h2))
                    {
                        events.end.push(CollisionPair {
                            entity_a: a,
                            entity_b: b,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Cast a segment from `from` to `to` (presentation space). Colliders
    /// without an attached entity are transparent. Reflects the last step.
    pub fn cast_ray(&mut self, from: Vec2, to: Vec2) -> Option<RayHit> {
        let hit = self.cast_ray_inner(from, to);
        self.record(DebugShape::Ray {
            from,
            to,
            hit: hit.map(|h| h.point),
        });
        hit
    }

    fn cast_ray_inner(&self, from: Vec2, to: Vec2) -> Option<RayHit> {
        let origin = self.space.point_to_physics(from);
        let target = self.space.point_to_physics(to);
        let dir = target - origin;
        if dir.length_squared() == 0.0 {
            return None;
        }

        // Unnormalized direction: time of impact is the fraction along the segment.
        let ray = Ray::new(point![origin.x, origin.y], vec2_to_na(dir));
        let bodies = &self.bodies;
        let has_entity = |_: ColliderHandle, collider: &Collider| {
            collider
                .parent()
                .and_then(|parent| bodies.get(parent))
                .and_then(|rb| decode_user_data(rb.user_data))
                .is_some()
        };
        let filter = QueryFilter::default().predicate(&has_entity);

        let (handle, intersection) = self.query_pipeline.cast_ray_and_get_normal(
            &self.bodies,
            &self.colliders,
            &ray,
            1.0,
            true,
            filter,
        )?;
        let entity = self.collider_to_entity(handle)?;
        let point = ray.point_at(intersection.time_of_impact);
        Some(RayHit {
            point: self.space.point_to_presentation(Vec2::new(point.x, point.y)),
            normal: self
                .space
                .vector_to_presentation(na_to_vec2(&intersection.normal)),
            fraction: intersection.time_of_impact,
            entity,
        })
    }

    /// Entities whose colliders overlap `rect` (top-left + extents, presentation
    /// space). Order follows the broad phase and is not stable.
    pub fn query_aabb(&mut self, rect: Rect) -> Vec<EntityId> {
        let center = self.space.point_to_physics(rect.center());
        let shape = SharedShape::cuboid(rect.w * 0.5, rect.h * 0.5);
        let pos = Isometry::translation(center.x, center.y);

        let mut found = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.bodies,
            &self.colliders,
            &pos,
            &*shape,
            QueryFilter::default(),
            |handle| {
                if let Some(id) = self.collider_to_entity(handle) {
                    if !found.contains(&id) {
                        found.push(id);
                    }
                }
                true
            },
        );

        self.record(DebugShape::Query { rect });
        found
    }

    fn record(&mut self, shape: DebugShape) {
        if self.debug_ttl > 0 {
            self.debug_records.push(DebugRecord {
                shape,
                ttl: self.debug_ttl,
            });
        }
    }

    /// Age debug records by one tick, dropping expired ones.
    pub fn tick_debug(&mut self) {
        for record in &mut self.debug_records {
            record.ttl = record.ttl.saturating_sub(1);
        }
        self.debug_records.retain(|r| r.ttl > 0);
    }

    pub fn debug_records(&self) -> &[DebugRecord] {
        &self.debug_records
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// The entity attached to a rigid body, if any.
    pub fn body_entity(&self, handle: RigidBodyHandle) -> Option<EntityId> {
        self.bodies
            .get(handle)
            .and_then(|rb| decode_user_data(rb.user_data))
    }

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        self.body_entity(collider.parent()?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
