//! Debug overlay geometry: opt-in collider, ray and query visualization.
//!
//! Call `debug_outlines()` after `Game::update()` and hand the polylines to
//! whatever draws lines. Everything is in presentation space.

use glam::Vec2;

use crate::api::types::{EntityId, Rect};
use crate::core::physics::{DebugShape, PhysicsWorld};
use crate::core::scene::Scene;

/// Half size of the square drawn at a ray hit point.
const HIT_MARKER: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    Player,
    Standable,
    Body,
    Ray,
    RayHit,
    Query,
}

/// A polyline to draw. Closed shapes repeat their first point at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugOutline {
    pub kind: OutlineKind,
    pub points: Vec<[f32; 2]>,
}

/// Outlines for every live collider plus the live ray/query records.
pub fn debug_outlines(
    scene: &Scene,
    physics: &PhysicsWorld,
    player: Option<EntityId>,
) -> Vec<DebugOutline> {
    let mut outlines = Vec::with_capacity(scene.len() + physics.debug_records().len());

    for entity in scene.iter() {
        let Some(body) = entity.body.filter(|b| b.is_valid(physics)) else {
            continue;
        };
        let kind = if Some(entity.id) == player {
            OutlineKind::Player
        } else if entity.is_standable() {
            OutlineKind::Standable
        } else {
            OutlineKind::Body
        };
        let points = box_outline(body.position(physics), body.size() * 0.5, body.angle(physics));
        outlines.push(DebugOutline { kind, points });
    }

    for record in physics.debug_records() {
        match record.shape {
            DebugShape::Ray { from, to, hit } => {
                let end = hit.unwrap_or(to);
                outlines.push(DebugOutline {
                    kind: OutlineKind::Ray,
                    points: vec![from.to_array(), end.to_array()],
                });
                if let Some(point) = hit {
                    outlines.push(DebugOutline {
                        kind: OutlineKind::RayHit,
                        points: box_outline(point, Vec2::splat(HIT_MARKER), 0.0),
                    });
                }
            }
            DebugShape::Query { rect } => outlines.push(DebugOutline {
                kind: OutlineKind::Query,
                points: rect_outline(&rect),
            }),
        }
    }
    outlines
}

/// Closed outline of an axis-aligned rect.
pub fn rect_outline(rect: &Rect) -> Vec<[f32; 2]> {
    box_outline(rect.center(), Vec2::new(rect.w, rect.h) * 0.5, 0.0)
}

/// Rotated rectangle (4 corners + close). `degrees` is visually clockwise.
fn box_outline(center: Vec2, half: Vec2, degrees: f32) -> Vec<[f32; 2]> {
    let (sin_r, cos_r) = degrees.to_radians().sin_cos();
    let corners = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ];
    let mut points: Vec<[f32; 2]> = corners
        .iter()
        .map(|c| {
            [
                center.x + c.x * cos_r - c.y * sin_r,
                center.y + c.x * sin_r + c.y * cos_r,
            ]
        })
        .collect();
    points.push(points[0]);
    points
}
