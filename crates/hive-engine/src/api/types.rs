use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational identifier for an entity in the scene.
///
/// Layout: `[generation: u32 | index: u32]`. The generation is bumped every
/// time an index is recycled, so a stale id never resolves to a newer entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The index portion (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation portion (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Axis-aligned rectangle in presentation space (origin top-left, Y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.w + 2.0 * margin,
            self.h + 2.0 * margin,
        )
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_horizontally(other)
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_packs_index_and_generation() {
        let id = EntityId::new(7, 3);
        assert_eq!(id.index(), 7);
        assert_eq!(id.generation(), 3);
        assert_eq!(EntityId::from_raw(id.to_raw()), id);
        assert_eq!(format!("{:?}", id), "EntityId(7v3)");
        assert_eq!(id.to_string(), "7v3");
    }

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), glam::Vec2::new(25.0, 40.0));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.inflate(1.0).overlaps(&b));
    }

    #[test]
    fn overlap_needs_both_axes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 50.0, 10.0, 10.0);
        assert!(a.overlaps_horizontally(&b));
        assert!(!a.overlaps(&b));
    }
}
