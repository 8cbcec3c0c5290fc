use std::collections::{HashMap, VecDeque};

use crate::api::error::EngineError;
use crate::api::types::EntityId;
use crate::components::entity::{Entity, Marker};

/// Hands out generational ids. Free indices are recycled FIFO.
#[derive(Debug, Default)]
struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_indices: VecDeque<u32>,
}

impl EntityAllocator {
    fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free_indices.pop_front() {
            self.alive[index as usize] = true;
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            EntityId::new(index, 0)
        }
    }

    fn deallocate(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(id.index());
        true
    }

    fn is_alive(&self, id: EntityId) -> bool {
        let idx = id.index() as usize;
        idx < self.generations.len() && self.alive[idx] && self.generations[idx] == id.generation()
    }
}

/// Entity storage in spawn order, with a per-marker index.
/// Designed for small-to-medium entity counts (hundreds, not millions).
///
/// Iteration order is spawn order and survives despawns, so "first match"
/// scans (ground detection, key lookup) stay deterministic.
pub struct Scene {
    entities: Vec<Entity>,
    allocator: EntityAllocator,
    index: HashMap<Marker, Vec<EntityId>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a scene with a specific entity capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            allocator: EntityAllocator::default(),
            index: HashMap::new(),
        }
    }

    /// Reserve a fresh id for an entity about to be spawned.
    pub fn allocate_id(&mut self) -> EntityId {
        self.allocator.allocate()
    }

    /// Add an entity whose id came from `allocate_id`.
    pub fn spawn(&mut self, entity: Entity) -> Result<EntityId, EngineError> {
        let id = entity.id;
        if !self.allocator.is_alive(id) {
            return Err(EngineError::StaleEntity { id });
        }
        if self.entities.iter().any(|e| e.id == id) {
            return Err(EngineError::DuplicateEntity { id });
        }
        for marker in entity.markers() {
            self.index.entry(marker).or_default().push(id);
        }
        self.entities.push(entity);
        Ok(id)
    }

    /// Remove an entity by ID. Returns the removed entity if it was alive.
    /// The id's generation is retired, so stale copies no longer resolve.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.position(id)?;
        let entity = self.entities.remove(idx);
        self.allocator.deallocate(id);
        for ids in self.index.values_mut() {
            ids.retain(|other| *other != id);
        }
        Some(entity)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.position(id).map(|idx| &self.entities[idx])
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let idx = self.position(id)?;
        Some(&mut self.entities[idx])
    }

    /// Iterate over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Ids carrying `marker`, in spawn order.
    pub fn ids_with(&self, marker: Marker) -> &[EntityId] {
        self.index.get(&marker).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entities carrying `marker`, in spawn order.
    pub fn with_marker(&self, marker: Marker) -> impl Iterator<Item = &Entity> {
        self.ids_with(marker)
            .iter()
            .filter_map(move |id| self.get(*id))
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    /// Find the first entity with the given tag (mutable).
    pub fn find_by_tag_mut(&mut self, tag: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.tag == tag)
    }

    /// Find all entities with the given tag.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.tag == tag).collect()
    }

    /// Number of entities in the scene.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity and retire their ids. Bodies are the caller's to release.
    pub fn clear(&mut self) -> Vec<Entity> {
        let removed = std::mem::take(&mut self.entities);
        for entity in &removed {
            self.allocator.deallocate(entity.id);
        }
        self.index.clear();
        removed
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.entities.iter().position(|e| e.id == id)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
