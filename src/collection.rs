//! Entity collections and the scene that links them.
//!
//! A `Scene` owns the player plus the "enemies" and "clouds" collections,
//! and keeps the "all" list (draw order) in step with both: anything
//! removed from a sub-collection is removed from "all" in the same call.

use crate::entities::{Entity, EntityId, EntityKind};

// ── EntityCollection ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct EntityCollection {
    members: Vec<Entity>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: Entity) {
        self.members.push(entity);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.members.iter().position(|e| e.id == id)?;
        Some(self.members.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.members.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.members.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Advance every member, then drop enemies and clouds that left the
    /// screen. Returns the ids that were dropped.
    pub fn advance_all(&mut self, dt: f32, screen_width: f32) -> Vec<EntityId> {
        for entity in &mut self.members {
            entity.advance(dt);
        }
        let mut dropped = Vec::new();
        self.members.retain(|e| {
            let gone = e.kind != EntityKind::Player && e.is_off_screen(screen_width);
            if gone {
                dropped.push(e.id);
            }
            !gone
        });
        dropped
    }

    /// Every `(mine, theirs)` pair whose bounding boxes intersect.
    pub fn collides_with(&self, other: &EntityCollection) -> Vec<(EntityId, EntityId)> {
        self.members
            .iter()
            .flat_map(|a| {
                other
                    .members
                    .iter()
                    .filter(move |b| a.overlaps(b))
                    .map(move |b| (a.id, b.id))
            })
            .collect()
    }

    /// Ids of members intersecting `entity`.
    pub fn overlapping(&self, entity: &Entity) -> Vec<EntityId> {
        self.members
            .iter()
            .filter(|e| e.overlaps(entity))
            .map(|e| e.id)
            .collect()
    }
}

// ── Scene ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Scene {
    pub player: Entity,
    pub enemies: EntityCollection,
    pub clouds: EntityCollection,
    /// Draw order: first-added is drawn first.
    all: Vec<EntityId>,
    next_id: u64,
}

impl Scene {
    pub fn new(mut player: Entity) -> Self {
        player.id = EntityId(0);
        Scene {
            player,
            enemies: EntityCollection::new(),
            clouds: EntityCollection::new(),
            all: vec![EntityId(0)],
            next_id: 1,
        }
    }

    /// Assign a fresh id and insert into the matching sub-collection and "all".
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        match entity.kind {
            EntityKind::Enemy => self.enemies.add(entity),
            EntityKind::Cloud => self.clouds.add(entity),
            EntityKind::Player => {
                // One player per scene; a second one is treated as a replacement.
                let old = self.player.id;
                self.all.retain(|&x| x != old);
                self.player = entity;
            }
        }
        self.all.push(id);
        id
    }

    /// Remove an enemy or cloud from its collection and from "all".
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.enemies.remove(id).or_else(|| self.clouds.remove(id))?;
        self.all.retain(|&x| x != id);
        Some(removed)
    }

    /// Move everything by `dt` and purge flyers that exited on the left.
    pub fn advance(&mut self, dt: f32, screen_width: f32) {
        self.player.advance(dt);
        let mut dropped = self.enemies.advance_all(dt, screen_width);
        dropped.extend(self.clouds.advance_all(dt, screen_width));
        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "flyers left the screen");
            self.all.retain(|id| !dropped.contains(id));
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if id == self.player.id {
            return Some(&self.player);
        }
        self.enemies.get(id).or_else(|| self.clouds.get(id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id == self.player.id {
            return Some(&mut self.player);
        }
        match self.enemies.get_mut(id) {
            Some(e) => Some(e),
            None => self.clouds.get_mut(id),
        }
    }

    pub fn all_ids(&self) -> &[EntityId] {
        &self.all
    }

    /// Entities in draw order.
    pub fn draw_order(&self) -> impl Iterator<Item = &Entity> {
        self.all.iter().filter_map(|&id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
