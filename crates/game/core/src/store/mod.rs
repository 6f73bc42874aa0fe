//! Entity and component storage.
//!
//! [`ComponentStore`] owns every entity and every component. One `RwLock`
//! guards the entity table and all component tables together so a reader can
//! never observe a component whose entity is gone, or an entity missing a
//! component a concurrent writer was in the middle of adding.
//!
//! Mutations on missing entities are not errors: entities can vanish between
//! the moment a system decides to touch them and the moment it does, so those
//! calls log at debug level and do nothing.

mod components;

pub use components::{
    AiTag, BlocksMovement, Component, ComponentKind, ComponentSet, ComponentTables,
    ComponentValue, CorpseTag, Fov, Health, Name, PlayerTag, Renderable, Tint, TurnActor,
};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::state::{EntityId, Position};

#[derive(Debug)]
struct StoreInner {
    next_id: EntityId,
    /// Live entities and the kinds each one currently holds.
    entities: BTreeMap<EntityId, ComponentSet>,
    tables: ComponentTables,
}

impl StoreInner {
    fn insert_kind(&mut self, id: EntityId, kind: ComponentKind) -> bool {
        match self.entities.get_mut(&id) {
            Some(set) => {
                set.insert(kind.into());
                true
            }
            None => false,
        }
    }

    fn clear_kind(&mut self, id: EntityId, kind: ComponentKind) {
        if let Some(set) = self.entities.get_mut(&id) {
            set.remove(kind.into());
        }
    }
}

/// Thread-safe table of entities and their components.
#[derive(Debug)]
pub struct ComponentStore {
    inner: RwLock<StoreInner>,
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                next_id: EntityId::FIRST,
                entities: BTreeMap::new(),
                tables: ComponentTables::default(),
            }),
        }
    }

    // The guarded data is plain values with no invariants that a panicking
    // writer could leave half-updated across an await, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Entity lifecycle
    // ========================================================================

    /// Allocates the next identifier and records it as live.
    pub fn create_entity(&self) -> EntityId {
        let mut inner = self.write();
        let id = inner.next_id;
        inner.next_id = id.next();
        inner.entities.insert(id, ComponentSet::empty());
        trace!(target: "game_core::store", entity = %id, "entity created");
        id
    }

    /// Removes the entity and every component keyed to it. Unknown ids are ignored.
    pub fn destroy_entity(&self, id: EntityId) {
        let mut inner = self.write();
        let Some(set) = inner.entities.remove(&id) else {
            debug!(target: "game_core::store", entity = %id, "destroy of unknown entity ignored");
            return;
        };
        for kind in set.kinds() {
            inner.tables.remove_value(kind, id);
        }
        trace!(target: "game_core::store", entity = %id, "entity destroyed");
    }

    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.read().entities.contains_key(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.read().entities.len()
    }

    /// All live entities in ascending id order.
    pub fn entities(&self) -> Vec<EntityId> {
        self.read().entities.keys().copied().collect()
    }

    /// Kinds currently attached to `id`, or `None` if the entity does not exist.
    pub fn component_set(&self, id: EntityId) -> Option<ComponentSet> {
        self.read().entities.get(&id).copied()
    }

    // ========================================================================
    // Typed component access
    // ========================================================================

    /// Adds or replaces a component. Logs and does nothing if `id` is not live.
    pub fn add<C: Component>(&self, id: EntityId, component: C) {
        let mut inner = self.write();
        if !inner.insert_kind(id, C::KIND) {
            debug!(
                target: "game_core::store",
                entity = %id,
                kind = %C::KIND,
                "attempted to add component to non-existent entity"
            );
            return;
        }
        C::table_mut(&mut inner.tables).insert(id, component);
    }

    pub fn get<C: Component>(&self, id: EntityId) -> Option<C> {
        C::table(&self.read().tables).get(&id).cloned()
    }

    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.has_component(id, C::KIND)
    }

    pub fn remove<C: Component>(&self, id: EntityId) -> Option<C> {
        let mut inner = self.write();
        let removed = C::table_mut(&mut inner.tables).remove(&id);
        inner.clear_kind(id, C::KIND);
        removed
    }

    /// Mutates a component in place under the write lock.
    ///
    /// Returns `None` without calling `f` if the entity lacks the component.
    pub fn update<C, R>(&self, id: EntityId, f: impl FnOnce(&mut C) -> R) -> Option<R>
    where
        C: Component,
    {
        let mut inner = self.write();
        C::table_mut(&mut inner.tables).get_mut(&id).map(f)
    }

    // ========================================================================
    // Kind-tagged component access
    // ========================================================================

    /// Adds or replaces a type-erased component. Same missing-entity policy as [`Self::add`].
    pub fn add_component(&self, id: EntityId, value: ComponentValue) {
        let kind = value.kind();
        let mut inner = self.write();
        if !inner.insert_kind(id, kind) {
            debug!(
                target: "game_core::store",
                entity = %id,
                kind = %kind,
                "attempted to add component to non-existent entity"
            );
            return;
        }
        inner.tables.insert_value(id, value);
    }

    pub fn get_component(&self, id: EntityId, kind: ComponentKind) -> Option<ComponentValue> {
        self.read().tables.get_value(kind, id)
    }

    pub fn has_component(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.read()
            .entities
            .get(&id)
            .is_some_and(|set| set.contains(kind.into()))
    }

    pub fn remove_component(&self, id: EntityId, kind: ComponentKind) -> Option<ComponentValue> {
        let mut inner = self.write();
        let removed = inner.tables.remove_value(kind, id);
        inner.clear_kind(id, kind);
        removed
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Entities holding every listed kind.
    ///
    /// Walks the smallest of the requested tables and filters by each
    /// candidate's kind set. An empty `kinds` list matches nothing.
    pub fn query(&self, kinds: &[ComponentKind]) -> BTreeSet<EntityId> {
        let inner = self.read();
        let Some(&smallest) = kinds.iter().min_by_key(|kind| inner.tables.len_of(**kind)) else {
            return BTreeSet::new();
        };
        let required: ComponentSet = kinds.iter().copied().collect();

        inner
            .tables
            .ids_of(smallest)
            .filter(|id| {
                inner
                    .entities
                    .get(id)
                    .is_some_and(|set| set.contains(required))
            })
            .collect()
    }

    /// Entities whose position is `position`, in ascending id order.
    pub fn entities_at(&self, position: Position) -> Vec<EntityId> {
        let inner = self.read();
        let mut ids: Vec<EntityId> = Position::table(&inner.tables)
            .iter()
            .filter(|(_, pos)| **pos == position)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    // ========================================================================
    // Read accessors for the UI layer
    // ========================================================================

    pub fn position(&self, id: EntityId) -> Option<Position> {
        self.get::<Position>(id)
    }

    pub fn renderable(&self, id: EntityId) -> Option<Renderable> {
        self.get::<Renderable>(id)
    }

    pub fn health(&self, id: EntityId) -> Option<Health> {
        self.get::<Health>(id)
    }

    pub fn name(&self, id: EntityId) -> Option<String> {
        self.get::<Name>(id).map(|name| name.0)
    }

    /// Display name, falling back to the entity id for unnamed entities.
    pub fn display_name(&self, id: EntityId) -> String {
        self.name(id).unwrap_or_else(|| id.to_string())
    }
}
