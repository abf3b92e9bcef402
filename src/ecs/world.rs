//! World management
//!
//! The World owns every entity and component, the simulation clock and the
//! game event queue. Systems receive it explicitly; nothing is global.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::component::{Component, ComponentKind, ComponentStore, ComponentValue};
use super::EntityId;
use crate::error::WorldError;
use crate::sim::events::GameEvent;

type DestroyObserver = Box<dyn FnMut(EntityId)>;

/// The entity registry
pub struct World {
    next_id: u64,
    /// Ordered so queries yield ascending ids
    alive: BTreeSet<EntityId>,
    store: ComponentStore,
    observers: HashMap<EntityId, Vec<DestroyObserver>>,
    now_ms: f64,
    events: Vec<GameEvent>,
}

impl World {
    /// Create an empty world with the clock at zero
    pub fn new() -> Self {
        Self {
            next_id: 1,
            alive: BTreeSet::new(),
            store: ComponentStore::default(),
            observers: HashMap::new(),
            now_ms: 0.0,
            events: Vec::new(),
        }
    }

    // === Entities ===

    /// Allocate a fresh entity with no components
    pub fn create(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.alive.insert(id);
        id
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.alive.len()
    }

    /// Destroy an entity, running component teardown and on-destroy
    /// observers. Returns false for unknown or already destroyed ids.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        if !self.alive.remove(&entity) {
            log::debug!("[{entity}]: destroy ignored, entity is not alive");
            return false;
        }

        for component in self.store.remove_all(entity) {
            component.teardown(entity);
        }
        if let Some(observers) = self.observers.remove(&entity) {
            for mut observer in observers {
                observer(entity);
            }
        }

        log::trace!("[{entity}]: destroyed");
        true
    }

    /// Run `observer` when `entity` is destroyed. Observers fire in
    /// registration order.
    pub fn on_destroy(&mut self, entity: EntityId, observer: impl FnMut(EntityId) + 'static) {
        if !self.is_alive(entity) {
            log::warn!("[{entity}]: on_destroy ignored, entity is not alive");
            return;
        }
        self.observers
            .entry(entity)
            .or_default()
            .push(Box::new(observer));
    }

    /// Remove every entity. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        log::debug!("Clearing {} entities", self.alive.len());
        self.alive.clear();
        self.store.clear();
        self.observers.clear();
        self.events.clear();
    }

    // === Components ===

    /// Attach a component. Rejected (first instance kept) if the kind is
    /// already present or the entity is dead.
    pub fn register<C: Component>(&mut self, entity: EntityId, component: C) -> bool {
        if !self.is_alive(entity) {
            log::warn!("[{entity}]: cannot register {:?}, entity is not alive", C::KIND);
            return false;
        }
        match C::storage_mut(&mut self.store).insert(entity, component) {
            Ok(()) => true,
            Err(_) => {
                log::warn!(
                    "[{entity}]: already has a {:?} component, keeping the first",
                    C::KIND
                );
                false
            }
        }
    }

    /// Type-erased [`register`](Self::register)
    pub fn register_value(&mut self, entity: EntityId, component: ComponentValue) -> bool {
        let kind = component.kind();
        if !self.is_alive(entity) {
            log::warn!("[{entity}]: cannot register {kind:?}, entity is not alive");
            return false;
        }
        match self.store.insert_value(entity, component) {
            Ok(()) => true,
            Err(kind) => {
                log::warn!("[{entity}]: already has a {kind:?} component, keeping the first");
                false
            }
        }
    }

    /// Detach and return a component
    pub fn remove<C: Component>(&mut self, entity: EntityId) -> Option<C> {
        let removed = C::storage_mut(&mut self.store).remove(entity);
        if removed.is_none() {
            log::debug!("[{entity}]: no {:?} component to remove", C::KIND);
        }
        removed
    }

    pub fn get<C: Component>(&self, entity: EntityId) -> Result<&C, WorldError> {
        if !self.is_alive(entity) {
            return Err(WorldError::DeadEntity(entity));
        }
        C::storage(&self.store)
            .get(entity)
            .ok_or(WorldError::ComponentNotFound {
                entity,
                kind: C::KIND,
            })
    }

    pub fn get_mut<C: Component>(&mut self, entity: EntityId) -> Result<&mut C, WorldError> {
        if !self.is_alive(entity) {
            return Err(WorldError::DeadEntity(entity));
        }
        C::storage_mut(&mut self.store)
            .get_mut(entity)
            .ok_or(WorldError::ComponentNotFound {
                entity,
                kind: C::KIND,
            })
    }

    pub fn try_get<C: Component>(&self, entity: EntityId) -> Option<&C> {
        C::storage(&self.store).get(entity)
    }

    pub fn try_get_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        C::storage_mut(&mut self.store).get_mut(entity)
    }

    pub fn has<C: Component>(&self, entity: EntityId) -> bool {
        C::storage(&self.store).contains(entity)
    }

    pub fn has_kind(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.store.contains(kind, entity)
    }

    /// True when the entity is alive and holds every listed kind
    pub fn has_all(&self, entity: EntityId, kinds: &[ComponentKind]) -> bool {
        self.is_alive(entity) && kinds.iter().all(|&kind| self.store.contains(kind, entity))
    }

    /// True when the entity holds at least one listed kind
    pub fn has_any(&self, entity: EntityId, kinds: &[ComponentKind]) -> bool {
        kinds.iter().any(|&kind| self.store.contains(kind, entity))
    }

    /// Number of entities holding `kind`
    pub fn count_of(&self, kind: ComponentKind) -> usize {
        self.store.count(kind)
    }

    // === Queries ===

    /// Lazily yield, in ascending id order, every entity holding all
    /// `kinds`. Call again to restart.
    pub fn query<'a>(&'a self, kinds: &'a [ComponentKind]) -> impl Iterator<Item = EntityId> + 'a {
        self.alive
            .iter()
            .copied()
            .filter(move |&id| kinds.iter().all(|&kind| self.store.contains(kind, id)))
    }

    /// Snapshot of [`query`](Self::query) for callers that mutate the world
    /// while walking the result
    pub fn query_all(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        self.query(kinds).collect()
    }

    // === Clock ===

    /// Simulation time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn advance_clock(&mut self, dt_ms: f64) {
        if dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }

    // === Events ===

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("next_id", &self.next_id)
            .field("alive", &self.alive.len())
            .field("now_ms", &self.now_ms)
            .field("pending_events", &self.events.len())
            .finish()
    }
}
