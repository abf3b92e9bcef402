//! Component storage
//!
//! Every component kind gets its own sparse set inside [`ComponentStore`].
//! Kinds form a closed enumeration ([`ComponentKind`]) so presence checks and
//! teardown never need runtime type reflection.

use std::collections::HashMap;

use super::EntityId;
use super::components::*;

/// Trait implemented by every component kind.
///
/// Implementations are generated by `declare_components!`; the accessors let
/// the [`World`](super::World) reach the right sparse set statically.
pub trait Component: Sized + 'static {
    /// Runtime tag of this component kind
    const KIND: ComponentKind;

    /// Storage for this kind
    fn storage(store: &ComponentStore) -> &SparseSet<Self>;

    /// Mutable storage for this kind
    fn storage_mut(store: &mut ComponentStore) -> &mut SparseSet<Self>;
}

/// Sparse-set storage for one component kind
///
/// Components are kept densely in `items`; `index` maps an entity to its slot
/// and `ids` maps a slot back to its entity so removal can swap the last slot
/// into the hole.
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    index: HashMap<EntityId, usize>,
    ids: Vec<EntityId>,
    items: Vec<T>,
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            ids: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.index.get(&id).map(|&slot| &self.items[slot])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let slot = *self.index.get(&id)?;
        Some(&mut self.items[slot])
    }

    /// Insert a component. An existing component is never overwritten: the
    /// rejected value is handed back instead.
    pub fn insert(&mut self, id: EntityId, value: T) -> Result<(), T> {
        if self.index.contains_key(&id) {
            return Err(value);
        }
        self.index.insert(id, self.items.len());
        self.ids.push(id);
        self.items.push(value);

        debug_assert_eq!(self.index.len(), self.ids.len());
        debug_assert_eq!(self.ids.len(), self.items.len());
        Ok(())
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.index.remove(&id)?;
        let last = self.items.len() - 1;
        if slot != last {
            let moved = self.ids[last];
            self.index.insert(moved, slot);
        }
        self.ids.swap_remove(slot);
        Some(self.items.swap_remove(slot))
    }

    /// Entities holding this kind, in storage order
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.ids.iter().copied().zip(self.items.iter())
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.ids.clear();
        self.items.clear();
    }
}

macro_rules! declare_components {
    ($($field:ident: $ty:ident),* $(,)?) => {
        /// Closed set of component kinds
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum ComponentKind {
            $($ty,)*
        }

        impl ComponentKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$ty,)*];
        }

        /// One sparse set per component kind
        #[derive(Debug, Default)]
        pub struct ComponentStore {
            $($field: SparseSet<$ty>,)*
        }

        impl ComponentStore {
            /// Whether `id` holds a component of `kind`
            pub fn contains(&self, kind: ComponentKind, id: EntityId) -> bool {
                match kind {
                    $(ComponentKind::$ty => self.$field.contains(id),)*
                }
            }

            /// Number of stored components of `kind`
            pub fn count(&self, kind: ComponentKind) -> usize {
                match kind {
                    $(ComponentKind::$ty => self.$field.len(),)*
                }
            }

            /// Entities holding `kind`, in storage order
            pub fn ids_of(&self, kind: ComponentKind) -> &[EntityId] {
                match kind {
                    $(ComponentKind::$ty => self.$field.ids(),)*
                }
            }

            /// Insert a type-erased component; rejects (returns the kind of)
            /// a component whose kind is already present
            pub fn insert_value(
                &mut self,
                id: EntityId,
                value: ComponentValue,
            ) -> Result<(), ComponentKind> {
                match value {
                    $(ComponentValue::$ty(c) => {
                        self.$field.insert(id, c).map_err(|_| ComponentKind::$ty)
                    })*
                }
            }

            /// Detach every component of `id`, in declaration order
            pub fn remove_all(&mut self, id: EntityId) -> Vec<ComponentValue> {
                let mut removed = Vec::new();
                $(
                    if let Some(c) = self.$field.remove(id) {
                        removed.push(ComponentValue::$ty(c));
                    }
                )*
                removed
            }

            pub fn clear(&mut self) {
                $(self.$field.clear();)*
            }
        }

        /// A component of any kind, used by builders and level staging
        #[derive(Debug, Clone)]
        pub enum ComponentValue {
            $($ty($ty),)*
        }

        impl ComponentValue {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(ComponentValue::$ty(_) => ComponentKind::$ty,)*
                }
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn storage(store: &ComponentStore) -> &SparseSet<Self> {
                    &store.$field
                }

                fn storage_mut(store: &mut ComponentStore) -> &mut SparseSet<Self> {
                    &mut store.$field
                }
            }

            impl From<$ty> for ComponentValue {
                fn from(c: $ty) -> Self {
                    ComponentValue::$ty(c)
                }
            }
        )*
    };
}

declare_components! {
    transforms: Transform,
    colliders: Collider,
    velocities: Velocity,
    rigidbodies: Rigidbody,
    projectiles: Projectile,
    guns: Gun,
    obstacles: Obstacle,
    enemies: Enemy,
    responses: ColliderResponse,
    players: Player,
    doors: Door,
    sprites: Sprite,
    scripts: Script,
}

impl ComponentValue {
    /// Teardown hook run when the owning entity is destroyed
    pub fn teardown(&self, owner: EntityId) {
        if let ComponentValue::ColliderResponse(response) = self {
            log::trace!("[{owner}]: released {response:?} collider response");
        }
    }
}
