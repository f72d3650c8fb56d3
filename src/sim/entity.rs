//! Generation-checked entity storage
//!
//! Entities are never hard deleted. Deactivating a slot keeps its data so an
//! editor can undo the removal, and the generation counter makes stale handles
//! resolve to `None` once a slot is reused.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Typed handle into an [`EntityArray`]
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Id<T> {
    pub index: u32,
    pub generation: u32,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            marker: PhantomData,
        }
    }
}

// Derives would put bounds on T.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot<T> {
    entity: T,
    generation: u32,
    active: bool,
}

/// Arena of entities with slot reuse and liveness tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityArray<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for EntityArray<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> EntityArray<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, reusing an inactive slot when one exists
    ///
    /// Reusing a slot bumps its generation, so handles to the previous
    /// occupant stop resolving.
    pub fn create(&mut self, entity: T) -> Id<T> {
        if let Some(index) = self.slots.iter().position(|slot| !slot.active) {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entity = entity;
            slot.active = true;
            return Id::new(index as u32, slot.generation);
        }
        self.slots.push(Slot {
            entity,
            generation: 0,
            active: true,
        });
        Id::new((self.slots.len() - 1) as u32, 0)
    }

    fn slot(&self, id: Id<T>) -> Option<&Slot<T>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    fn slot_mut(&mut self, id: Id<T>) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    /// Live entity behind `id`
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.slot(id).filter(|slot| slot.active).map(|slot| &slot.entity)
    }

    pub fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        self.slot_mut(id)
            .filter(|slot| slot.active)
            .map(|slot| &mut slot.entity)
    }

    pub fn is_alive(&self, id: Id<T>) -> bool {
        self.get(id).is_some()
    }

    /// Hide an entity without dropping its data. Returns false for stale ids.
    pub fn deactivate(&mut self, id: Id<T>) -> bool {
        match self.slot_mut(id) {
            Some(slot) if slot.active => {
                slot.active = false;
                true
            }
            _ => false,
        }
    }

    /// Bring a deactivated entity back (undo of a removal)
    ///
    /// Fails if the slot was reused in the meantime.
    pub fn activate(&mut self, id: Id<T>) -> bool {
        match self.slot_mut(id) {
            Some(slot) if !slot.active => {
                slot.active = true;
                true
            }
            _ => false,
        }
    }

    /// Live entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(i, slot)| (Id::new(i as u32, slot.generation), &slot.entity))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id<T>, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(i, slot)| (Id::new(i as u32, slot.generation), &mut slot.entity))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, entity)| entity)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.iter_mut().map(|(_, entity)| entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
