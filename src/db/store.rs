//! Keyed in-memory store for one entity type.
//!
//! A store is the only holder of live entity data. It is not thread-safe;
//! callers needing shared access must serialize through their own lock.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use serde::Serialize;

use super::models::{Camp, Enquiry, EnquiryId, Suggestion, SuggestionId, User};
use super::repository::Repository;
use super::{DbError, DbResult};

/// An entity that can live in a [`Store`].
pub trait Entity {
    type Key: Ord + Clone + Debug + Display;

    /// Name used in errors and logs.
    const ENTITY_TYPE: &'static str;

    fn key(&self) -> Self::Key;
}

impl Entity for User {
    type Key = String;
    const ENTITY_TYPE: &'static str = "User";

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Camp {
    type Key = String;
    const ENTITY_TYPE: &'static str = "Camp";

    fn key(&self) -> String {
        self.name.clone()
    }
}

impl Entity for Enquiry {
    type Key = EnquiryId;
    const ENTITY_TYPE: &'static str = "Enquiry";

    fn key(&self) -> EnquiryId {
        self.id
    }
}

impl Entity for Suggestion {
    type Key = SuggestionId;
    const ENTITY_TYPE: &'static str = "Suggestion";

    fn key(&self) -> SuggestionId {
        self.id
    }
}

/// Lifecycle of a store.
///
/// `Empty -> Loading -> Ready -> Mutated* -> Saved`, where a saved store
/// accepts further changes exactly like a ready one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    #[default]
    Empty,
    Loading,
    Ready,
    Mutated,
    Saved,
}

impl StoreState {
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            StoreState::Ready | StoreState::Mutated | StoreState::Saved
        )
    }
}

impl std::fmt::Display for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StoreState::Empty => "empty",
            StoreState::Loading => "loading",
            StoreState::Ready => "ready",
            StoreState::Mutated => "mutated",
            StoreState::Saved => "saved",
        };
        write!(f, "{}", s)
    }
}

/// ID-ordered collection of one entity type.
#[derive(Debug, Clone)]
pub struct Store<T: Entity> {
    items: BTreeMap<T::Key, T>,
    state: StoreState,
}

impl<T: Entity> Default for Store<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            state: StoreState::Empty,
        }
    }
}

impl<T: Entity> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// True when there are changes since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.state == StoreState::Mutated
    }

    pub fn begin_load(&mut self) {
        self.items.clear();
        self.state = StoreState::Loading;
    }

    /// Insert a decoded entity. Only legal while loading.
    pub fn load(&mut self, entity: T) -> DbResult<()> {
        if self.state != StoreState::Loading {
            return Err(self.not_ready());
        }
        let key = entity.key();
        if self.items.contains_key(&key) {
            return Err(DbError::AlreadyExists {
                entity_type: T::ENTITY_TYPE.to_string(),
                id: key.to_string(),
            });
        }
        self.items.insert(key, entity);
        Ok(())
    }

    pub fn finish_load(&mut self) {
        self.state = StoreState::Ready;
    }

    pub fn mark_saved(&mut self) {
        if self.state.is_writable() {
            self.state = StoreState::Saved;
        }
    }

    /// Insert a new entity, failing if the ID is taken.
    pub fn insert(&mut self, entity: T) -> DbResult<()> {
        self.ensure_writable()?;
        let key = entity.key();
        if self.items.contains_key(&key) {
            return Err(DbError::AlreadyExists {
                entity_type: T::ENTITY_TYPE.to_string(),
                id: key.to_string(),
            });
        }
        self.items.insert(key, entity);
        self.state = StoreState::Mutated;
        Ok(())
    }

    pub fn get_mut<Q>(&mut self, id: &Q) -> DbResult<&mut T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + Display + ?Sized,
    {
        self.ensure_writable()?;
        if !self.items.contains_key(id) {
            return Err(DbError::not_found(T::ENTITY_TYPE, id));
        }
        self.state = StoreState::Mutated;
        self.items
            .get_mut(id)
            .ok_or_else(|| DbError::not_found(T::ENTITY_TYPE, id))
    }

    /// Apply `f` to every entity; `f` reports whether it changed anything.
    /// Returns the number of changed entities.
    pub fn update_all(&mut self, mut f: impl FnMut(&mut T) -> bool) -> DbResult<usize> {
        self.ensure_writable()?;
        let mut changed = 0;
        for entity in self.items.values_mut() {
            if f(entity) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.state = StoreState::Mutated;
        }
        Ok(changed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &T::Key> {
        self.items.keys()
    }

    pub fn last_key(&self) -> Option<&T::Key> {
        self.items.keys().next_back()
    }

    fn ensure_writable(&self) -> DbResult<()> {
        if self.state.is_writable() {
            Ok(())
        } else {
            Err(self.not_ready())
        }
    }

    fn not_ready(&self) -> DbError {
        DbError::NotReady {
            entity_type: T::ENTITY_TYPE.to_string(),
            state: self.state,
        }
    }
}

impl<T: Entity> Repository<T> for Store<T> {
    fn get<Q>(&self, id: &Q) -> DbResult<&T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + Display + ?Sized,
    {
        self.items
            .get(id)
            .ok_or_else(|| DbError::not_found(T::ENTITY_TYPE, id))
    }

    fn put(&mut self, entity: T) -> DbResult<Option<T>> {
        self.ensure_writable()?;
        let previous = self.items.insert(entity.key(), entity);
        self.state = StoreState::Mutated;
        Ok(previous)
    }

    fn delete<Q>(&mut self, id: &Q) -> DbResult<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + Display + ?Sized,
    {
        self.ensure_writable()?;
        let removed = self
            .items
            .remove(id)
            .ok_or_else(|| DbError::not_found(T::ENTITY_TYPE, id))?;
        self.state = StoreState::Mutated;
        Ok(removed)
    }

    fn list(&self) -> Vec<&T> {
        self.items.values().collect()
    }

    fn contains<Q>(&self, id: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.items.contains_key(id)
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
