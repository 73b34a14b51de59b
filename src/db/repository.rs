//! Repository trait and the aggregate of all stores.
//!
//! The trait defines the contract for keyed access so that services do not
//! depend on how a store keeps its data.

use std::borrow::Borrow;
use std::fmt::Display;
use std::ops::Deref;

use crate::codec::check_user_id;

use super::models::{Camp, Enquiry, EnquiryId, Suggestion, SuggestionId, User};
use super::resolver::{self, ReferentialIntegrityError, Violation};
use super::store::{Entity, Store, StoreState};
use super::{DbError, DbResult};

/// Keyed access to one entity type.
pub trait Repository<T: Entity> {
    /// Get an entity by ID.
    fn get<Q>(&self, id: &Q) -> DbResult<&T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + Display + ?Sized;

    /// Insert or replace an entity, returning the previous value.
    fn put(&mut self, entity: T) -> DbResult<Option<T>>;

    /// Remove an entity by ID. Cross references are not touched; use the
    /// cascading deletes on [`Stores`] for that.
    fn delete<Q>(&mut self, id: &Q) -> DbResult<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + Display + ?Sized;

    /// All entities, ordered by ID.
    fn list(&self) -> Vec<&T>;

    fn contains<Q>(&self, id: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One store per entity type.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    pub users: Store<User>,
    pub camps: Store<Camp>,
    pub enquiries: Store<Enquiry>,
    pub suggestions: Store<Suggestion>,
}

impl Stores {
    pub fn begin_load(&mut self) {
        self.users.begin_load();
        self.camps.begin_load();
        self.enquiries.begin_load();
        self.suggestions.begin_load();
    }

    pub fn finish_load(&mut self) {
        self.users.finish_load();
        self.camps.finish_load();
        self.enquiries.finish_load();
        self.suggestions.finish_load();
    }

    pub fn mark_saved(&mut self) {
        self.users.mark_saved();
        self.camps.mark_saved();
        self.enquiries.mark_saved();
        self.suggestions.mark_saved();
    }

    pub fn is_dirty(&self) -> bool {
        self.users.is_dirty()
            || self.camps.is_dirty()
            || self.enquiries.is_dirty()
            || self.suggestions.is_dirty()
    }

    /// State of each store, keyed by entity type.
    pub fn states(&self) -> [(&'static str, StoreState); 4] {
        [
            (User::ENTITY_TYPE, self.users.state()),
            (Camp::ENTITY_TYPE, self.camps.state()),
            (Enquiry::ENTITY_TYPE, self.enquiries.state()),
            (Suggestion::ENTITY_TYPE, self.suggestions.state()),
        ]
    }

    /// One past the highest enquiry ID. Deleting the highest enquiry frees
    /// its ID for reuse; cascades leave no reference to it behind.
    pub fn next_enquiry_id(&self) -> DbResult<EnquiryId> {
        next_id::<Enquiry>(self.enquiries.last_key().copied())
    }

    /// One past the highest suggestion ID, with the same reuse rule as
    /// [`Stores::next_enquiry_id`].
    pub fn next_suggestion_id(&self) -> DbResult<SuggestionId> {
        next_id::<Suggestion>(self.suggestions.last_key().copied())
    }
}

fn next_id<T: Entity>(last: Option<u32>) -> DbResult<u32> {
    match last {
        None => Ok(1),
        Some(id) => id.checked_add(1).ok_or_else(|| {
            DbError::constraint(format!("{} IDs are exhausted", T::ENTITY_TYPE))
        }),
    }
}

/// The runtime dataset: all stores plus any integrity violations found at
/// import. Reads go through `Deref`; writes go through [`write`], which is
/// refused while violations are unacknowledged.
///
/// [`write`]: Repositories::write
#[derive(Debug, Clone)]
pub struct Repositories {
    stores: Stores,
    violations: Vec<Violation>,
}

impl Repositories {
    /// A fresh dataset with every store ready for use.
    pub fn empty() -> Self {
        let mut stores = Stores::default();
        stores.begin_load();
        stores.finish_load();
        Self::from_loaded(stores)
    }

    /// Wrap freshly loaded stores, running the resolver over them.
    pub fn from_loaded(stores: Stores) -> Self {
        let violations = resolver::resolve(&stores);
        Self { stores, violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn integrity_error(&self) -> Option<ReferentialIntegrityError> {
        if self.violations.is_empty() {
            None
        } else {
            Some(ReferentialIntegrityError {
                violations: self.violations.clone(),
            })
        }
    }

    /// Accept the reported violations: dangling references are pruned and
    /// modification is allowed again. Returns what was acknowledged.
    pub fn acknowledge_violations(&mut self) -> DbResult<Vec<Violation>> {
        if !self.violations.is_empty() {
            resolver::prune_dangling(&mut self.stores)?;
        }
        Ok(std::mem::take(&mut self.violations))
    }

    /// Mutable access to the stores.
    pub fn write(&mut self) -> DbResult<&mut Stores> {
        if self.violations.is_empty() {
            Ok(&mut self.stores)
        } else {
            Err(DbError::IntegrityUnresolved {
                count: self.violations.len(),
            })
        }
    }

    pub fn insert_user(&mut self, user: User) -> DbResult<()> {
        check_user_id(&user.id)
            .map_err(|e| DbError::validation(format!("user id {:?}: {}", user.id, e)))?;
        self.write()?.users.insert(user)
    }

    pub fn insert_camp(&mut self, camp: Camp) -> DbResult<()> {
        self.write()?.camps.insert(camp)
    }

    pub fn delete_user(&mut self, id: &str) -> DbResult<User> {
        self.write()?.delete_user(id)
    }

    pub fn delete_camp(&mut self, name: &str) -> DbResult<Camp> {
        self.write()?.delete_camp(name)
    }

    pub fn rename_camp(&mut self, old: &str, new: &str) -> DbResult<()> {
        self.write()?.rename_camp(old, new)
    }

    pub fn delete_enquiry(&mut self, id: EnquiryId) -> DbResult<Enquiry> {
        self.write()?.delete_enquiry(id)
    }

    pub fn delete_suggestion(&mut self, id: SuggestionId) -> DbResult<Suggestion> {
        self.write()?.delete_suggestion(id)
    }

    /// Re-run every integrity check against the current data.
    pub fn check(&self) -> Vec<Violation> {
        resolver::resolve(&self.stores)
    }

    pub(crate) fn mark_saved(&mut self) {
        self.stores.mark_saved();
    }
}

impl Deref for Repositories {
    type Target = Stores;

    fn deref(&self) -> &Stores {
        &self.stores
    }
}
