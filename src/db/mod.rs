//! In-memory entity stores and referential integrity.
//!
//! # Architecture
//!
//! - `error`: Store error types
//! - `models`: Domain entities (User, Camp, Enquiry, Suggestion)
//! - `store`: Keyed store with a load/save lifecycle
//! - `repository`: Repository trait and the aggregate of all stores
//! - `resolver`: Cross-reference checks run after import
//! - `cascade`: Deletes that keep every reference resolvable

mod cascade;
mod error;
mod models;
mod repository;
mod resolver;
mod store;

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod models_test;
#[cfg(test)]
mod resolver_test;

pub use error::{DbError, DbResult};
pub use models::*;
pub use repository::{Repositories, Repository, Stores};
pub use resolver::{prune_dangling, resolve, ReferentialIntegrityError, Violation};
pub use store::{Entity, Store, StoreState};
