//! Persistence and cross-reference layer for the Camp Application and
//! Management System (CAMs).

pub mod codec;
pub mod db;
pub mod service;
pub mod sync;

#[cfg(feature = "cli")]
pub mod cli;
