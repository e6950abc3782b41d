//! # corkboard-store
//!
//! Persistence for the Corkboard application: two interchangeable backends
//! behind the [`StorageBackend`] trait.
//!
//! [`LocalStore`] keeps the post collection in a same-process SQLite record
//! store. [`BridgedStore`] reaches the same record store across a process
//! boundary through a request/response command channel, treating everything
//! that crosses the channel as untrusted input. Both persist one JSON array
//! of posts under the `savedPosts` key and are observably identical to
//! callers.

pub mod backend;
pub mod bridge;
pub mod database;
pub mod local;
pub mod migrations;

mod error;

pub use backend::{open_backend, BackendKind, StorageBackend};
pub use bridge::{spawn_host, BridgedStore, StoreRequest};
pub use database::Database;
pub use error::{Result, StoreError};
pub use local::LocalStore;
