//! The storage backend contract both implementations satisfy.
//!
//! The Post Store is handed a `Box<dyn StorageBackend>` chosen once at
//! startup and never branches on which implementation is behind it.

use std::path::Path;

use async_trait::async_trait;

use corkboard_shared::Post;

use crate::bridge::BridgedStore;
use crate::database::Database;
use crate::error::Result;
use crate::local::LocalStore;

/// Persistence contract shared by the local and bridged backends.
///
/// Whatever the implementation does internally (the bridged host uses a
/// soft-delete tombstone, the local store removes directly), the observable
/// behavior of these five operations must be identical.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// The full visible collection. An empty or uninitialized store yields
    /// `Ok(vec![])`, never an error the caller must handle specially.
    async fn get_all(&self) -> Result<Vec<Post>>;

    /// Replace the persisted collection wholesale. Shape-invalid input
    /// returns `Ok(false)` and leaves the previous record untouched.
    async fn save_all(&self, posts: &[Post]) -> Result<bool>;

    /// Remove a post (cascading its replies) or a single reply, and return
    /// the remaining visible collection. Absent ids are a no-op.
    async fn delete_by_id(&self, id: &str) -> Result<Vec<Post>>;

    /// Record a like. Idempotent per `(id, user_id)` pair; absent ids are a
    /// no-op.
    async fn like_by_id(&self, id: &str, user_id: &str) -> Result<()>;

    /// Append a reply to the named top-level post.
    async fn add_reply(&self, parent_id: &str, reply: &Post) -> Result<()>;
}

/// Which backend to run against, decided once at startup and injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Same-process record store.
    Local,
    /// Record store on the far side of a request/response channel.
    Bridged,
}

/// Open the database at `path` (or the platform default when `None`) and
/// wrap it in the requested backend. For [`BackendKind::Bridged`] this also
/// spawns the host task, so a tokio runtime must be running.
pub fn open_backend(kind: BackendKind, path: Option<&Path>) -> Result<Box<dyn StorageBackend>> {
    let db = match path {
        Some(p) => Database::open_at(p)?,
        None => Database::new()?,
    };
    let local = LocalStore::new(db);

    tracing::info!(?kind, "storage backend selected");

    Ok(match kind {
        BackendKind::Local => Box::new(local),
        BackendKind::Bridged => Box::new(BridgedStore::spawn(local)),
    })
}
