//! Application state assembled once at startup.
//!
//! Everything the presentation layer consumes is constructed here and
//! passed by reference, never looked up ambiently: the backend is chosen
//! from the config exactly once, the Post Store is loaded, and the pieces
//! are handed out as one [`App`] value.

use corkboard_media::MediaBuilder;
use corkboard_store::{open_backend, Database};

use crate::config::AppConfig;
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::post_store::PostStore;

/// Central application state.
pub struct App {
    /// The local identity handle.
    pub identity: IdentityProvider,
    /// Single source of truth for the post collection.
    pub posts: PostStore,
    /// Builder and registry for media display references.
    pub media: MediaBuilder,
}

/// Open the configured backend, load the collection, and hand out the
/// assembled state. For the bridged backend a tokio runtime must already be
/// running, since the host task is spawned here.
pub async fn bootstrap(config: &AppConfig) -> Result<App> {
    tracing::info!(backend = ?config.backend, "starting corkboard");

    let backend = open_backend(config.backend, config.db_path().as_deref())?;

    let mut posts = PostStore::new(backend);
    posts.load().await?;

    // The identity record lives in the same store file but is not part of
    // the bridge surface, so it gets its own connection.
    let identity_db = match config.db_path() {
        Some(path) => Database::open_at(&path)?,
        None => Database::new()?,
    };

    Ok(App {
        identity: IdentityProvider::new(identity_db),
        posts,
        media: MediaBuilder::new(),
    })
}
