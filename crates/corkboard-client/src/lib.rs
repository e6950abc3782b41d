//! # corkboard-client
//!
//! Application core for the Corkboard discussion board: the Post Store,
//! the identity provider, backend selection, and startup wiring. The
//! presentation layer sits on top of this crate and only ever forwards
//! user intents (compose, like, delete, reply) into it.

pub mod config;
pub mod identity;
pub mod post_store;
pub mod state;

mod error;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use identity::IdentityProvider;
pub use post_store::{PostStore, SortOrder};
pub use state::{bootstrap, App};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. Call once, before [`bootstrap`].
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("corkboard_client=debug,corkboard_store=info,corkboard_media=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
