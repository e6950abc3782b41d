/// Application name, used for the platform data directory.
pub const APP_NAME: &str = "Corkboard";

/// Key under which the full post collection is persisted.
///
/// Both backends write the same JSON array under this key so either can
/// deserialize what the other wrote.
pub const SAVED_POSTS_KEY: &str = "savedPosts";

/// Key under which the local identity record is persisted.
pub const IDENTITY_KEY: &str = "identity";

/// Maximum number of media attachments per post, enforced at creation.
pub const MAX_MEDIA_PER_POST: usize = 4;

/// File name of the SQLite record store.
pub const DB_FILE_NAME: &str = "corkboard.db";

/// URL scheme for revocable media display references.
pub const MEDIA_URL_SCHEME: &str = "media://";

/// Buffer size of the cross-process store request channel.
pub const BRIDGE_CHANNEL_CAPACITY: usize = 32;
