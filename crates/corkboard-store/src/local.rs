//! Same-process storage backend.
//!
//! [`LocalStore`] owns the SQLite record store directly and trusts its
//! callers to have sanitized text already (the Post Store sanitizes before
//! anything reaches a backend). Stored data is still normalized on every
//! read, so tombstones and malformed nesting never escape.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use corkboard_shared::constants::SAVED_POSTS_KEY;
use corkboard_shared::{find_post_mut, normalize_collection, validate_collection, Post};

use crate::backend::StorageBackend;
use crate::database::Database;
use crate::error::{Result, StoreError};

/// Storage backend over a same-process [`Database`].
pub struct LocalStore {
    db: Mutex<Database>,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// A poisoned lock still yields a usable connection.
    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Raw persisted collection, tombstones and all.
    fn load_raw(db: &Database) -> Result<Vec<Post>> {
        Ok(db.get_record(SAVED_POSTS_KEY)?.unwrap_or_default())
    }

    /// Persisted collection with tombstones dropped and invariants
    /// restored.
    fn load_visible(db: &Database) -> Result<Vec<Post>> {
        let mut posts = Self::load_raw(db)?;
        normalize_collection(&mut posts);
        Ok(posts)
    }

    /// Soft-delete variant used by the bridge host: the tombstoned
    /// collection is persisted before filtering, so another process
    /// watching the raw record sees a marker rather than a silent
    /// disappearance. The filtered collection is what callers get back.
    pub(crate) fn delete_by_id_soft(&self, id: &str) -> Result<Vec<Post>> {
        let db = self.db();
        let mut posts = Self::load_raw(&db)?;

        let mut marked = false;
        if let Some(post) = posts.iter_mut().find(|p| p.id == id) {
            post.is_deleted = Some(true);
            for reply in post.replies.iter_mut() {
                reply.is_deleted = Some(true);
            }
            marked = true;
        } else {
            for post in posts.iter_mut() {
                if let Some(reply) = post.replies.iter_mut().find(|r| r.id == id) {
                    reply.is_deleted = Some(true);
                    marked = true;
                    break;
                }
            }
        }

        if marked {
            db.set_record(SAVED_POSTS_KEY, &posts)?;
            tracing::debug!(%id, "post tombstoned");
        }

        normalize_collection(&mut posts);
        Ok(posts)
    }
}

#[async_trait]
impl StorageBackend for LocalStore {
    async fn get_all(&self) -> Result<Vec<Post>> {
        let db = self.db();
        Self::load_visible(&db)
    }

    async fn save_all(&self, posts: &[Post]) -> Result<bool> {
        if !validate_collection(posts) {
            tracing::warn!(count = posts.len(), "rejecting malformed collection");
            return Ok(false);
        }
        let db = self.db();
        db.set_record(SAVED_POSTS_KEY, &posts)?;
        tracing::debug!(count = posts.len(), "collection saved");
        Ok(true)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Vec<Post>> {
        let db = self.db();
        let mut posts = Self::load_visible(&db)?;

        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            for post in posts.iter_mut() {
                post.replies.retain(|r| r.id != id);
            }
        }

        db.set_record(SAVED_POSTS_KEY, &posts)?;
        Ok(posts)
    }

    async fn like_by_id(&self, id: &str, user_id: &str) -> Result<()> {
        let db = self.db();
        let mut posts = Self::load_visible(&db)?;

        // Absent ids and repeat likes are both no-ops.
        if let Some(post) = find_post_mut(&mut posts, id) {
            if !post.liked_by.iter().any(|u| u == user_id) {
                post.liked_by.push(user_id.to_string());
                post.likes = post.liked_by.len() as u32;
                db.set_record(SAVED_POSTS_KEY, &posts)?;
            }
        }
        Ok(())
    }

    async fn add_reply(&self, parent_id: &str, reply: &Post) -> Result<()> {
        let db = self.db();
        let mut posts = Self::load_visible(&db)?;

        if corkboard_shared::find_post(&posts, &reply.id).is_some() {
            return Err(StoreError::InvalidPayload(format!(
                "reply id {} already exists",
                reply.id
            )));
        }

        let parent = posts
            .iter_mut()
            .find(|p| p.id == parent_id)
            .ok_or(StoreError::NotFound)?;

        let mut reply = reply.clone();
        reply.replies.clear();
        reply.parent_id = Some(parent.id.clone());
        parent.replies.push(reply);

        db.set_record(SAVED_POSTS_KEY, &posts)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corkboard_shared::User;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, LocalStore::new(db))
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
        }
    }

    #[tokio::test]
    async fn get_all_on_empty_store_returns_empty() {
        let (_dir, store) = store();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_all_rejects_malformed_input_and_keeps_previous_state() {
        let (_dir, store) = store();
        let good = vec![Post::new("hello", user("u1"), vec![])];
        assert!(store.save_all(&good).await.unwrap());

        let mut bad = good.clone();
        bad.push(bad[0].clone()); // duplicate id
        assert!(!store.save_all(&bad).await.unwrap());

        assert_eq!(store.get_all().await.unwrap(), good);
    }

    #[tokio::test]
    async fn delete_cascades_and_is_idempotent() {
        let (_dir, store) = store();
        let mut post = Post::new("top", user("u1"), vec![]);
        let reply = Post::new_reply(&post.id, "re", user("u2"), vec![]);
        let reply_id = reply.id.clone();
        post.replies.push(reply);
        store.save_all(&[post.clone()]).await.unwrap();

        let remaining = store.delete_by_id(&post.id).await.unwrap();
        assert!(remaining.is_empty());
        assert!(corkboard_shared::find_post(&remaining, &reply_id).is_none());

        // Deleting an absent id leaves the collection unchanged.
        let remaining = store.delete_by_id(&post.id).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_reply_keeps_the_parent() {
        let (_dir, store) = store();
        let mut post = Post::new("top", user("u1"), vec![]);
        let reply = Post::new_reply(&post.id, "re", user("u2"), vec![]);
        let reply_id = reply.id.clone();
        post.replies.push(reply);
        store.save_all(&[post.clone()]).await.unwrap();

        let remaining = store.delete_by_id(&reply_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].replies.is_empty());
    }

    #[tokio::test]
    async fn like_is_idempotent_per_user() {
        let (_dir, store) = store();
        let post = Post::new("top", user("u1"), vec![]);
        store.save_all(&[post.clone()]).await.unwrap();

        store.like_by_id(&post.id, "u2").await.unwrap();
        store.like_by_id(&post.id, "u2").await.unwrap();

        let posts = store.get_all().await.unwrap();
        assert_eq!(posts[0].liked_by, vec!["u2".to_string()]);
        assert_eq!(posts[0].likes, 1);

        // Absent id is a no-op, not an error.
        store.like_by_id("missing", "u2").await.unwrap();
    }

    #[tokio::test]
    async fn add_reply_to_missing_parent_fails() {
        let (_dir, store) = store();
        let reply = Post::new_reply("nope", "re", user("u2"), vec![]);
        let err = store.add_reply("nope", &reply).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn maliciously_deep_storage_is_truncated_on_read() {
        let (_dir, store) = store();
        let mut post = Post::new("top", user("u1"), vec![]);
        let mut reply = Post::new_reply(&post.id, "re", user("u2"), vec![]);
        reply
            .replies
            .push(Post::new_reply(&reply.id, "deep", user("u3"), vec![]));
        post.replies.push(reply);

        // Bypass save_all validation by writing the raw record directly.
        store.db().set_record(SAVED_POSTS_KEY, &vec![post]).unwrap();

        let posts = store.get_all().await.unwrap();
        assert!(posts[0].replies[0].replies.is_empty());
    }

    #[tokio::test]
    async fn soft_delete_persists_a_tombstone_before_filtering() {
        let (_dir, store) = store();
        let post = Post::new("top", user("u1"), vec![]);
        store.save_all(&[post.clone()]).await.unwrap();

        let remaining = store.delete_by_id_soft(&post.id).unwrap();
        assert!(remaining.is_empty());

        // The raw record keeps the marker until the next full save; the
        // visible read path never shows it.
        let raw: Vec<Post> = store
            .db()
            .get_record(SAVED_POSTS_KEY)
            .unwrap()
            .unwrap_or_default();
        assert_eq!(raw.len(), 1);
        assert!(raw[0].is_tombstone());
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
