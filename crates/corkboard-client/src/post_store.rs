//! The post collection's single source of truth during a session.
//!
//! Every read and mutation goes through [`PostStore`]. Mutations recompute
//! the in-memory collection first and then drive the matching backend
//! operation; each backend operation rewrites the whole persisted record,
//! so there is never partial/delta state between memory and storage. When a
//! persistence call fails the operation reports it and memory may be ahead
//! of the record; the recovery path is a forced [`PostStore::load`].

use corkboard_shared::constants::MAX_MEDIA_PER_POST;
use corkboard_shared::sanitize::{detect_dangerous, sanitize};
use corkboard_shared::{find_post, find_post_mut, normalize_collection, MediaFile, Post, User};
use corkboard_store::{StorageBackend, StoreError};

use crate::error::{AppError, Result};

/// Read-time presentation orderings. The storage boundary only ever sees
/// newest-first; these never touch the persisted order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    MostLiked,
    MostReplied,
}

/// Owns the canonical in-memory collection and keeps the active backend's
/// persisted state consistent with it. Never branches on which backend is
/// behind the trait object.
pub struct PostStore {
    posts: Vec<Post>,
    backend: Box<dyn StorageBackend>,
}

impl PostStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            posts: Vec::new(),
            backend,
        }
    }

    /// Replace memory wholesale with the backend's collection. No merging:
    /// the last completed call wins.
    pub async fn load(&mut self) -> Result<()> {
        let mut posts = self.backend.get_all().await?;
        normalize_collection(&mut posts);
        tracing::debug!(count = posts.len(), "collection loaded");
        self.posts = posts;
        Ok(())
    }

    /// Validate and sanitize compose input. Dangerous content fails the
    /// operation outright; the sanitized text is what gets stored either
    /// way.
    fn prepare_text(text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("post text cannot be empty".into()));
        }
        if detect_dangerous(text) {
            return Err(AppError::Validation(
                "text matches a blocked content pattern".into(),
            ));
        }
        Ok(sanitize(text))
    }

    fn check_media(media: &[MediaFile]) -> Result<()> {
        if media.len() > MAX_MEDIA_PER_POST {
            return Err(AppError::Validation(format!(
                "a post can carry at most {MAX_MEDIA_PER_POST} media attachments"
            )));
        }
        Ok(())
    }

    /// Create a top-level post. Prepended: newest-first is the only order
    /// at the storage boundary.
    pub async fn create(
        &mut self,
        text: &str,
        author: User,
        media: Vec<MediaFile>,
    ) -> Result<Post> {
        let clean = Self::prepare_text(text)?;
        Self::check_media(&media)?;

        let post = Post::new(clean, author, media);
        self.posts.insert(0, post.clone());

        tracing::info!(id = %post.id, "post created");
        self.persist_all().await?;
        Ok(post)
    }

    /// Attach a reply to an existing top-level post. Replies are appended:
    /// their order is chronological.
    pub async fn reply(
        &mut self,
        parent_id: &str,
        text: &str,
        author: User,
        media: Vec<MediaFile>,
    ) -> Result<Post> {
        let clean = Self::prepare_text(text)?;
        Self::check_media(&media)?;

        let parent = self
            .posts
            .iter_mut()
            .find(|p| p.id == parent_id)
            .ok_or_else(|| AppError::NotFound(format!("no post with id {parent_id}")))?;

        let reply = Post::new_reply(parent_id, clean, author, media);
        parent.replies.push(reply.clone());

        tracing::info!(id = %reply.id, parent = %parent_id, "reply created");
        self.backend.add_reply(parent_id, &reply).await?;
        Ok(reply)
    }

    /// Record a like. Absent ids and repeat likes by the same user are
    /// idempotent no-ops.
    pub async fn like(&mut self, id: &str, user_id: &str) -> Result<()> {
        let Some(post) = find_post_mut(&mut self.posts, id) else {
            return Ok(());
        };
        if post.liked_by.iter().any(|u| u == user_id) {
            return Ok(());
        }
        post.liked_by.push(user_id.to_string());
        post.likes = post.liked_by.len() as u32;

        self.backend.like_by_id(id, user_id).await?;
        Ok(())
    }

    /// Remove a top-level post (with all its replies) or a single reply.
    /// Deleting an absent id is a no-op, not an error.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        if self.posts.len() == before {
            for post in self.posts.iter_mut() {
                post.replies.retain(|r| r.id != id);
            }
        }

        // Adopt whatever the backend reports as remaining, keeping memory
        // and record aligned even if they had drifted.
        let mut remaining = self.backend.delete_by_id(id).await?;
        normalize_collection(&mut remaining);
        self.posts = remaining;
        Ok(())
    }

    /// Find a post or reply, searching top-level first, then one level into
    /// replies. Never searches deeper.
    pub fn get_by_id(&self, id: &str) -> Option<&Post> {
        find_post(&self.posts, id)
    }

    /// The collection in storage order (newest-first).
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Presentation-order view. Sorts are stable, so equal keys keep their
    /// insertion order.
    pub fn sorted(&self, order: SortOrder) -> Vec<&Post> {
        let mut view: Vec<&Post> = self.posts.iter().collect();
        match order {
            SortOrder::NewestFirst => view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::OldestFirst => view.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            SortOrder::MostLiked => view.sort_by(|a, b| b.likes.cmp(&a.likes)),
            SortOrder::MostReplied => view.sort_by(|a, b| b.replies.len().cmp(&a.replies.len())),
        }
        view
    }

    async fn persist_all(&mut self) -> Result<()> {
        let saved = self.backend.save_all(&self.posts).await?;
        if !saved {
            // The backend refused the collection; memory is ahead of the
            // record until the caller re-loads.
            return Err(AppError::Storage(StoreError::InvalidPayload(
                "backend rejected the collection".into(),
            )));
        }
        Ok(())
    }
}
