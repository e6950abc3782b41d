//! Domain model structs persisted in the record store.
//!
//! Every struct serializes with camelCase keys so the persisted JSON array
//! under `savedPosts` has the exact shape the UI layer consumes over IPC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A locally chosen identity: a stable generated id plus a display name.
///
/// There is no server-side verification; the author is embedded by value in
/// every post, not referenced, so deleting the identity never breaks posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    /// Create a user with a fresh generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Media classification. Anything whose mime type is not image-prefixed is
/// treated as video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Descriptor for an attached file. Only the descriptor travels with the
/// post; the bytes themselves are never persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub id: String,
    /// Serialized under the key `type` in the persisted record.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Revocable display reference (`media://{id}`), resolved through the
    /// media registry. Not an access-control token.
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// BLAKE3 digest of the content (hex), used for integrity display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A user-authored piece of content. The same struct represents replies:
/// a reply carries `parent_id` and keeps its own `replies` list empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique across the whole collection, top-level and replies alike.
    pub id: String,
    /// Already sanitized before it enters the model.
    pub text: String,
    /// Embedded snapshot of the author, not a live reference.
    pub author: User,
    /// Creation time, immutable after construction.
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<DateTime<Utc>>,
    /// Kept denormalized for display; always equals `liked_by.len()`.
    #[serde(default)]
    pub likes: u32,
    /// Set semantics: each user id appears at most once.
    #[serde(default)]
    pub liked_by: Vec<String>,
    /// Depth is exactly one level; a reply's own list is always empty.
    #[serde(default)]
    pub replies: Vec<Post>,
    /// Set only on replies; names the owning top-level post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaFile>,
    /// Transient soft-delete tombstone used by one backend's delete path.
    /// Never visible on any read path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl Post {
    /// Build a fresh top-level post. The caller is responsible for having
    /// sanitized `text` already.
    pub fn new(text: impl Into<String>, author: User, media: Vec<MediaFile>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            author,
            timestamp: Utc::now(),
            last_edited: None,
            likes: 0,
            liked_by: Vec::new(),
            replies: Vec::new(),
            parent_id: None,
            media,
            is_deleted: None,
        }
    }

    /// Build a reply attached to `parent_id`. The reply's own `replies`
    /// list starts empty and must stay empty.
    pub fn new_reply(
        parent_id: impl Into<String>,
        text: impl Into<String>,
        author: User,
        media: Vec<MediaFile>,
    ) -> Self {
        let mut post = Self::new(text, author, media);
        post.parent_id = Some(parent_id.into());
        post
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn is_tombstone(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Restore per-post invariants in place: `liked_by` deduplicated with
    /// first-occurrence order preserved, and `likes` recomputed from it.
    fn normalize_own_fields(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.liked_by.retain(|u| seen.insert(u.clone()));
        self.likes = self.liked_by.len() as u32;
        self.is_deleted = None;
    }
}

// ---------------------------------------------------------------------------
// Collection helpers
// ---------------------------------------------------------------------------

/// Check that a collection has the shape both backends agree to persist:
/// unique ids over the union of posts and replies, nesting depth exactly
/// one, and reply `parent_id`s that name their owning post.
pub fn validate_collection(posts: &[Post]) -> bool {
    let mut ids = std::collections::HashSet::new();
    for post in posts {
        if post.is_reply() || !ids.insert(post.id.as_str()) {
            return false;
        }
        for reply in &post.replies {
            if !ids.insert(reply.id.as_str()) {
                return false;
            }
            if !reply.replies.is_empty() {
                return false;
            }
            if reply.parent_id.as_deref() != Some(post.id.as_str()) {
                return false;
            }
        }
    }
    true
}

/// Repair a collection read from storage: drop tombstones, truncate nesting
/// deeper than one level, reattach reply `parent_id`s, and recompute like
/// counts. Storage contents are untrusted; accidentally or maliciously deep
/// nesting must never survive a load.
pub fn normalize_collection(posts: &mut Vec<Post>) {
    posts.retain(|p| !p.is_tombstone());
    for post in posts.iter_mut() {
        post.parent_id = None;
        post.normalize_own_fields();
        post.replies.retain(|r| !r.is_tombstone());
        for reply in post.replies.iter_mut() {
            reply.replies.clear();
            reply.parent_id = Some(post.id.clone());
            reply.normalize_own_fields();
        }
    }
}

/// Locate a post or reply by id, searching top-level entries first and then
/// one level into replies. Never searches past depth 1.
pub fn find_post<'a>(posts: &'a [Post], id: &str) -> Option<&'a Post> {
    if let Some(post) = posts.iter().find(|p| p.id == id) {
        return Some(post);
    }
    posts
        .iter()
        .flat_map(|p| p.replies.iter())
        .find(|r| r.id == id)
}

/// Mutable variant of [`find_post`], same depth-1 search order.
pub fn find_post_mut<'a>(posts: &'a mut [Post], id: &str) -> Option<&'a mut Post> {
    if posts.iter().any(|p| p.id == id) {
        return posts.iter_mut().find(|p| p.id == id);
    }
    posts
        .iter_mut()
        .flat_map(|p| p.replies.iter_mut())
        .find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: format!("user-{id}"),
        }
    }

    #[test]
    fn persisted_shape_uses_camel_case_keys() {
        let mut post = Post::new("hello", user("u1"), vec![]);
        post.liked_by.push("u2".to_string());
        post.likes = 1;
        post.media.push(MediaFile {
            id: "m1".to_string(),
            kind: MediaKind::Image,
            url: "media://m1".to_string(),
            name: "cat.png".to_string(),
            size: Some(42),
            content_hash: Some("abc".to_string()),
        });

        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("likedBy").is_some());
        assert!(json.get("liked_by").is_none());
        assert_eq!(json["media"][0]["type"], "image");
        assert!(json["media"][0].get("contentHash").is_some());
        // Top-level posts never serialize a parentId key.
        assert!(json.get("parentId").is_none());
    }

    #[test]
    fn reply_serializes_parent_id() {
        let reply = Post::new_reply("p1", "hi", user("u1"), vec![]);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["parentId"], "p1");
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut a = Post::new("a", user("u1"), vec![]);
        let b = Post::new("b", user("u1"), vec![]);
        let mut dup = b.clone();
        dup.id = a.id.clone();
        dup.parent_id = Some(b.id.clone());
        assert!(validate_collection(&[a.clone(), b.clone()]));

        a.replies.push(dup);
        // The reply under `a` claims b's parent and reuses a's id.
        assert!(!validate_collection(&[a, b]));
    }

    #[test]
    fn validate_rejects_nested_replies() {
        let mut post = Post::new("a", user("u1"), vec![]);
        let mut reply = Post::new_reply(&post.id, "r", user("u2"), vec![]);
        reply
            .replies
            .push(Post::new_reply(&reply.id, "deep", user("u3"), vec![]));
        post.replies.push(reply);
        assert!(!validate_collection(&[post]));
    }

    #[test]
    fn validate_rejects_top_level_with_parent_id() {
        let stray = Post::new_reply("nowhere", "r", user("u1"), vec![]);
        assert!(!validate_collection(&[stray]));
    }

    #[test]
    fn normalize_truncates_deep_nesting_and_fixes_likes() {
        let mut post = Post::new("a", user("u1"), vec![]);
        let mut reply = Post::new_reply(&post.id, "r", user("u2"), vec![]);
        reply
            .replies
            .push(Post::new_reply(&reply.id, "deep", user("u3"), vec![]));
        reply.liked_by = vec!["u1".into(), "u1".into(), "u2".into()];
        reply.likes = 99;
        post.replies.push(reply);

        let mut posts = vec![post];
        normalize_collection(&mut posts);

        let reply = &posts[0].replies[0];
        assert!(reply.replies.is_empty());
        assert_eq!(reply.liked_by, vec!["u1".to_string(), "u2".to_string()]);
        assert_eq!(reply.likes, 2);
    }

    #[test]
    fn normalize_drops_tombstones_at_both_levels() {
        let mut post = Post::new("a", user("u1"), vec![]);
        let mut dead_reply = Post::new_reply(&post.id, "r", user("u2"), vec![]);
        dead_reply.is_deleted = Some(true);
        post.replies.push(dead_reply);
        let mut dead_post = Post::new("b", user("u1"), vec![]);
        dead_post.is_deleted = Some(true);

        let mut posts = vec![post, dead_post];
        normalize_collection(&mut posts);

        assert_eq!(posts.len(), 1);
        assert!(posts[0].replies.is_empty());
    }

    #[test]
    fn find_post_never_searches_past_depth_one() {
        let mut post = Post::new("a", user("u1"), vec![]);
        let mut reply = Post::new_reply(&post.id, "r", user("u2"), vec![]);
        let buried = Post::new_reply(&reply.id, "deep", user("u3"), vec![]);
        let buried_id = buried.id.clone();
        reply.replies.push(buried);
        let reply_id = reply.id.clone();
        post.replies.push(reply);
        let posts = vec![post];

        assert!(find_post(&posts, &reply_id).is_some());
        assert!(find_post(&posts, &buried_id).is_none());
    }
}
