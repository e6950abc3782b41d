//! Cross-process storage backend.
//!
//! In the desktop packaging the record store lives in the main process and
//! the Post Store reaches it through five named request/response calls.
//! [`spawn_host`] runs the main-process side: a task that owns a
//! [`LocalStore`] and serves [`StoreRequest`]s from an mpsc channel, each
//! carrying a oneshot reply sender. [`BridgedStore`] is the near side.
//!
//! Everything crossing the channel is untrusted input: the renderer surface
//! could be compromised, so both sides re-validate argument shapes and
//! re-sanitize post text. Transport faults surface as
//! [`StoreError::BridgeClosed`], never as a fault thrown across the
//! boundary.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use corkboard_shared::constants::BRIDGE_CHANNEL_CAPACITY;
use corkboard_shared::sanitize::{detect_dangerous, resanitize};
use corkboard_shared::Post;

use crate::backend::StorageBackend;
use crate::error::{Result, StoreError};
use crate::local::LocalStore;

/// One request/response call over the bridge. Five operations, 1:1 with the
/// [`StorageBackend`] contract.
pub enum StoreRequest {
    GetAll {
        reply: oneshot::Sender<Result<Vec<Post>>>,
    },
    SaveAll {
        posts: Vec<Post>,
        reply: oneshot::Sender<Result<bool>>,
    },
    DeleteById {
        id: String,
        reply: oneshot::Sender<Result<Vec<Post>>>,
    },
    LikeById {
        id: String,
        user_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    AddReply {
        parent_id: String,
        post: Post,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Re-sanitize the text of every post and reply in place.
fn sanitize_boundary(posts: &mut [Post]) {
    for post in posts.iter_mut() {
        post.text = resanitize(&post.text).into_owned();
        for reply in post.replies.iter_mut() {
            reply.text = resanitize(&reply.text).into_owned();
        }
    }
}

/// True if any post or reply still matches an injection signature.
fn contains_dangerous(posts: &[Post]) -> bool {
    posts
        .iter()
        .any(|p| detect_dangerous(&p.text) || p.replies.iter().any(|r| detect_dangerous(&r.text)))
}

fn require_id(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidPayload(format!(
            "{what} must be a non-empty string"
        )));
    }
    Ok(())
}

/// Spawn the host task serving store requests against `store`. The host
/// stops when every sender is dropped.
pub fn spawn_host(store: LocalStore) -> mpsc::Sender<StoreRequest> {
    let (tx, mut rx) = mpsc::channel::<StoreRequest>(BRIDGE_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            match request {
                StoreRequest::GetAll { reply } => {
                    let result = store.get_all().await.map(|mut posts| {
                        sanitize_boundary(&mut posts);
                        posts
                    });
                    let _ = reply.send(result);
                }
                StoreRequest::SaveAll { mut posts, reply } => {
                    sanitize_boundary(&mut posts);
                    let result = if contains_dangerous(&posts) {
                        tracing::warn!("rejecting collection with dangerous content");
                        Ok(false)
                    } else {
                        store.save_all(&posts).await
                    };
                    let _ = reply.send(result);
                }
                StoreRequest::DeleteById { id, reply } => {
                    let result = require_id(&id, "id").and_then(|_| {
                        store.delete_by_id_soft(&id).map(|mut posts| {
                            sanitize_boundary(&mut posts);
                            posts
                        })
                    });
                    let _ = reply.send(result);
                }
                StoreRequest::LikeById { id, user_id, reply } => {
                    let result = match require_id(&id, "id")
                        .and_then(|_| require_id(&user_id, "user id"))
                    {
                        Ok(()) => store.like_by_id(&id, &user_id).await,
                        Err(e) => Err(e),
                    };
                    let _ = reply.send(result);
                }
                StoreRequest::AddReply {
                    parent_id,
                    mut post,
                    reply,
                } => {
                    post.text = resanitize(&post.text).into_owned();
                    let result = match require_id(&parent_id, "parent id") {
                        Ok(()) if detect_dangerous(&post.text) => Err(StoreError::InvalidPayload(
                            "reply contains dangerous content".to_string(),
                        )),
                        Ok(()) => store.add_reply(&parent_id, &post).await,
                        Err(e) => Err(e),
                    };
                    let _ = reply.send(result);
                }
            }
        }
        tracing::debug!("store bridge host stopped");
    });

    tx
}

/// Near side of the bridge: satisfies [`StorageBackend`] by forwarding each
/// call over the request channel and awaiting the oneshot reply.
pub struct BridgedStore {
    tx: mpsc::Sender<StoreRequest>,
}

impl BridgedStore {
    /// Wrap an already-running host.
    pub fn new(tx: mpsc::Sender<StoreRequest>) -> Self {
        Self { tx }
    }

    /// Spawn a host around `store` and connect to it.
    pub fn spawn(store: LocalStore) -> Self {
        Self::new(spawn_host(store))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> StoreRequest,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| StoreError::BridgeClosed)?;
        reply_rx.await.map_err(|_| StoreError::BridgeClosed)?
    }
}

#[async_trait]
impl StorageBackend for BridgedStore {
    async fn get_all(&self) -> Result<Vec<Post>> {
        let mut posts = self.request(|reply| StoreRequest::GetAll { reply }).await?;
        // What came back over the channel is as untrusted as what goes in.
        sanitize_boundary(&mut posts);
        Ok(posts)
    }

    async fn save_all(&self, posts: &[Post]) -> Result<bool> {
        let mut posts = posts.to_vec();
        sanitize_boundary(&mut posts);
        if contains_dangerous(&posts) {
            return Ok(false);
        }
        self.request(|reply| StoreRequest::SaveAll { posts, reply })
            .await
    }

    async fn delete_by_id(&self, id: &str) -> Result<Vec<Post>> {
        require_id(id, "id")?;
        let id = id.to_string();
        let mut posts = self
            .request(|reply| StoreRequest::DeleteById { id, reply })
            .await?;
        sanitize_boundary(&mut posts);
        Ok(posts)
    }

    async fn like_by_id(&self, id: &str, user_id: &str) -> Result<()> {
        require_id(id, "id")?;
        require_id(user_id, "user id")?;
        let (id, user_id) = (id.to_string(), user_id.to_string());
        self.request(|reply| StoreRequest::LikeById { id, user_id, reply })
            .await
    }

    async fn add_reply(&self, parent_id: &str, reply_post: &Post) -> Result<()> {
        require_id(parent_id, "parent id")?;
        let mut post = reply_post.clone();
        post.text = resanitize(&post.text).into_owned();
        if detect_dangerous(&post.text) {
            return Err(StoreError::InvalidPayload(
                "reply contains dangerous content".to_string(),
            ));
        }
        let parent_id = parent_id.to_string();
        self.request(|reply| StoreRequest::AddReply {
            parent_id,
            post,
            reply,
        })
        .await
    }
}
