//! Media descriptor construction and reference lifetimes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use corkboard_shared::constants::{MAX_MEDIA_PER_POST, MEDIA_URL_SCHEME};
use corkboard_shared::{MediaFile, MediaKind};

use crate::error::{MediaError, Result};

/// Builds [`MediaFile`] descriptors and tracks which display references are
/// still live. A released reference no longer resolves; the descriptor
/// itself stays valid wherever it was embedded.
#[derive(Default)]
pub struct MediaBuilder {
    refs: Mutex<HashMap<String, PathBuf>>,
}

impl MediaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn refs(&self) -> MutexGuard<'_, HashMap<String, PathBuf>> {
        self.refs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Build a descriptor for the file at `path`.
    ///
    /// The kind comes from the declared media type of the file name: image
    /// mime types map to [`MediaKind::Image`], everything else is treated
    /// as video. The integrity hash is a BLAKE3 digest of the bytes,
    /// falling back to a composite of name, size and modification time when
    /// the bytes cannot be read back.
    pub fn build(&self, path: &Path) -> Result<MediaFile> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| MediaError::NoFileName(path.display().to_string()))?;

        let metadata = std::fs::metadata(path)?;
        let size = metadata.len();

        let content_hash = match hash_file(path) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(%name, error = %e, "content digest unavailable, using composite");
                fallback_hash(&name, size, metadata.modified().ok())
            }
        };

        let id = Uuid::new_v4().to_string();
        let url = format!("{MEDIA_URL_SCHEME}{id}");
        self.refs().insert(id.clone(), path.to_path_buf());

        tracing::debug!(%id, %name, size, "media reference created");

        Ok(MediaFile {
            id,
            kind: classify(path),
            url,
            name,
            size: Some(size),
            content_hash: Some(content_hash),
        })
    }

    /// Resolve a live display reference back to its file. Released or
    /// foreign references yield `None`.
    pub fn resolve(&self, media: &MediaFile) -> Option<PathBuf> {
        self.refs().get(&media.id).cloned()
    }

    /// Revoke the display reference. Idempotent; never fails.
    pub fn release(&self, media: &MediaFile) {
        if self.refs().remove(&media.id).is_some() {
            tracing::debug!(id = %media.id, "media reference released");
        }
    }
}

/// Image-prefixed mime types are images; anything else (including unknown
/// types) defaults to video.
fn classify(path: &Path) -> MediaKind {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::IMAGE {
        MediaKind::Image
    } else {
        MediaKind::Video
    }
}

fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

fn fallback_hash(name: &str, size: u64, modified: Option<SystemTime>) -> String {
    let mtime_millis = modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis())
        .unwrap_or(0);
    blake3::hash(format!("{name}:{size}:{mtime_millis}").as_bytes())
        .to_hex()
        .to_string()
}

/// Compose-buffer attachment list, bounded before `create` is ever invoked.
#[derive(Default)]
pub struct Attachments {
    files: Vec<MediaFile>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attachment; the fifth one is rejected here, not downstream.
    pub fn push(&mut self, media: MediaFile) -> Result<()> {
        if self.files.len() >= MAX_MEDIA_PER_POST {
            return Err(MediaError::TooManyAttachments);
        }
        self.files.push(media);
        Ok(())
    }

    /// Remove a single attachment from the draft, releasing its reference.
    pub fn remove(&mut self, builder: &MediaBuilder, id: &str) -> Option<MediaFile> {
        let index = self.files.iter().position(|m| m.id == id)?;
        let media = self.files.remove(index);
        builder.release(&media);
        Some(media)
    }

    /// Hand the attachments over for post creation, emptying the draft.
    /// References stay live; they now belong to the created post.
    pub fn take(&mut self) -> Vec<MediaFile> {
        std::mem::take(&mut self.files)
    }

    /// Discard the draft, releasing every reference.
    pub fn clear(&mut self, builder: &MediaBuilder) {
        for media in self.files.drain(..) {
            builder.release(&media);
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[MediaFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn classifies_images_and_defaults_to_video() {
        let dir = tempfile::tempdir().unwrap();
        let builder = MediaBuilder::new();

        let png = builder
            .build(&write_file(dir.path(), "cat.png", b"png bytes"))
            .unwrap();
        assert_eq!(png.kind, MediaKind::Image);

        let mp4 = builder
            .build(&write_file(dir.path(), "clip.mp4", b"mp4 bytes"))
            .unwrap();
        assert_eq!(mp4.kind, MediaKind::Video);

        let unknown = builder
            .build(&write_file(dir.path(), "blob.xyz", b"???"))
            .unwrap();
        assert_eq!(unknown.kind, MediaKind::Video);
    }

    #[test]
    fn hash_is_content_derived() {
        let dir = tempfile::tempdir().unwrap();
        let builder = MediaBuilder::new();

        let a = builder
            .build(&write_file(dir.path(), "a.png", b"same bytes"))
            .unwrap();
        let b = builder
            .build(&write_file(dir.path(), "b.png", b"same bytes"))
            .unwrap();
        let c = builder
            .build(&write_file(dir.path(), "c.png", b"other bytes"))
            .unwrap();

        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
        assert_eq!(a.size, Some(10));
    }

    #[test]
    fn released_references_stop_resolving() {
        let dir = tempfile::tempdir().unwrap();
        let builder = MediaBuilder::new();
        let media = builder
            .build(&write_file(dir.path(), "cat.png", b"bytes"))
            .unwrap();

        assert!(media.url.starts_with("media://"));
        assert!(builder.resolve(&media).is_some());

        builder.release(&media);
        assert!(builder.resolve(&media).is_none());
        // Releasing again is a no-op.
        builder.release(&media);
    }

    #[test]
    fn missing_file_is_an_error() {
        let builder = MediaBuilder::new();
        let err = builder.build(Path::new("/no/such/file.png")).unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
    }

    #[test]
    fn attachments_reject_the_fifth_file() {
        let dir = tempfile::tempdir().unwrap();
        let builder = MediaBuilder::new();
        let mut draft = Attachments::new();

        for i in 0..4 {
            let media = builder
                .build(&write_file(dir.path(), &format!("img{i}.png"), b"x"))
                .unwrap();
            draft.push(media).unwrap();
        }
        assert_eq!(draft.len(), 4);

        let fifth = builder
            .build(&write_file(dir.path(), "img5.png", b"x"))
            .unwrap();
        assert!(matches!(
            draft.push(fifth).unwrap_err(),
            MediaError::TooManyAttachments
        ));
    }

    #[test]
    fn clearing_a_draft_releases_every_reference() {
        let dir = tempfile::tempdir().unwrap();
        let builder = MediaBuilder::new();
        let mut draft = Attachments::new();

        let a = builder
            .build(&write_file(dir.path(), "a.png", b"x"))
            .unwrap();
        let b = builder
            .build(&write_file(dir.path(), "b.png", b"x"))
            .unwrap();
        draft.push(a.clone()).unwrap();
        draft.push(b.clone()).unwrap();

        draft.clear(&builder);
        assert!(draft.is_empty());
        assert!(builder.resolve(&a).is_none());
        assert!(builder.resolve(&b).is_none());
    }
}
