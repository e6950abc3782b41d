//! # corkboard-shared
//!
//! Domain types and text-safety utilities shared by every Corkboard crate.
//!
//! The [`Post`] struct is used for both top-level posts and replies (a reply
//! is a `Post` with `parent_id` set and an always-empty `replies` list).
//! Collection-level helpers enforce the invariants every consumer relies on:
//! globally unique ids, one-level nesting, and like counts that match the
//! `liked_by` set.

pub mod constants;
pub mod sanitize;
pub mod types;

pub use types::{
    find_post, find_post_mut, normalize_collection, validate_collection, MediaFile, MediaKind,
    Post, User,
};
