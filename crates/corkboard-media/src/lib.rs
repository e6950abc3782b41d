//! # corkboard-media
//!
//! Turns selected files into [`MediaFile`] descriptors and manages their
//! display references. Only descriptors travel with posts; the bytes stay
//! where they are, reachable through a revocable `media://` reference until
//! [`MediaBuilder::release`] is called.
//!
//! [`MediaFile`]: corkboard_shared::MediaFile

pub mod builder;

mod error;

pub use builder::{Attachments, MediaBuilder};
pub use error::{MediaError, Result};
