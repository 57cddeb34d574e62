//! Image storage and packaging
//!
//! Provides:
//! - Downloading generated images into a session folder
//! - Zipping a session folder into a downloadable archive

mod archive;
mod fetch;

use std::path::PathBuf;

pub use archive::{build_archive, Archive, ARCHIVE_MEDIA_TYPE};
pub use fetch::fetch_and_store;

/// File name for the image at a 1-based position
pub fn image_file_name(index: usize) -> String {
    format!("generated_image_{}.png", index)
}

/// An image persisted to the session folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// 1-based position in request order
    pub index: usize,
    pub path: PathBuf,
}

/// Result of one generation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Stored(StoredImage),
    /// Nothing was written for this index
    Absent { reason: String },
}

/// One attempt in a batch, kept in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttempt {
    pub index: usize,
    pub outcome: AttemptOutcome,
}

impl ImageAttempt {
    pub fn stored(image: StoredImage) -> Self {
        Self {
            index: image.index,
            outcome: AttemptOutcome::Stored(image),
        }
    }

    pub fn absent(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            outcome: AttemptOutcome::Absent {
                reason: reason.into(),
            },
        }
    }

    pub fn stored_image(&self) -> Option<&StoredImage> {
        match &self.outcome {
            AttemptOutcome::Stored(image) => Some(image),
            AttemptOutcome::Absent { .. } => None,
        }
    }

    pub fn is_stored(&self) -> bool {
        self.stored_image().is_some()
    }
}
