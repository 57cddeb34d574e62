//! Error types for the generation pipeline

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised by the pipeline
///
/// Transport and write failures while fetching a single image never surface
/// here; they are recorded as absent attempts instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no response from text API")]
    EmptyCompletion,

    #[error("malformed theme list: {0}")]
    MalformedThemes(String),

    #[error("no image generated")]
    NoImageData,

    #[error("invalid image payload: {0}")]
    InvalidImagePayload(String),

    #[error("image {index} failed: {reason}")]
    ImageFailed { index: usize, reason: String },

    #[error("image count must be between {min} and {max}, got {count}")]
    InvalidImageCount { count: usize, min: usize, max: usize },

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
