//! colorbook - coloring book page generator
//!
//! Asks a text API for themes, asks an image API for black-and-white line
//! art on the chosen theme, saves the pages into a session folder and zips
//! them for download.

pub mod config;
pub mod console;
pub mod error;
pub mod images;
pub mod openai;
pub mod prompt;
pub mod session;
pub mod theme;

pub use config::{Config, FailurePolicy};
pub use error::{Error, Result};
pub use openai::{ImageReference, OpenAiClient};
pub use session::{Orchestrator, Progress, SessionContext, SessionReport, SessionState};
pub use theme::Theme;
