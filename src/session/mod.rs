//! Session context and generation orchestration
//!
//! A session moves strictly forward:
//! Idle -> ThemeSelected -> Generating -> Complete.
//! The context owns everything that lives for one session (cached themes,
//! selected theme); nothing is kept in process-wide state.

mod orchestrator;

use std::fmt;

use chrono::NaiveDateTime;

use crate::openai::OpenAiClient;
use crate::theme::{self, Theme};
use crate::{Error, Result};

pub use orchestrator::{Orchestrator, Progress, SessionReport};

/// Smallest number of images per batch
pub const MIN_IMAGES: usize = 1;
/// Largest number of images per batch
pub const MAX_IMAGES: usize = 10;

/// Timestamp format used in folder names (second granularity)
pub const FOLDER_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ThemeSelected,
    Generating,
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::ThemeSelected => "theme-selected",
            SessionState::Generating => "generating",
            SessionState::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Folder name for a run: `<theme with spaces as underscores>_<YYYYmmdd_HHMMSS>`
pub fn folder_name(theme: &Theme, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}",
        theme.slug(),
        timestamp.format(FOLDER_TIMESTAMP_FORMAT)
    )
}

/// Check an image count against [`MIN_IMAGES`, `MAX_IMAGES`]
pub fn validate_image_count(count: usize) -> Result<usize> {
    if (MIN_IMAGES..=MAX_IMAGES).contains(&count) {
        Ok(count)
    } else {
        Err(Error::InvalidImageCount {
            count,
            min: MIN_IMAGES,
            max: MAX_IMAGES,
        })
    }
}

/// State owned by one interactive session
#[derive(Debug)]
pub struct SessionContext {
    state: SessionState,
    themes: Option<Vec<Theme>>,
    selected: Option<Theme>,
}

impl SessionContext {
    /// Start a new session in the Idle state
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            themes: None,
            selected: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selected_theme(&self) -> Option<&Theme> {
        self.selected.as_ref()
    }

    /// Cached themes, if they have been fetched
    pub fn cached_themes(&self) -> Option<&[Theme]> {
        self.themes.as_deref()
    }

    /// Themes for this session, fetched from the text API on first use
    pub async fn themes(&mut self, client: &OpenAiClient, count: usize) -> Result<&[Theme]> {
        if self.themes.is_none() {
            let fetched = theme::fetch_themes(client, count).await?;
            self.themes = Some(fetched);
        }
        Ok(self.themes.as_deref().unwrap_or_default())
    }

    /// Seed the theme cache directly
    pub fn set_themes(&mut self, themes: Vec<Theme>) {
        self.themes = Some(themes);
    }

    /// Select one of the cached themes by label
    pub fn select_theme(&mut self, label: &str) -> Result<&Theme> {
        let theme = self
            .themes
            .as_ref()
            .and_then(|themes| themes.iter().find(|t| t.as_str() == label.trim()))
            .cloned()
            .ok_or_else(|| Error::UnknownTheme(label.to_string()))?;
        self.choose(theme)
    }

    /// Select a theme that did not come from the theme list
    pub fn select_custom_theme(&mut self, theme: Theme) -> Result<&Theme> {
        self.choose(theme)
    }

    fn choose(&mut self, theme: Theme) -> Result<&Theme> {
        match self.state {
            SessionState::Idle | SessionState::ThemeSelected => {
                self.state = SessionState::ThemeSelected;
                Ok(&*self.selected.insert(theme))
            }
            state => Err(Error::InvalidTransition {
                action: "select a theme",
                state,
            }),
        }
    }

    /// The theme a run would generate for, without leaving ThemeSelected
    pub(crate) fn ready_theme(&self) -> Result<Theme> {
        match (self.state, &self.selected) {
            (SessionState::ThemeSelected, Some(theme)) => Ok(theme.clone()),
            (state, _) => Err(Error::InvalidTransition {
                action: "start generating",
                state,
            }),
        }
    }

    /// ThemeSelected -> Generating; returns the theme to generate for
    pub(crate) fn begin_generation(&mut self) -> Result<Theme> {
        let theme = self.ready_theme()?;
        self.state = SessionState::Generating;
        Ok(theme)
    }

    /// Generating -> Complete
    pub(crate) fn complete(&mut self) {
        if self.state == SessionState::Generating {
            self.state = SessionState::Complete;
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
