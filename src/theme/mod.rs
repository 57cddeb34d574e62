//! Coloring book themes
//!
//! Themes are short labels produced by the text API. They drive both the
//! image prompt and the session folder name.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::openai::{ChatMessage, OpenAiClient};
use crate::{Error, Result};

/// A theme label, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Theme(String);

impl Theme {
    /// Create a theme from a label; surrounding whitespace is trimmed
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label as used in folder names: spaces and path separators become underscores
    pub fn slug(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                other => other,
            })
            .collect()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prompt asking the text API for a theme list
pub fn theme_list_prompt(count: usize) -> String {
    format!(
        "Generate a list of {} suitable themes for children's coloring book pages.",
        count
    )
}

/// Prompt asking the text API for a one-line description of a theme
pub fn theme_description_prompt(theme: &Theme) -> String {
    format!(
        "Generate a simple one-liner prompt for a coloring book page based on the theme: {}",
        theme
    )
}

fn bullet_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    // "- ", "* ", "• ", "1. ", "2) "
    MARKER.get_or_init(|| Regex::new(r"^(?:[-*•]+|\d+[.)])\s*").expect("valid regex"))
}

/// Parse a free-text completion into themes, one per line
///
/// Leading bullet or numbering markers are stripped, blank lines skipped.
/// A completion with no usable line is an error rather than an empty list.
pub fn parse_theme_list(text: &str) -> Result<Vec<Theme>> {
    let themes: Vec<Theme> = text
        .lines()
        .map(str::trim)
        .map(|line| bullet_marker().replace(line, ""))
        .map(|line| line.trim().trim_matches('"').trim().to_string())
        .filter(|line| !line.is_empty())
        .map(Theme::new)
        .collect();

    if themes.is_empty() {
        return Err(Error::MalformedThemes(format!(
            "no themes in completion: {:?}",
            text
        )));
    }

    Ok(themes)
}

/// Ask the text API for candidate themes
pub async fn fetch_themes(client: &OpenAiClient, count: usize) -> Result<Vec<Theme>> {
    let prompt = theme_list_prompt(count);
    let completion = client.chat(vec![ChatMessage::user(&prompt)]).await?;
    debug!("Theme completion: {}", completion);

    let themes = parse_theme_list(&completion)?;
    info!("Received {} themes", themes.len());
    Ok(themes)
}

/// Ask the text API for a one-line description of the theme
pub async fn describe_theme(client: &OpenAiClient, theme: &Theme) -> Result<String> {
    let prompt = theme_description_prompt(theme);
    let completion = client.chat(vec![ChatMessage::user(&prompt)]).await?;
    let description = completion.trim().to_string();
    if description.is_empty() {
        return Err(Error::EmptyCompletion);
    }
    debug!("Theme description for '{}': {}", theme, description);
    Ok(description)
}
