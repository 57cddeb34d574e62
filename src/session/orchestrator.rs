//! Batch generation for one session
//!
//! Pipeline per run:
//! 1. Optionally ask the text API to describe the theme
//! 2. Compose the image prompt
//! 3. For each index: request an image, then fetch and store it
//! 4. Zip the session folder

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use super::{folder_name, validate_image_count, SessionContext};
use crate::config::{Config, FailurePolicy};
use crate::images::{build_archive, fetch_and_store, Archive, ImageAttempt, StoredImage};
use crate::openai::OpenAiClient;
use crate::prompt::compose_prompt;
use crate::theme::{self, Theme};
use crate::{Error, Result};

/// Progress after one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Attempts finished so far, including this one
    pub completed: usize,
    pub total: usize,
    /// Whether this attempt produced a file
    pub stored: bool,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        self.completed as f32 / self.total as f32
    }
}

/// Outcome of a completed run
#[derive(Debug)]
pub struct SessionReport {
    pub theme: Theme,
    pub folder: PathBuf,
    pub prompt: String,
    /// One entry per requested index, in order
    pub attempts: Vec<ImageAttempt>,
    pub archive: Archive,
}

impl SessionReport {
    /// Images that made it to disk, in index order
    pub fn stored_images(&self) -> impl Iterator<Item = &StoredImage> {
        self.attempts.iter().filter_map(ImageAttempt::stored_image)
    }

    pub fn absent_count(&self) -> usize {
        self.attempts.iter().filter(|a| !a.is_stored()).count()
    }
}

/// Runs generation batches against the API
#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: OpenAiClient,
    output_dir: PathBuf,
    describe_theme: bool,
    failure_policy: FailurePolicy,
}

impl Orchestrator {
    pub fn new(client: OpenAiClient, config: &Config) -> Self {
        Self {
            client,
            output_dir: config.output_dir.clone(),
            describe_theme: config.describe_theme,
            failure_policy: config.failure_policy,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate `count` images for the session's selected theme
    ///
    /// Runs every index to completion; fetch failures leave gaps rather than
    /// renumbering. Under [`FailurePolicy::Abort`] an image API failure stops
    /// the batch with [`Error::ImageFailed`].
    pub async fn run<F>(
        &self,
        ctx: &mut SessionContext,
        count: usize,
        timestamp: NaiveDateTime,
        mut on_progress: F,
    ) -> Result<SessionReport>
    where
        F: FnMut(Progress),
    {
        let count = validate_image_count(count)?;

        // Nothing touches the disk or the session state until the
        // description is in hand
        let theme = ctx.ready_theme()?;
        let description = if self.describe_theme {
            Some(theme::describe_theme(&self.client, &theme).await?)
        } else {
            None
        };
        let theme = ctx.begin_generation()?;

        let name = folder_name(&theme, timestamp);
        let folder = self.output_dir.join(&name);
        if folder.exists() {
            // Same theme within the same second; files are shared
            warn!("Session folder {} already exists", folder.display());
        }
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| Error::io(&folder, e))?;

        let prompt = compose_prompt(&theme, description.as_deref());

        info!(
            "Generating {} images for theme '{}' into {}",
            count,
            theme,
            folder.display()
        );

        let mut attempts = Vec::with_capacity(count);
        for index in 1..=count {
            let attempt = match self.client.generate_image(&prompt).await {
                Ok(reference) => {
                    fetch_and_store(self.client.http(), &reference, &folder, index).await
                }
                Err(e) => match self.failure_policy {
                    FailurePolicy::Skip => {
                        warn!("Image {} not generated: {}", index, e);
                        ImageAttempt::absent(index, e.to_string())
                    }
                    FailurePolicy::Abort => {
                        return Err(Error::ImageFailed {
                            index,
                            reason: e.to_string(),
                        });
                    }
                },
            };

            let progress = Progress {
                completed: index,
                total: count,
                stored: attempt.is_stored(),
            };
            let status = if progress.stored { "stored" } else { "absent" };
            info!("Image {}/{} {}", index, count, status);
            on_progress(progress);
            attempts.push(attempt);
        }

        let archive = build_archive(&folder, format!("{}.zip", name))?;
        ctx.complete();

        let stored = attempts.iter().filter(|a| a.is_stored()).count();
        info!(
            "Session complete: {}/{} images stored, archive {}",
            stored, count, archive.file_name
        );

        Ok(SessionReport {
            theme,
            folder,
            prompt,
            attempts,
            archive,
        })
    }
}
