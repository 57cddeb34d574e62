//! colorbook - interactive coloring book generator

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colorbook::console::Console;
use colorbook::session::validate_image_count;
use colorbook::{Config, OpenAiClient, Orchestrator, SessionContext, Theme};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Image count suggested when none is given
const DEFAULT_IMAGE_COUNT: usize = 3;

/// Coloring book page generator
#[derive(Parser, Debug)]
#[command(
    name = "colorbook",
    version,
    about = "Generate coloring book pages and bundle them into a zip archive"
)]
struct Args {
    /// Configuration file (default: colorbook.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OpenAI API key (falls back to config, OPENAI_API_KEY, then a prompt)
    #[arg(long)]
    api_key: Option<String>,

    /// Use this theme instead of choosing from generated ones
    #[arg(short, long)]
    theme: Option<String>,

    /// Number of images to generate (1-10)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Folder for session folders and archives
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the generated themes and exit
    #[arg(long, conflicts_with = "theme")]
    list_themes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colorbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(api_key) = args.api_key {
        config.api_key = Some(api_key);
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    let stdin = io::stdin();
    let hidden = stdin.is_terminal();
    let mut console = Console::new(stdin.lock(), io::stdout()).with_hidden_input(hidden);

    let configured = config.api_key().map(str::to_string);
    match console.resolve_api_key(configured.as_deref())? {
        Some(api_key) => config.api_key = Some(api_key),
        None => return Ok(()),
    }

    let client = OpenAiClient::new(&config)?;
    let mut session = SessionContext::new();

    match args.theme {
        Some(label) => {
            session.select_custom_theme(Theme::new(label))?;
        }
        None => {
            let themes = session
                .themes(&client, config.theme_count)
                .await
                .context("Could not generate themes")?
                .to_vec();
            console.show_themes(&themes)?;
            if args.list_themes {
                return Ok(());
            }
            let chosen = console.choose_theme(&themes)?;
            session.select_theme(chosen.as_str())?;
        }
    }

    let count = match args.count {
        Some(count) => validate_image_count(count)?,
        None => console.ask_image_count(DEFAULT_IMAGE_COUNT)?,
    };
    console.cost_warning(count)?;

    if let Some(theme) = session.selected_theme() {
        console.say(&format!("Creating images based on '{}'", theme))?;
    }

    let orchestrator = Orchestrator::new(client, &config);
    let timestamp = chrono::Local::now().naive_local();
    let report = orchestrator
        .run(&mut session, count, timestamp, |progress| {
            if let Err(e) = console.progress(progress) {
                warn!("Failed to report progress: {}", e);
            }
        })
        .await
        .context("Session stopped")?;

    let stored = report.stored_images().count();
    console.say(&format!(
        "Generated {} of {} images for theme: {}",
        stored, count, report.theme
    ))?;
    console.show_images(report.stored_images())?;

    let archive_path = report.archive.save_to(orchestrator.output_dir())?;
    info!("Archive ready at {}", archive_path.display());
    console.say(&format!(
        "Download: {} ({})",
        archive_path.display(),
        report.archive.media_type()
    ))?;
    console.say(
        "Note: images are 1024x1024 pixels. For best print quality on A4 paper, \
         you may need to scale them up slightly in an image editor.",
    )?;

    Ok(())
}
