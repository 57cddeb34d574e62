//! Terminal interaction
//!
//! Line-oriented prompts over any reader/writer pair so the interactive
//! flow can be driven from tests.

use std::io::{self, BufRead, Write};

use crate::images::StoredImage;
use crate::session::{Progress, MAX_IMAGES, MIN_IMAGES};
use crate::theme::Theme;

/// Line-based prompt helper
pub struct Console<R, W> {
    input: R,
    output: W,
    /// Read the API key from the terminal with echo off instead of `input`
    hidden_input: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            hidden_input: false,
        }
    }

    /// Read secrets without echo; only meaningful when stdin is a terminal
    pub fn with_hidden_input(mut self, hidden: bool) -> Self {
        self.hidden_input = hidden;
        self
    }

    /// Read one trimmed line; `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        self.read_line()
    }

    /// Ask for the API key; blank or missing input means no key
    pub fn ask_api_key(&mut self) -> io::Result<Option<String>> {
        const QUESTION: &str = "Enter your OpenAI API key: ";

        let answer = if self.hidden_input {
            write!(self.output, "{}", QUESTION)?;
            self.output.flush()?;
            Some(rpassword::read_password()?.trim().to_string())
        } else {
            self.ask(QUESTION)?
        };
        Ok(answer.filter(|key| !key.is_empty()))
    }

    /// Use the configured key, or ask for one
    ///
    /// `None` means generation stays locked: the user is told a key is
    /// required and nothing is sent upstream.
    pub fn resolve_api_key(&mut self, configured: Option<&str>) -> io::Result<Option<String>> {
        if let Some(key) = configured {
            return Ok(Some(key.to_string()));
        }
        let key = self.ask_api_key()?;
        if key.is_none() {
            writeln!(self.output, "An API key is required to generate pages.")?;
        }
        Ok(key)
    }

    /// Print the numbered theme list
    pub fn show_themes(&mut self, themes: &[Theme]) -> io::Result<()> {
        writeln!(self.output, "Available themes:")?;
        for (i, theme) in themes.iter().enumerate() {
            writeln!(self.output, "  {:>2}. {}", i + 1, theme)?;
        }
        Ok(())
    }

    /// Let the user pick a theme by number; blank input or end of input picks the first
    pub fn choose_theme<'a>(&mut self, themes: &'a [Theme]) -> io::Result<&'a Theme> {
        let Some(first) = themes.first() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no themes to choose from",
            ));
        };

        loop {
            let question = format!("Select a theme [1-{}] (default 1): ", themes.len());
            let answer = match self.ask(&question)? {
                None => return Ok(first),
                Some(answer) if answer.is_empty() => return Ok(first),
                Some(answer) => answer,
            };

            match answer.parse::<usize>() {
                Ok(n) if (1..=themes.len()).contains(&n) => return Ok(&themes[n - 1]),
                _ => writeln!(
                    self.output,
                    "Please enter a number between 1 and {}.",
                    themes.len()
                )?,
            }
        }
    }

    /// Ask how many images to generate; blank input or end of input keeps the default
    pub fn ask_image_count(&mut self, default: usize) -> io::Result<usize> {
        loop {
            let question = format!(
                "Number of images to generate [{}-{}] (default {}): ",
                MIN_IMAGES, MAX_IMAGES, default
            );
            let answer = match self.ask(&question)? {
                None => return Ok(default),
                Some(answer) if answer.is_empty() => return Ok(default),
                Some(answer) => answer,
            };

            match answer.parse::<usize>() {
                Ok(n) if (MIN_IMAGES..=MAX_IMAGES).contains(&n) => return Ok(n),
                _ => writeln!(
                    self.output,
                    "Please enter a number between {} and {}.",
                    MIN_IMAGES, MAX_IMAGES
                )?,
            }
        }
    }

    pub fn cost_warning(&mut self, count: usize) -> io::Result<()> {
        writeln!(
            self.output,
            "You've chosen to generate {} images. Generating more images increases your API usage and costs.",
            count
        )
    }

    pub fn progress(&mut self, progress: Progress) -> io::Result<()> {
        writeln!(
            self.output,
            "[{}/{}] {} ({:.0}%)",
            progress.completed,
            progress.total,
            if progress.stored { "saved" } else { "missing" },
            progress.fraction() * 100.0
        )
    }

    /// List stored images as the preview
    pub fn show_images<'a>(
        &mut self,
        images: impl IntoIterator<Item = &'a StoredImage>,
    ) -> io::Result<()> {
        for image in images {
            writeln!(self.output, "  #{}: {}", image.index, image.path.display())?;
        }
        Ok(())
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }
}
