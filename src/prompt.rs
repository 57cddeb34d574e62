//! Image prompt composition
//!
//! Fixed style directives keep pages visually consistent across themes:
//! monochrome line art, bold outlines, simple shapes, safe to print on A4.

use crate::theme::Theme;

/// Opening directive: medium and audience
pub const STYLE_MEDIUM: &str =
    "Create a black and white line drawing suitable for a children's coloring book page.";

/// Composition directive
pub const STYLE_COMPOSITION: &str =
    "The image should feature a simple, cute cartoon-style in a balanced composition.";

/// Print-safety directives
pub const STYLE_PRINT: &str = "Ensure the design has clear, bold lines and simple shapes that will look good when scaled up for printing on A4 paper. Avoid intricate details that may be lost when printed.";

/// Compose the image prompt for a theme
///
/// Pure: the same theme and description always give the same prompt.
pub fn compose_prompt(theme: &Theme, description: Option<&str>) -> String {
    let subject = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => format!("The theme is '{}': {}.", theme, description),
        None => format!("The theme is '{}'.", theme),
    };

    format!(
        "{} {} {} {}",
        STYLE_MEDIUM, STYLE_COMPOSITION, subject, STYLE_PRINT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_theme_and_directives() {
        for label in ["Dinosaurs", "Under the Sea", "Robots & Rockets", "Été"] {
            let prompt = compose_prompt(&Theme::new(label), None);
            assert!(prompt.contains(label));
            assert!(prompt.contains("black and white line drawing"));
            assert!(prompt.contains("bold lines"));
            assert!(prompt.contains("A4 paper"));
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let theme = Theme::new("Farm Animals");
        assert_eq!(compose_prompt(&theme, None), compose_prompt(&theme, None));
    }

    #[test]
    fn test_prompt_with_description() {
        let prompt = compose_prompt(&Theme::new("Space"), Some("A rocket waving at the moon"));
        assert!(prompt.contains("The theme is 'Space': A rocket waving at the moon."));
    }

    #[test]
    fn test_blank_description_ignored() {
        let theme = Theme::new("Space");
        assert_eq!(
            compose_prompt(&theme, Some("   ")),
            compose_prompt(&theme, None)
        );
    }
}
