//! Terminal prompt helpers.
//!
//! Wraps `dialoguer` so every prompt shares one cancellation story: Ctrl-C
//! (via the installed handler) and the literal input `cancel` both resolve
//! to `None`, which the survey loop turns into the engine's `Cancel` event.

use std::sync::atomic::{AtomicBool, Ordering};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use canopysurvey::survey::Choice;
use canopysurvey::Point;

use crate::error::CliError;

static CANCELLED: AtomicBool = AtomicBool::new(false);

/// Install the Ctrl-C handler. Call once at survey start.
pub fn install_cancel_handler() {
    // Errors only if a handler is already installed; repeat surveys reuse it
    let _ = ctrlc::set_handler(|| {
        CANCELLED.store(true, Ordering::SeqCst);
    });
}

/// Whether Ctrl-C has been pressed since the handler was installed.
pub fn cancel_requested() -> bool {
    CANCELLED.load(Ordering::SeqCst)
}

/// Resolve a prompt result against the cancellation flag.
///
/// `Ok(None)` means the surveyor cancelled; errors with the flag set are
/// interrupted reads and also resolve to cancellation.
fn resolve<T>(result: Result<T, dialoguer::Error>) -> Result<Option<T>, CliError> {
    if cancel_requested() {
        return Ok(None);
    }
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(CliError::Prompt(err)),
    }
}

/// Free-text input. Empty input is allowed and returned as an empty string.
pub fn text(prompt: &str) -> Result<Option<String>, CliError> {
    let result = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text();
    match resolve(result)? {
        Some(value) if value.trim().eq_ignore_ascii_case("cancel") => Ok(None),
        other => Ok(other),
    }
}

/// Single choice from a fixed list. Returns the selected index.
pub fn select(prompt: &str, items: &[&str]) -> Result<Option<usize>, CliError> {
    let result = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact();
    resolve(result)
}

/// Three-way Yes / No / Cancel prompt, as a tagged choice.
pub fn yes_no_cancel(prompt: &str) -> Result<Choice, CliError> {
    match select(prompt, &["Yes", "No", "Cancel"])? {
        Some(0) => Ok(Choice::Yes),
        Some(1) => Ok(Choice::No),
        _ => Ok(Choice::Cancel),
    }
}

/// Plain yes/no confirmation (no cancel semantics).
pub fn confirm(prompt: &str, default: bool) -> Result<bool, CliError> {
    let result = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact();
    Ok(resolve(result)?.unwrap_or(false))
}

/// One measurement-entry step: a coordinate, `undo`, or `done`.
pub enum MeasureInput {
    Coordinate(Point),
    Undo,
    Done,
    Cancelled,
}

/// Prompt for a coordinate with `undo` / `done` keywords.
///
/// Re-prompts on unparseable input until something usable arrives.
pub fn measure_step(prompt: &str) -> Result<MeasureInput, CliError> {
    loop {
        let Some(raw) = text(prompt)? else {
            return Ok(MeasureInput::Cancelled);
        };
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("done") || trimmed.is_empty() {
            return Ok(MeasureInput::Done);
        }
        if trimmed.eq_ignore_ascii_case("undo") {
            return Ok(MeasureInput::Undo);
        }
        match parse_point(trimmed) {
            Some(point) => return Ok(MeasureInput::Coordinate(point)),
            None => {
                eprintln!("  Could not parse '{}': expected 'lat, lon'", trimmed);
            }
        }
    }
}

/// Prompt for a single coordinate, with no keywords.
pub fn point(prompt: &str) -> Result<Option<Point>, CliError> {
    loop {
        let Some(raw) = text(prompt)? else {
            return Ok(None);
        };
        match parse_point(raw.trim()) {
            Some(point) => return Ok(Some(point)),
            None => {
                eprintln!("  Could not parse '{}': expected 'lat, lon'", raw.trim());
            }
        }
    }
}

/// Parse `"lat, lon"` (comma or whitespace separated) into a point.
pub fn parse_point(input: &str) -> Option<Point> {
    let mut parts = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let lat: f64 = parts.next()?.parse().ok()?;
    let lon: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Point::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point_comma() {
        let p = parse_point("49.001, 10.002").unwrap();
        assert_eq!(p.lat, 49.001);
        assert_eq!(p.lon, 10.002);
    }

    #[test]
    fn test_parse_point_whitespace() {
        let p = parse_point("  -33.9 151.2 ").unwrap();
        assert_eq!(p.lat, -33.9);
        assert_eq!(p.lon, 151.2);
    }

    #[test]
    fn test_parse_point_rejects_garbage() {
        assert!(parse_point("").is_none());
        assert!(parse_point("49.0").is_none());
        assert!(parse_point("a, b").is_none());
        assert!(parse_point("1, 2, 3").is_none());
    }
}
