//! Survey command - interactive sampling session at the terminal.
//!
//! The engine drives: every round we feed one `SurveyEvent` into the
//! session, render the returned effects, and translate the next piece of
//! terminal input according to the phase the machine is now in. Coordinates
//! are entered as `lat, lon` pairs; `undo` and `done` are keywords during
//! the measurement phases; `cancel` or Ctrl-C cancels from anywhere.

use std::path::Path;

use console::style;
use tracing::debug;

use canopysurvey::report::AuditRecord;
use canopysurvey::survey::{Effect, SurveyEvent, SurveyPhase, SurveySession};
use canopysurvey::{EngineConfig, SurveyResult, TargetArea, VegetationKind};

use crate::error::CliError;
use crate::prompts::{self, MeasureInput};

/// Run the survey command.
pub fn run(
    polygon: &Path,
    imagery: Option<String>,
    config: EngineConfig,
) -> Result<(), CliError> {
    prompts::install_cancel_handler();

    let payload = std::fs::read_to_string(polygon)?;
    let target = TargetArea::from_geojson(&payload)?;
    println!(
        "{} {} ({}), {:.1} m2",
        style("Surveying target").bold(),
        target.id(),
        target.kind(),
        target.resolve_area()
    );

    let mut session = SurveySession::new(config);
    let mut audit: Option<Box<AuditRecord>> = None;

    let mut effects = session.handle(SurveyEvent::Invoked {
        selection: Some(target),
        imagery,
    });

    loop {
        render_effects(&effects, &mut audit);

        if session.phase().is_terminal() {
            break;
        }
        if prompts::cancel_requested() {
            effects = session.handle(SurveyEvent::Cancel);
            continue;
        }

        match next_event(&session, &effects)? {
            Some(event) => effects = session.handle(event),
            None => effects = session.handle(SurveyEvent::Cancel),
        }
    }

    if session.phase() == SurveyPhase::Complete {
        if let Some(record) = audit {
            offer_save(&record)?;
        }
    }
    Ok(())
}

/// Render one round of engine effects.
///
/// Prompt effects are skipped here; [`next_event`] consumes them when it
/// asks for the matching input.
fn render_effects(effects: &[Effect], audit: &mut Option<Box<AuditRecord>>) {
    for effect in effects {
        match effect {
            Effect::Status(message) => {
                eprintln!("{}", style(format!("· {}", message)).dim());
            }
            Effect::ShowMessage(message) => {
                println!();
                for line in message.lines() {
                    println!("  {}", line);
                }
                println!();
            }
            Effect::ShowSummary(result) => render_summary(result),
            Effect::ApplyTags(tags) => {
                println!("{}", style("Tags applied:").bold());
                for (key, value) in tags {
                    println!("  {} = {}", style(key).cyan(), value);
                }
            }
            Effect::EmitAuditRecord(record) => {
                *audit = Some(record.clone());
            }
            Effect::Aborted(err) => {
                eprintln!("{} {}", style("aborted:").red().bold(), err);
            }
            Effect::PromptImageryOverride { .. }
            | Effect::PromptMetadata
            | Effect::PromptSuggestion { .. } => {
                debug!("Prompt effect deferred to input translation");
            }
        }
    }
}

fn render_summary(result: &SurveyResult) {
    println!();
    println!("{}", style("ANALYSIS COMPLETE").bold().green());
    println!("-----------------");
    println!("Counted:      {} ({})", result.count, result.vegetation_kind);
    println!("Avg Size:     {:.1}m", result.mean_diameter_m);
    match result.mean_spacing_m {
        Some(spacing) => println!("Avg Spacing:  {:.1}m", spacing),
        None => println!("Avg Spacing:  n/a"),
    }
    println!("Est. Total:   {}", result.stem_count);
    println!(
        "Canopy:       {}% ({})",
        result.canopy_percent, result.density_class
    );
    println!();
}

/// Translate the next terminal input into an engine event, by phase.
///
/// `None` means the surveyor cancelled.
fn next_event(
    session: &SurveySession,
    effects: &[Effect],
) -> Result<Option<SurveyEvent>, CliError> {
    match session.phase() {
        SurveyPhase::ValidatingSelection => {
            let message = effects
                .iter()
                .find_map(|e| match e {
                    Effect::PromptImageryOverride { message } => Some(message.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| "No imagery layer named.".to_string());
            println!();
            for line in message.lines() {
                println!("  {}", style(line).yellow());
            }
            let choice = prompts::yes_no_cancel("Proceed without imagery?")?;
            Ok(Some(SurveyEvent::ImageryOverride(choice)))
        }

        SurveyPhase::AwaitingMetadata => {
            let Some(date) = prompts::text("Imagery date (YYYY-MM-DD, empty if unknown)")? else {
                return Ok(None);
            };
            let imagery_date = {
                let trimmed = date.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            };

            const KINDS: [VegetationKind; 3] = [
                VegetationKind::Trees,
                VegetationKind::Bushes,
                VegetationKind::Heathland,
            ];
            let Some(index) = prompts::select(
                "What are you counting?",
                &["Trees", "Bushes", "Heathland Plants"],
            )?
            else {
                return Ok(None);
            };

            Ok(Some(SurveyEvent::MetadataProvided {
                imagery_date,
                kind: KINDS[index],
            }))
        }

        SurveyPhase::DrawingSampleBox => {
            println!(
                "  Define the sample box by its two opposite corners.\n  \
                 Corners snap to the 0.5 m grid."
            );
            let Some(anchor) = prompts::point("Box corner 1 (lat, lon)")? else {
                return Ok(None);
            };
            let Some(opposite) = prompts::point("Box corner 2 (lat, lon)")? else {
                return Ok(None);
            };
            Ok(Some(SurveyEvent::BoxDragged { anchor, opposite }))
        }

        SurveyPhase::CalibratingDiameter => {
            match prompts::measure_step("Diameter start (lat, lon), 'undo', or 'done'")? {
                MeasureInput::Coordinate(start) => {
                    let Some(end) = prompts::point("Diameter end (lat, lon)")? else {
                        return Ok(None);
                    };
                    Ok(Some(SurveyEvent::DiameterDragged { start, end }))
                }
                MeasureInput::Undo => Ok(Some(SurveyEvent::Undo)),
                MeasureInput::Done => Ok(Some(SurveyEvent::Confirm)),
                MeasureInput::Cancelled => Ok(None),
            }
        }

        SurveyPhase::Counting => {
            match prompts::measure_step("Item location (lat, lon), 'undo', or 'done'")? {
                MeasureInput::Coordinate(location) => {
                    Ok(Some(SurveyEvent::ItemClicked { location }))
                }
                MeasureInput::Undo => Ok(Some(SurveyEvent::Undo)),
                MeasureInput::Done => Ok(Some(SurveyEvent::Confirm)),
                MeasureInput::Cancelled => Ok(None),
            }
        }

        SurveyPhase::Finalizing => {
            let message = effects
                .iter()
                .find_map(|e| match e {
                    Effect::PromptSuggestion { message, .. } => Some(message.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| "Apply the suggested tag change?".to_string());
            println!();
            for line in message.lines() {
                println!("  {}", line);
            }
            let choice = prompts::yes_no_cancel("Apply suggestion?")?;
            Ok(Some(SurveyEvent::SuggestionAnswered(choice)))
        }

        // Terminal phases and Idle never reach input translation
        _ => Ok(None),
    }
}

/// Offer to write the audit record next to the working directory.
fn offer_save(record: &AuditRecord) -> Result<(), CliError> {
    if !prompts::confirm("Save survey log to a text file?", true)? {
        return Ok(());
    }

    let now = chrono::Local::now();
    let default_name = record.default_filename(now);
    let Some(name) = prompts::text(&format!("Filename [{}]", default_name))? else {
        return Ok(());
    };
    let name = if name.trim().is_empty() {
        default_name
    } else {
        name.trim().to_string()
    };

    std::fs::write(&name, record.render(now))?;
    println!("Survey log written to {}", style(&name).green());
    Ok(())
}
