//! The survey session state machine.

use tracing::{debug, info, warn};

use super::events::{Choice, Effect, SurveyError, SurveyEvent};
use super::phase::SurveyPhase;
use crate::area::TargetArea;
use crate::calibration::{CalibrationError, CalibrationTracker};
use crate::config::EngineConfig;
use crate::counting::{CountingError, CountingTracker};
use crate::extrapolate::{self, SurveyResult, VegetationKind};
use crate::geom::Point;
use crate::report::{AuditRecord, SuggestionOutcome};
use crate::sample::SampleBox;
use crate::suggest::{self, PrimaryCategory, Suggestion};
use crate::tags::{render_tags, SurveyMetadata};

/// One in-progress survey.
///
/// The session owns every piece of intermediate state (target snapshot,
/// sample box, both trackers, the computed result) and is driven entirely
/// through [`handle`](Self::handle). Nothing leaves the session until a
/// successful finalize emits [`Effect::ApplyTags`]; cancelling at any point
/// is therefore a pure no-op with respect to the host.
#[derive(Debug)]
pub struct SurveySession {
    config: EngineConfig,
    phase: SurveyPhase,
    target: Option<TargetArea>,
    imagery_source: Option<String>,
    metadata: Option<SurveyMetadata>,
    vegetation_kind: Option<VegetationKind>,
    sample_box: Option<SampleBox>,
    calibration: CalibrationTracker,
    counting: CountingTracker,
    mean_diameter_m: Option<f64>,
    result: Option<SurveyResult>,
    pending_suggestion: Option<(&'static str, &'static str)>,
}

impl SurveySession {
    /// Create a fresh session in [`SurveyPhase::Idle`].
    pub fn new(config: EngineConfig) -> Self {
        Self {
            calibration: CalibrationTracker::new(config.sampling.min_drag_m),
            counting: CountingTracker::new(),
            config,
            phase: SurveyPhase::Idle,
            target: None,
            imagery_source: None,
            metadata: None,
            vegetation_kind: None,
            sample_box: None,
            mean_diameter_m: None,
            result: None,
            pending_suggestion: None,
        }
    }

    /// Create a session with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// The current phase.
    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    /// The committed sample box, once one exists.
    pub fn sample_box(&self) -> Option<&SampleBox> {
        self.sample_box.as_ref()
    }

    /// The computed result, once finalize has run.
    pub fn result(&self) -> Option<&SurveyResult> {
        self.result.as_ref()
    }

    /// Feed one input event through the machine.
    ///
    /// Each call runs to completion before the next is processed; events
    /// that make no sense in the current phase are ignored. The returned
    /// effects are descriptors for the host adapter: the engine itself
    /// touches nothing.
    pub fn handle(&mut self, event: SurveyEvent) -> Vec<Effect> {
        if self.phase.is_terminal() {
            debug!(phase = %self.phase, "Event after terminal phase ignored");
            return Vec::new();
        }
        if let SurveyEvent::Cancel = event {
            return self.cancel();
        }

        match self.phase {
            SurveyPhase::Idle => match event {
                SurveyEvent::Invoked { selection, imagery } => self.on_invoked(selection, imagery),
                _ => self.ignore(&event),
            },
            SurveyPhase::ValidatingSelection => match event {
                SurveyEvent::ImageryOverride(choice) => self.on_imagery_override(choice),
                _ => self.ignore(&event),
            },
            SurveyPhase::AwaitingMetadata => match event {
                SurveyEvent::MetadataProvided { imagery_date, kind } => {
                    self.on_metadata(imagery_date, kind)
                }
                _ => self.ignore(&event),
            },
            SurveyPhase::DrawingSampleBox => match event {
                SurveyEvent::BoxDragged { anchor, opposite } => self.on_box_drag(anchor, opposite),
                _ => self.ignore(&event),
            },
            SurveyPhase::CalibratingDiameter => match event {
                SurveyEvent::DiameterDragged { start, end } => self.on_diameter_drag(start, end),
                SurveyEvent::Undo => self.on_calibration_undo(),
                SurveyEvent::Confirm => self.on_calibration_confirm(),
                _ => self.ignore(&event),
            },
            SurveyPhase::Counting => match event {
                SurveyEvent::ItemClicked { location } => self.on_item_click(location),
                SurveyEvent::Undo => self.on_counting_undo(),
                SurveyEvent::Confirm => self.on_counting_confirm(),
                _ => self.ignore(&event),
            },
            SurveyPhase::Finalizing => match event {
                SurveyEvent::SuggestionAnswered(choice) => self.on_suggestion_answer(choice),
                _ => self.ignore(&event),
            },
            SurveyPhase::Complete | SurveyPhase::Cancelled => Vec::new(),
        }
    }

    fn set_phase(&mut self, next: SurveyPhase) {
        info!(from = %self.phase, to = %next, "Survey phase transition");
        self.phase = next;
    }

    fn ignore(&self, event: &SurveyEvent) -> Vec<Effect> {
        debug!(phase = %self.phase, ?event, "Unrelated event ignored");
        Vec::new()
    }

    fn cancel(&mut self) -> Vec<Effect> {
        // Computed results die with the survey; nothing reached the host
        self.result = None;
        self.pending_suggestion = None;
        self.set_phase(SurveyPhase::Cancelled);
        vec![Effect::Status(
            "Survey cancelled: no changes made".to_string(),
        )]
    }

    fn singular(&self) -> &'static str {
        self.vegetation_kind
            .map(|k| k.singular())
            .unwrap_or("individual")
    }

    fn on_invoked(
        &mut self,
        selection: Option<TargetArea>,
        imagery: Option<String>,
    ) -> Vec<Effect> {
        let Some(target) = selection else {
            self.set_phase(SurveyPhase::Cancelled);
            return vec![
                Effect::Aborted(SurveyError::InvalidSelection),
                Effect::ShowMessage("Select the main area polygon first.".to_string()),
            ];
        };

        debug!(
            target_id = target.id(),
            area_m2 = format!("{:.1}", target.resolve_area()),
            "Selection accepted"
        );
        self.target = Some(target);

        match imagery {
            Some(name) => {
                self.imagery_source = Some(name);
                self.set_phase(SurveyPhase::AwaitingMetadata);
                vec![Effect::PromptMetadata]
            }
            None => {
                self.set_phase(SurveyPhase::ValidatingSelection);
                vec![Effect::PromptImageryOverride {
                    message: "No active imagery layer detected!\n\nAccurate density estimation \
                              requires visible satellite imagery.\nDo you want to proceed anyway?"
                        .to_string(),
                }]
            }
        }
    }

    fn on_imagery_override(&mut self, choice: Choice) -> Vec<Effect> {
        match choice {
            Choice::Yes => {
                warn!("Proceeding without visible imagery");
                self.imagery_source = Some("Unknown Source".to_string());
                self.set_phase(SurveyPhase::AwaitingMetadata);
                vec![Effect::PromptMetadata]
            }
            Choice::No | Choice::Cancel => {
                self.set_phase(SurveyPhase::Cancelled);
                vec![Effect::Aborted(SurveyError::NoImagery)]
            }
        }
    }

    fn on_metadata(&mut self, imagery_date: Option<String>, kind: VegetationKind) -> Vec<Effect> {
        let source = self
            .imagery_source
            .clone()
            .unwrap_or_else(|| "Unknown Source".to_string());
        self.metadata = Some(SurveyMetadata::new(source, imagery_date.as_deref()));
        self.vegetation_kind = Some(kind);

        self.set_phase(SurveyPhase::DrawingSampleBox);
        vec![Effect::Status(
            "Drag to draw the sample box".to_string(),
        )]
    }

    fn on_box_drag(&mut self, anchor: Point, opposite: Point) -> Vec<Effect> {
        match SampleBox::from_drag(anchor, opposite, &self.config.sampling) {
            Err(err) => {
                debug!(%err, "Degenerate sample box rejected");
                vec![Effect::ShowMessage(
                    "Area too small. Please drag to create a box.".to_string(),
                )]
            }
            Ok(sample_box) => {
                let singular = self.singular();
                let help = format!(
                    "Box: {}.\nNext: Measure average {} diameter.\n\n\
                     1. Drag from one edge of a {} to the other.\n\
                     2. Repeat a few times to improve accuracy.\n\
                     3. Undo removes the last measurement.",
                    sample_box, singular, singular
                );
                self.sample_box = Some(sample_box);
                self.set_phase(SurveyPhase::CalibratingDiameter);
                vec![
                    Effect::ShowMessage(help),
                    Effect::Status(format!("Measure diameter of each {} (drag)", singular)),
                ]
            }
        }
    }

    fn on_diameter_drag(&mut self, start: Point, end: Point) -> Vec<Effect> {
        match self.calibration.add_measurement(start, end) {
            Ok(mean) => vec![Effect::Status(format!(
                "Avg: {:.1}m (n={}) | confirm to start counting",
                mean,
                self.calibration.len()
            ))],
            Err(CalibrationError::MeasurementTooShort { .. }) => {
                // Accidental micro-click; nothing changes
                Vec::new()
            }
            Err(err) => {
                warn!(%err, "Calibration measurement rejected");
                Vec::new()
            }
        }
    }

    fn on_calibration_undo(&mut self) -> Vec<Effect> {
        match self.calibration.undo_last() {
            Some(mean) => vec![Effect::Status(format!(
                "Avg: {:.1}m (n={})",
                mean,
                self.calibration.len()
            ))],
            None => vec![Effect::Status(format!(
                "Measure diameter of each {} (drag)",
                self.singular()
            ))],
        }
    }

    fn on_calibration_confirm(&mut self) -> Vec<Effect> {
        match self.calibration.finalize() {
            Err(CalibrationError::InsufficientData) | Err(CalibrationError::Frozen) => {
                vec![
                    Effect::ShowMessage(
                        "Measure at least one diameter before continuing.".to_string(),
                    ),
                    Effect::Status(format!(
                        "Measure diameter of each {} (drag)",
                        self.singular()
                    )),
                ]
            }
            Err(err) => {
                warn!(%err, "Unexpected calibration error");
                Vec::new()
            }
            Ok(mean) => {
                self.mean_diameter_m = Some(mean);
                self.set_phase(SurveyPhase::Counting);
                vec![
                    Effect::ShowMessage(format!(
                        "Now mark every {} inside the box.",
                        self.singular()
                    )),
                    Effect::Status("Count: 0 | confirm to finish".to_string()),
                ]
            }
        }
    }

    fn on_item_click(&mut self, location: Point) -> Vec<Effect> {
        let Some(sample_box) = self.sample_box.as_ref() else {
            warn!("Counting without a sample box");
            return Vec::new();
        };
        match self.counting.add_item(location, sample_box) {
            Ok(count) => vec![Effect::Status(format!(
                "Count: {} | confirm to finish",
                count
            ))],
            Err(CountingError::OutOfBounds) => vec![Effect::Status(
                "Outside the sample box: click ignored".to_string(),
            )],
            Err(err) => {
                warn!(%err, "Count rejected");
                Vec::new()
            }
        }
    }

    fn on_counting_undo(&mut self) -> Vec<Effect> {
        let count = self.counting.undo_last();
        vec![Effect::Status(format!(
            "Count: {} | confirm to finish",
            count
        ))]
    }

    fn on_counting_confirm(&mut self) -> Vec<Effect> {
        self.set_phase(SurveyPhase::Finalizing);
        self.counting.finalize();

        let (Some(target), Some(sample_box), Some(mean_diameter), Some(kind)) = (
            self.target.as_ref(),
            self.sample_box.as_ref(),
            self.mean_diameter_m,
            self.vegetation_kind,
        ) else {
            // Phase guards make this unreachable; bail without mutation
            tracing::error!("Finalize reached with incomplete session state");
            return self.cancel();
        };

        let result = extrapolate::compute(
            target,
            sample_box,
            mean_diameter,
            self.counting.items(),
            kind,
            &self.config.thresholds,
        );

        let category = PrimaryCategory::from_tags(target.tags());
        let suggestion = suggest::suggest(category, result.density_class, &self.config.suggestion);

        let mut effects = vec![Effect::ShowSummary(result.clone())];
        let canopy_percent = result.canopy_percent;
        let density_class = result.density_class;
        self.result = Some(result);

        match suggestion {
            Suggestion::Suggest { key, value } => {
                let message = format!(
                    "Density is {}% ({}).\nSuggest changing {} to {}={}?",
                    canopy_percent,
                    density_class,
                    category.describe(),
                    key,
                    value
                );
                self.pending_suggestion = Some((key, value));
                effects.push(Effect::PromptSuggestion {
                    message,
                    proposed: (key.to_string(), value.to_string()),
                });
                effects
            }
            Suggestion::Silent => {
                effects.extend(self.complete(None));
                effects
            }
        }
    }

    fn on_suggestion_answer(&mut self, choice: Choice) -> Vec<Effect> {
        let pending = self.pending_suggestion.take();
        match choice {
            Choice::Yes => self.complete(pending),
            Choice::No => {
                self.pending_suggestion = pending;
                self.complete(None)
            }
            Choice::Cancel => self.cancel(),
        }
    }

    /// Finish the survey: render tags, build the audit record, complete.
    ///
    /// `accepted` carries the suggested primary-tag change when the
    /// surveyor said yes.
    fn complete(&mut self, accepted: Option<(&'static str, &'static str)>) -> Vec<Effect> {
        let (Some(target), Some(metadata), Some(sample_box), Some(result)) = (
            self.target.as_ref(),
            self.metadata.as_ref(),
            self.sample_box.as_ref(),
            self.result.as_ref(),
        ) else {
            tracing::error!("Complete reached with incomplete session state");
            return self.cancel();
        };

        let category = PrimaryCategory::from_tags(target.tags());
        let tags = render_tags(result, metadata, accepted);

        let suggestion_outcome = match (accepted, self.pending_suggestion) {
            (Some((key, value)), _) => SuggestionOutcome::Accepted {
                from: category.describe().to_string(),
                to: format!("{}={}", key, value),
            },
            (None, Some((key, value))) => SuggestionOutcome::Declined {
                proposed: format!("{}={}", key, value),
            },
            (None, None) => SuggestionOutcome::NotApplicable,
        };

        let record = AuditRecord {
            imagery_source: metadata.imagery_source.clone(),
            imagery_date: metadata.imagery_date.clone(),
            target_id: target.id(),
            target_kind: target.kind(),
            surveyed_category: category.describe().to_string(),
            target_area_m2: result.source_area_m2,
            suggestion: suggestion_outcome,
            tags: tags.clone(),
            box_width_m: sample_box.width_m(),
            box_height_m: sample_box.height_m(),
            box_area_m2: sample_box.area_m2(),
            box_corners: sample_box.corners().to_vec(),
            calibration: self.calibration.segments().to_vec(),
            items: self.counting.items().to_vec(),
        };

        info!(
            target_id = target.id(),
            canopy_percent = result.canopy_percent,
            stem_count = result.stem_count,
            "Survey complete"
        );
        self.set_phase(SurveyPhase::Complete);

        vec![
            Effect::ApplyTags(tags),
            Effect::EmitAuditRecord(Box::new(record)),
            Effect::Status("Survey complete".to_string()),
        ]
    }
}
