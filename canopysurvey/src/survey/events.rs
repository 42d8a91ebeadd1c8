//! The state machine's input and output alphabets.
//!
//! The engine is a function of (current state, input event) → (new state,
//! effect list). Host adapters translate their native input (mouse drags,
//! key presses, dialog buttons) into [`SurveyEvent`]s and interpret the
//! returned [`Effect`]s with whatever UI they have. The core never calls
//! the host.

use thiserror::Error;

use crate::area::TargetArea;
use crate::extrapolate::{SurveyResult, VegetationKind};
use crate::geom::Point;
use crate::report::AuditRecord;

/// Precondition failures that abort a survey before measurement begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    /// The current selection is not a closed way or multipolygon relation.
    #[error("Select a closed way or multipolygon relation first")]
    InvalidSelection,

    /// No visible imagery layer and the surveyor did not override.
    #[error("No visible imagery layer detected")]
    NoImagery,
}

/// Three-way answer to a modal prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    Cancel,
}

/// One unit of surveyor input, as translated by the host adapter.
#[derive(Debug, Clone)]
pub enum SurveyEvent {
    /// The tool was invoked. Carries the host's current selection (already
    /// resolved to a target area, or `None` if unusable) and the name of
    /// the visible imagery layer, if any.
    Invoked {
        selection: Option<TargetArea>,
        imagery: Option<String>,
    },
    /// Answer to the missing-imagery warning.
    ImageryOverride(Choice),
    /// Metadata entered: imagery capture date (free text, may be empty)
    /// and what is being counted.
    MetadataProvided {
        imagery_date: Option<String>,
        kind: VegetationKind,
    },
    /// Sample-box drag completed.
    BoxDragged { anchor: Point, opposite: Point },
    /// Diameter drag completed.
    DiameterDragged { start: Point, end: Point },
    /// One individual marked inside the box.
    ItemClicked { location: Point },
    /// Undo the last measurement or counted item, per current phase.
    Undo,
    /// Confirm the current phase (Enter).
    Confirm,
    /// Answer to the tag-change suggestion prompt.
    SuggestionAnswered(Choice),
    /// Unconditional escape valve (Escape / Ctrl-C).
    Cancel,
}

/// Side-effect descriptors returned to the host adapter.
///
/// The engine performs none of these itself; it only describes them.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Update the transient status line.
    Status(String),
    /// Show a modal informational message.
    ShowMessage(String),
    /// Warn that no imagery is visible and ask whether to proceed anyway.
    PromptImageryOverride { message: String },
    /// Ask for imagery date and vegetation kind.
    PromptMetadata,
    /// Propose a primary-tag change and ask Yes/No/Cancel.
    PromptSuggestion {
        message: String,
        proposed: (String, String),
    },
    /// Present the computed survey summary.
    ShowSummary(SurveyResult),
    /// Merge these tags onto the target object. Emitted at most once per
    /// survey, only on successful finalize.
    ApplyTags(Vec<(String, String)>),
    /// Hand the finished audit record to the host's file writer.
    EmitAuditRecord(Box<AuditRecord>),
    /// The survey aborted on a precondition failure.
    Aborted(SurveyError),
}

impl Effect {
    /// Whether this effect mutates host state (tag application).
    pub fn is_mutation(&self) -> bool {
        matches!(self, Effect::ApplyTags(_))
    }
}
