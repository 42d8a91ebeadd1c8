//! Survey phases.

/// Lifecycle phase of one survey.
///
/// Phases advance strictly forward; the only backward edge is the
/// unconditional escape to [`Cancelled`](SurveyPhase::Cancelled), which is
/// available from every non-terminal phase and never mutates host state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurveyPhase {
    /// Nothing running; waiting for invocation.
    #[default]
    Idle,
    /// Selection accepted but imagery missing; waiting for the surveyor to
    /// override the imagery warning or give up.
    ValidatingSelection,
    /// Waiting for imagery date and vegetation kind.
    AwaitingMetadata,
    /// Waiting for the sample-box drag.
    DrawingSampleBox,
    /// Recording diameter measurements.
    CalibratingDiameter,
    /// Counting individuals inside the box.
    Counting,
    /// Results computed; waiting on the suggestion prompt.
    Finalizing,
    /// Tags handed to the host; the survey is done.
    Complete,
    /// Ended without any host mutation.
    Cancelled,
}

impl SurveyPhase {
    /// Whether the survey has ended, one way or the other.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SurveyPhase::Complete | SurveyPhase::Cancelled)
    }

    /// Short human-readable description for status lines.
    pub fn description(&self) -> &'static str {
        match self {
            SurveyPhase::Idle => "idle",
            SurveyPhase::ValidatingSelection => "validating selection",
            SurveyPhase::AwaitingMetadata => "awaiting metadata",
            SurveyPhase::DrawingSampleBox => "drawing sample box",
            SurveyPhase::CalibratingDiameter => "calibrating diameter",
            SurveyPhase::Counting => "counting",
            SurveyPhase::Finalizing => "finalizing",
            SurveyPhase::Complete => "complete",
            SurveyPhase::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SurveyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
