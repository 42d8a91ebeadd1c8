//! The survey state machine.
//!
//! Orchestrates one survey from invocation to finalize or cancel:
//!
//! ```text
//! Idle ──► ValidatingSelection ──► AwaitingMetadata ──► DrawingSampleBox
//!                                                             │
//!              Complete ◄── Finalizing ◄── Counting ◄── CalibratingDiameter
//!
//!              (every non-terminal phase ──► Cancelled on Cancel)
//! ```
//!
//! The machine is a pure function of (current state, input event) → (new
//! state, effect list). Host adapters translate native input into
//! [`SurveyEvent`]s and interpret the returned [`Effect`]s; the engine never
//! calls into the host and writes nothing to it except through the
//! [`Effect::ApplyTags`] descriptor, emitted at most once per survey.
//!
//! Everything in progress (target snapshot, sample box, trackers, computed
//! result) is owned by one [`SurveySession`] value. There is no ambient
//! state, so concurrent surveys in one process cannot interfere and a
//! dropped session leaves no trace.

mod events;
mod phase;
mod session;

pub use events::{Choice, Effect, SurveyError, SurveyEvent};
pub use phase::SurveyPhase;
pub use session::SurveySession;
