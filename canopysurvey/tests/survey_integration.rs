//! Integration tests for the survey engine.
//!
//! These tests verify the complete survey flow through the public API:
//! - invocation → metadata → sample box → calibration → counting → finalize
//! - the suggestion prompt round trip
//! - the no-host-mutation cancellation property
//!
//! Run with: `cargo test --test survey_integration`

use std::collections::BTreeMap;

use canopysurvey::geom::LocalFrame;
use canopysurvey::report::SuggestionOutcome;
use canopysurvey::survey::{Choice, Effect, SurveyEvent, SurveyPhase, SurveySession};
use canopysurvey::{Point, Ring, TargetArea, VegetationKind};

// ============================================================================
// Helper Functions
// ============================================================================

const ANCHOR: Point = Point {
    lat: 49.0,
    lon: 10.0,
};

/// A point at local (x, y) meters from the shared anchor.
fn at(x: f64, y: f64) -> Point {
    LocalFrame::new(ANCHOR).from_local(x, y)
}

/// A rectangular target of roughly `width x height` meters with the given
/// primary tag.
fn target_with_tag(width_m: f64, height_m: f64, key: &str, value: &str) -> TargetArea {
    let mut tags = BTreeMap::new();
    tags.insert(key.to_string(), value.to_string());
    let ring = Ring::new(vec![
        at(0.0, 0.0),
        at(width_m, 0.0),
        at(width_m, height_m),
        at(0.0, height_m),
    ])
    .unwrap();
    TargetArea::from_way(9001, ring, tags)
}

/// Drive a fresh session to the counting phase: 100x60 box, one 4 m
/// diameter measurement.
fn session_ready_to_count(target: TargetArea) -> SurveySession {
    let mut session = SurveySession::with_defaults();
    session.handle(SurveyEvent::Invoked {
        selection: Some(target),
        imagery: Some("Esri World Imagery".to_string()),
    });
    session.handle(SurveyEvent::MetadataProvided {
        imagery_date: Some("2025-07-15".to_string()),
        kind: VegetationKind::Trees,
    });
    session.handle(SurveyEvent::BoxDragged {
        anchor: at(10.0, 10.0),
        opposite: at(110.0, 70.0),
    });
    session.handle(SurveyEvent::DiameterDragged {
        start: at(20.0, 20.0),
        end: at(24.0, 20.0),
    });
    session.handle(SurveyEvent::Confirm);
    assert_eq!(session.phase(), SurveyPhase::Counting);
    session
}

fn applied_tags(effects: &[Effect]) -> Option<Vec<(String, String)>> {
    effects.iter().find_map(|e| match e {
        Effect::ApplyTags(tags) => Some(tags.clone()),
        _ => None,
    })
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A full survey of a heath target: 30 trees in a 100x60 box over a
/// ~50_000 m2 polygon. Verifies the reference numbers end to end.
#[test]
fn test_full_survey_flow() {
    let mut session = session_ready_to_count(target_with_tag(250.0, 200.0, "natural", "heath"));

    for i in 0..30 {
        let effects = session.handle(SurveyEvent::ItemClicked {
            location: at(15.0 + (i % 10) as f64 * 9.0, 15.0 + (i / 10) as f64 * 15.0),
        });
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::Status(m) if m.contains(&format!("Count: {}", i + 1)))));
    }

    let effects = session.handle(SurveyEvent::Confirm);
    assert_eq!(session.phase(), SurveyPhase::Complete);

    // Heath is outside the scrub/wood continuum: no suggestion prompt
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::PromptSuggestion { .. })));

    let result = session.result().unwrap();
    assert_eq!(result.count, 30);
    assert_eq!(result.sample_area_m2, 6000.0);
    assert_eq!(result.canopy_percent, 5);
    assert!((result.mean_spacing_m.unwrap() - 14.14).abs() < 0.01);
    assert!((result.stem_count as i64 - 250).abs() <= 2);

    let tags = applied_tags(&effects).expect("Tags applied on finalize");
    let get = |key: &str| tags.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());
    assert_eq!(get("canopy").unwrap(), "5%");
    assert_eq!(get("wood:density").unwrap(), "scattered");
    assert_eq!(get("est:avg_crown").unwrap(), "4.0m");
    assert_eq!(
        get("source").unwrap(),
        "Esri World Imagery (2025-07-15); canopysurvey"
    );

    // The audit record mirrors the raw measurements
    let record = effects
        .iter()
        .find_map(|e| match e {
            Effect::EmitAuditRecord(r) => Some(r.clone()),
            _ => None,
        })
        .expect("Audit record emitted");
    assert_eq!(record.items.len(), 30);
    assert_eq!(record.calibration.len(), 1);
    assert_eq!(record.box_width_m, 100.0);
    assert_eq!(record.box_height_m, 60.0);
    assert_eq!(record.suggestion, SuggestionOutcome::NotApplicable);
}

/// Undo during counting is a strict inverse, across the public API.
#[test]
fn test_counting_undo_roundtrip() {
    let mut session = session_ready_to_count(target_with_tag(250.0, 200.0, "natural", "heath"));

    session.handle(SurveyEvent::ItemClicked {
        location: at(20.0, 20.0),
    });
    session.handle(SurveyEvent::ItemClicked {
        location: at(30.0, 20.0),
    });
    session.handle(SurveyEvent::Undo);
    session.handle(SurveyEvent::Undo);
    // Undo on empty is a no-op
    session.handle(SurveyEvent::Undo);

    session.handle(SurveyEvent::ItemClicked {
        location: at(40.0, 40.0),
    });
    let effects = session.handle(SurveyEvent::Confirm);

    let result = session.result().unwrap();
    assert_eq!(result.count, 1);
    let record = effects
        .iter()
        .find_map(|e| match e {
            Effect::EmitAuditRecord(r) => Some(r.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(record.items[0].ordinal, 1);
}

/// A dense survey of scrub walks through the suggestion prompt and applies
/// the accepted tag change.
#[test]
fn test_suggestion_accept_flow() {
    let mut session = session_ready_to_count(target_with_tag(250.0, 200.0, "natural", "scrub"));

    // Enough 4m crowns to cross the dense threshold in the 6000 m2 box
    for i in 0..200 {
        session.handle(SurveyEvent::ItemClicked {
            location: at(
                12.0 + (i % 20) as f64 * 4.5,
                12.0 + (i / 20) as f64 * 5.5,
            ),
        });
    }

    let effects = session.handle(SurveyEvent::Confirm);
    assert_eq!(session.phase(), SurveyPhase::Finalizing);
    assert!(applied_tags(&effects).is_none(), "Tags wait for the answer");

    let effects = session.handle(SurveyEvent::SuggestionAnswered(Choice::Yes));
    assert_eq!(session.phase(), SurveyPhase::Complete);

    let tags = applied_tags(&effects).unwrap();
    assert!(tags.iter().any(|(k, v)| k == "natural" && v == "wood"));

    let record = effects
        .iter()
        .find_map(|e| match e {
            Effect::EmitAuditRecord(r) => Some(r.clone()),
            _ => None,
        })
        .unwrap();
    assert!(matches!(record.suggestion, SuggestionOutcome::Accepted { .. }));
}

/// Cancelling at every stage of a survey emits no tag application, ever.
#[test]
fn test_cancellation_never_mutates_host() {
    type Step = Box<dyn Fn(&mut SurveySession)>;
    let steps: Vec<(&str, Step)> = vec![
        ("idle", Box::new(|_| {})),
        (
            "after invoke",
            Box::new(|s| {
                s.handle(SurveyEvent::Invoked {
                    selection: Some(target_with_tag(250.0, 200.0, "natural", "scrub")),
                    imagery: Some("Bing".to_string()),
                });
            }),
        ),
        (
            "awaiting imagery override",
            Box::new(|s| {
                s.handle(SurveyEvent::Invoked {
                    selection: Some(target_with_tag(250.0, 200.0, "natural", "scrub")),
                    imagery: None,
                });
            }),
        ),
        (
            "counting",
            Box::new(|s| {
                let ready =
                    session_ready_to_count(target_with_tag(250.0, 200.0, "natural", "scrub"));
                *s = ready;
                s.handle(SurveyEvent::ItemClicked {
                    location: at(20.0, 20.0),
                });
            }),
        ),
    ];

    for (label, build) in steps {
        let mut session = SurveySession::with_defaults();
        build(&mut session);

        let effects = session.handle(SurveyEvent::Cancel);
        assert_eq!(session.phase(), SurveyPhase::Cancelled, "Stage: {}", label);
        assert!(
            !effects.iter().any(Effect::is_mutation),
            "Stage {} must not apply tags",
            label
        );

        // The session is inert afterwards
        assert!(session.handle(SurveyEvent::Confirm).is_empty());
    }
}

/// Multipolygon target: the hole reduces the extrapolated stem count.
#[test]
fn test_multipolygon_target_hole_reduces_stems() {
    let outer = Ring::new(vec![
        at(0.0, 0.0),
        at(250.0, 0.0),
        at(250.0, 200.0),
        at(0.0, 200.0),
    ])
    .unwrap();
    let hole = Ring::new(vec![
        at(50.0, 50.0),
        at(150.0, 50.0),
        at(150.0, 150.0),
        at(50.0, 150.0),
    ])
    .unwrap();
    let mut tags = BTreeMap::new();
    tags.insert("natural".to_string(), "heath".to_string());
    let target = TargetArea::from_relation(9002, vec![outer], vec![hole], tags).unwrap();

    let mut session = session_ready_to_count(target);
    for i in 0..30 {
        session.handle(SurveyEvent::ItemClicked {
            location: at(15.0 + (i % 10) as f64 * 9.0, 15.0 + (i / 10) as f64 * 15.0),
        });
    }
    session.handle(SurveyEvent::Confirm);

    let result = session.result().unwrap();
    // 50_000 - 10_000 = 40_000 m2 at 0.005/m2 -> ~200 stems
    assert!((result.stem_count as i64 - 200).abs() <= 2);
}
