//! Integration tests for status pipelines and the workflow validator.
//!
//! These walk whole collections the way a tenant edits them: adding and
//! removing statuses, then asking the validator what the pipeline allows.

use std::collections::BTreeSet;

use testresult::TestResult;

use atrium::{
    ids::SequentialIdGenerator,
    statuses::{NewStatus, StatusCollection, StatusId, StatusKind, StatusPatch, canonical_defaults},
    workflow::{self, DanglingReference, FinalStateIssue, TransitionError},
};

fn transitions(ids: &[&str]) -> Option<BTreeSet<StatusId>> {
    Some(ids.iter().map(|id| StatusId::new(*id)).collect())
}

#[test]
fn removing_a_target_leaves_a_dangling_reference() -> TestResult {
    let ids = SequentialIdGenerator::new("status");
    let mut collection = StatusCollection::default();

    let nine = collection.add(
        NewStatus {
            name: "Nine".to_string(),
            ..NewStatus::default()
        },
        &ids,
    );

    let two = collection.add(
        NewStatus {
            name: "Two".to_string(),
            allowed_transitions: Some(BTreeSet::from([nine.clone()])),
            ..NewStatus::default()
        },
        &ids,
    );

    assert!(workflow::find_dangling_references(&collection).is_empty());

    collection.remove(nine.as_str())?;

    assert_eq!(
        workflow::find_dangling_references(&collection),
        [DanglingReference {
            status_id: two,
            missing_target: nine,
        }]
    );

    Ok(())
}

#[test]
fn final_statuses_absorb_in_every_canonical_collection() {
    for kind in StatusKind::ALL {
        let collection = canonical_defaults(kind);

        for terminal in collection.final_statuses() {
            for other in collection.list() {
                let allowed = workflow::can_transition(terminal, &other.id);

                assert_eq!(
                    allowed,
                    other.id == terminal.id,
                    "{kind:?}: {} -> {} should only allow staying put",
                    terminal.id,
                    other.id
                );
            }
        }
    }
}

#[test]
fn lead_pipeline_walks_from_new_to_won() -> TestResult {
    let leads = canonical_defaults(StatusKind::Lead);

    let path = ["new", "contacted", "qualified", "proposal", "won"];

    for pair in path.windows(2) {
        if let [from, to] = pair {
            let target = workflow::transition(&leads, from, to)?;

            assert_eq!(target.id.as_str(), *to);
        }
    }

    assert!(workflow::is_reachable(&leads, "new", "won"));
    assert!(!workflow::is_reachable(&leads, "won", "new"));

    let skipped = workflow::transition(&leads, "new", "won");

    assert!(
        matches!(skipped, Err(TransitionError::NotAllowed { .. })),
        "expected NotAllowed, got {skipped:?}"
    );

    let reopened = workflow::transition(&leads, "lost", "new");

    assert!(
        matches!(reopened, Err(TransitionError::FromFinal { .. })),
        "expected FromFinal, got {reopened:?}"
    );

    Ok(())
}

#[test]
fn cyclic_pipelines_terminate() -> TestResult {
    let collection: StatusCollection = serde_json::from_value(serde_json::json!([
        {"id": "a", "name": "A", "order": 1, "allowedTransitions": ["b"]},
        {"id": "b", "name": "B", "order": 2, "allowedTransitions": ["a"]},
        {"id": "c", "name": "C", "order": 3, "isFinal": true}
    ]))?;

    assert!(workflow::is_reachable(&collection, "a", "b"));
    assert!(workflow::is_reachable(&collection, "b", "a"));
    assert!(!workflow::is_reachable(&collection, "a", "c"));

    Ok(())
}

#[test]
fn conflicting_defaults_are_reported_not_rejected() -> TestResult {
    let mut collection = canonical_defaults(StatusKind::Task);

    collection.update(
        "in_progress",
        StatusPatch {
            is_default: Some(true),
            ..StatusPatch::default()
        },
    )?;

    let report = workflow::report(&collection);

    assert!(collection.has_conflicting_defaults());
    assert_eq!(report.conflicting_defaults.len(), 2);
    assert!(report.dangling.is_empty());

    Ok(())
}

#[test]
fn final_status_with_exits_is_flagged() -> TestResult {
    let mut collection = canonical_defaults(StatusKind::Lead);

    collection.update(
        "won",
        StatusPatch {
            allowed_transitions: Some(transitions(&["new"])),
            ..StatusPatch::default()
        },
    )?;

    let issues = workflow::final_state_issues(&collection);

    assert!(
        issues.contains(&FinalStateIssue::FinalHasTransitions(StatusId::new("won"))),
        "expected won to be flagged, got {issues:?}"
    );

    // The final flag still wins over the declared edge.
    assert!(workflow::transition(&collection, "won", "new").is_err());

    Ok(())
}
