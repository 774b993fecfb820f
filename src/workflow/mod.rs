//! Workflow Validator
//!
//! Transition checks, reachability and consistency reports over a status
//! collection's declared `allowed_transitions` edges.

use petgraph::graphmap::DiGraphMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;

use crate::statuses::{Status, StatusCollection, StatusId};

pub mod errors;
pub mod rules;

pub use errors::TransitionError;
pub use rules::{AutoRule, NotificationRule, NotificationRuleId, RuleId, apply_auto_rule};

/// Whether a status may move to `to`.
///
/// Final statuses absorb: only staying put is allowed. Statuses without a
/// declared transition set are unrestricted. Staying in the same status is
/// always allowed.
#[must_use]
pub fn can_transition(from: &Status, to: &StatusId) -> bool {
    if from.is_final {
        return from.id == *to;
    }

    match &from.allowed_transitions {
        None => true,
        Some(allowed) => from.id == *to || allowed.contains(to),
    }
}

/// Validate a transition between two statuses of the same collection and
/// return the target status.
///
/// # Errors
///
/// Returns [`TransitionError::UnknownStatus`] when either status is missing,
/// [`TransitionError::FromFinal`] when leaving a final status and
/// [`TransitionError::NotAllowed`] when the edge is not declared.
pub fn transition<'a>(
    collection: &'a StatusCollection,
    from: &str,
    to: &str,
) -> Result<&'a Status, TransitionError> {
    let source = collection
        .get(from)
        .ok_or_else(|| TransitionError::UnknownStatus(StatusId::new(from)))?;

    let target = collection
        .get(to)
        .ok_or_else(|| TransitionError::UnknownStatus(StatusId::new(to)))?;

    if can_transition(source, &target.id) {
        return Ok(target);
    }

    if source.is_final {
        return Err(TransitionError::FromFinal {
            from: source.id.clone(),
        });
    }

    Err(TransitionError::NotAllowed {
        from: source.id.clone(),
        to: target.id.clone(),
    })
}

/// Build the transition graph of a collection. Dangling targets are not nodes.
fn transition_graph(collection: &StatusCollection) -> DiGraphMap<&str, ()> {
    let mut graph = DiGraphMap::with_capacity(collection.len(), collection.len());

    for status in collection.list() {
        graph.add_node(status.id.as_str());
    }

    for from in collection.list() {
        for to in collection.list() {
            if from.id != to.id && can_transition(from, &to.id) {
                graph.add_edge(from.id.as_str(), to.id.as_str(), ());
            }
        }
    }

    graph
}

/// Whether `target` can be reached from `start` by following allowed
/// transitions.
///
/// The search is breadth-first and stops after `collection.len()` hops, so it
/// terminates on cyclic graphs.
#[must_use]
pub fn is_reachable(collection: &StatusCollection, start: &str, target: &str) -> bool {
    let (Some(start), true) = (collection.get(start), collection.contains(target)) else {
        return false;
    };

    let start = start.id.as_str();

    if start == target {
        return true;
    }

    let graph = transition_graph(collection);

    let mut visited = FxHashSet::default();
    let mut frontier: Vec<&str> = vec![start];

    visited.insert(start);

    for _hop in 0..collection.len() {
        let mut next = Vec::new();

        for node in frontier {
            for neighbour in graph.neighbors(node) {
                if neighbour == target {
                    return true;
                }

                if visited.insert(neighbour) {
                    next.push(neighbour);
                }
            }
        }

        if next.is_empty() {
            break;
        }

        frontier = next;
    }

    false
}

/// A declared transition whose target is not in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// Status declaring the transition.
    pub status_id: StatusId,

    /// Target that does not exist.
    pub missing_target: StatusId,
}

/// All declared transitions pointing at statuses that do not exist.
#[must_use]
pub fn find_dangling_references(collection: &StatusCollection) -> Vec<DanglingReference> {
    collection
        .list()
        .iter()
        .flat_map(|status| {
            status
                .allowed_transitions
                .iter()
                .flatten()
                .filter(|target| !collection.contains(target.as_str()))
                .map(|target| DanglingReference {
                    status_id: status.id.clone(),
                    missing_target: target.clone(),
                })
        })
        .collect()
}

/// A problem with a collection's terminal states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", content = "status_id", rename_all = "snake_case")]
pub enum FinalStateIssue {
    /// A non-empty collection has no final status.
    MissingFinal,

    /// The status new records start in is also terminal.
    DefaultIsFinal(StatusId),

    /// A final status declares transitions out of itself.
    FinalHasTransitions(StatusId),
}

/// Conflicting or missing terminal states.
#[must_use]
pub fn final_state_issues(collection: &StatusCollection) -> SmallVec<[FinalStateIssue; 2]> {
    let mut issues = SmallVec::new();

    if collection.is_empty() {
        return issues;
    }

    if collection.final_statuses().is_empty() {
        issues.push(FinalStateIssue::MissingFinal);
    }

    for status in collection.list() {
        if status.is_final && status.is_default {
            issues.push(FinalStateIssue::DefaultIsFinal(status.id.clone()));
        }

        let leaves = status
            .allowed_transitions
            .iter()
            .flatten()
            .any(|target| *target != status.id);

        if status.is_final && leaves {
            issues.push(FinalStateIssue::FinalHasTransitions(status.id.clone()));
        }
    }

    issues
}

/// Every soft fault of a collection in one place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WorkflowReport {
    /// Transitions to missing statuses.
    pub dangling: Vec<DanglingReference>,

    /// Terminal-state problems.
    pub final_issues: Vec<FinalStateIssue>,

    /// Ids of all defaults when more than one is marked.
    pub conflicting_defaults: Vec<StatusId>,
}

impl WorkflowReport {
    /// Whether no faults were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.final_issues.is_empty() && self.conflicting_defaults.is_empty()
    }
}

/// Collect dangling references, final-state issues and conflicting defaults.
#[must_use]
pub fn report(collection: &StatusCollection) -> WorkflowReport {
    let conflicting_defaults = if collection.has_conflicting_defaults() {
        collection
            .defaults()
            .iter()
            .map(|status| status.id.clone())
            .collect()
    } else {
        Vec::new()
    };

    WorkflowReport {
        dangling: find_dangling_references(collection),
        final_issues: final_state_issues(collection).into_vec(),
        conflicting_defaults,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use testresult::TestResult;

    use crate::statuses::{StatusKind, canonical_defaults};

    use super::*;

    fn status(id: &str, order: u32, transitions: Option<&[&str]>) -> Status {
        Status {
            id: StatusId::new(id),
            name: id.to_string(),
            color: "#000000".to_string(),
            order,
            is_default: false,
            is_final: false,
            allowed_transitions: transitions
                .map(|targets| targets.iter().copied().map(StatusId::new).collect::<BTreeSet<_>>()),
        }
    }

    fn terminal(id: &str, order: u32) -> Status {
        Status {
            is_final: true,
            ..status(id, order, None)
        }
    }

    #[test]
    fn unrestricted_status_can_go_anywhere() {
        let from = status("a", 1, None);

        assert!(can_transition(&from, &StatusId::new("anything")));
    }

    #[test]
    fn restricted_status_only_follows_declared_edges() {
        let from = status("a", 1, Some(&["b"]));

        assert!(can_transition(&from, &StatusId::new("b")));
        assert!(!can_transition(&from, &StatusId::new("c")));
        assert!(can_transition(&from, &StatusId::new("a")));
    }

    #[test]
    fn final_status_absorbs() {
        let mut won = terminal("won", 5);
        won.allowed_transitions = Some(BTreeSet::from([StatusId::new("new")]));

        for other in ["new", "lost", "contacted", "unknown"] {
            assert!(
                !can_transition(&won, &StatusId::new(other)),
                "final status must not move to {other}"
            );
        }

        assert!(can_transition(&won, &StatusId::new("won")));
    }

    #[test]
    fn transition_reports_why_it_failed() {
        let leads = canonical_defaults(StatusKind::Lead);

        let from_final = transition(&leads, "won", "new");
        let not_allowed = transition(&leads, "new", "won");
        let unknown = transition(&leads, "new", "ghost");

        assert!(
            matches!(from_final, Err(TransitionError::FromFinal { .. })),
            "expected FromFinal, got {from_final:?}"
        );
        assert!(
            matches!(not_allowed, Err(TransitionError::NotAllowed { .. })),
            "expected NotAllowed, got {not_allowed:?}"
        );
        assert!(
            matches!(unknown, Err(TransitionError::UnknownStatus(_))),
            "expected UnknownStatus, got {unknown:?}"
        );
    }

    #[test]
    fn transition_returns_target() -> TestResult {
        let leads = canonical_defaults(StatusKind::Lead);

        let target = transition(&leads, "new", "contacted")?;

        assert_eq!(target.name, "Contacted");

        Ok(())
    }

    #[test]
    fn reachability_follows_multiple_hops() {
        let leads = canonical_defaults(StatusKind::Lead);

        assert!(is_reachable(&leads, "new", "won"));
        assert!(!is_reachable(&leads, "won", "new"));
        assert!(!is_reachable(&leads, "new", "missing"));
    }

    #[test]
    fn reachability_terminates_on_cycles() {
        let collection = StatusCollection::from(vec![
            status("a", 1, Some(&["b"])),
            status("b", 2, Some(&["a"])),
            status("c", 3, Some(&[])),
        ]);

        assert!(is_reachable(&collection, "a", "b"));
        assert!(!is_reachable(&collection, "a", "c"));
    }

    #[test]
    fn reachability_ignores_dangling_targets() {
        let collection = StatusCollection::from(vec![status("a", 1, Some(&["ghost"]))]);

        assert!(!is_reachable(&collection, "a", "ghost"));
    }

    #[test]
    fn dangling_reference_reported_after_removal() -> TestResult {
        let mut collection = StatusCollection::from(vec![
            status("1", 1, Some(&["2"])),
            status("2", 2, Some(&["9"])),
            status("9", 3, None),
        ]);

        assert!(find_dangling_references(&collection).is_empty());

        collection.remove("9")?;

        assert_eq!(
            find_dangling_references(&collection),
            vec![DanglingReference {
                status_id: StatusId::new("2"),
                missing_target: StatusId::new("9"),
            }]
        );

        Ok(())
    }

    #[test]
    fn final_state_issues_detects_conflicts() {
        let mut start = terminal("start", 1);
        start.is_default = true;

        let mut leaky = terminal("leaky", 2);
        leaky.allowed_transitions = Some(BTreeSet::from([StatusId::new("start")]));

        let issues = final_state_issues(&StatusCollection::from(vec![start, leaky]));

        assert_eq!(
            issues.as_slice(),
            [
                FinalStateIssue::DefaultIsFinal(StatusId::new("start")),
                FinalStateIssue::FinalHasTransitions(StatusId::new("leaky")),
            ]
        );
    }

    #[test]
    fn missing_final_is_reported() {
        let issues = final_state_issues(&StatusCollection::from(vec![status("a", 1, None)]));

        assert_eq!(issues.as_slice(), [FinalStateIssue::MissingFinal]);
    }

    #[test]
    fn canonical_collections_report_clean() {
        for kind in StatusKind::ALL {
            assert!(
                report(&canonical_defaults(kind)).is_clean(),
                "{kind:?} defaults should be clean"
            );
        }
    }

    #[test]
    fn report_lists_conflicting_defaults() {
        let mut a = status("a", 1, None);
        a.is_default = true;

        let mut b = status("b", 2, None);
        b.is_default = true;

        let report = report(&StatusCollection::from(vec![a, b, terminal("z", 3)]));

        assert_eq!(
            report.conflicting_defaults,
            vec![StatusId::new("a"), StatusId::new("b")]
        );
    }
}
