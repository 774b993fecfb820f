//! Canonical default status collections.

use std::collections::BTreeSet;

use crate::statuses::{Status, StatusCollection, StatusId, StatusKind};

struct Seed {
    id: &'static str,
    name: &'static str,
    color: &'static str,
    is_default: bool,
    is_final: bool,
    transitions: Option<&'static [&'static str]>,
}

const fn seed(id: &'static str, name: &'static str, color: &'static str) -> Seed {
    Seed {
        id,
        name,
        color,
        is_default: false,
        is_final: false,
        transitions: None,
    }
}

const LEAD: [Seed; 6] = [
    Seed {
        is_default: true,
        transitions: Some(&["contacted", "lost"]),
        ..seed("new", "New", "#3b82f6")
    },
    Seed {
        transitions: Some(&["qualified", "lost"]),
        ..seed("contacted", "Contacted", "#8b5cf6")
    },
    Seed {
        transitions: Some(&["proposal", "lost"]),
        ..seed("qualified", "Qualified", "#f59e0b")
    },
    Seed {
        transitions: Some(&["won", "lost"]),
        ..seed("proposal", "Proposal", "#06b6d4")
    },
    Seed {
        is_final: true,
        transitions: Some(&[]),
        ..seed("won", "Won", "#10b981")
    },
    Seed {
        is_final: true,
        transitions: Some(&[]),
        ..seed("lost", "Lost", "#ef4444")
    },
];

const TASK: [Seed; 4] = [
    Seed {
        is_default: true,
        ..seed("pending", "Pending", "#f59e0b")
    },
    seed("in_progress", "In Progress", "#3b82f6"),
    Seed {
        is_final: true,
        ..seed("completed", "Completed", "#10b981")
    },
    Seed {
        is_final: true,
        ..seed("cancelled", "Cancelled", "#6b7280")
    },
];

const CUSTOMER: [Seed; 3] = [
    Seed {
        is_default: true,
        ..seed("active", "Active", "#10b981")
    },
    seed("inactive", "Inactive", "#f59e0b"),
    Seed {
        is_final: true,
        ..seed("churned", "Churned", "#ef4444")
    },
];

const PAYMENT: [Seed; 5] = [
    Seed {
        is_default: true,
        ..seed("pending", "Pending", "#f59e0b")
    },
    seed("partial", "Partial", "#3b82f6"),
    Seed {
        is_final: true,
        ..seed("paid", "Paid", "#10b981")
    },
    seed("overdue", "Overdue", "#ef4444"),
    Seed {
        is_final: true,
        ..seed("refunded", "Refunded", "#6b7280")
    },
];

/// The built-in collection for a status kind.
///
/// Ids are stable across calls so backfilled caches stay comparable.
#[must_use]
pub fn canonical_defaults(kind: StatusKind) -> StatusCollection {
    let seeds: &[Seed] = match kind {
        StatusKind::Lead => &LEAD,
        StatusKind::Task => &TASK,
        StatusKind::Customer => &CUSTOMER,
        StatusKind::Payment => &PAYMENT,
    };

    seeds
        .iter()
        .zip(1..)
        .map(|(seed, order)| Status {
            id: StatusId::new(seed.id),
            name: seed.name.to_string(),
            color: seed.color.to_string(),
            order,
            is_default: seed.is_default,
            is_final: seed.is_final,
            allowed_transitions: seed
                .transitions
                .map(|targets| targets.iter().copied().map(StatusId::new).collect::<BTreeSet<_>>()),
        })
        .collect::<Vec<_>>()
        .into()
}
