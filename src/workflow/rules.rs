//! Workflow rules carried in a client's workflow bundle.

use serde::{Deserialize, Serialize};

use crate::{
    ids::TypedId,
    statuses::{Status, StatusCollection, StatusId},
    templates::{TemplateId, TemplateKind},
    workflow::transition,
};

/// Auto-rule identifier.
pub type RuleId = TypedId<AutoRule>;

/// Notification rule identifier.
pub type NotificationRuleId = TypedId<NotificationRule>;

const fn active_by_default() -> bool {
    true
}

/// Moves a record from one status to another once it has sat long enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoRule {
    /// Rule identifier.
    pub id: RuleId,

    /// Status the record must currently be in.
    pub from_status: StatusId,

    /// Status to move the record to.
    pub to_status: StatusId,

    /// Whole days the record must have spent in `from_status`.
    #[serde(default)]
    pub after_days: u32,

    /// Inactive rules never fire.
    #[serde(default = "active_by_default")]
    pub active: bool,
}

/// Sends a templated message when a record enters a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRule {
    /// Rule identifier.
    pub id: NotificationRuleId,

    /// Status whose entry triggers the notification.
    pub trigger_status: StatusId,

    /// Template to send.
    pub template_id: TemplateId,

    /// Delivery channel.
    pub channel: TemplateKind,

    /// Inactive rules never fire.
    #[serde(default = "active_by_default")]
    pub active: bool,
}

impl NotificationRule {
    /// Whether entering `status` should fire this rule.
    #[must_use]
    pub fn fires_on(&self, status: &str) -> bool {
        self.active && self.trigger_status.as_str() == status
    }
}

/// The status an auto-rule moves a record to, if it fires.
///
/// Elapsed days are computed by the caller. A rule never fires when it is
/// inactive, does not match `current`, has not waited long enough, or the
/// transition is not allowed (final statuses never auto-transition).
#[must_use]
pub fn apply_auto_rule<'a>(
    collection: &'a StatusCollection,
    rule: &AutoRule,
    current: &str,
    days_in_status: u32,
) -> Option<&'a Status> {
    if !rule.active || rule.from_status.as_str() != current || days_in_status < rule.after_days {
        return None;
    }

    transition(collection, current, rule.to_status.as_str()).ok()
}
