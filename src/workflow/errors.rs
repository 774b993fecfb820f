//! Workflow errors.

use thiserror::Error;

use crate::statuses::StatusId;

/// Reasons a status transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// One side of the transition does not exist in the collection.
    #[error("status {0} not found")]
    UnknownStatus(StatusId),

    /// The source status is terminal.
    #[error("status {from} is final and cannot transition")]
    FromFinal {
        /// Terminal source status.
        from: StatusId,
    },

    /// The source status does not declare the target as allowed.
    #[error("transition from {from} to {to} is not allowed")]
    NotAllowed {
        /// Source status.
        from: StatusId,

        /// Requested target.
        to: StatusId,
    },
}
