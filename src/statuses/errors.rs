//! Status catalog errors.

use thiserror::Error;

use crate::statuses::StatusId;

/// Identity faults raised by catalog edits.
///
/// Soft data faults (duplicate defaults, dangling transitions) are never
/// errors; they are reported by queries instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusCatalogError {
    /// No status with this id exists in the collection.
    #[error("status {0} not found")]
    UnknownStatus(StatusId),

    /// The same id was listed more than once.
    #[error("status {0} listed more than once")]
    DuplicateStatus(StatusId),
}
