//! Config repository errors.

use thiserror::Error;

use atrium::{
    clients::ClientId, statuses::StatusCatalogError, templates::TemplateId,
};

use crate::remote::RemoteError;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The remote authority rejected or failed the call.
    #[error("remote error")]
    Remote(#[from] RemoteError),

    /// A configuration change needs an active client and none is selected.
    #[error("no active client")]
    NoActiveClient,

    /// The client is not in the current collection.
    #[error("unknown client {0}")]
    UnknownClient(ClientId),

    /// A status edit referenced a missing status.
    #[error("status catalog error")]
    Status(#[from] StatusCatalogError),

    /// The feature key is not in the catalog.
    #[error("unknown feature {0}")]
    UnknownFeature(String),

    /// The template is not in the active client's workflow.
    #[error("unknown template {0}")]
    UnknownTemplate(TemplateId),
}

impl RepositoryError {
    /// A message suitable for showing to a user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(error) => error.user_message(),
            Self::NoActiveClient => "Select a client first".to_string(),
            Self::UnknownClient(id) => format!("Client {id} no longer exists"),
            Self::Status(StatusCatalogError::UnknownStatus(id)) => format!("Status {id} does not exist"),
            Self::Status(StatusCatalogError::DuplicateStatus(id)) => format!("Status {id} is listed twice"),
            Self::UnknownFeature(key) => format!("Feature {key} does not exist"),
            Self::UnknownTemplate(id) => format!("Template {id} does not exist"),
        }
    }
}
