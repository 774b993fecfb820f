//! Repository state published to subscribers.

use serde::Serialize;

use atrium::clients::{ClientConfiguration, ClientId};

/// Lifecycle of the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryState {
    /// Not loaded from the remote authority yet.
    #[default]
    Uninitialized,

    /// A fetch or mutation is in flight.
    Loading,

    /// The clients reflect the last successful fetch.
    Ready,

    /// The last remote call failed; clients are the last good set.
    Error,
}

/// Everything a consumer can observe about the repository.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RepositorySnapshot {
    /// Lifecycle state.
    pub state: RepositoryState,

    /// Resolved clients.
    pub clients: Vec<ClientConfiguration>,

    /// Active client, always a member of `clients`.
    pub active_client_id: Option<ClientId>,

    /// User message of the last failure, cleared on success.
    pub last_error: Option<String>,
}

impl RepositorySnapshot {
    /// Look up a client by id.
    #[must_use]
    pub fn client(&self, id: &str) -> Option<&ClientConfiguration> {
        self.clients.iter().find(|client| client.id.as_str() == id)
    }

    /// The active client.
    #[must_use]
    pub fn active_client(&self) -> Option<&ClientConfiguration> {
        self.active_client_id
            .as_ref()
            .and_then(|id| self.client(id.as_str()))
    }

    /// Whether `id` names a known client.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.client(id).is_some()
    }
}
