//! Remote authority contract.

use async_trait::async_trait;
use mockall::automock;

use atrium::clients::{ClientId, ClientUpdate, ConfigUpdate, NewClient, SystemClient};

use crate::{remote::RemoteError, session::SessionTokens};

/// The remote source of truth for tenants and their configuration.
#[automock]
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    /// List every tenant visible to the session.
    async fn list_clients(&self, tokens: &SessionTokens) -> Result<Vec<SystemClient>, RemoteError>;

    /// Create a tenant.
    async fn create_client(
        &self,
        tokens: &SessionTokens,
        client: NewClient,
    ) -> Result<SystemClient, RemoteError>;

    /// Patch a tenant's own record.
    async fn update_client(
        &self,
        tokens: &SessionTokens,
        id: ClientId,
        update: ClientUpdate,
    ) -> Result<SystemClient, RemoteError>;

    /// Delete a tenant.
    async fn delete_client(&self, tokens: &SessionTokens, id: ClientId) -> Result<(), RemoteError>;

    /// Mark a tenant active.
    async fn activate_client(&self, tokens: &SessionTokens, id: ClientId)
    -> Result<(), RemoteError>;

    /// Mark a tenant inactive.
    async fn deactivate_client(
        &self,
        tokens: &SessionTokens,
        id: ClientId,
    ) -> Result<(), RemoteError>;

    /// Replace a tenant's nested configuration.
    async fn update_client_config(
        &self,
        tokens: &SessionTokens,
        id: ClientId,
        config: ConfigUpdate,
    ) -> Result<(), RemoteError>;
}
