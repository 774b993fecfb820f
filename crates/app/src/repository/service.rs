//! Config repository service.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use tokio::sync::watch;
use tracing::{Span, debug, info, warn};

use atrium::{
    clients::{
        ClientConfiguration, ClientId, ClientUpdate, ConfigUpdate, NewClient, SystemClient,
        resolve_client,
    },
    features::{FeatureCatalog, FeatureSettings},
    ids::IdGenerator,
    migrations::{CacheState, migrate_or_reset},
    statuses::{NewStatus, Status, StatusId, StatusKind, StatusPatch},
    templates::{self, MessageTemplate, NewTemplate, TemplateId},
    workflow::{self, WorkflowReport},
};

use crate::{
    cache::CacheStore,
    notifications::Notifier,
    remote::{RemoteAuthority, RemoteError},
    repository::{RepositoryError, RepositorySnapshot, RepositoryState},
    session::{SessionProvider, SessionTokens},
};

/// Owns the tenant collection and active tenant pointer.
///
/// Operations that need the remote authority return `Ok(None)` when there is
/// no session. Mutations report failures to the notifier and return them;
/// refreshes report failures and keep the last known clients.
pub struct ConfigRepository {
    remote: Arc<dyn RemoteAuthority>,
    session: Arc<dyn SessionProvider>,
    cache: Arc<dyn CacheStore>,
    notifier: Arc<dyn Notifier>,
    ids: Arc<dyn IdGenerator>,
    catalog: FeatureCatalog,
    state: watch::Sender<RepositorySnapshot>,
}

impl fmt::Debug for ConfigRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.state.borrow();

        f.debug_struct("ConfigRepository")
            .field("state", &snapshot.state)
            .field("clients", &snapshot.clients.len())
            .field("active_client_id", &snapshot.active_client_id)
            .finish_non_exhaustive()
    }
}

impl ConfigRepository {
    /// Build a repository from its collaborators. Nothing is loaded until
    /// [`ConfigRepository::initialize`] is called.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteAuthority>,
        session: Arc<dyn SessionProvider>,
        cache: Arc<dyn CacheStore>,
        notifier: Arc<dyn Notifier>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let (state, _) = watch::channel(RepositorySnapshot::default());

        Self {
            remote,
            session,
            cache,
            notifier,
            ids,
            catalog: FeatureCatalog::standard(),
            state,
        }
    }

    /// Resolve features against a different catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: FeatureCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Load the cache, restore the active pointer and fetch from the remote.
    ///
    /// An unreadable or unmigratable cache starts the repository empty.
    #[tracing::instrument(name = "repository.initialize", skip(self))]
    pub async fn initialize(&self) -> RepositorySnapshot {
        let cached = match self.cache.load_envelope() {
            Ok(Some(envelope)) => {
                let (state, error) = migrate_or_reset(envelope);

                if let Some(error) = error {
                    warn!(%error, "cache reset after failed migration");
                }

                state
            }
            Ok(None) => CacheState::default(),
            Err(error) => {
                warn!(%error, "cache unreadable, starting empty");
                CacheState::default()
            }
        };

        let stored_pointer = self.cache.load_active_pointer().unwrap_or_else(|error| {
            warn!(%error, "active pointer unreadable");
            None
        });

        let resume = stored_pointer.or(cached.current_client_id);

        info!(
            cached_clients = cached.clients.len(),
            resume = ?resume,
            "restored cache"
        );

        self.state.send_modify(|snapshot| {
            snapshot.active_client_id = resume
                .clone()
                .filter(|id| cached.clients.iter().any(|client| client.id == *id));
            snapshot.clients = cached.clients;
            snapshot.state = RepositoryState::Uninitialized;
            snapshot.last_error = None;
        });

        if let Some(tokens) = self.tokens("repository.initialize")
            && let Err(error) = self.refetch(&tokens, resume).await
        {
            debug!(%error, "initial fetch failed");
        }

        self.snapshot()
    }

    /// Refetch every client. Failures are reported, not returned.
    #[tracing::instrument(name = "repository.refresh", skip(self))]
    pub async fn refresh(&self) -> RepositorySnapshot {
        if let Some(tokens) = self.tokens("repository.refresh")
            && let Err(error) = self.refetch(&tokens, None).await
        {
            debug!(%error, "refresh failed, keeping last known clients");
        }

        self.snapshot()
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> RepositorySnapshot {
        self.state.borrow().clone()
    }

    /// Receive every future state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RepositorySnapshot> {
        self.state.subscribe()
    }

    /// All resolved clients.
    #[must_use]
    pub fn clients(&self) -> Vec<ClientConfiguration> {
        self.state.borrow().clients.clone()
    }

    /// The active client.
    #[must_use]
    pub fn active_client(&self) -> Option<ClientConfiguration> {
        self.state.borrow().active_client().cloned()
    }

    /// Make `id` the active client. Unknown ids are ignored and leave the
    /// pointer untouched; the return value says whether the pointer moved.
    pub fn set_active_client(&self, id: &str) -> bool {
        let switched = self.state.send_if_modified(|snapshot| {
            if !snapshot.contains(id) {
                return false;
            }

            snapshot.active_client_id = Some(ClientId::new(id));

            true
        });

        if switched {
            info!(client_id = id, "active client changed");
            self.persist();
        } else {
            debug!(client_id = id, "ignored unknown client");
        }

        switched
    }

    /// Deselect the active client.
    pub fn clear_active_client(&self) {
        self.state.send_modify(|snapshot| snapshot.active_client_id = None);
        self.persist();
    }

    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns the remote failure after reporting it.
    #[tracing::instrument(
        name = "repository.create_client",
        skip(self, client),
        fields(client_name = %client.name, client_id = tracing::field::Empty),
        err
    )]
    pub async fn create_client(
        &self,
        client: NewClient,
    ) -> Result<Option<ClientConfiguration>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.create_client") else {
            return Ok(None);
        };

        let created = self
            .write(&tokens, || self.remote.create_client(&tokens, client))
            .await?;

        Span::current().record("client_id", tracing::field::display(&created.id));

        self.notifier.success("Client created");

        Ok(Some(self.resolved(created)))
    }

    /// Patch a client's own record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::UnknownClient`] for an id not in the
    /// collection, or the remote failure after reporting it.
    #[tracing::instrument(
        name = "repository.update_client",
        skip(self, update),
        fields(client_id = %id),
        err
    )]
    pub async fn update_client(
        &self,
        id: &ClientId,
        update: ClientUpdate,
    ) -> Result<Option<ClientConfiguration>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.update_client") else {
            return Ok(None);
        };

        self.require_client(id)?;

        let updated = self
            .write(&tokens, || self.remote.update_client(&tokens, id.clone(), update))
            .await?;

        self.notifier.success("Client updated");

        Ok(Some(self.resolved(updated)))
    }

    /// Delete a client, clearing the active pointer if it pointed there.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::UnknownClient`] for an id not in the
    /// collection, or the remote failure after reporting it.
    #[tracing::instrument(name = "repository.delete_client", skip(self), fields(client_id = %id), err)]
    pub async fn delete_client(&self, id: &ClientId) -> Result<Option<()>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.delete_client") else {
            return Ok(None);
        };

        self.require_client(id)?;

        self.write(&tokens, || self.remote.delete_client(&tokens, id.clone()))
            .await?;

        let cleared = self.state.send_if_modified(|snapshot| {
            if snapshot.active_client_id.as_ref() != Some(id) {
                return false;
            }

            snapshot.active_client_id = None;

            true
        });

        if cleared {
            info!("deleted the active client, pointer cleared");
            self.persist();
        }

        self.notifier.success("Client deleted");

        Ok(Some(()))
    }

    /// Mark a client active.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::UnknownClient`] for an id not in the
    /// collection, or the remote failure after reporting it.
    #[tracing::instrument(name = "repository.activate_client", skip(self), fields(client_id = %id), err)]
    pub async fn activate_client(&self, id: &ClientId) -> Result<Option<()>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.activate_client") else {
            return Ok(None);
        };

        self.require_client(id)?;

        self.write(&tokens, || self.remote.activate_client(&tokens, id.clone()))
            .await?;

        self.notifier.success("Client activated");

        Ok(Some(()))
    }

    /// Mark a client inactive.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::UnknownClient`] for an id not in the
    /// collection, or the remote failure after reporting it.
    #[tracing::instrument(name = "repository.deactivate_client", skip(self), fields(client_id = %id), err)]
    pub async fn deactivate_client(&self, id: &ClientId) -> Result<Option<()>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.deactivate_client") else {
            return Ok(None);
        };

        self.require_client(id)?;

        self.write(&tokens, || self.remote.deactivate_client(&tokens, id.clone()))
            .await?;

        self.notifier.success("Client deactivated");

        Ok(Some(()))
    }

    /// Add a status to one of the active client's collections.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`] without an active client,
    /// or the remote failure after reporting it.
    #[tracing::instrument(
        name = "repository.add_status",
        skip(self, status),
        fields(kind = ?kind, status_id = tracing::field::Empty),
        err
    )]
    pub async fn add_status(
        &self,
        kind: StatusKind,
        status: NewStatus,
    ) -> Result<Option<StatusId>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.add_status") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        let id = client.statuses_mut(kind).add(status, self.ids.as_ref());

        Span::current().record("status_id", tracing::field::display(&id));

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Status added");

        Ok(Some(id))
    }

    /// Patch a status of the active client.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`], a status catalog error for
    /// an unknown id, or the remote failure after reporting it.
    #[tracing::instrument(
        name = "repository.update_status",
        skip(self, patch),
        fields(kind = ?kind, status_id = id),
        err
    )]
    pub async fn update_status(
        &self,
        kind: StatusKind,
        id: &str,
        patch: StatusPatch,
    ) -> Result<Option<Status>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.update_status") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        let updated = client
            .statuses_mut(kind)
            .update(id, patch)
            .map_err(|error| self.reject(error.into()))?
            .clone();

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Status updated");

        Ok(Some(updated))
    }

    /// Remove a status of the active client. Transitions pointing at it are
    /// left in place and show up in [`ConfigRepository::workflow_report`].
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`], a status catalog error for
    /// an unknown id, or the remote failure after reporting it.
    #[tracing::instrument(
        name = "repository.remove_status",
        skip(self),
        fields(kind = ?kind, status_id = id),
        err
    )]
    pub async fn remove_status(
        &self,
        kind: StatusKind,
        id: &str,
    ) -> Result<Option<Status>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.remove_status") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        let removed = client
            .statuses_mut(kind)
            .remove(id)
            .map_err(|error| self.reject(error.into()))?;

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Status removed");

        Ok(Some(removed))
    }

    /// Reorder a collection of the active client.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`], a status catalog error for
    /// unknown or repeated ids, or the remote failure after reporting it.
    #[tracing::instrument(name = "repository.reorder_statuses", skip(self, ids), fields(kind = ?kind), err)]
    pub async fn reorder_statuses(
        &self,
        kind: StatusKind,
        ids: &[StatusId],
    ) -> Result<Option<()>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.reorder_statuses") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        client
            .statuses_mut(kind)
            .reorder(ids)
            .map_err(|error| self.reject(error.into()))?;

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Statuses reordered");

        Ok(Some(()))
    }

    /// Toggle a feature of the active client.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`],
    /// [`RepositoryError::UnknownFeature`], or the remote failure after
    /// reporting it.
    #[tracing::instrument(name = "repository.set_feature_enabled", skip(self), err)]
    pub async fn set_feature_enabled(
        &self,
        key: &str,
        enabled: bool,
    ) -> Result<Option<()>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.set_feature_enabled") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        if !client.features.set_enabled(key, enabled) {
            return Err(self.reject(RepositoryError::UnknownFeature(key.to_string())));
        }

        self.push_config(&tokens, &client).await?;
        self.notifier.success(if enabled {
            "Feature enabled"
        } else {
            "Feature disabled"
        });

        Ok(Some(()))
    }

    /// Replace a feature's settings on the active client.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`],
    /// [`RepositoryError::UnknownFeature`], or the remote failure after
    /// reporting it.
    #[tracing::instrument(name = "repository.set_feature_settings", skip(self, settings), err)]
    pub async fn set_feature_settings(
        &self,
        key: &str,
        settings: FeatureSettings,
    ) -> Result<Option<()>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.set_feature_settings") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        if !client.features.set_settings(key, settings) {
            return Err(self.reject(RepositoryError::UnknownFeature(key.to_string())));
        }

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Feature settings saved");

        Ok(Some(()))
    }

    /// Append the built-in templates to the active client.
    ///
    /// Importing again appends another copy with fresh ids.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`] or the remote failure after
    /// reporting it.
    #[tracing::instrument(name = "repository.import_default_templates", skip(self), err)]
    pub async fn import_default_templates(&self) -> Result<Option<Vec<TemplateId>>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.import_default_templates") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        let imported = templates::import_defaults(&client.id, self.ids.as_ref(), Timestamp::now());
        let ids: Vec<TemplateId> = imported.iter().map(|template| template.id.clone()).collect();

        client.workflow.message_templates.extend(imported);

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Default templates imported");

        Ok(Some(ids))
    }

    /// Add a template to the active client.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`] or the remote failure after
    /// reporting it.
    #[tracing::instrument(
        name = "repository.add_template",
        skip(self, template),
        fields(template_name = %template.name),
        err
    )]
    pub async fn add_template(
        &self,
        template: NewTemplate,
    ) -> Result<Option<TemplateId>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.add_template") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        let template = MessageTemplate::new(client.id.clone(), template, self.ids.as_ref(), Timestamp::now());
        let id = template.id.clone();

        let undeclared = template.undeclared_variables();

        if !undeclared.is_empty() {
            debug!(?undeclared, "template uses undeclared variables");
        }

        client.workflow.message_templates.push(template);

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Template added");

        Ok(Some(id))
    }

    /// Remove a template from the active client.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`],
    /// [`RepositoryError::UnknownTemplate`], or the remote failure after
    /// reporting it.
    #[tracing::instrument(name = "repository.remove_template", skip(self), err)]
    pub async fn remove_template(&self, id: &str) -> Result<Option<MessageTemplate>, RepositoryError> {
        let Some(tokens) = self.tokens("repository.remove_template") else {
            return Ok(None);
        };

        let mut client = self.require_active()?;

        let Some(index) = client
            .workflow
            .message_templates
            .iter()
            .position(|template| template.id.as_str() == id)
        else {
            return Err(self.reject(RepositoryError::UnknownTemplate(TemplateId::new(id))));
        };

        let removed = client.workflow.message_templates.remove(index);

        self.push_config(&tokens, &client).await?;
        self.notifier.success("Template removed");

        Ok(Some(removed))
    }

    /// Soft faults of one of the active client's collections.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NoActiveClient`] without an active client.
    pub fn workflow_report(&self, kind: StatusKind) -> Result<WorkflowReport, RepositoryError> {
        self.state
            .borrow()
            .active_client()
            .map(|client| workflow::report(client.statuses(kind)))
            .ok_or(RepositoryError::NoActiveClient)
    }

    fn tokens(&self, operation: &'static str) -> Option<SessionTokens> {
        let tokens = self.session.tokens();

        if tokens.is_none() {
            debug!(operation, "skipped, not authenticated");
        }

        tokens
    }

    fn require_active(&self) -> Result<ClientConfiguration, RepositoryError> {
        self.active_client()
            .ok_or_else(|| self.reject(RepositoryError::NoActiveClient))
    }

    fn require_client(&self, id: &ClientId) -> Result<(), RepositoryError> {
        if self.state.borrow().contains(id.as_str()) {
            return Ok(());
        }

        Err(self.reject(RepositoryError::UnknownClient(id.clone())))
    }

    /// Prefer the refetched copy of a client the remote just returned.
    fn resolved(&self, system: SystemClient) -> ClientConfiguration {
        self.state
            .borrow()
            .client(system.id.as_str())
            .cloned()
            .unwrap_or_else(|| resolve_client(system, &self.catalog))
    }

    /// Report a local validation failure.
    fn reject(&self, error: RepositoryError) -> RepositoryError {
        self.notifier.error(&error.user_message());
        error
    }

    /// Report a remote failure and move to the error state.
    fn fail(&self, error: RepositoryError) -> RepositoryError {
        let message = error.user_message();

        warn!(%error, message, "remote call failed");

        self.state.send_modify(|snapshot| {
            snapshot.state = RepositoryState::Error;
            snapshot.last_error = Some(message.clone());
        });

        self.notifier.error(&message);

        error
    }

    /// Move to loading, start a remote write, then refetch everything.
    async fn write<T, F>(
        &self,
        tokens: &SessionTokens,
        call: impl FnOnce() -> F,
    ) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        self.state
            .send_modify(|snapshot| snapshot.state = RepositoryState::Loading);

        let value = call().await.map_err(|error| self.fail(error.into()))?;

        self.refetch(tokens, None).await?;

        Ok(value)
    }

    async fn push_config(
        &self,
        tokens: &SessionTokens,
        client: &ClientConfiguration,
    ) -> Result<(), RepositoryError> {
        self.write(tokens, || {
            self.remote
                .update_client_config(tokens, client.id.clone(), ConfigUpdate::from(client))
        })
        .await
    }

    /// Replace the clients with the remote list.
    ///
    /// The active pointer survives only if it still names a client; `resume`
    /// is tried when nothing is active.
    async fn refetch(
        &self,
        tokens: &SessionTokens,
        resume: Option<ClientId>,
    ) -> Result<(), RepositoryError> {
        self.state
            .send_modify(|snapshot| snapshot.state = RepositoryState::Loading);

        let clients: Vec<ClientConfiguration> = self
            .remote
            .list_clients(tokens)
            .await
            .map_err(|error| self.fail(error.into()))?
            .into_iter()
            .map(|client| resolve_client(client, &self.catalog))
            .collect();

        let client_count = clients.len();

        self.state.send_modify(|snapshot| {
            let candidate = snapshot.active_client_id.take().or(resume);

            snapshot.clients = clients;
            snapshot.active_client_id = candidate.filter(|id| snapshot.contains(id.as_str()));
            snapshot.state = RepositoryState::Ready;
            snapshot.last_error = None;
        });

        info!(client_count, "clients refreshed");

        self.persist();

        Ok(())
    }

    fn persist(&self) {
        let state = {
            let snapshot = self.state.borrow();

            CacheState {
                clients: snapshot.clients.clone(),
                current_client_id: snapshot.active_client_id.clone(),
            }
        };

        if let Err(error) = self.cache.save_envelope(&state.to_envelope()) {
            warn!(%error, "failed to persist cache envelope");
        }

        if let Err(error) = self
            .cache
            .save_active_pointer(state.current_client_id.as_ref())
        {
            warn!(%error, "failed to persist active pointer");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use serde_json::json;
    use testresult::TestResult;

    use atrium::{features::keys, migrations::PersistedCacheEnvelope};

    use crate::{
        cache::MemoryCacheStore,
        remote::MockRemoteAuthority,
        test::{ACME_ID, TestContext, anonymous, authenticated, system_client, tokens},
    };

    use super::*;

    fn listing(clients: Vec<SystemClient>) -> MockRemoteAuthority {
        let mut remote = MockRemoteAuthority::new();

        remote
            .expect_list_clients()
            .returning(move |_| Ok(clients.clone()));

        remote
    }

    fn unavailable() -> RemoteError {
        RemoteError::UnexpectedResponse {
            status: 503,
            message: "maintenance".to_string(),
        }
    }

    #[tokio::test]
    async fn initialize_with_empty_cache_fetches_clients() -> TestResult {
        let ctx = TestContext::new(listing(vec![system_client(ACME_ID, "Acme")]), authenticated());

        let snapshot = ctx.repository.initialize().await;

        assert_eq!(snapshot.state, RepositoryState::Ready);
        assert_eq!(snapshot.clients.len(), 1);
        assert_eq!(snapshot.active_client_id, None);
        assert!(snapshot.last_error.is_none());

        assert!(ctx.repository.set_active_client(ACME_ID));
        assert_eq!(
            ctx.repository.active_client().map(|client| client.name),
            Some("Acme".to_string())
        );
        assert_eq!(ctx.cache.pointer(), Some(ClientId::new(ACME_ID)));

        Ok(())
    }

    #[tokio::test]
    async fn initialize_resumes_the_stored_pointer() -> TestResult {
        let cache = MemoryCacheStore::with_contents(None, Some(ClientId::new(ACME_ID)));

        let ctx = TestContext::with_cache(
            listing(vec![system_client(ACME_ID, "Acme"), system_client("2", "Globex")]),
            authenticated(),
            cache,
        );

        let snapshot = ctx.repository.initialize().await;

        assert_eq!(snapshot.active_client_id, Some(ClientId::new(ACME_ID)));

        Ok(())
    }

    #[tokio::test]
    async fn initialize_drops_a_pointer_to_a_missing_client() -> TestResult {
        let cache = MemoryCacheStore::with_contents(None, Some(ClientId::new("9")));

        let ctx = TestContext::with_cache(listing(vec![system_client(ACME_ID, "Acme")]), authenticated(), cache);

        let snapshot = ctx.repository.initialize().await;

        assert_eq!(snapshot.active_client_id, None);
        assert_eq!(ctx.cache.pointer(), None);

        Ok(())
    }

    #[tokio::test]
    async fn initialize_without_session_serves_the_cache() -> TestResult {
        let cached = CacheState {
            clients: vec![resolve_client(system_client(ACME_ID, "Acme"), &FeatureCatalog::standard())],
            current_client_id: Some(ClientId::new(ACME_ID)),
        };

        let mut remote = MockRemoteAuthority::new();

        remote.expect_list_clients().never();

        let ctx = TestContext::with_cache(
            remote,
            anonymous(),
            MemoryCacheStore::with_contents(Some(cached.to_envelope()), None),
        );

        let snapshot = ctx.repository.initialize().await;

        assert_eq!(snapshot.state, RepositoryState::Uninitialized);
        assert_eq!(snapshot.clients, cached.clients);
        assert_eq!(snapshot.active_client_id, Some(ClientId::new(ACME_ID)));

        Ok(())
    }

    #[tokio::test]
    async fn unmigratable_cache_starts_empty() -> TestResult {
        let envelope = PersistedCacheEnvelope {
            version: 99,
            state: json!({"clients": [{"id": ACME_ID}]}),
        };

        let mut remote = MockRemoteAuthority::new();

        remote.expect_list_clients().never();

        let ctx = TestContext::with_cache(
            remote,
            anonymous(),
            MemoryCacheStore::with_contents(Some(envelope), None),
        );

        let snapshot = ctx.repository.initialize().await;

        assert!(snapshot.clients.is_empty(), "expected an empty cache, got {snapshot:?}");
        assert_eq!(snapshot.active_client_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn refresh_failure_keeps_clients_and_reports() -> TestResult {
        let mut remote = MockRemoteAuthority::new();
        let mut calls = 0;

        remote.expect_list_clients().times(2).returning(move |_| {
            calls += 1;

            if calls == 1 {
                Ok(vec![system_client(ACME_ID, "Acme")])
            } else {
                Err(unavailable())
            }
        });

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;

        let snapshot = ctx.repository.refresh().await;

        assert_eq!(snapshot.state, RepositoryState::Error);
        assert_eq!(snapshot.clients.len(), 1);
        assert_eq!(snapshot.last_error.as_deref(), Some("maintenance"));
        assert_eq!(ctx.notifier.errors(), vec!["maintenance".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn refresh_recovers_from_an_error() -> TestResult {
        let mut remote = MockRemoteAuthority::new();
        let mut calls = 0;

        remote.expect_list_clients().times(3).returning(move |_| {
            calls += 1;

            if calls == 2 {
                Err(unavailable())
            } else {
                Ok(vec![system_client(ACME_ID, "Acme")])
            }
        });

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;

        assert_eq!(ctx.repository.refresh().await.state, RepositoryState::Error);

        let mut updates = ctx.repository.subscribe();
        let snapshot = ctx.repository.refresh().await;

        assert_eq!(snapshot.state, RepositoryState::Ready);
        assert_eq!(snapshot.last_error, None);
        assert_eq!(snapshot.clients.len(), 1);
        assert!(updates.has_changed()?, "retry should publish new state");

        Ok(())
    }

    #[tokio::test]
    async fn mutation_in_flight_is_loading() -> TestResult {
        let observer: Arc<Mutex<Option<watch::Receiver<RepositorySnapshot>>>> = Arc::default();
        let seen = observer.clone();

        let mut remote = listing(vec![system_client(ACME_ID, "Acme")]);

        remote
            .expect_update_client_config()
            .once()
            .return_once(move |_, _, _| {
                let state = seen
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .as_ref()
                    .map(|updates| updates.borrow().state);

                assert_eq!(state, Some(RepositoryState::Loading));

                Ok(())
            });

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;
        ctx.repository.set_active_client(ACME_ID);

        *observer.lock().unwrap_or_else(PoisonError::into_inner) = Some(ctx.repository.subscribe());

        ctx.repository.set_feature_enabled(keys::LEADS, false).await?;

        assert_eq!(ctx.repository.snapshot().state, RepositoryState::Ready);

        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_is_reported_and_returned() -> TestResult {
        let mut remote = listing(vec![system_client(ACME_ID, "Acme")]);

        remote
            .expect_create_client()
            .once()
            .return_once(|_, _| Err(unavailable()));

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;

        let result = ctx
            .repository
            .create_client(NewClient {
                name: "Globex".to_string(),
                company_name: None,
                branding: None,
                settings: None,
            })
            .await;

        assert!(
            matches!(result, Err(RepositoryError::Remote(RemoteError::UnexpectedResponse { status: 503, .. }))),
            "expected Remote, got {result:?}"
        );
        assert_eq!(ctx.repository.snapshot().state, RepositoryState::Error);
        assert_eq!(ctx.notifier.errors().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn mutations_without_session_are_skipped() -> TestResult {
        let mut remote = MockRemoteAuthority::new();

        remote.expect_list_clients().never();
        remote.expect_delete_client().never();

        let ctx = TestContext::new(remote, anonymous());

        let result = ctx.repository.delete_client(&ClientId::new(ACME_ID)).await?;

        assert_eq!(result, None);
        assert!(ctx.notifier.errors().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn deleting_the_active_client_clears_the_pointer() -> TestResult {
        let mut remote = MockRemoteAuthority::new();
        let mut calls = 0;

        remote.expect_list_clients().times(2).returning(move |_| {
            calls += 1;

            if calls == 1 {
                Ok(vec![system_client(ACME_ID, "Acme"), system_client("2", "Globex")])
            } else {
                Ok(vec![system_client("2", "Globex")])
            }
        });

        remote
            .expect_delete_client()
            .once()
            .withf(|session, id| *session == tokens() && id.as_str() == ACME_ID)
            .return_once(|_, _| Ok(()));

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;
        ctx.repository.set_active_client(ACME_ID);

        let result = ctx.repository.delete_client(&ClientId::new(ACME_ID)).await?;

        assert_eq!(result, Some(()));
        assert_eq!(ctx.repository.active_client(), None);
        assert_eq!(ctx.repository.clients().len(), 1);
        assert_eq!(ctx.cache.pointer(), None);
        assert_eq!(ctx.notifier.successes(), vec!["Client deleted".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_clients_are_rejected_locally() -> TestResult {
        let mut remote = listing(vec![system_client(ACME_ID, "Acme")]);

        remote.expect_activate_client().never();

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;

        assert!(!ctx.repository.set_active_client("9"));

        let result = ctx.repository.activate_client(&ClientId::new("9")).await;

        assert!(
            matches!(result, Err(RepositoryError::UnknownClient(_))),
            "expected UnknownClient, got {result:?}"
        );
        assert_eq!(ctx.repository.snapshot().state, RepositoryState::Ready);

        Ok(())
    }

    #[tokio::test]
    async fn config_edits_need_an_active_client() -> TestResult {
        let mut remote = listing(vec![system_client(ACME_ID, "Acme")]);

        remote.expect_update_client_config().never();

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;

        let result = ctx
            .repository
            .add_status(StatusKind::Lead, NewStatus {
                name: "Negotiation".to_string(),
                ..NewStatus::default()
            })
            .await;

        assert!(
            matches!(result, Err(RepositoryError::NoActiveClient)),
            "expected NoActiveClient, got {result:?}"
        );
        assert_eq!(ctx.notifier.errors(), vec!["Select a client first".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn added_status_is_pushed_with_the_full_config() -> TestResult {
        let mut remote = MockRemoteAuthority::new();

        remote
            .expect_list_clients()
            .times(2)
            .returning(|_| Ok(vec![system_client(ACME_ID, "Acme")]));

        remote
            .expect_update_client_config()
            .once()
            .withf(|_, id, config| {
                id.as_str() == ACME_ID
                    && config.lead_statuses.iter().any(|status| status.name == "Negotiation")
                    && !config.task_statuses.is_empty()
                    && !config.payment_statuses.is_empty()
            })
            .return_once(|_, _, _| Ok(()));

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;
        ctx.repository.set_active_client(ACME_ID);

        let id = ctx
            .repository
            .add_status(StatusKind::Lead, NewStatus {
                name: "Negotiation".to_string(),
                ..NewStatus::default()
            })
            .await?;

        assert_eq!(id, Some(StatusId::new("gen-1")));
        assert_eq!(ctx.repository.snapshot().state, RepositoryState::Ready);

        Ok(())
    }

    #[tokio::test]
    async fn partial_reorder_keeps_unlisted_statuses() -> TestResult {
        let mut remote = listing(vec![system_client(ACME_ID, "Acme")]);

        remote
            .expect_update_client_config()
            .once()
            .withf(|_, _, config| {
                let ids: Vec<&str> = config.lead_statuses.iter().map(|status| status.id.as_str()).collect();

                ids == ["lost", "won", "new", "contacted", "qualified", "proposal"]
            })
            .return_once(|_, _, _| Ok(()));

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;
        ctx.repository.set_active_client(ACME_ID);

        let reordered = ctx
            .repository
            .reorder_statuses(StatusKind::Lead, &[StatusId::new("lost"), StatusId::new("won")])
            .await?;

        assert_eq!(reordered, Some(()));

        Ok(())
    }

    #[tokio::test]
    async fn legacy_toggles_are_written_back_structured() -> TestResult {
        let legacy: SystemClient = serde_json::from_value(json!({
            "id": ACME_ID,
            "name": "Acme",
            "config": {"features": {"leads": true, "dialer": false}}
        }))?;

        let mut remote = listing(vec![legacy]);

        remote
            .expect_update_client_config()
            .once()
            .withf(|_, _, config| {
                config.features.get(keys::DIALER).is_some_and(|feature| feature.enabled)
                    && config.features.is_enabled(keys::LEADS)
            })
            .return_once(|_, _, _| Ok(()));

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;
        ctx.repository.set_active_client(ACME_ID);

        let enabled = ctx
            .repository
            .active_client()
            .is_some_and(|client| client.features.is_enabled(keys::DIALER));

        assert!(!enabled, "dialer should start disabled");

        ctx.repository.set_feature_enabled(keys::DIALER, true).await?;

        Ok(())
    }

    #[tokio::test]
    async fn unknown_feature_is_rejected_before_any_call() -> TestResult {
        let mut remote = listing(vec![system_client(ACME_ID, "Acme")]);

        remote.expect_update_client_config().never();

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;
        ctx.repository.set_active_client(ACME_ID);

        let result = ctx.repository.set_feature_enabled("teleport", true).await;

        assert!(
            matches!(result, Err(RepositoryError::UnknownFeature(ref key)) if key == "teleport"),
            "expected UnknownFeature, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn importing_templates_pushes_the_defaults() -> TestResult {
        let mut remote = listing(vec![system_client(ACME_ID, "Acme")]);

        remote
            .expect_update_client_config()
            .once()
            .withf(|_, _, config| {
                !config.message_templates.is_empty()
                    && config
                        .message_templates
                        .iter()
                        .all(|template| template.client_id.as_str() == ACME_ID)
            })
            .return_once(|_, _, _| Ok(()));

        let ctx = TestContext::new(remote, authenticated());

        ctx.repository.initialize().await;
        ctx.repository.set_active_client(ACME_ID);

        let imported = ctx.repository.import_default_templates().await?;

        assert!(
            imported.is_some_and(|ids| !ids.is_empty()),
            "expected imported template ids"
        );

        Ok(())
    }

    #[tokio::test]
    async fn refetch_persists_the_cache() -> TestResult {
        let ctx = TestContext::new(listing(vec![system_client(ACME_ID, "Acme")]), authenticated());

        ctx.repository.initialize().await;

        let envelope = ctx.cache.envelope().ok_or("envelope was not written")?;
        let state = CacheState::from_envelope(envelope)?;

        assert_eq!(state.clients, ctx.repository.clients());

        Ok(())
    }

    #[tokio::test]
    async fn subscribers_see_the_ready_state() -> TestResult {
        let ctx = TestContext::new(listing(vec![system_client(ACME_ID, "Acme")]), authenticated());

        let mut updates = ctx.repository.subscribe();

        ctx.repository.initialize().await;

        assert!(updates.has_changed()?, "expected a published update");
        assert_eq!(updates.borrow_and_update().state, RepositoryState::Ready);

        Ok(())
    }

    #[test]
    fn workflow_report_needs_an_active_client() {
        let ctx = TestContext::new(MockRemoteAuthority::new(), anonymous());

        let result = ctx.repository.workflow_report(StatusKind::Lead);

        assert!(
            matches!(result, Err(RepositoryError::NoActiveClient)),
            "expected NoActiveClient, got {result:?}"
        );
    }
}
