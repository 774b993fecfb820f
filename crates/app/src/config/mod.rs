//! Application configuration module

use std::sync::Arc;

use clap::Args;

use atrium::ids::UuidIdGenerator;
use atrium_app::{
    cache::FileCacheStore,
    notifications::TracingNotifier,
    remote::{HttpRemoteAuthority, RemoteConfig},
    repository::ConfigRepository,
    session::StaticSession,
};

use crate::config::{
    cache::CacheConfig,
    observability::LoggingConfig,
    remote::{RemoteSettings, SessionConfig},
};

pub(crate) mod cache;
pub(crate) mod observability;
pub(crate) mod remote;

/// Settings shared by every command.
#[derive(Debug, Args)]
pub(crate) struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Remote authority settings.
    #[command(flatten)]
    pub remote: RemoteSettings,

    /// Session tokens.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Local cache settings.
    #[command(flatten)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Wire a repository from the configured collaborators.
    pub(crate) fn repository(&self) -> ConfigRepository {
        ConfigRepository::new(
            Arc::new(HttpRemoteAuthority::new(RemoteConfig {
                base_url: self.remote.api_url.clone(),
            })),
            Arc::new(StaticSession::new(
                self.session.access_token.clone(),
                self.session.client_token.clone(),
            )),
            Arc::new(FileCacheStore::new(self.cache.cache_path.clone())),
            Arc::new(TracingNotifier),
            Arc::new(UuidIdGenerator),
        )
    }
}
