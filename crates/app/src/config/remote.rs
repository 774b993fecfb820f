//! Remote Authority Config

use clap::Args;

/// Remote authority settings.
#[derive(Debug, Args)]
pub(crate) struct RemoteSettings {
    /// Base URL of the tenant API
    #[arg(long, env = "ATRIUM_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,
}

/// Session tokens; both are required for remote calls.
#[derive(Debug, Args)]
pub(crate) struct SessionConfig {
    /// Bearer access token
    #[arg(long, env = "ATRIUM_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Tenant-scoped client token
    #[arg(long, env = "ATRIUM_CLIENT_TOKEN", hide_env_values = true)]
    pub client_token: Option<String>,
}
