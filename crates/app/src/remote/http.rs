//! JSON-over-HTTP remote authority.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};

use atrium::clients::{ClientId, ClientUpdate, ConfigUpdate, NewClient, SystemClient};

use crate::{
    remote::{RemoteAuthority, RemoteError},
    session::SessionTokens,
};

/// Header carrying the tenant-scoped client token.
const CLIENT_TOKEN_HEADER: &str = "X-Client-Token";

/// Configuration for connecting to the remote authority.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API base URL, e.g. `"https://crm.example.com/api"`.
    pub base_url: String,
}

/// HTTP client for the tenant resource collection.
#[derive(Debug, Clone)]
pub struct HttpRemoteAuthority {
    config: RemoteConfig,
    http: Client,
}

/// Bodies arrive either bare or wrapped in a `data` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl HttpRemoteAuthority {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|error| RemoteError::InvalidUrl(format!("{}: {error}", self.config.base_url)))?;

        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .push("clients")
            .extend(segments);

        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        tokens: &SessionTokens,
        segments: &[&str],
    ) -> Result<RequestBuilder, RemoteError> {
        Ok(self
            .http
            .request(method, self.url(segments)?)
            .bearer_auth(tokens.access_token())
            .header(CLIENT_TOKEN_HEADER, tokens.client_token()))
    }

    async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| text.trim().to_string());

        Err(RemoteError::UnexpectedResponse {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
        let payload: Payload<T> = Self::send(request).await?.json().await?;

        Ok(payload.into_inner())
    }
}

#[async_trait]
impl RemoteAuthority for HttpRemoteAuthority {
    #[tracing::instrument(name = "remote.list_clients", skip(self, tokens), err)]
    async fn list_clients(&self, tokens: &SessionTokens) -> Result<Vec<SystemClient>, RemoteError> {
        Self::json(self.request(Method::GET, tokens, &[])?).await
    }

    #[tracing::instrument(
        name = "remote.create_client",
        skip(self, tokens, client),
        fields(client_name = %client.name),
        err
    )]
    async fn create_client(
        &self,
        tokens: &SessionTokens,
        client: NewClient,
    ) -> Result<SystemClient, RemoteError> {
        Self::json(self.request(Method::POST, tokens, &[])?.json(&client)).await
    }

    #[tracing::instrument(
        name = "remote.update_client",
        skip(self, tokens, update),
        fields(client_id = %id),
        err
    )]
    async fn update_client(
        &self,
        tokens: &SessionTokens,
        id: ClientId,
        update: ClientUpdate,
    ) -> Result<SystemClient, RemoteError> {
        Self::json(
            self.request(Method::PATCH, tokens, &[id.as_str()])?
                .json(&update),
        )
        .await
    }

    #[tracing::instrument(name = "remote.delete_client", skip(self, tokens), fields(client_id = %id), err)]
    async fn delete_client(&self, tokens: &SessionTokens, id: ClientId) -> Result<(), RemoteError> {
        Self::send(self.request(Method::DELETE, tokens, &[id.as_str()])?).await?;

        Ok(())
    }

    #[tracing::instrument(name = "remote.activate_client", skip(self, tokens), fields(client_id = %id), err)]
    async fn activate_client(
        &self,
        tokens: &SessionTokens,
        id: ClientId,
    ) -> Result<(), RemoteError> {
        Self::send(self.request(Method::POST, tokens, &[id.as_str(), "activate"])?).await?;

        Ok(())
    }

    #[tracing::instrument(name = "remote.deactivate_client", skip(self, tokens), fields(client_id = %id), err)]
    async fn deactivate_client(
        &self,
        tokens: &SessionTokens,
        id: ClientId,
    ) -> Result<(), RemoteError> {
        Self::send(self.request(Method::POST, tokens, &[id.as_str(), "deactivate"])?).await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "remote.update_client_config",
        skip(self, tokens, config),
        fields(client_id = %id),
        err
    )]
    async fn update_client_config(
        &self,
        tokens: &SessionTokens,
        id: ClientId,
        config: ConfigUpdate,
    ) -> Result<(), RemoteError> {
        Self::send(
            self.request(Method::PUT, tokens, &[id.as_str(), "config"])?
                .json(&config),
        )
        .await?;

        Ok(())
    }
}
