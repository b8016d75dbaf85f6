//! Chef server REST client
//!
//! Implements [`Gateway`] over the Chef server HTTP API. Requests are signed
//! with the configured client key and bounded by the configured timeout.
//! Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument};

use chef_provider::entity::{EntityKind, Locator, RemoteEntity};
use chef_provider::error::{ProviderError, ProviderResult};
use chef_provider::gateway::Gateway;

use crate::config::ChefConfig;
use crate::signing::RequestSigner;

/// Version reported in `X-Chef-Version`.
const CHEF_VERSION: &str = "18.0.0";

/// Chef server API client.
pub struct ChefClient {
    config: ChefConfig,
    client: Client,
    signer: RequestSigner,
}

impl std::fmt::Debug for ChefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefClient")
            .field("config", &self.config.redacted())
            .finish_non_exhaustive()
    }
}

impl ChefClient {
    /// Create a client from a validated configuration.
    pub fn new(config: ChefConfig) -> ProviderResult<Self> {
        config.validate()?;

        let key = config.resolved_key().ok_or_else(|| {
            ProviderError::invalid_configuration("key_material or private_key_pem is required")
        })?;
        let signer = RequestSigner::new(config.client_name.clone(), key)?;
        let client = Self::build_client(&config)?;

        Ok(Self {
            config,
            client,
            signer,
        })
    }

    pub fn config(&self) -> &ChefConfig {
        &self.config
    }

    fn build_client(config: &ChefConfig) -> ProviderResult<Client> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.request_timeout_secs));

        if config.allow_unverified_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|e| {
            ProviderError::invalid_configuration(format!("Failed to build HTTP client: {e}"))
        })
    }

    /// Sign and send one request.
    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> ProviderResult<Response> {
        let url = self.config.url(path);
        let parsed = url::Url::parse(&url)
            .map_err(|e| ProviderError::invalid_configuration(format!("invalid request URL {url}: {e}")))?;

        let body = body.unwrap_or_default();
        let auth_headers = self.signer.sign(method.as_str(), parsed.path(), &body)?;

        let mut request = self
            .client
            .request(method.clone(), parsed)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Chef-Version", CHEF_VERSION);
        for (name, value) in auth_headers {
            request = request.header(name, value);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        debug!(method = %method, url = %url, "Sending Chef request");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::RequestTimeout {
                    timeout_secs: self.config.request_timeout_secs,
                }
            } else {
                ProviderError::transport_with_source(format!("Request failed: {method} {url}"), e)
            }
        })?;

        debug!(url = %url, status = %response.status(), "Received Chef response");
        Ok(response)
    }

    /// Turn a non-2xx response into an error.
    async fn check(&self, response: Response, kind: EntityKind, name: &str) -> ProviderResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(handle_response_error(status, &body, kind, name))
    }

    async fn decode<E: RemoteEntity>(&self, response: Response, locator: &Locator) -> ProviderResult<E> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::transport_with_source("Failed to read response body", e))?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            ProviderError::serialization(format!("Failed to parse response for {locator}"), e)
        })?;

        E::from_response(locator, body).map_err(|e| {
            ProviderError::serialization(format!("Unexpected response shape for {locator}"), e)
        })
    }

    fn encode<E: RemoteEntity>(entity: &E, locator: &Locator) -> ProviderResult<Vec<u8>> {
        serde_json::to_vec(entity)
            .map_err(|e| ProviderError::serialization(format!("Failed to encode {locator}"), e))
    }
}

/// Map a failed response to an error.
///
/// Chef reports failures as `{"error": [...]}` or `{"error": "..."}`.
fn handle_response_error(status: StatusCode, body: &str, kind: EntityKind, name: &str) -> ProviderError {
    if status == StatusCode::NOT_FOUND {
        return ProviderError::not_found(kind, name);
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| match json.get("error") {
            Some(Value::String(message)) => Some(message.clone()),
            Some(Value::Array(messages)) => Some(
                messages
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        })
        .unwrap_or_else(|| body.to_string());

    ProviderError::Remote {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Gateway for ChefClient {
    #[instrument(skip_all, fields(locator = %locator))]
    async fn get<E: RemoteEntity>(&self, locator: &Locator) -> ProviderResult<E> {
        let response = self.send(Method::GET, &locator.path(), None).await?;
        let response = self.check(response, locator.kind(), locator.name()).await?;
        self.decode(response, locator).await
    }

    #[instrument(skip_all, fields(locator = %locator))]
    async fn create<E: RemoteEntity>(&self, locator: &Locator, entity: &E) -> ProviderResult<E> {
        let body = Self::encode(entity, locator)?;
        let response = self
            .send(Method::POST, &locator.collection_path(), Some(body))
            .await?;
        self.check(response, locator.kind(), locator.name()).await?;

        info!(locator = %locator, "Chef entity created");
        Ok(entity.clone())
    }

    #[instrument(skip_all, fields(locator = %locator))]
    async fn update<E: RemoteEntity>(&self, locator: &Locator, entity: &E) -> ProviderResult<E> {
        let body = Self::encode(entity, locator)?;
        let response = self.send(Method::PUT, &locator.path(), Some(body)).await?;
        let response = self.check(response, locator.kind(), locator.name()).await?;

        info!(locator = %locator, "Chef entity updated");
        self.decode(response, locator).await
    }

    #[instrument(skip_all, fields(locator = %locator))]
    async fn delete(&self, locator: &Locator) -> ProviderResult<()> {
        let response = self.send(Method::DELETE, &locator.path(), None).await?;
        self.check(response, locator.kind(), locator.name()).await?;

        info!(locator = %locator, "Chef entity deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_auxiliary(&self, name: &str) -> ProviderResult<()> {
        let locator = Locator::new(EntityKind::Client, name);
        let response = self.send(Method::DELETE, &locator.path(), None).await?;
        self.check(response, EntityKind::Client, name).await?;

        info!(client = %name, "Chef client deleted");
        Ok(())
    }
}
