//! Campaign backend client
//!
//! Implements the [`AccountValidator`] and [`CampaignTransport`] ports over
//! HTTP. Every request carries a 15s budget independent of the retry
//! schedule; retry decisions belong to the callers in `nudgekit-core`, so
//! this client performs exactly one attempt per call and maps the outcome
//! onto the shared error taxonomy.

use async_trait::async_trait;
use nudgekit_core::{AccountValidator, CampaignTransport};
use nudgekit_domain::{
    NudgeKitError, PendingCsatResponse, PendingEvent, PendingUserAttributes, SdkConfig, TokenPair,
};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Account identity and endpoint configuration
    pub sdk: SdkConfig,
}

impl ApiClientConfig {
    /// Wrap an [`SdkConfig`].
    #[must_use]
    pub fn new(sdk: SdkConfig) -> Self {
        Self { sdk }
    }
}

/// HTTP client for the campaign backend.
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiClientConfig,
}

#[derive(Debug, Serialize)]
struct ValidateAccountRequest<'a> {
    account_id: &'a str,
    app_id: &'a str,
}

#[derive(Debug, Serialize)]
struct EventsRequest<'a> {
    events: &'a [PendingEvent],
}

#[derive(Debug, Serialize)]
struct CsatRequest<'a> {
    responses: &'a [PendingCsatResponse],
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`NudgeKitError::InvalidUrl`] for an unparseable base URL and
    /// [`NudgeKitError::Network`] if the HTTP client cannot be built.
    pub fn new(config: ApiClientConfig) -> Result<Self, NudgeKitError> {
        // Fail fast on a malformed base URL - this is a configuration bug,
        // not a transport condition.
        Url::parse(&config.sdk.base_url)
            .map_err(|e| NudgeKitError::InvalidUrl(format!("{}: {e}", config.sdk.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(config.sdk.request_timeout)
            .build()
            .map_err(|e| NudgeKitError::Network(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.sdk.base_url.trim_end_matches('/'), path)
    }

    async fn post_authed<T: Serialize + ?Sized>(
        &self,
        path: &str,
        access_token: &str,
        body: &T,
    ) -> Result<(), NudgeKitError> {
        let url = self.endpoint(path);
        debug!(url = %url, "Submitting records");

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            warn!(url = %url, status = status.as_u16(), "Submission rejected");
            Err(NudgeKitError::from_status(status.as_u16()))
        }
    }
}

#[async_trait]
impl AccountValidator for ApiClient {
    #[instrument(skip(self))]
    async fn validate_account(&self) -> Result<TokenPair, NudgeKitError> {
        let url = self.endpoint("validate-account");
        let body = ValidateAccountRequest {
            account_id: &self.config.sdk.account_id,
            app_id: &self.config.sdk.app_id,
        };

        debug!(url = %url, "Validating account");

        let response: Response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            StatusCode::OK => {
                let tokens: TokenPair =
                    response.json().await.map_err(|_| NudgeKitError::InvalidResponse)?;
                debug!("Account validated, token pair issued");
                Ok(tokens)
            }
            status => {
                warn!(status = status.as_u16(), "Account validation rejected");
                Err(NudgeKitError::from_status(status.as_u16()))
            }
        }
    }
}

#[async_trait]
impl CampaignTransport for ApiClient {
    #[instrument(skip(self, access_token, events), fields(count = events.len()))]
    async fn send_events(
        &self,
        access_token: &str,
        events: &[PendingEvent],
    ) -> Result<(), NudgeKitError> {
        self.post_authed("events", access_token, &EventsRequest { events }).await
    }

    #[instrument(skip(self, access_token, responses), fields(count = responses.len()))]
    async fn send_csat(
        &self,
        access_token: &str,
        responses: &[PendingCsatResponse],
    ) -> Result<(), NudgeKitError> {
        self.post_authed("csat-responses", access_token, &CsatRequest { responses }).await
    }

    #[instrument(skip(self, access_token, snapshot), fields(user_id = %snapshot.user_id))]
    async fn send_user_attributes(
        &self,
        access_token: &str,
        snapshot: &PendingUserAttributes,
    ) -> Result<(), NudgeKitError> {
        self.post_authed("user-attributes", access_token, snapshot).await
    }
}

/// Map transport-layer failures onto the taxonomy: connectivity problems
/// (timeout, refused, DNS) are retryable network errors; undecodable bodies
/// are terminal.
fn map_transport_error(err: reqwest::Error) -> NudgeKitError {
    if err.is_decode() {
        NudgeKitError::InvalidResponse
    } else {
        NudgeKitError::Network(err.to_string())
    }
}
