//! Authentication session state machine
//!
//! Owns the in-memory credential state, drives the validation handshake
//! through the backoff schedule, and mirrors issued tokens into the secure
//! store. All mutating access runs behind a single async lock so concurrent
//! callers queue instead of racing: a second `authenticate()` either waits
//! for the first to finish or observes its completed result.

use std::sync::Arc;

use nudgekit_common::BackoffPolicy;
use nudgekit_domain::{Credentials, NudgeKitError};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::ports::{AccountValidator, TokenStore};

/// Secure-store key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Secure-store key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

struct SessionState {
    phase: AuthPhase,
    credentials: Credentials,
}

/// Serialized owner of the credential lifecycle.
pub struct AuthSession {
    validator: Arc<dyn AccountValidator>,
    store: Arc<dyn TokenStore>,
    backoff: BackoffPolicy,
    state: Mutex<SessionState>,
}

impl AuthSession {
    /// Create a session with the default backoff schedule.
    #[must_use]
    pub fn new(validator: Arc<dyn AccountValidator>, store: Arc<dyn TokenStore>) -> Self {
        Self::with_backoff(validator, store, BackoffPolicy::default())
    }

    /// Create a session with a custom backoff schedule.
    #[must_use]
    pub fn with_backoff(
        validator: Arc<dyn AccountValidator>,
        store: Arc<dyn TokenStore>,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            validator,
            store,
            backoff,
            state: Mutex::new(SessionState {
                phase: AuthPhase::Unauthenticated,
                credentials: Credentials::default(),
            }),
        }
    }

    /// Perform the account-validation handshake.
    ///
    /// Idempotent: a no-op success when already authenticated with a cached
    /// token. Otherwise makes up to 4 attempts (1 initial + 3 retries) with
    /// the scheduled delays between them. Retryable failures (connectivity,
    /// 5xx) are absorbed until the budget is exhausted; credential rejection
    /// and other terminal errors propagate immediately.
    ///
    /// # Errors
    ///
    /// Returns [`NudgeKitError::AuthenticationFailed`] on 401/403,
    /// [`NudgeKitError::ServerError`] when the budget is exhausted on 5xx,
    /// the transport error for exhausted connectivity failures, and
    /// [`NudgeKitError::Storage`] if persisting an issued token pair fails.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<(), NudgeKitError> {
        let mut state = self.state.lock().await;

        if state.phase == AuthPhase::Authenticated && state.credentials.has_access_token() {
            debug!("Already authenticated, skipping handshake");
            return Ok(());
        }

        state.phase = AuthPhase::Authenticating;

        let total_attempts = self.backoff.max_retries() + 1;
        let mut last_error: Option<NudgeKitError> = None;

        for attempt in 0..total_attempts {
            if attempt > 0 {
                // Backoff suspension point. The session lock stays with this
                // call, queueing concurrent callers behind the handshake.
                if let Some(delay) = self.backoff.delay_for_retry(attempt - 1) {
                    debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying handshake");
                    tokio::time::sleep(delay).await;
                }
            }

            match self.validator.validate_account().await {
                Ok(tokens) => {
                    // Write-then-cache: the in-memory copy must never get
                    // ahead of the durable one.
                    self.store.save(ACCESS_TOKEN_KEY, &tokens.access_token).map_err(|e| {
                        state.phase = AuthPhase::Unauthenticated;
                        NudgeKitError::from(e)
                    })?;
                    self.store.save(REFRESH_TOKEN_KEY, &tokens.refresh_token).map_err(|e| {
                        state.phase = AuthPhase::Unauthenticated;
                        NudgeKitError::from(e)
                    })?;

                    state.credentials.access_token = Some(tokens.access_token);
                    state.credentials.refresh_token = Some(tokens.refresh_token);
                    state.phase = AuthPhase::Authenticated;

                    info!(attempt, "Account validated");
                    return Ok(());
                }
                Err(err) if err.should_retry() => {
                    warn!(attempt, error = %err, "Handshake attempt failed, will retry");
                    last_error = Some(err);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "Handshake failed terminally");
                    state.phase = AuthPhase::Unauthenticated;
                    return Err(err);
                }
            }
        }

        state.phase = AuthPhase::Unauthenticated;
        Err(last_error.unwrap_or(NudgeKitError::InvalidResponse))
    }

    /// Return the cached access token.
    ///
    /// Falls back to one secure-store read on an in-memory miss (cold-start
    /// recovery after a process restart) and caches the result. Never
    /// triggers authentication: callers observing `NoAccessToken` must call
    /// [`Self::authenticate`] explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`NudgeKitError::NoAccessToken`] when no credential is cached
    /// or stored.
    pub async fn get_access_token(&self) -> Result<String, NudgeKitError> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.credentials.access_token.clone() {
            return Ok(token);
        }

        // Cold-start recovery: refill the cache from the durable copy.
        let stored = match self.store.get(ACCESS_TOKEN_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "Secure-store read failed, treating as missing token");
                None
            }
        };

        match stored {
            Some(token) => {
                state.credentials.access_token = Some(token.clone());
                if let Ok(refresh) = self.store.get(REFRESH_TOKEN_KEY) {
                    state.credentials.refresh_token = refresh;
                }
                state.phase = AuthPhase::Authenticated;
                debug!("Recovered access token from secure store");
                Ok(token)
            }
            None => Err(NudgeKitError::NoAccessToken),
        }
    }

    /// True when a token is cached in memory.
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.credentials.has_access_token()
    }

    /// Delete both secrets and wipe the in-memory credentials (logout).
    ///
    /// # Errors
    ///
    /// Returns [`NudgeKitError::Storage`] if the secure store fails.
    #[instrument(skip(self))]
    pub async fn clear_tokens(&self) -> Result<(), NudgeKitError> {
        let mut state = self.state.lock().await;

        self.store.delete(ACCESS_TOKEN_KEY)?;
        self.store.delete(REFRESH_TOKEN_KEY)?;

        state.credentials = Credentials::default();
        state.phase = AuthPhase::Unauthenticated;

        info!("Tokens cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use nudgekit_domain::{StorageError, TokenPair};
    use tokio::time::Instant;

    use super::*;

    #[derive(Default)]
    struct MemoryTokenStore {
        secrets: StdMutex<HashMap<String, String>>,
        fail_writes: bool,
    }

    impl MemoryTokenStore {
        fn failing() -> Self {
            Self { secrets: StdMutex::new(HashMap::new()), fail_writes: true }
        }

        fn seeded(key: &str, value: &str) -> Self {
            let store = Self::default();
            store.secrets.lock().unwrap().insert(key.to_string(), value.to_string());
            store
        }

        fn contains(&self, key: &str) -> bool {
            self.secrets.lock().unwrap().contains_key(key)
        }
    }

    impl TokenStore for MemoryTokenStore {
        fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Keychain("write denied".to_string()));
            }
            self.secrets.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.secrets.lock().unwrap().get(key).cloned())
        }

        fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.secrets.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct ScriptedValidator {
        responses: StdMutex<Vec<Result<TokenPair, NudgeKitError>>>,
        calls: StdMutex<u32>,
    }

    impl ScriptedValidator {
        fn new(responses: Vec<Result<TokenPair, NudgeKitError>>) -> Self {
            Self { responses: StdMutex::new(responses), calls: StdMutex::new(0) }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl AccountValidator for ScriptedValidator {
        async fn validate_account(&self) -> Result<TokenPair, NudgeKitError> {
            *self.calls.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(NudgeKitError::InvalidResponse)
            } else {
                responses.remove(0)
            }
        }
    }

    fn token_pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair { access_token: access.to_string(), refresh_token: refresh.to_string() }
    }

    #[tokio::test]
    async fn successful_handshake_persists_and_caches_tokens() {
        let validator = Arc::new(ScriptedValidator::new(vec![Ok(token_pair("A", "B"))]));
        let store = Arc::new(MemoryTokenStore::default());
        let session = AuthSession::new(validator.clone(), store.clone());

        session.authenticate().await.unwrap();

        assert_eq!(session.get_access_token().await.unwrap(), "A");
        assert!(store.contains(ACCESS_TOKEN_KEY));
        assert!(store.contains(REFRESH_TOKEN_KEY));
        assert_eq!(validator.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn all_server_errors_exhaust_four_attempts_with_scheduled_delays() {
        let validator = Arc::new(ScriptedValidator::new(vec![
            Err(NudgeKitError::ServerError(500)),
            Err(NudgeKitError::ServerError(502)),
            Err(NudgeKitError::ServerError(503)),
            Err(NudgeKitError::ServerError(500)),
        ]));
        let store = Arc::new(MemoryTokenStore::default());
        let session = AuthSession::new(validator.clone(), store);

        let started = Instant::now();
        let result = session.authenticate().await;

        assert!(matches!(result, Err(NudgeKitError::ServerError(500))));
        assert_eq!(validator.call_count(), 4);
        // 1s + 2s + 4s of scheduled backoff, no delay after the last attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn credential_rejection_stops_immediately() {
        let validator = Arc::new(ScriptedValidator::new(vec![
            Err(NudgeKitError::ServerError(500)),
            Err(NudgeKitError::AuthenticationFailed),
            Ok(token_pair("A", "B")),
        ]));
        let store = Arc::new(MemoryTokenStore::default());
        let session = AuthSession::new(validator.clone(), store);

        let started = Instant::now();
        let result = session.authenticate().await;

        assert!(matches!(result, Err(NudgeKitError::AuthenticationFailed)));
        assert_eq!(validator.call_count(), 2);
        // Only the first retry delay elapsed; no delay after the rejection.
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert!(matches!(
            session.get_access_token().await,
            Err(NudgeKitError::NoAccessToken)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_network_failure_recovers_on_later_attempt() {
        let validator = Arc::new(ScriptedValidator::new(vec![
            Err(NudgeKitError::Network("connection refused".to_string())),
            Err(NudgeKitError::Network("timed out".to_string())),
            Ok(token_pair("A", "B")),
        ]));
        let store = Arc::new(MemoryTokenStore::default());
        let session = AuthSession::new(validator.clone(), store);

        session.authenticate().await.unwrap();
        assert_eq!(validator.call_count(), 3);
    }

    #[tokio::test]
    async fn authenticate_is_idempotent_once_authenticated() {
        let validator = Arc::new(ScriptedValidator::new(vec![Ok(token_pair("A", "B"))]));
        let store = Arc::new(MemoryTokenStore::default());
        let session = AuthSession::new(validator.clone(), store);

        session.authenticate().await.unwrap();
        session.authenticate().await.unwrap();

        assert_eq!(validator.call_count(), 1);
    }

    #[tokio::test]
    async fn cold_start_recovers_token_from_store() {
        let validator = Arc::new(ScriptedValidator::new(vec![]));
        let store = Arc::new(MemoryTokenStore::seeded(ACCESS_TOKEN_KEY, "persisted"));
        let session = AuthSession::new(validator.clone(), store);

        assert_eq!(session.get_access_token().await.unwrap(), "persisted");
        assert!(session.is_authenticated().await);
        assert_eq!(validator.call_count(), 0);
    }

    #[tokio::test]
    async fn clear_tokens_wipes_memory_and_store() {
        let validator = Arc::new(ScriptedValidator::new(vec![Ok(token_pair("A", "B"))]));
        let store = Arc::new(MemoryTokenStore::default());
        let session = AuthSession::new(validator, store.clone());

        session.authenticate().await.unwrap();
        session.clear_tokens().await.unwrap();

        assert!(matches!(
            session.get_access_token().await,
            Err(NudgeKitError::NoAccessToken)
        ));
        assert!(!store.contains(ACCESS_TOKEN_KEY));
        assert!(!store.contains(REFRESH_TOKEN_KEY));
    }

    #[tokio::test]
    async fn store_write_failure_surfaces_and_leaves_session_unauthenticated() {
        let validator = Arc::new(ScriptedValidator::new(vec![Ok(token_pair("A", "B"))]));
        let store = Arc::new(MemoryTokenStore::failing());
        let session = AuthSession::new(validator, store);

        let result = session.authenticate().await;

        assert!(matches!(result, Err(NudgeKitError::Storage(_))));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn concurrent_authenticate_calls_share_one_handshake() {
        let validator = Arc::new(ScriptedValidator::new(vec![Ok(token_pair("A", "B"))]));
        let store = Arc::new(MemoryTokenStore::default());
        let session = Arc::new(AuthSession::new(validator.clone(), store));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.authenticate().await }
        });
        let second = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.authenticate().await }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(validator.call_count(), 1);
    }
}
