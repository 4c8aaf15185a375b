//! Session lifecycle for the configured Bluesky identity
//!
//! The session is created lazily, refreshed proactively when the access token
//! gets within [`EXPIRY_MARGIN_SECS`] of expiry, and dropped on demand after the
//! service rejects a token. All transitions happen under one async mutex, so
//! concurrent callers share a single in-flight create/refresh.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::BlueskyError;
use super::token;
use super::xrpc::{CREATE_SESSION, REFRESH_SESSION, XrpcClient, XrpcRequest};
use crate::config::Config;

/// Renew tokens this long before their declared expiry
pub const EXPIRY_MARGIN_SECS: i64 = 5 * 60;

/// Anything that can hand out a bearer token and forget it on rejection
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// A currently usable access token
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, BlueskyError>;

    /// Drop the current session so the next call authenticates from scratch
    async fn invalidate(&self);
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    access_jwt: String,
    refresh_jwt: String,
    did: String,
    handle: String,
}

/// Access/refresh pair; always replaced as a whole
#[derive(Clone)]
struct Session {
    access_jwt: String,
    refresh_jwt: String,
    access_expires_at: Option<DateTime<Utc>>,
    refresh_expires_at: Option<DateTime<Utc>>,
    did: String,
    handle: String,
}

impl From<SessionResponse> for Session {
    fn from(response: SessionResponse) -> Self {
        Self {
            access_expires_at: token::expires_at(&response.access_jwt),
            refresh_expires_at: token::expires_at(&response.refresh_jwt),
            access_jwt: response.access_jwt,
            refresh_jwt: response.refresh_jwt,
            did: response.did,
            handle: response.handle,
        }
    }
}

impl Session {
    fn access_is_fresh(&self, now: DateTime<Utc>) -> bool {
        !token::expires_within(self.access_expires_at, now, margin())
    }

    fn refresh_is_fresh(&self, now: DateTime<Utc>) -> bool {
        !token::expires_within(self.refresh_expires_at, now, margin())
    }
}

fn margin() -> Duration {
    Duration::seconds(EXPIRY_MARGIN_SECS)
}

/// Owner of the one live session for the configured identity
pub struct SessionManager {
    xrpc: Arc<XrpcClient>,
    identifier: Option<String>,
    app_password: Option<String>,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    /// Construct without touching the network
    pub fn new(xrpc: Arc<XrpcClient>, config: &Config) -> Self {
        Self {
            xrpc,
            identifier: config.identifier.clone(),
            app_password: config.app_password.clone(),
            session: Mutex::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.identifier.is_some() && self.app_password.is_some()
    }

    /// Return a usable access token, creating or renewing the session first if needed
    pub async fn valid_access_token(
        &self,
        cancel: &CancellationToken,
    ) -> Result<String, BlueskyError> {
        let mut guard = self.session.lock().await;
        let now = Utc::now();

        if let Some(session) = guard.as_ref() {
            if session.access_is_fresh(now) {
                return Ok(session.access_jwt.clone());
            }
        }

        let renewed = match guard.as_ref() {
            Some(session) if session.refresh_is_fresh(now) => {
                self.refresh_or_recreate(&session.refresh_jwt, cancel).await?
            }
            Some(_) => {
                debug!("Refresh token near expiry, authenticating from scratch");
                self.create_session(cancel).await?
            }
            None => self.create_session(cancel).await?,
        };

        let access_jwt = renewed.access_jwt.clone();
        *guard = Some(renewed);
        Ok(access_jwt)
    }

    /// Forget the current session entirely
    pub async fn invalidate(&self) {
        if self.session.lock().await.take().is_some() {
            debug!("Bluesky session invalidated");
        }
    }

    /// DID of the authenticated account, if a session is live
    pub async fn current_did(&self) -> Option<String> {
        self.session.lock().await.as_ref().map(|s| s.did.clone())
    }

    async fn create_session(&self, cancel: &CancellationToken) -> Result<Session, BlueskyError> {
        let identifier = self
            .identifier
            .as_deref()
            .ok_or_else(|| BlueskyError::Config("BLUESKY_IDENTIFIER is not set".to_string()))?;
        let password = self
            .app_password
            .as_deref()
            .ok_or_else(|| BlueskyError::Config("BLUESKY_APP_PASSWORD is not set".to_string()))?;

        let request = XrpcRequest::procedure(CREATE_SESSION).json(serde_json::json!({
            "identifier": identifier,
            "password": password,
        }));

        let response: SessionResponse = self
            .xrpc
            .send(&request, None, cancel)
            .await
            .map_err(|e| match e {
                // Only a credential refusal is an authentication failure
                BlueskyError::Status { status: status @ (400 | 401), detail, .. } => {
                    BlueskyError::Authentication {
                        operation: "createSession",
                        status: Some(status),
                        detail,
                    }
                }
                other => other,
            })?;

        let session = Session::from(response);
        info!(
            did = %session.did,
            handle = %session.handle,
            access_expires_at = ?session.access_expires_at,
            "Bluesky session created"
        );
        Ok(session)
    }

    async fn refresh_or_recreate(
        &self,
        refresh_jwt: &str,
        cancel: &CancellationToken,
    ) -> Result<Session, BlueskyError> {
        let request = XrpcRequest::procedure(REFRESH_SESSION);

        match self
            .xrpc
            .send::<SessionResponse>(&request, Some(refresh_jwt), cancel)
            .await
        {
            Ok(response) => {
                let session = Session::from(response);
                info!(
                    did = %session.did,
                    access_expires_at = ?session.access_expires_at,
                    "Bluesky session refreshed"
                );
                Ok(session)
            }
            Err(e) if e.is_auth_rejection() => {
                warn!(error = %e, "Refresh token rejected, authenticating from scratch");
                self.create_session(cancel).await
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl CredentialSource for SessionManager {
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, BlueskyError> {
        self.valid_access_token(cancel).await
    }

    async fn invalidate(&self) {
        SessionManager::invalidate(self).await
    }
}
