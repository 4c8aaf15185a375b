//! Authenticated XRPC calls with one credential-refresh retry

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::error::BlueskyError;
use super::session::CredentialSource;
use super::xrpc::{XrpcClient, XrpcRequest};

/// Physical attempts per logical call
pub const MAX_ATTEMPTS: u32 = 2;

/// Attaches a bearer token to each call and recovers once from a rejected token.
///
/// Only 400/401 responses are retried, immediately and without backoff: the
/// failure mode is a bad credential, not an overloaded server. Everything else
/// propagates on first occurrence.
pub struct AuthenticatedExecutor<S> {
    xrpc: Arc<XrpcClient>,
    credentials: Arc<S>,
}

impl<S: CredentialSource> AuthenticatedExecutor<S> {
    pub fn new(xrpc: Arc<XrpcClient>, credentials: Arc<S>) -> Self {
        Self { xrpc, credentials }
    }

    pub fn endpoint(&self, request: &XrpcRequest) -> String {
        self.xrpc.endpoint(request.nsid())
    }

    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &XrpcRequest,
        cancel: &CancellationToken,
    ) -> Result<T, BlueskyError> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            let token = self.credentials.access_token(cancel).await?;

            match self.xrpc.send(request, Some(&token), cancel).await {
                Err(e) if e.is_auth_rejection() && attempts < MAX_ATTEMPTS => {
                    warn!(
                        nsid = request.nsid(),
                        attempt = attempts,
                        error = %e,
                        "Access token rejected, retrying with a new session"
                    );
                    self.credentials.invalidate().await;
                }
                result => return result,
            }
        }
    }
}
