//! XRPC transport: one paced, cancellable HTTP round trip

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::BlueskyError;
use crate::config::Config;
use crate::services::rate_limiter::RateLimitedClient;

pub const CREATE_SESSION: &str = "com.atproto.server.createSession";
pub const REFRESH_SESSION: &str = "com.atproto.server.refreshSession";
pub const GET_FOLLOWERS: &str = "app.bsky.graph.getFollowers";
pub const GET_FOLLOWS: &str = "app.bsky.graph.getFollows";
pub const GET_PROFILE: &str = "app.bsky.actor.getProfile";

/// A single XRPC call description, reusable across attempts
#[derive(Debug, Clone)]
pub struct XrpcRequest {
    method: Method,
    nsid: &'static str,
    query: Vec<(&'static str, String)>,
    body: Option<JsonValue>,
}

impl XrpcRequest {
    pub fn query(nsid: &'static str) -> Self {
        Self {
            method: Method::GET,
            nsid,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn procedure(nsid: &'static str) -> Self {
        Self {
            method: Method::POST,
            nsid,
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter; parameters are sent in insertion order
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn nsid(&self) -> &'static str {
        self.nsid
    }
}

/// HTTP client bound to one XRPC service
pub struct XrpcClient {
    http: RateLimitedClient,
    service_url: String,
}

impl XrpcClient {
    /// Build the client. No network traffic happens here.
    pub fn new(config: &Config) -> Result<Self, BlueskyError> {
        let http = RateLimitedClient::new(
            "bluesky",
            config.rate_limit(),
            Duration::from_secs(config.request_timeout_secs),
        )
        .map_err(|e| BlueskyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            service_url: config.service_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service_url, nsid)
    }

    /// Perform the call with an optional bearer token and decode the JSON body
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: &XrpcRequest,
        bearer: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<T, BlueskyError> {
        let url = self.endpoint(request.nsid);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(BlueskyError::Cancelled),
            result = self.round_trip(&url, request, bearer) => result,
        }
    }

    async fn round_trip<T: DeserializeOwned>(
        &self,
        url: &str,
        request: &XrpcRequest,
        bearer: Option<&str>,
    ) -> Result<T, BlueskyError> {
        self.http.wait_for_permit().await;
        debug!(method = %request.method, nsid = request.nsid, "Sending XRPC request");

        let mut builder = self.http.inner().request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| BlueskyError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| BlueskyError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            debug!(nsid = request.nsid, status = status.as_u16(), "XRPC request failed");
            return Err(BlueskyError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                detail: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| BlueskyError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
