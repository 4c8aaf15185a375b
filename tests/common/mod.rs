//! Shared fixtures for the Bluesky integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use comics_bluesky::Config;
use comics_bluesky::services::bluesky::{BlueskyError, CredentialSource};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockito::{Matcher, Mock, ServerGuard};
use serde::Serialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

pub const IDENTIFIER: &str = "user.test";
pub const PASSWORD: &str = "pw";
pub const ACCOUNT_DID: &str = "did:plc:user";

pub const CREATE_SESSION_PATH: &str = "/xrpc/com.atproto.server.createSession";
pub const REFRESH_SESSION_PATH: &str = "/xrpc/com.atproto.server.refreshSession";
pub const FOLLOWERS_PATH: &str = "/xrpc/app.bsky.graph.getFollowers";
pub const FOLLOWS_PATH: &str = "/xrpc/app.bsky.graph.getFollows";
pub const PROFILE_PATH: &str = "/xrpc/app.bsky.actor.getProfile";

/// Query string of a first page: actor and limit, no cursor
pub const FIRST_PAGE_QUERY: &str = "^actor=[^&]+&limit=[0-9]+$";

#[derive(Serialize)]
struct Claims<'a> {
    scope: &'a str,
    sub: &'a str,
    jti: &'a str,
    iat: i64,
    exp: i64,
}

/// Mint an HS256 JWT expiring `expires_in_secs` from now; `label` keeps tokens distinct
pub fn jwt(label: &str, expires_in_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        scope: "com.atproto.access",
        sub: ACCOUNT_DID,
        jti: label,
        iat: now,
        exp: now + expires_in_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"pds-secret"),
    )
    .unwrap()
}

pub fn session_body(access_jwt: &str, refresh_jwt: &str) -> String {
    json!({
        "accessJwt": access_jwt,
        "refreshJwt": refresh_jwt,
        "did": ACCOUNT_DID,
        "handle": IDENTIFIER,
    })
    .to_string()
}

/// Config pointing at the mock server with pacing effectively disabled
pub fn test_config(server: &ServerGuard) -> Config {
    Config {
        requests_per_second: 10_000,
        burst_size: 10_000,
        ..Config::default()
    }
    .with_service_url(server.url())
    .with_credentials(IDENTIFIER, PASSWORD)
}

pub async fn mock_create_session(
    server: &mut ServerGuard,
    access_jwt: &str,
    refresh_jwt: &str,
    hits: usize,
) -> Mock {
    server
        .mock("POST", CREATE_SESSION_PATH)
        .match_body(Matcher::PartialJson(json!({
            "identifier": IDENTIFIER,
            "password": PASSWORD,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body(access_jwt, refresh_jwt))
        .expect(hits)
        .create_async()
        .await
}

pub fn profile(index: usize) -> Value {
    json!({
        "did": format!("did:plc:follower{index}"),
        "handle": format!("follower{index}.test"),
        "displayName": format!("Follower {index}"),
    })
}

pub fn followers_page(indices: std::ops::Range<usize>, cursor: Option<&str>) -> String {
    let followers: Vec<Value> = indices.map(profile).collect();
    let mut body = json!({
        "subject": {"did": "did:plc:abc", "handle": "artist.test"},
        "followers": followers,
    });
    if let Some(cursor) = cursor {
        body["cursor"] = json!(cursor);
    }
    body.to_string()
}

pub fn cursor_query(actor: &str, cursor: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("actor".into(), actor.into()),
        Matcher::UrlEncoded("cursor".into(), cursor.into()),
    ])
}

/// Credential source that hands out scripted tokens and counts invalidations.
///
/// Each invalidation advances to the next token; the last one is reused.
pub struct ScriptedCredentials {
    tokens: Vec<String>,
    position: AtomicUsize,
    issued: AtomicUsize,
    invalidations: AtomicUsize,
}

impl ScriptedCredentials {
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            position: AtomicUsize::new(0),
            issued: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSource for ScriptedCredentials {
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, BlueskyError> {
        if cancel.is_cancelled() {
            return Err(BlueskyError::Cancelled);
        }
        self.issued.fetch_add(1, Ordering::SeqCst);
        let position = self.position.load(Ordering::SeqCst).min(self.tokens.len() - 1);
        Ok(self.tokens[position].clone())
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.position.fetch_add(1, Ordering::SeqCst);
    }
}
