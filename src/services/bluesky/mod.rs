//! Bluesky client for the comics platform
//!
//! Wraps the XRPC API behind a managed session: the session is created on
//! first use, renewed before it expires, and re-created once when the service
//! rejects a token mid-use. List endpoints are walked to completion.
//!
//! ```rust,ignore
//! let client = BlueskyClient::new(&Config::from_env()?)?;
//! let followers = client.fetch_all_followers("did:plc:abc").await?;
//! ```

pub mod error;
pub mod executor;
pub mod paginator;
pub mod session;
pub mod token;
pub mod types;
pub mod xrpc;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;

pub use error::BlueskyError;
pub use executor::AuthenticatedExecutor;
pub use paginator::{CursorPage, Paginator};
pub use session::{CredentialSource, SessionManager};
pub use types::{FollowersPage, FollowsPage, ProfileView, ProfileViewDetailed};
pub use xrpc::{XrpcClient, XrpcRequest};

/// Bluesky client bound to one configured identity
pub struct BlueskyClient {
    session: Arc<SessionManager>,
    executor: AuthenticatedExecutor<SessionManager>,
    page_size: u32,
    max_pages: usize,
}

impl BlueskyClient {
    /// Build the client. Performs no network calls; credentials are checked on first use.
    pub fn new(config: &Config) -> Result<Self, BlueskyError> {
        let xrpc = Arc::new(XrpcClient::new(config)?);
        let session = Arc::new(SessionManager::new(xrpc.clone(), config));

        Ok(Self {
            executor: AuthenticatedExecutor::new(xrpc, session.clone()),
            session,
            page_size: config.page_size,
            max_pages: config.max_pages,
        })
    }

    /// Identifier and app password are both present
    pub fn is_configured(&self) -> bool {
        self.session.is_configured()
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn paginator(&self) -> Paginator<'_, SessionManager> {
        Paginator::new(&self.executor, self.page_size, self.max_pages)
    }

    /// Every account following `actor`, in service order
    pub async fn fetch_all_followers(&self, actor: &str) -> Result<Vec<ProfileView>, BlueskyError> {
        self.fetch_all_followers_cancellable(actor, &CancellationToken::new())
            .await
    }

    pub async fn fetch_all_followers_cancellable(
        &self,
        actor: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProfileView>, BlueskyError> {
        let followers = self
            .paginator()
            .fetch_all::<FollowersPage>(xrpc::GET_FOLLOWERS, actor, cancel)
            .await?;
        info!(actor, count = followers.len(), "Fetched all Bluesky followers");
        Ok(followers)
    }

    /// Every account `actor` follows, in service order
    pub async fn fetch_all_follows(&self, actor: &str) -> Result<Vec<ProfileView>, BlueskyError> {
        self.fetch_all_follows_cancellable(actor, &CancellationToken::new())
            .await
    }

    pub async fn fetch_all_follows_cancellable(
        &self,
        actor: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProfileView>, BlueskyError> {
        let follows = self
            .paginator()
            .fetch_all::<FollowsPage>(xrpc::GET_FOLLOWS, actor, cancel)
            .await?;
        info!(actor, count = follows.len(), "Fetched all Bluesky follows");
        Ok(follows)
    }

    /// Follower count by exhaustive listing.
    ///
    /// O(n) in followers; `get_profile` carries the service's own (cached) count.
    pub async fn get_follower_count(&self, handle: &str) -> Result<usize, BlueskyError> {
        Ok(self.fetch_all_followers(handle).await?.len())
    }

    pub async fn get_profile(&self, handle: &str) -> Result<ProfileViewDetailed, BlueskyError> {
        let request = XrpcRequest::query(xrpc::GET_PROFILE).param("actor", handle);
        self.executor
            .execute(&request, &CancellationToken::new())
            .await
    }
}
