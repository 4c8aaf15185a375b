//! Application context shared by the binary and host services.
//!
//! Holds the one Bluesky client per configured identity; callers receive it
//! explicitly instead of reaching for a global.

use std::sync::Arc;

use crate::config::Config;
use crate::services::bluesky::{BlueskyClient, BlueskyError};

/// Process-wide state handed to whatever needs the integration
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub bluesky: Arc<BlueskyClient>,
}

impl AppContext {
    /// Build the context. The Bluesky session is not created until first use.
    pub fn new(config: Config) -> Result<Self, BlueskyError> {
        let bluesky = Arc::new(BlueskyClient::new(&config)?);
        Ok(Self {
            config: Arc::new(config),
            bluesky,
        })
    }

    /// Whether the Bluesky integration has credentials
    pub fn bluesky_configured(&self) -> bool {
        self.bluesky.is_configured()
    }
}
