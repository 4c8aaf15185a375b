//! External service integrations

pub mod bluesky;
pub mod rate_limiter;

pub use bluesky::{BlueskyClient, BlueskyError};
pub use rate_limiter::{RateLimitConfig, RateLimitedClient};
