//! Bluesky integration for the comics platform
//!
//! A managed session client for the Bluesky XRPC API. The rest of the platform
//! asks it for followers, follows and profiles, and whether it is configured.

pub mod app;
pub mod config;
pub mod services;

pub use app::AppContext;
pub use config::Config;
pub use services::bluesky::{BlueskyClient, BlueskyError, ProfileView, ProfileViewDetailed};
