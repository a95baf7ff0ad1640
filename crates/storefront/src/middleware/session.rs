//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions with a moka-backed store.
//! The only thing stored per visitor is the cart id (plus the visitor key used
//! to coalesce cart creation), so losing sessions on restart only loses the
//! cart pointer. Records are evicted once their expiry passes, and the store
//! is capped at [`MAX_SESSIONS`] entries.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopfront_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on live session records held in memory.
pub const MAX_SESSIONS: u64 = 100_000;

/// Create the session layer with an evicting in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(MokaStore::new(Some(MAX_SESSIONS)))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
