//! Command handlers.

use anyhow::{Context, Result};
use rmx_core::session::SessionStore;

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod payment;
pub mod tenant;

/// Currency marker used by the service.
pub(crate) const CURRENCY: &str = "₹";

/// Caller policy for 401: the session is cleared and login is required again.
pub(crate) fn expire_session(store: &SessionStore) -> Result<()> {
    store.clear().context("clear session")?;
    anyhow::bail!("session expired; run `rmx login` again")
}
