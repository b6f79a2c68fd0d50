//! Session command handlers (login, logout, whoami, passwd).

use anyhow::{Context, Result, bail};
use rmx_core::client::RentClient;
use rmx_core::config::Config;
use rmx_core::error::ApiError;
use rmx_core::session::{SessionStore, mask_token};

use super::expire_session;

pub async fn login(config: &Config, user: &str, password: &str) -> Result<()> {
    let store = SessionStore::open_default();
    if let Some(existing) = store.load().context("load session")? {
        println!(
            "Already logged in as {}. Run `rmx logout` first.",
            existing.user_name
        );
        return Ok(());
    }

    let client = RentClient::new(config);
    let session = client.login(user, password).await?;

    // The session must be on disk before any role routing happens.
    store.save(&session).context("save session")?;

    if session.is_owner {
        println!("Logged in as {} (owner).", session.user_name);
        println!("Run `rmx tenant register` to manage tenants.");
    } else {
        let tenant_id = session.tenant_id.as_deref().unwrap_or("-");
        println!("Logged in as {} (tenant {tenant_id}).", session.user_name);
        println!("Run `rmx dashboard` to see your current bill.");
    }
    Ok(())
}

pub fn logout() -> Result<()> {
    let store = SessionStore::open_default();
    if store.clear().context("clear session")? {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

pub fn whoami() -> Result<()> {
    let store = SessionStore::open_default();
    let Some(session) = store.load().context("load session")? else {
        bail!("not logged in; run `rmx login`");
    };

    let role = if session.is_owner { "owner" } else { "tenant" };
    println!("{} ({role})", session.user_name);
    if let Some(tenant_id) = session.tenant_id.as_deref() {
        println!("Tenant ID: {tenant_id}");
    }
    println!("Token: {}", mask_token(&session.token));
    Ok(())
}

pub async fn passwd(config: &Config, current: &str, new: &str) -> Result<()> {
    if current.trim().is_empty() || new.trim().is_empty() {
        bail!("current and new password must not be empty");
    }

    let store = SessionStore::open_default();
    let Some(session) = store.load().context("load session")? else {
        bail!("not logged in; run `rmx login`");
    };

    let client = RentClient::new(config);
    match client.change_password(&session, current, new).await {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(ApiError::Unauthorized) => expire_session(&store),
        Err(err) => Err(err).context("change password"),
    }
}
