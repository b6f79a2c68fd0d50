//! Tenant management command handlers (owner only).

use anyhow::{Context, Result, bail};
use rmx_core::client::{NewTenant, RentClient};
use rmx_core::config::Config;
use rmx_core::error::ApiError;
use rmx_core::session::SessionStore;

use super::expire_session;

pub async fn register(
    config: &Config,
    name: String,
    rent: f64,
    electricity: f64,
    water: f64,
) -> Result<()> {
    let store = SessionStore::open_default();
    let Some(session) = store.load().context("load session")? else {
        bail!("not logged in; run `rmx login`");
    };
    if !session.is_owner {
        bail!("only the owner account can register tenants");
    }

    let client = RentClient::new(config);
    let tenant = NewTenant {
        name,
        rent_amount: rent,
        initial_electricity_reading: electricity,
        initial_water_reading: water,
    };

    match client.register_tenant(&session, &tenant).await {
        Ok(registered) => {
            println!(
                "Registered tenant {} ({}).",
                registered.name, registered.tenant_id
            );
            println!("Generated password (shown once): {}", registered.password);
            Ok(())
        }
        Err(ApiError::Unauthorized) => expire_session(&store),
        Err(err) => Err(err).context("register tenant"),
    }
}
