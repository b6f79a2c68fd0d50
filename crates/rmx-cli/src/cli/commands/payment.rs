//! Payment command handler.

use anyhow::{Context, Result, anyhow, bail};
use rmx_core::client::{PaymentInitiation, PaymentMethod, RentClient};
use rmx_core::config::Config;
use rmx_core::dashboard::format_amount;
use rmx_core::error::ApiError;
use rmx_core::session::SessionStore;

use super::{CURRENCY, expire_session};

pub async fn run(config: &Config, method: &str) -> Result<()> {
    let method: PaymentMethod = method.parse().map_err(|err: String| anyhow!(err))?;

    let store = SessionStore::open_default();
    let Some(session) = store.load().context("load session")? else {
        bail!("not logged in; run `rmx login`");
    };

    let client = RentClient::new(config);
    match client.create_payment(&session, method).await {
        Ok(PaymentInitiation::CardIntent {
            client_secret,
            amount,
        }) => {
            println!(
                "Card payment of {CURRENCY}{} initiated.",
                format_amount(amount)
            );
            println!("Client secret: {client_secret}");
            Ok(())
        }
        Ok(PaymentInitiation::Reference {
            reference,
            amount,
            message,
        }) => {
            println!(
                "Payment of {CURRENCY}{} recorded as pending.",
                format_amount(amount)
            );
            println!("Reference: {reference}");
            println!("{message}");
            Ok(())
        }
        Err(ApiError::Unauthorized) => expire_session(&store),
        Err(err) => Err(err).context("create payment"),
    }
}
