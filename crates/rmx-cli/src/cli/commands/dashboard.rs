//! Dashboard command handler and rendering.

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use rmx_core::client::RentClient;
use rmx_core::config::Config;
use rmx_core::dashboard::{
    DashboardSnapshot, capitalize_first, format_amount, format_display_date,
};
use rmx_core::error::ApiError;
use rmx_core::session::{Session, SessionStore};

use super::{CURRENCY, expire_session};

pub async fn run(config: &Config) -> Result<()> {
    let store = SessionStore::open_default();
    let Some(session) = store.load().context("load session")? else {
        bail!("not logged in; run `rmx login`");
    };
    if session.is_owner {
        // The backend 403s owner tokens on this endpoint anyway.
        bail!("owner accounts do not have a tenant dashboard; see `rmx tenant --help`");
    }

    let client = RentClient::new(config);
    match client.fetch_dashboard(&session).await {
        Ok(snapshot) => {
            render(&snapshot, &session);
            Ok(())
        }
        Err(ApiError::Unauthorized) => expire_session(&store),
        Err(err) => Err(err).context("load dashboard"),
    }
}

fn render(snapshot: &DashboardSnapshot, session: &Session) {
    println!("Welcome, {}", session.user_name);
    println!("Tenant ID: {}", snapshot.tenant.tenant_id);
    println!();

    println!("Billing");
    println!(
        "  Rent:        {CURRENCY}{}",
        format_amount(snapshot.billing.rent)
    );
    println!(
        "  Electricity: {CURRENCY}{}",
        format_amount(snapshot.billing.electricity)
    );
    println!(
        "  Water:       {CURRENCY}{}",
        format_amount(snapshot.billing.water)
    );
    println!(
        "  Total:       {CURRENCY}{}",
        format_amount(snapshot.billing.total)
    );
    println!();

    match &snapshot.payment_status {
        Some(status) => {
            println!(
                "Payment status: {} [{}]",
                capitalize_first(&status.status),
                status.class().label()
            );
            println!("  Method:    {}", capitalize_first(&status.method));
            println!("  Amount:    {CURRENCY}{}", format_amount(status.amount));
            println!("  Date:      {}", format_display_date(&status.date));
            println!(
                "  Reference: {}",
                status.reference.as_deref().unwrap_or("N/A")
            );
        }
        None => println!("Payment due. Run `rmx pay` to make a payment."),
    }
    println!();

    println!("Meter readings");
    match &snapshot.meter_readings.electricity {
        Some(reading) => println!(
            "  Electricity: current {}, previous {}, units {}",
            reading.current, reading.previous, reading.consumption
        ),
        None => println!("  No electricity readings available"),
    }
    match &snapshot.meter_readings.water {
        Some(reading) => match reading.previous {
            Some(previous) => println!(
                "  Water: current {}, previous {previous}",
                reading.current
            ),
            None => println!("  Water: current {}, previous N/A", reading.current),
        },
        None => println!("  No water readings available"),
    }
    println!();

    if snapshot.payment_history.is_empty() {
        println!("No payment history available");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(["Date", "Amount", "Method", "Status"]);
    for payment in &snapshot.payment_history {
        table.add_row([
            format_display_date(&payment.date),
            format!("{CURRENCY}{}", format_amount(payment.amount)),
            capitalize_first(&payment.method),
            format!(
                "{} [{}]",
                capitalize_first(&payment.status),
                payment.class().label()
            ),
        ]);
    }
    println!("Payment history");
    println!("{table}");
}
