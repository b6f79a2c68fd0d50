//! Tenant dashboard snapshot model.
//!
//! A snapshot is a fully-parsed, immutable view of the tenant's current
//! billing/payment/meter-reading state as of one fetch. Parsing is
//! all-or-nothing at the wire boundary; rendering code never sees a partial
//! snapshot or an unchecked field.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

/// Wire format for timestamps (local time, no zone designator).
pub const API_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Display format for timestamps.
pub const DISPLAY_DATE_FORMAT: &str = "%d %b %Y, %H:%M";

/// Parses a wire timestamp.
///
/// The backend emits ISO-style local timestamps, sometimes with a fractional
/// seconds tail; the fraction carries no information here and is ignored.
///
/// # Errors
/// Returns an error if the value does not match [`API_DATE_FORMAT`].
pub fn parse_api_date(raw: &str) -> chrono::format::ParseResult<NaiveDateTime> {
    let seconds = raw.split('.').next().unwrap_or(raw);
    NaiveDateTime::parse_from_str(seconds, API_DATE_FORMAT)
}

/// Formats a timestamp for display, e.g. "01 Mar 2024, 14:30".
pub fn format_display_date(date: &NaiveDateTime) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Formats a monetary amount as two-decimal fixed point, independent of
/// locale grouping.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Uppercases the first character of a status or method string for display.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Display class of a payment status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Payment went through (`completed`, `confirmed`).
    Success,
    /// Payment is underway (`pending`).
    InProgress,
    /// Anything else, including unrecognized and empty statuses.
    Failure,
}

impl StatusClass {
    /// Returns a short display label for this class.
    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Success => "ok",
            StatusClass::InProgress => "in progress",
            StatusClass::Failure => "failed",
        }
    }
}

/// Classifies a server-reported payment status string.
///
/// Total over all inputs: unrecognized statuses classify as
/// [`StatusClass::Failure`] rather than erroring.
pub fn classify_status(status: &str) -> StatusClass {
    match status {
        "completed" | "confirmed" => StatusClass::Success,
        "pending" => StatusClass::InProgress,
        _ => StatusClass::Failure,
    }
}

fn deserialize_api_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_api_date(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_api_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|value| parse_api_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

/// The backend sometimes stores the literal string "null" in reference
/// columns; treat it the same as a missing value.
fn deserialize_reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty() && value != "null"))
}

/// Fully-parsed view of the tenant's current state as of one fetch.
///
/// Rebuilt on every fetch; never cached across fetches.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSnapshot {
    pub tenant: TenantInfo,
    pub billing: Billing,
    /// Absent means the current billing period has no payment yet; callers
    /// render the pay-now action instead of a status card.
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    pub meter_readings: MeterReadings,
    /// Newest first, as returned by the server; the client does not reorder.
    #[serde(default)]
    pub payment_history: Vec<PaymentRecord>,
}

/// Tenant identity block.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantInfo {
    pub tenant_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rent_amount: Option<f64>,
}

/// Amounts due for the current billing period.
#[derive(Debug, Clone, Deserialize)]
pub struct Billing {
    pub rent: f64,
    pub electricity: f64,
    pub water: f64,
    pub total: f64,
}

/// The payment recorded for the current billing period, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentStatus {
    pub status: String,
    pub method: String,
    pub amount: f64,
    #[serde(deserialize_with = "deserialize_api_date")]
    pub date: NaiveDateTime,
    #[serde(default, deserialize_with = "deserialize_reference")]
    pub reference: Option<String>,
}

impl PaymentStatus {
    /// Returns the display class of this payment's status.
    pub fn class(&self) -> StatusClass {
        classify_status(&self.status)
    }
}

/// Latest meter readings per category.
///
/// An absent category means "no reading available", which renders
/// differently from a zero reading.
#[derive(Debug, Clone, Deserialize)]
pub struct MeterReadings {
    #[serde(default)]
    pub electricity: Option<ElectricityReading>,
    #[serde(default)]
    pub water: Option<WaterReading>,
}

/// Latest electricity reading with the consumption since the previous one.
#[derive(Debug, Clone, Deserialize)]
pub struct ElectricityReading {
    pub current: f64,
    pub previous: f64,
    pub consumption: f64,
    #[serde(default, deserialize_with = "deserialize_api_date_opt")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Latest water reading; the previous reading may not exist yet.
#[derive(Debug, Clone, Deserialize)]
pub struct WaterReading {
    pub current: f64,
    #[serde(default)]
    pub previous: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_api_date_opt")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One row of the payment history.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRecord {
    #[serde(deserialize_with = "deserialize_api_date")]
    pub date: NaiveDateTime,
    pub amount: f64,
    pub method: String,
    pub status: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_reference")]
    pub reference: Option<String>,
}

impl PaymentRecord {
    /// Returns the display class of this payment's status.
    pub fn class(&self) -> StatusClass {
        classify_status(&self.status)
    }
}
