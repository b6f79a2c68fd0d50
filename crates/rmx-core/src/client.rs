//! HTTP client for the rent-management service API.
//!
//! One outbound request per call, resolved as a single future; no retries,
//! no coalescing, no timeouts beyond the transport default. Discarding the
//! future is the only cancellation.

use std::str::FromStr;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::dashboard::DashboardSnapshot;
use crate::error::{ApiError, AuthError};
use crate::session::Session;

/// Client for the rent-management service.
pub struct RentClient {
    base_url: String,
    http: reqwest::Client,
}

impl RentClient {
    /// Creates a new client from the given configuration.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics if `base_url` is the
    ///   placeholder production API.
    /// - At runtime, panics if `RMX_BLOCK_REAL_API=1` and `base_url` is the
    ///   placeholder production API.
    ///
    /// This prevents tests from accidentally making real network requests.
    /// Use the `RMX_BASE_URL` env var or config to point at a mock server.
    pub fn new(config: &Config) -> Self {
        let base_url = config.resolve_base_url();

        #[cfg(test)]
        if base_url == DEFAULT_BASE_URL {
            panic!(
                "Tests must not use the production rent-manager API!\n\
                 Set RMX_BASE_URL to a mock server (e.g., wiremock).\n\
                 Found base_url: {base_url}"
            );
        }

        #[cfg(not(test))]
        if std::env::var("RMX_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && base_url == DEFAULT_BASE_URL
        {
            panic!(
                "RMX_BLOCK_REAL_API=1 but trying to use the production rent-manager API!\n\
                 Set RMX_BASE_URL to a mock server.\n\
                 Found base_url: {base_url}"
            );
        }

        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Performs the login exchange.
    ///
    /// Both identifier and password must be non-empty after trimming; a
    /// violation fails with [`AuthError::Validation`] before any request is
    /// sent. On success the returned session is NOT persisted here; saving
    /// it is the caller's explicit step.
    ///
    /// # Errors
    /// Returns a typed [`AuthError`] on validation, transport, rejection, or
    /// a response body that does not match the expected shape.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session, AuthError> {
        let identifier = identifier.trim();
        let password = password.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Please enter both tenant ID/email and password".to_string(),
            ));
        }

        debug!(endpoint = "/login", "sending login request");
        let response = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&serde_json::json!({
                "tenant_id": identifier,
                "password": password,
            }))
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::Rejected(server_message(status, &body)));
        }

        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|err| AuthError::Malformed(err.to_string()))?;

        Ok(Session {
            token: login.token,
            is_owner: login.user.is_owner,
            user_id: login.user.id,
            user_name: login.user.name,
            tenant_id: login.user.tenant_id,
        })
    }

    /// Fetches the tenant dashboard and parses it all-or-nothing.
    ///
    /// # Errors
    /// 401 yields [`ApiError::Unauthorized`] (caller clears the session);
    /// other failures yield [`ApiError::Transport`]/[`ApiError::Rejected`]
    /// and leave caller state untouched; a body that violates the expected
    /// schema yields [`ApiError::Malformed`].
    pub async fn fetch_dashboard(&self, session: &Session) -> Result<DashboardSnapshot, ApiError> {
        debug!(endpoint = "/tenant/dashboard", "fetching dashboard");
        let body = self
            .get_authorized("/tenant/dashboard", session)
            .await?;
        decode_api_json(&body)
    }

    /// Initiates a payment for the current billing period.
    ///
    /// # Errors
    /// Same taxonomy as [`Self::fetch_dashboard`].
    pub async fn create_payment(
        &self,
        session: &Session,
        method: PaymentMethod,
    ) -> Result<PaymentInitiation, ApiError> {
        let body = self
            .post_authorized(
                "/create_payment",
                session,
                &serde_json::json!({ "payment_method": method.as_str() }),
            )
            .await?;
        decode_api_json(&body)
    }

    /// Registers a new tenant. Owner accounts only; others receive
    /// [`ApiError::Forbidden`].
    ///
    /// # Errors
    /// Same taxonomy as [`Self::fetch_dashboard`].
    pub async fn register_tenant(
        &self,
        session: &Session,
        tenant: &NewTenant,
    ) -> Result<RegisteredTenant, ApiError> {
        let body = self
            .post_authorized("/register_tenant", session, tenant)
            .await?;
        let response: RegisterTenantResponse = decode_api_json(&body)?;
        Ok(response.tenant)
    }

    /// Changes the current account's password. Returns the server's
    /// confirmation message.
    ///
    /// # Errors
    /// Same taxonomy as [`Self::fetch_dashboard`].
    pub async fn change_password(
        &self,
        session: &Session,
        current: &str,
        new: &str,
    ) -> Result<String, ApiError> {
        let body = self
            .post_authorized(
                "/change_password",
                session,
                &serde_json::json!({
                    "current_password": current,
                    "new_password": new,
                }),
            )
            .await?;
        let response: MessageResponse = decode_api_json(&body)?;
        Ok(response.message)
    }

    async fn get_authorized(&self, endpoint: &str, session: &Session) -> Result<String, ApiError> {
        let response = self
            .http
            .get(format!("{}{endpoint}", self.base_url))
            .header("Authorization", format!("Bearer {}", session.token))
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        read_api_response(response).await
    }

    async fn post_authorized<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        session: &Session,
        body: &T,
    ) -> Result<String, ApiError> {
        let response = self
            .http
            .post(format!("{}{endpoint}", self.base_url))
            .header("Authorization", format!("Bearer {}", session.token))
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        read_api_response(response).await
    }
}

/// Maps an authenticated response to its body or a typed failure.
async fn read_api_response(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    if status == StatusCode::FORBIDDEN {
        return Err(ApiError::Forbidden(server_message(status, &body)));
    }
    if !status.is_success() {
        return Err(ApiError::Rejected(server_message(status, &body)));
    }

    Ok(body)
}

fn decode_api_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Malformed(err.to_string()))
}

/// Extracts the server's `{"error": ...}` message, falling back to the
/// status line.
fn server_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| format!("HTTP {status}"))
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    /// Returns the wire name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" | "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!(
                "unknown payment method '{other}' (expected card, bank-transfer, or cash)"
            )),
        }
    }
}

/// Result of initiating a payment.
///
/// Card payments return a payment-intent client secret; cash and bank
/// transfers return a reference the tenant quotes when paying.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PaymentInitiation {
    CardIntent {
        #[serde(rename = "clientSecret")]
        client_secret: String,
        amount: f64,
    },
    Reference {
        reference: String,
        amount: f64,
        message: String,
    },
}

/// Fields for registering a new tenant (owner only).
#[derive(Debug, Clone, Serialize)]
pub struct NewTenant {
    pub name: String,
    pub rent_amount: f64,
    pub initial_electricity_reading: f64,
    pub initial_water_reading: f64,
}

/// A freshly registered tenant, including the one-time generated password.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredTenant {
    pub id: i64,
    pub name: String,
    pub tenant_id: String,
    /// Shown once to the owner; never persisted.
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: LoginUser,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    id: i64,
    name: String,
    is_owner: bool,
    #[serde(default)]
    tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterTenantResponse {
    #[allow(dead_code)]
    message: String,
    tenant: RegisteredTenant,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(base_url: &str) -> RentClient {
        RentClient::new(&Config {
            base_url: base_url.to_string(),
        })
    }

    fn tenant_session() -> Session {
        Session {
            token: "abc123".to_string(),
            is_owner: false,
            user_id: 7,
            user_name: "Jane".to_string(),
            tenant_id: Some("T-9".to_string()),
        }
    }

    fn dashboard_body() -> serde_json::Value {
        serde_json::json!({
            "tenant": {"tenant_id": "T-9"},
            "billing": {"rent": 1000.0, "electricity": 184.5, "water": 50.0, "total": 1234.5},
            "payment_status": null,
            "meter_readings": {"electricity": null, "water": null},
            "payment_history": []
        })
    }

    /// Test: empty credentials fail fast with Validation, no request sent.
    #[tokio::test]
    async fn test_login_empty_credentials_is_validation_error() {
        // A request against this address would surface as Transport.
        let client = client_for("http://127.0.0.1:1");

        for (user, password) in [("", "pw"), ("T-9", ""), ("   ", "pw"), ("T-9", "  ")] {
            let err = client.login(user, password).await.unwrap_err();
            assert!(
                matches!(err, AuthError::Validation(_)),
                "expected Validation for ({user:?}, {password:?}), got {err:?}"
            );
        }
    }

    /// Test: a successful login response maps onto a Session field by field.
    #[tokio::test]
    async fn test_login_success_builds_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({
                "tenant_id": "T-9",
                "password": "secret",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "abc123",
                "user": {"id": 7, "name": "Jane", "is_owner": false, "tenant_id": "T-9"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let session = client.login("T-9", "secret").await.unwrap();

        assert_eq!(session.token, "abc123");
        assert!(!session.is_owner);
        assert_eq!(session.user_id, 7);
        assert_eq!(session.user_name, "Jane");
        assert_eq!(session.tenant_id.as_deref(), Some("T-9"));
    }

    /// Test: credentials the server turns away surface the server's message.
    #[tokio::test]
    async fn test_login_rejected_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.login("T-9", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::Rejected("Invalid credentials".to_string()));
    }

    /// Test: a 2xx login body missing required fields is Malformed.
    #[tokio::test]
    async fn test_login_missing_token_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": {"id": 7, "name": "Jane", "is_owner": false}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.login("T-9", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)), "got {err:?}");
    }

    /// Test: dashboard requests carry the bearer token and parse on success.
    #[tokio::test]
    async fn test_fetch_dashboard_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenant/dashboard"))
            .and(header("Authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let snapshot = client.fetch_dashboard(&tenant_session()).await.unwrap();

        assert_eq!(snapshot.tenant.tenant_id, "T-9");
        assert!(snapshot.payment_status.is_none());
        assert!(snapshot.payment_history.is_empty());
    }

    /// Test: 401 is always Unauthorized, never Transport or Malformed.
    #[tokio::test]
    async fn test_fetch_dashboard_401_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenant/dashboard"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid token"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.fetch_dashboard(&tenant_session()).await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }

    /// Test: a 2xx dashboard body violating the schema is Malformed.
    #[tokio::test]
    async fn test_fetch_dashboard_missing_billing_is_malformed() {
        let server = MockServer::start().await;
        let mut body = dashboard_body();
        body.as_object_mut().unwrap().remove("billing");

        Mock::given(method("GET"))
            .and(path("/tenant/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.fetch_dashboard(&tenant_session()).await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)), "got {err:?}");
    }

    /// Test: an unreachable server is Transport, not a panic or a hang.
    #[tokio::test]
    async fn test_fetch_dashboard_connection_refused_is_transport() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.fetch_dashboard(&tenant_session()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    }

    /// Test: card payments decode to CardIntent, transfers to Reference.
    #[tokio::test]
    async fn test_create_payment_decodes_both_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create_payment"))
            .and(body_json(serde_json::json!({"payment_method": "card"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "clientSecret": "pi_secret_123",
                "amount": 1234.5
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/create_payment"))
            .and(body_json(serde_json::json!({"payment_method": "bank_transfer"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reference": "RENT20240301120000_7",
                "amount": 1234.5,
                "message": "Please use reference RENT20240301120000_7 when making the payment"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let session = tenant_session();

        let card = client
            .create_payment(&session, PaymentMethod::Card)
            .await
            .unwrap();
        assert!(matches!(
            card,
            PaymentInitiation::CardIntent { ref client_secret, .. } if client_secret == "pi_secret_123"
        ));

        let transfer = client
            .create_payment(&session, PaymentMethod::BankTransfer)
            .await
            .unwrap();
        assert!(matches!(
            transfer,
            PaymentInitiation::Reference { ref reference, .. } if reference == "RENT20240301120000_7"
        ));
    }

    /// Test: a 403 (role mismatch) maps to Forbidden with the server text.
    #[tokio::test]
    async fn test_register_tenant_forbidden_for_non_owner() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register_tenant"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"error": "Unauthorized"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let tenant = NewTenant {
            name: "New Tenant".to_string(),
            rent_amount: 900.0,
            initial_electricity_reading: 100.0,
            initial_water_reading: 10.0,
        };
        let err = client
            .register_tenant(&tenant_session(), &tenant)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Forbidden("Unauthorized".to_string()));
    }

    /// Test: change_password returns the server's confirmation message.
    #[tokio::test]
    async fn test_change_password_returns_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/change_password"))
            .and(body_json(serde_json::json!({
                "current_password": "old",
                "new_password": "new",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Password updated successfully"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let message = client
            .change_password(&tenant_session(), "old", "new")
            .await
            .unwrap();
        assert_eq!(message, "Password updated successfully");
    }

    /// Test: payment method names round-trip through FromStr.
    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("card".parse::<PaymentMethod>(), Ok(PaymentMethod::Card));
        assert_eq!(
            "bank-transfer".parse::<PaymentMethod>(),
            Ok(PaymentMethod::BankTransfer)
        );
        assert_eq!(
            "bank_transfer".parse::<PaymentMethod>(),
            Ok(PaymentMethod::BankTransfer)
        );
        assert_eq!("Cash".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }
}
