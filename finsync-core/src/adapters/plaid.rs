//! Plaid API client
//!
//! Talks to the Plaid REST API for sandbox token creation, public token
//! exchange and transaction fetches. Every endpoint is a JSON `POST`
//! authenticated with client id and secret headers.
//!
//! API Documentation: https://plaid.com/docs/api/

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::redact;
use crate::domain::result::{Error, Result};
use crate::domain::{DateRange, Transaction};
use crate::ports::FinancialDataApi;

/// API version pinned for every request
pub const PLAID_API_VERSION: &str = "2020-09-14";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Environments
// =============================================================================

/// Plaid deployment to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaidEnvironment {
    #[default]
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "sandbox",
            PlaidEnvironment::Development => "development",
            PlaidEnvironment::Production => "production",
        }
    }
}

impl fmt::Display for PlaidEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaidEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "development" => Ok(PlaidEnvironment::Development),
            "production" => Ok(PlaidEnvironment::Production),
            other => Err(Error::config(format!(
                "Unknown Plaid environment '{}' (expected sandbox, development or production)",
                other
            ))),
        }
    }
}

// =============================================================================
// API Request/Response Models
// =============================================================================

#[derive(Debug, Serialize)]
struct SandboxPublicTokenCreateRequest<'a> {
    institution_id: &'a str,
    initial_products: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SandboxPublicTokenCreateResponse {
    public_token: String,
}

#[derive(Debug, Serialize)]
struct PublicTokenExchangeRequest<'a> {
    public_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublicTokenExchangeResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct TransactionsGetRequest<'a> {
    access_token: &'a str,
    start_date: &'a str,
    end_date: &'a str,
}

#[derive(Debug, Deserialize)]
struct TransactionsGetResponse {
    transactions: Vec<Transaction>,
    #[serde(default)]
    total_transactions: Option<u64>,
}

/// Error body returned with every non-2xx response
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidErrorBody {
    pub error_type: String,
    pub error_code: String,
    pub error_message: String,
    #[serde(default)]
    pub display_message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl fmt::Display for PlaidErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plaid {}/{}: {}",
            self.error_type, self.error_code, self.error_message
        )?;
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id {})", request_id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Plaid HTTP Client
// =============================================================================

/// Plaid API client
#[derive(Debug, Clone)]
pub struct PlaidClient {
    client: Client,
    client_id: String,
    secret: String,
    base_url: String,
    timeout: Duration,
}

impl PlaidClient {
    /// Create a client for one of the hosted Plaid environments
    pub fn new(client_id: &str, secret: &str, environment: PlaidEnvironment) -> Result<Self> {
        Self::new_with_base_url(
            client_id,
            secret,
            environment.base_url(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client against an explicit base URL
    pub fn new_with_base_url(
        client_id: &str,
        secret: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if client_id.trim().is_empty() {
            return Err(Error::config("Plaid client id cannot be empty"));
        }
        if secret.trim().is_empty() {
            return Err(Error::config("Plaid secret cannot be empty"));
        }

        let parsed = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid Plaid base URL '{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Plaid base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            secret: secret.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body to an endpoint and decode the JSON answer
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "Plaid request");

        let response = self
            .client
            .post(&url)
            .header("PLAID-CLIENT-ID", &self.client_id)
            .header("PLAID-SECRET", &self.secret)
            .header("Plaid-Version", PLAID_API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status.as_u16(), &text));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse Plaid {} response: {}", path, e)))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::remote(format!(
                "Plaid request timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::remote(format!("Unable to connect to Plaid at {}", self.base_url))
        } else {
            Error::remote(format!("Plaid request failed: {}", error))
        }
    }

    /// Turn a non-2xx answer into an error, using the Plaid error body when present
    fn status_error(status: u16, body: &str) -> Error {
        match serde_json::from_str::<PlaidErrorBody>(body) {
            Ok(plaid_error) => Error::remote(format!("{} (HTTP {})", plaid_error, status)),
            Err(_) => Error::remote(format!("Plaid API error: HTTP {}", status)),
        }
    }
}

#[async_trait]
impl FinancialDataApi for PlaidClient {
    fn name(&self) -> &str {
        "plaid"
    }

    async fn create_sandbox_public_token(
        &self,
        institution_id: &str,
        products: &[String],
    ) -> Result<String> {
        let response: SandboxPublicTokenCreateResponse = self
            .post(
                "/sandbox/public_token/create",
                &SandboxPublicTokenCreateRequest {
                    institution_id,
                    initial_products: products,
                },
            )
            .await?;
        Ok(response.public_token)
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<String> {
        tracing::debug!(public_token = %redact(public_token), "Exchanging public token");
        let response: PublicTokenExchangeResponse = self
            .post(
                "/item/public_token/exchange",
                &PublicTokenExchangeRequest { public_token },
            )
            .await?;
        Ok(response.access_token)
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        range: &DateRange,
    ) -> Result<Vec<Transaction>> {
        let response: TransactionsGetResponse = self
            .post(
                "/transactions/get",
                &TransactionsGetRequest {
                    access_token,
                    start_date: &range.start_date,
                    end_date: &range.end_date,
                },
            )
            .await?;

        if let Some(total) = response.total_transactions {
            if total as usize > response.transactions.len() {
                tracing::debug!(
                    access_token = %redact(access_token),
                    returned = response.transactions.len(),
                    total,
                    "Only the first page of transactions was fetched"
                );
            }
        }
        Ok(response.transactions)
    }
}

// =============================================================================
// Tests
// =============================================================================
