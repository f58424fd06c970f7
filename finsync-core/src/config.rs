//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "demoMode": false,
//!   "plaid": { "clientId": "...", "secret": "...", "environment": "sandbox", "timeoutSecs": 60 },
//!   "institutionIds": ["ins_56", "ins_127989", "ins_128026"],
//!   "products": ["transactions"],
//!   "database": { "inMemory": false },
//!   "server": { "host": "127.0.0.1", "port": 8080 }
//! }
//! ```
//! Every field is optional. A few values can be overridden from the
//! environment (see [`Config::load`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::plaid::{PlaidClient, PlaidEnvironment, DEFAULT_TIMEOUT_SECS};

pub const SETTINGS_FILE: &str = "settings.json";

/// Sandbox institutions provisioned when none are configured
pub const DEFAULT_INSTITUTION_IDS: [&str; 3] = ["ins_56", "ins_127989", "ins_128026"];

/// Plaid credentials and endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: String,
    pub environment: PlaidEnvironment,
    /// Overrides the environment's URL (local mocks, proxies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for PlaidConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            secret: String::new(),
            environment: PlaidEnvironment::default(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PlaidConfig {
    /// Build a client from these settings
    pub fn client(&self) -> crate::domain::result::Result<PlaidClient> {
        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url());
        PlaidClient::new_with_base_url(
            &self.client_id,
            &self.secret,
            base_url,
            Duration::from_secs(self.timeout_secs),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// Keep everything in memory instead of a DuckDB file
    pub in_memory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Finsync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Use the offline demo API and a separate database file
    pub demo_mode: bool,
    pub plaid: PlaidConfig,
    pub institution_ids: Vec<String>,
    pub products: Vec<String>,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            plaid: PlaidConfig::default(),
            institution_ids: DEFAULT_INSTITUTION_IDS.iter().map(|s| s.to_string()).collect(),
            products: vec!["transactions".to_string()],
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing settings file gives the defaults. These environment
    /// variables take precedence over the file:
    /// `FINSYNC_PLAID_CLIENT_ID`, `FINSYNC_PLAID_SECRET`, `FINSYNC_PLAID_ENV`,
    /// `FINSYNC_DEMO_MODE`, `FINSYNC_HOST`, `FINSYNC_PORT`.
    pub fn load(finsync_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(finsync_dir)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load only the settings file, without environment overrides
    pub fn load_file(finsync_dir: &Path) -> Result<Self> {
        let settings_path = finsync_dir.join(SETTINGS_FILE);
        if !settings_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&settings_path)
            .with_context(|| format!("Failed to read {}", settings_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", settings_path.display()))
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client_id) = var("FINSYNC_PLAID_CLIENT_ID") {
            self.plaid.client_id = client_id;
        }
        if let Some(secret) = var("FINSYNC_PLAID_SECRET") {
            self.plaid.secret = secret;
        }
        if let Some(env) = var("FINSYNC_PLAID_ENV") {
            self.plaid.environment = env.parse()?;
        }
        match var("FINSYNC_DEMO_MODE").as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => self.demo_mode = true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => self.demo_mode = false,
            _ => {}
        }
        if let Some(host) = var("FINSYNC_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("FINSYNC_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("FINSYNC_PORT is not a valid port: {}", port))?;
        }
        Ok(())
    }

    /// Save config to the data directory
    pub fn save(&self, finsync_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(finsync_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(finsync_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Database file for the current mode
    pub fn db_path(&self, finsync_dir: &Path) -> PathBuf {
        let db_filename = if self.demo_mode {
            "demo.duckdb"
        } else {
            "finsync.duckdb"
        };
        finsync_dir.join(db_filename)
    }
}
