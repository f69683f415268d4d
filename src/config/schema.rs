/// Configuration schema and defaults for fraudwatch.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[api]`, `[dashboard]`, `[session]` and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

use crate::api::types::FraudType;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level fraudwatch configuration.
///
/// Maps directly to the `~/.fraudwatch/config.toml` and `.fraudwatch.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudwatchConfig {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the fraud-detection API, including the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout in milliseconds. Uploads run model inference
    /// server-side, so this is generous.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout_ms: 120_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Merchant dashboard behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Merchant whose historical fraud split is shown before a detection run.
    pub default_merchant: String,
    /// Largest upload accepted by the file picker, in megabytes.
    pub max_upload_mb: u64,
    /// Fraud types whose results get a per-category breakdown chart.
    pub category_fraud_types: Vec<FraudType>,
    /// Quiet period before a burst of resize events is applied.
    pub resize_debounce_ms: u64,
    /// Width in columns of rendered charts.
    pub chart_width: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_merchant: "Retail".to_string(),
            max_upload_mb: 25,
            category_fraud_types: vec![FraudType::Payment, FraudType::Merchant],
            resize_debounce_ms: 150,
            chart_width: 40,
        }
    }
}

impl DashboardConfig {
    /// Whether a run of this type gets the category bar chart.
    pub fn needs_category(&self, fraud_type: FraudType) -> bool {
        self.category_fraud_types.contains(&fraud_type)
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

// ---------------------------------------------------------------------------
// [session]
// ---------------------------------------------------------------------------

/// Where the persisted session lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path to the session file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: "~/.fraudwatch/session.json".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether activity logging is enabled.
    pub enabled: bool,
    /// Path to the activity log file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.fraudwatch/activity.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl FraudwatchConfig {
    /// The annotated TOML written by `fraudwatch config init`.
    pub fn default_toml() -> String {
        r#"# fraudwatch Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (FRAUDWATCH_*)
#   2. Project config (.fraudwatch.toml in current directory)
#   3. User global config (~/.fraudwatch/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://127.0.0.1:8000/api"
timeout_ms = 120000

[dashboard]
default_merchant = "Retail"
max_upload_mb = 25
category_fraud_types = ["payment", "merchant"]   # fake_review | payment | chargeback | merchant
resize_debounce_ms = 150
chart_width = 40

[session]
path = "~/.fraudwatch/session.json"

[logging]
enabled = true
path = "~/.fraudwatch/activity.jsonl"
"#
        .to_string()
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> Option<std::path::PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(std::path::PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
