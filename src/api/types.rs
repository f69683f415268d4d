//! Wire types for the fraud-detection backend.
//!
//! Every type here is a transient projection of one JSON response. Optional
//! fields are `Option` or `#[serde(default)]` because the backend omits them
//! freely depending on which pipeline produced the data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Fraud types
// ---------------------------------------------------------------------------

/// Which backend model/pipeline processes an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudType {
    FakeReview,
    Payment,
    Chargeback,
    Merchant,
}

impl FraudType {
    /// All fraud types in the order the picker lists them.
    pub const ALL: [FraudType; 4] = [
        FraudType::FakeReview,
        FraudType::Payment,
        FraudType::Chargeback,
        FraudType::Merchant,
    ];

    /// Wire name used in URLs and form fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FakeReview => "fake_review",
            Self::Payment => "payment",
            Self::Chargeback => "chargeback",
            Self::Merchant => "merchant",
        }
    }
}

impl fmt::Display for FraudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FraudType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fake_review" => Ok(Self::FakeReview),
            "payment" => Ok(Self::Payment),
            "chargeback" => Ok(Self::Chargeback),
            "merchant" => Ok(Self::Merchant),
            other => anyhow::bail!(
                "unknown fraud type '{other}' (expected fake_review, payment, chargeback or merchant)"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Response body of `POST /auth/login/`.
///
/// The token pair is only meaningful when both halves are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub user: Option<Value>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

/// Request body of `POST /auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub pincode: String,
    pub mobile_no: String,
    pub role: String,
}

/// Generic `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Response body of both upload endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub fraud_type: Option<String>,
    pub merchant_name: Option<String>,
    pub total_records: u64,
    pub results: Vec<Value>,
}

/// One classified record from the temp summary.
///
/// An open key/value bag: the backend guarantees `transaction_id`,
/// `captured_text` and `status`, anything else is passed through. Key order
/// is preserved so CSV export columns follow the backend's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(pub Map<String, Value>);

impl Transaction {
    /// The transaction id, whether the backend sent it as a string or a number.
    pub fn id(&self) -> String {
        self.0
            .get("transaction_id")
            .map(display_value)
            .unwrap_or_default()
    }

    pub fn captured_text(&self) -> String {
        self.0
            .get("captured_text")
            .map(display_value)
            .unwrap_or_default()
    }

    pub fn status(&self) -> String {
        self.0.get("status").map(display_value).unwrap_or_default()
    }

    /// Whether the status reads as fraudulent (`"Fraud"` or `true`).
    pub fn is_fraud(&self) -> bool {
        match self.0.get("status") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("fraud"),
            _ => false,
        }
    }

    /// Column names in backend order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Text rendering of one field; missing and null fields are empty.
    pub fn field(&self, key: &str) -> String {
        self.0.get(key).map(display_value).unwrap_or_default()
    }
}

/// Render a JSON scalar the way a table cell shows it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Aggregate of the most recent, not-yet-cleared detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub fraud_type: FraudType,
    #[serde(default)]
    pub merchant_name: Option<String>,
    pub total_transactions: u64,
    pub total_fraud: u64,
    pub total_non_fraud: u64,
    pub fraud_percentage: f64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Fraud / non-fraud counts for one captured-text category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub captured_text: Option<String>,
    pub fraud: u64,
    pub non_fraud: u64,
    #[serde(default)]
    pub total: Option<u64>,
}

impl CategoryBucket {
    /// Bar label; uncategorised records are grouped under `(none)`.
    pub fn label(&self) -> &str {
        self.captured_text.as_deref().unwrap_or("(none)")
    }

    pub fn count(&self) -> u64 {
        self.fraud + self.non_fraud
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Per-fraud-type counts, shared by the merchant summary and the admin view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudSummaryRow {
    pub fraud_type: String,
    pub total_transactions: u64,
    pub fraudulent: u64,
    pub non_fraudulent: u64,
    #[serde(default)]
    pub fraud_percentage: Option<f64>,
}

/// Historical fraud split for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantFraudSummary {
    pub merchant_name: String,
    #[serde(default)]
    pub fraud_summary: Vec<FraudSummaryRow>,
    #[serde(rename = "totalTransactions", default)]
    pub total_transactions: Option<u64>,
    #[serde(rename = "totalFraudTransactions", default)]
    pub total_fraud_transactions: Option<u64>,
    #[serde(rename = "totalNonFraudTransaction", default)]
    pub total_non_fraud_transactions: Option<u64>,
}

impl MerchantFraudSummary {
    /// Fraudulent count, falling back to the sum of the per-type rows.
    pub fn fraud_count(&self) -> u64 {
        self.total_fraud_transactions
            .unwrap_or_else(|| self.fraud_summary.iter().map(|r| r.fraudulent).sum())
    }

    /// Legitimate count, falling back to the sum of the per-type rows.
    pub fn legit_count(&self) -> u64 {
        self.total_non_fraud_transactions
            .unwrap_or_else(|| self.fraud_summary.iter().map(|r| r.non_fraudulent).sum())
    }
}

/// Total vs fraudulent counts for one merchant (admin view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantFraudRow {
    pub merchant_name: Option<String>,
    pub total: u64,
    pub fraudulent: u64,
}

/// One stored prediction as listed for admin inspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudulentRecord {
    pub transaction_id: Option<String>,
    pub merchant_name: Option<String>,
    pub fraud_type: Option<String>,
    pub captured_text: Option<String>,
    pub status: Option<bool>,
}

impl FraudulentRecord {
    /// Status label used in tables and exports.
    pub fn status_label(&self) -> &'static str {
        if self.status.unwrap_or(false) {
            "FRAUD"
        } else {
            "REAL"
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
