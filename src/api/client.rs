/// HTTP client for the fraud-detection backend.
///
/// Uses the synchronous `ureq` agent. Every endpoint is a single blocking
/// request/response pair; there is no retry or backoff. Non-2xx responses are
/// turned into errors that carry the status code and the response body.
///
/// When a session with an access token is attached, requests carry
/// `Authorization: Bearer <token>`.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::multipart::{MultipartForm, UploadFile};
use super::types::{
    CategoryBucket, FraudSummaryRow, FraudType, FraudulentRecord, LoginResponse,
    MerchantFraudRow, MerchantFraudSummary, MessageResponse, RegisterRequest, Summary,
    UploadResponse,
};
use super::FraudApi;
use crate::config::schema::ApiConfig;
use crate::session::Session;

/// Blocking client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    access_token: Option<String>,
}

impl HttpClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Attach the bearer token of a logged-in session.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.access_token = session.access_token.clone();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the backend answers at all. Any HTTP status counts as reachable.
    pub fn is_reachable(&self) -> bool {
        let result = self
            .agent
            .get(&format!("{}/", self.base_url))
            .timeout(Duration::from_secs(5))
            .call();
        matches!(result, Ok(_) | Err(ureq::Error::Status(..)))
    }

    // -- Endpoints present on the backend but not wired into a view --

    /// `GET /fraud-detection/metrics/`
    pub fn metrics(&self) -> Result<Value> {
        self.get_json("fraud-detection/metrics/", "metrics")
    }

    /// `GET /analytics/fraud-vs-legit/`
    pub fn fraud_vs_legit(&self) -> Result<Value> {
        self.get_json("analytics/fraud-vs-legit/", "fraud-vs-legit analytics")
    }

    /// `GET /analytics/hourly-transactions/`
    pub fn hourly_transactions(&self) -> Result<Value> {
        self.get_json("analytics/hourly-transactions/", "hourly analytics")
    }

    /// `GET /runs/`
    pub fn runs(&self) -> Result<Value> {
        self.get_json("runs/", "detection runs")
    }

    /// `GET /fake-reviews/`
    pub fn fake_reviews(&self) -> Result<Value> {
        self.get_json("fake-reviews/", "fake reviews")
    }

    /// `POST /close/`
    pub fn close_analytics(&self) -> Result<Value> {
        self.post_json("close/", &serde_json::json!({}), "close analytics")
    }

    // -- Internal --

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.access_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let request = self.authorize(self.agent.get(&self.url(path)));
        let response = check(request.call(), what)?;
        response
            .into_json()
            .with_context(|| format!("failed to parse {what} response"))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<T> {
        let request = self.authorize(self.agent.post(&self.url(path)));
        let response = check(request.send_json(body), what)?;
        response
            .into_json()
            .with_context(|| format!("failed to parse {what} response"))
    }

    fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
        what: &str,
    ) -> Result<T> {
        let (content_type, body) = form.finish();
        let request = self
            .authorize(self.agent.post(&self.url(path)))
            .set("Content-Type", &content_type);
        let response = check(request.send_bytes(&body), what)?;
        response
            .into_json()
            .with_context(|| format!("failed to parse {what} response"))
    }
}

/// Turn a `ureq` result into an `anyhow` one, keeping the response body of
/// HTTP errors so the backend's validation messages reach the user.
fn check(
    result: std::result::Result<ureq::Response, ureq::Error>,
    what: &str,
) -> Result<ureq::Response> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                anyhow::bail!("{what} failed with HTTP {code}");
            }
            anyhow::bail!("{what} failed with HTTP {code}: {body}")
        }
        Err(err) => Err(anyhow::Error::new(err).context(format!("{what} request failed"))),
    }
}

/// The backend answers `{"message": ...}` instead of a summary when the temp
/// table is empty.
fn parse_summary(value: Value) -> Result<Summary> {
    if value.get("fraud_type").is_none()
        && let Some(message) = value.get("message").and_then(Value::as_str)
    {
        anyhow::bail!("no detection results available: {message}");
    }
    serde_json::from_value(value).context("failed to parse temp summary")
}

impl FraudApi for HttpClient {
    fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.post_json(
            "auth/login/",
            &serde_json::json!({ "email": email, "password": password }),
            "login",
        )
    }

    fn register(&self, request: &RegisterRequest) -> Result<MessageResponse> {
        self.post_json("auth/register/", request, "registration")
    }

    fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        self.post_json(
            "auth/forgot-password/",
            &serde_json::json!({ "email": email }),
            "password reset request",
        )
    }

    fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        self.post_json(
            "auth/reset-password/",
            &serde_json::json!({ "token": token, "new_password": new_password }),
            "password reset",
        )
    }

    fn predict_upload(
        &self,
        fraud_type: FraudType,
        file: &UploadFile,
        username: &str,
    ) -> Result<UploadResponse> {
        let form = MultipartForm::new()
            .file("file", file)
            .text("username", username);
        self.post_multipart(&format!("predict-upload/{fraud_type}/"), form, "upload")
    }

    fn upload_file(
        &self,
        fraud_type: FraudType,
        merchant_name: &str,
        file: &UploadFile,
    ) -> Result<UploadResponse> {
        let form = MultipartForm::new()
            .text("fraud_type", fraud_type.as_str())
            .text("merchant_name", merchant_name)
            .file("file", file);
        self.post_multipart("predict-upload/", form, "upload")
    }

    fn temp_summary(&self) -> Result<Summary> {
        let value: Value = self.get_json("temp-summary/", "temp summary")?;
        parse_summary(value)
    }

    fn category_summary(&self) -> Result<Vec<CategoryBucket>> {
        self.get_json("temp-category/", "category summary")
    }

    fn clear_temp(&self) -> Result<MessageResponse> {
        self.post_json("clear-temp/", &serde_json::json!({}), "clear temp")
    }

    fn merchant_fraud_summary(&self, merchant: &str) -> Result<MerchantFraudSummary> {
        let request = self
            .authorize(self.agent.get(&self.url("merchant-fraud-summary/")))
            .query("merchant", merchant);
        let response = check(request.call(), "merchant summary")?;
        response
            .into_json()
            .context("failed to parse merchant summary response")
    }

    fn admin_fraud_summary(&self) -> Result<Vec<FraudSummaryRow>> {
        self.get_json("admin-dashboard/fraud-summary/", "fraud summary")
    }

    fn admin_merchant_fraud(&self) -> Result<Vec<MerchantFraudRow>> {
        self.get_json("admin-dashboard/merchant-fraud/", "merchant fraud")
    }

    fn admin_fraudulent_records(&self) -> Result<Vec<FraudulentRecord>> {
        self.get_json("admin-dashboard/fraudulent-records/", "fraudulent records")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
