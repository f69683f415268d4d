//! Canned-response backend shared by the view tests.
//!
//! Every endpoint records its name in `calls`. Failure switches make one
//! endpoint return an error. `during_upload` runs inside the upload call so a
//! test can poke at the view while a run is in flight.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use anyhow::{Result, bail};
use serde_json::{Value, json};

use fraudwatch::api::{
    CategoryBucket, FraudApi, FraudSummaryRow, FraudType, FraudulentRecord, LoginResponse,
    MerchantFraudRow, MerchantFraudSummary, MessageResponse, RegisterRequest, Summary,
    UploadFile, UploadResponse,
};

#[derive(Default)]
pub struct FakeApi {
    pub merchant: Option<MerchantFraudSummary>,
    pub summary: RefCell<Option<Summary>>,
    pub buckets: Vec<CategoryBucket>,
    pub fraud_summary: Vec<FraudSummaryRow>,
    pub merchants: Vec<MerchantFraudRow>,
    pub records: Vec<FraudulentRecord>,
    pub login: Option<LoginResponse>,

    pub fail_upload: Cell<bool>,
    pub fail_summary: Cell<bool>,
    pub fail_category: Cell<bool>,
    pub fail_clear: Cell<bool>,
    pub fail_fraud_summary: Cell<bool>,
    pub fail_merchants: Cell<bool>,
    pub fail_records: Cell<bool>,

    pub calls: RefCell<Vec<&'static str>>,
    /// `(fraud_type, merchant_name, file name)` per upload.
    pub uploads: RefCell<Vec<(FraudType, String, String)>>,
    pub during_upload: RefCell<Option<Box<dyn Fn()>>>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.borrow().iter().any(|c| *c == name)
    }

    pub fn set_summary(&self, summary: Summary) {
        *self.summary.borrow_mut() = Some(summary);
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }
}

impl FraudApi for FakeApi {
    fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse> {
        self.record("login");
        match &self.login {
            Some(response) => Ok(response.clone()),
            None => bail!("login failed with HTTP 401"),
        }
    }

    fn register(&self, _request: &RegisterRequest) -> Result<MessageResponse> {
        self.record("register");
        Ok(MessageResponse::default())
    }

    fn forgot_password(&self, _email: &str) -> Result<MessageResponse> {
        self.record("forgot_password");
        Ok(MessageResponse::default())
    }

    fn reset_password(&self, _token: &str, _new_password: &str) -> Result<MessageResponse> {
        self.record("reset_password");
        Ok(MessageResponse::default())
    }

    fn predict_upload(
        &self,
        _fraud_type: FraudType,
        _file: &UploadFile,
        _username: &str,
    ) -> Result<UploadResponse> {
        self.record("predict_upload");
        Ok(UploadResponse::default())
    }

    fn upload_file(
        &self,
        fraud_type: FraudType,
        merchant_name: &str,
        file: &UploadFile,
    ) -> Result<UploadResponse> {
        self.record("upload_file");
        self.uploads
            .borrow_mut()
            .push((fraud_type, merchant_name.to_string(), file.name.clone()));
        if let Some(hook) = self.during_upload.borrow().as_ref() {
            hook();
        }
        if self.fail_upload.get() {
            bail!("upload failed with HTTP 500");
        }
        Ok(UploadResponse::default())
    }

    fn temp_summary(&self) -> Result<Summary> {
        self.record("temp_summary");
        if self.fail_summary.get() {
            bail!("temp summary failed with HTTP 500");
        }
        match self.summary.borrow().clone() {
            Some(summary) => Ok(summary),
            None => bail!("no detection results available"),
        }
    }

    fn category_summary(&self) -> Result<Vec<CategoryBucket>> {
        self.record("category_summary");
        if self.fail_category.get() {
            bail!("category summary failed with HTTP 500");
        }
        Ok(self.buckets.clone())
    }

    fn clear_temp(&self) -> Result<MessageResponse> {
        self.record("clear_temp");
        if self.fail_clear.get() {
            bail!("clear temp failed with HTTP 500");
        }
        Ok(MessageResponse::default())
    }

    fn merchant_fraud_summary(&self, _merchant: &str) -> Result<MerchantFraudSummary> {
        self.record("merchant_fraud_summary");
        match &self.merchant {
            Some(summary) => Ok(summary.clone()),
            None => bail!("merchant summary failed with HTTP 404"),
        }
    }

    fn admin_fraud_summary(&self) -> Result<Vec<FraudSummaryRow>> {
        self.record("admin_fraud_summary");
        if self.fail_fraud_summary.get() {
            bail!("fraud summary failed with HTTP 500");
        }
        Ok(self.fraud_summary.clone())
    }

    fn admin_merchant_fraud(&self) -> Result<Vec<MerchantFraudRow>> {
        self.record("admin_merchant_fraud");
        if self.fail_merchants.get() {
            bail!("merchant fraud failed with HTTP 500");
        }
        Ok(self.merchants.clone())
    }

    fn admin_fraudulent_records(&self) -> Result<Vec<FraudulentRecord>> {
        self.record("admin_fraudulent_records");
        if self.fail_records.get() {
            bail!("fraudulent records failed with HTTP 500");
        }
        Ok(self.records.clone())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn merchant_summary() -> MerchantFraudSummary {
    serde_json::from_value(json!({
        "merchant_name": "Retail",
        "fraud_summary": [
            {"fraud_type": "payment", "total_transactions": 30, "fraudulent": 6, "non_fraudulent": 24},
            {"fraud_type": "chargeback", "total_transactions": 10, "fraudulent": 1, "non_fraudulent": 9}
        ]
    }))
    .unwrap()
}

pub fn summary(fraud_type: &str) -> Summary {
    serde_json::from_value(json!({
        "fraud_type": fraud_type,
        "merchant_name": "alice",
        "total_transactions": 3,
        "total_fraud": 1,
        "total_non_fraud": 2,
        "fraud_percentage": 33.3,
        "transactions": [
            {"transaction_id": "t1", "captured_text": "Electronics", "status": "Fraud"},
            {"transaction_id": "t2", "captured_text": "Books, used", "status": "Non-fraud"},
            {"transaction_id": "t3", "captured_text": "Books", "status": "Non-fraud"}
        ]
    }))
    .unwrap()
}

pub fn buckets() -> Vec<CategoryBucket> {
    serde_json::from_value(json!([
        {"captured_text": "Electronics", "fraud": 1, "non_fraud": 0},
        {"captured_text": "Books", "fraud": 0, "non_fraud": 2}
    ]))
    .unwrap()
}

pub fn upload() -> UploadFile {
    UploadFile::new("batch.csv", b"transaction_id,amount\nt1,10\n".to_vec())
}

pub fn record(id: &str, fraud_type: &str, status: bool) -> FraudulentRecord {
    FraudulentRecord {
        transaction_id: Some(id.to_string()),
        merchant_name: Some("Retail".to_string()),
        fraud_type: Some(fraud_type.to_string()),
        captured_text: Some(format!("text for {id}")),
        status: Some(status),
    }
}

pub fn login_response(value: Value) -> LoginResponse {
    serde_json::from_value(value).unwrap()
}
