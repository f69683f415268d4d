//! Fraud-detection backend API.
//!
//! [`FraudApi`] is the seam every view talks through: [`client::HttpClient`]
//! implements it over HTTP, tests implement it with canned responses.

pub mod client;
pub mod multipart;
pub mod types;

use anyhow::Result;

pub use client::HttpClient;
pub use multipart::UploadFile;
pub use types::{
    CategoryBucket, FraudSummaryRow, FraudType, FraudulentRecord, LoginResponse,
    MerchantFraudRow, MerchantFraudSummary, MessageResponse, RegisterRequest, Summary,
    Transaction, UploadResponse,
};

/// One method per backend endpoint used by the views.
pub trait FraudApi {
    /// `POST /auth/login/`
    fn login(&self, email: &str, password: &str) -> Result<LoginResponse>;

    /// `POST /auth/register/`
    fn register(&self, request: &RegisterRequest) -> Result<MessageResponse>;

    /// `POST /auth/forgot-password/`
    fn forgot_password(&self, email: &str) -> Result<MessageResponse>;

    /// `POST /auth/reset-password/`
    fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse>;

    /// `POST /predict-upload/{fraud_type}/` with `file` and `username` parts.
    fn predict_upload(
        &self,
        fraud_type: FraudType,
        file: &UploadFile,
        username: &str,
    ) -> Result<UploadResponse>;

    /// `POST /predict-upload/` with `fraud_type`, `merchant_name` and `file` parts.
    fn upload_file(
        &self,
        fraud_type: FraudType,
        merchant_name: &str,
        file: &UploadFile,
    ) -> Result<UploadResponse>;

    /// `GET /temp-summary/`
    fn temp_summary(&self) -> Result<Summary>;

    /// `GET /temp-category/`
    fn category_summary(&self) -> Result<Vec<CategoryBucket>>;

    /// `POST /clear-temp/`
    fn clear_temp(&self) -> Result<MessageResponse>;

    /// `GET /merchant-fraud-summary/?merchant=`
    fn merchant_fraud_summary(&self, merchant: &str) -> Result<MerchantFraudSummary>;

    /// `GET /admin-dashboard/fraud-summary/`
    fn admin_fraud_summary(&self) -> Result<Vec<FraudSummaryRow>>;

    /// `GET /admin-dashboard/merchant-fraud/`
    fn admin_merchant_fraud(&self) -> Result<Vec<MerchantFraudRow>>;

    /// `GET /admin-dashboard/fraudulent-records/`
    fn admin_fraudulent_records(&self) -> Result<Vec<FraudulentRecord>>;
}

impl<T: FraudApi + ?Sized> FraudApi for &T {
    fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        (**self).login(email, password)
    }

    fn register(&self, request: &RegisterRequest) -> Result<MessageResponse> {
        (**self).register(request)
    }

    fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        (**self).forgot_password(email)
    }

    fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        (**self).reset_password(token, new_password)
    }

    fn predict_upload(
        &self,
        fraud_type: FraudType,
        file: &UploadFile,
        username: &str,
    ) -> Result<UploadResponse> {
        (**self).predict_upload(fraud_type, file, username)
    }

    fn upload_file(
        &self,
        fraud_type: FraudType,
        merchant_name: &str,
        file: &UploadFile,
    ) -> Result<UploadResponse> {
        (**self).upload_file(fraud_type, merchant_name, file)
    }

    fn temp_summary(&self) -> Result<Summary> {
        (**self).temp_summary()
    }

    fn category_summary(&self) -> Result<Vec<CategoryBucket>> {
        (**self).category_summary()
    }

    fn clear_temp(&self) -> Result<MessageResponse> {
        (**self).clear_temp()
    }

    fn merchant_fraud_summary(&self, merchant: &str) -> Result<MerchantFraudSummary> {
        (**self).merchant_fraud_summary(merchant)
    }

    fn admin_fraud_summary(&self) -> Result<Vec<FraudSummaryRow>> {
        (**self).admin_fraud_summary()
    }

    fn admin_merchant_fraud(&self) -> Result<Vec<MerchantFraudRow>> {
        (**self).admin_merchant_fraud()
    }

    fn admin_fraudulent_records(&self) -> Result<Vec<FraudulentRecord>> {
        (**self).admin_fraudulent_records()
    }
}
