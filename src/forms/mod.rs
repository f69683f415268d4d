//! Login, registration and password-reset forms.
//!
//! Each form validates locally before anything is sent; the messages are the
//! alerts shown to the user.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::api::types::RegisterRequest;

/// Role submitted with every self-registration. The backend assigns the
/// real role and ignores this one.
pub const SELF_REGISTER_ROLE: &str = "merchant";

/// The backend rejects shorter passwords.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Role picked on the form; only used when the backend sends none.
    pub role: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: SELF_REGISTER_ROLE.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            anyhow::bail!("Please enter email and password");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub address: String,
    pub pincode: String,
    pub mobile_no: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<()> {
        if self.password != self.confirm_password {
            anyhow::bail!("Passwords do not match!");
        }
        if self.name.trim().is_empty() {
            anyhow::bail!("Please enter your name");
        }
        if !is_valid_email(&self.email) {
            anyhow::bail!("Please enter a valid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            anyhow::bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
        }
        Ok(())
    }

    /// The fixed field set sent to the backend.
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            address: self.address.clone(),
            pincode: self.pincode.clone(),
            mobile_no: self.mobile_no.clone(),
            role: SELF_REGISTER_ROLE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Forgot / reset password
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_email(&self.email) {
            anyhow::bail!("Please enter a valid email address");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            anyhow::bail!("Reset token is missing");
        }
        if self.new_password != self.confirm_password {
            anyhow::bail!("Passwords do not match!");
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            anyhow::bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
