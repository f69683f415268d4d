//! Authentication service.
//!
//! Exchanges credentials for a token pair, keeps the session store in sync,
//! and decides where a fresh login lands. There is no token refresh and no
//! expiry check; a session lasts until `logout`.

use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::activity::{ActivityLog, Outcome};
use crate::api::FraudApi;
use crate::api::types::LoginResponse;
use crate::forms::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
use crate::session::{self, Session, SessionStore};

/// Which view a logged-in user is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    MerchantDashboard,
    AdminDashboard,
}

impl std::fmt::Display for Landing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MerchantDashboard => write!(f, "dashboard"),
            Self::AdminDashboard => write!(f, "admin dashboard"),
        }
    }
}

pub struct AuthService<'a, A: FraudApi> {
    api: A,
    store: &'a mut dyn SessionStore,
    log: ActivityLog,
}

impl<'a, A: FraudApi> AuthService<'a, A> {
    pub fn new(api: A, store: &'a mut dyn SessionStore, log: ActivityLog) -> Self {
        Self { api, store, log }
    }

    /// Log in and persist the session. Returns the landing view.
    ///
    /// On failure nothing is written to the store.
    pub fn login(&mut self, form: &LoginForm) -> Result<Landing> {
        form.validate()?;
        let started = Instant::now();

        let response = match self.api.login(form.email.trim(), &form.password) {
            Ok(response) => response,
            Err(err) => {
                self.log.record(
                    "login",
                    Outcome::Failed,
                    Some(&format!("{err:#}")),
                    Some(started.elapsed()),
                );
                return Err(err.context("Invalid email or password"));
            }
        };

        persist_login(&mut *self.store, &response)?;
        let landing = complete_login(&mut *self.store, &response, &form.role)?;
        self.log
            .record("login", Outcome::Ok, None, Some(started.elapsed()));
        Ok(landing)
    }

    /// Submit a registration. The form state is the caller's; nothing is stored.
    pub fn register(&self, form: &RegisterForm) -> Result<()> {
        form.validate()?;
        let result = self.api.register(&form.to_request());
        match &result {
            Ok(_) => self.log.record("register", Outcome::Ok, None, None),
            Err(err) => self.log.record(
                "register",
                Outcome::Failed,
                Some(&format!("{err:#}")),
                None,
            ),
        }
        result
            .map(|_| ())
            .context("Registration failed. Email may already exist.")
    }

    /// Ask the backend to email a reset link. Returns the backend's message.
    pub fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<String> {
        form.validate()?;
        let email = form.email.trim();
        let response = self
            .api
            .forgot_password(email)
            .context("Could not request a password reset")?;
        self.log.record("forgot-password", Outcome::Ok, None, None);
        Ok(response
            .message
            .unwrap_or_else(|| format!("Reset link sent to {email}")))
    }

    pub fn reset_password(&self, form: &ResetPasswordForm) -> Result<String> {
        form.validate()?;
        let response = self
            .api
            .reset_password(form.token.trim(), &form.new_password)
            .context("Password reset failed")?;
        self.log.record("reset-password", Outcome::Ok, None, None);
        Ok(response
            .message
            .unwrap_or_else(|| "Password updated successfully".to_string()))
    }

    /// Clear every persisted key, not just the auth ones.
    pub fn logout(&mut self) -> Result<()> {
        self.store.clear().context("failed to clear session")?;
        self.log.record("logout", Outcome::Ok, None, None);
        Ok(())
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(session::ACCESS_TOKEN)
    }

    pub fn user(&self) -> Option<Value> {
        Session::load(&*self.store).user
    }

    pub fn username(&self) -> Option<String> {
        self.store.get(session::USERNAME)
    }
}

/// Persist a login response.
///
/// Only acts when both tokens are present. The username comes from
/// `user.name`, then `user.username`, then a top-level `name`.
pub fn persist_login(store: &mut dyn SessionStore, response: &LoginResponse) -> Result<()> {
    let (Some(access), Some(refresh)) = (&response.access, &response.refresh) else {
        return Ok(());
    };

    store.set(session::ACCESS_TOKEN, access)?;
    store.set(session::REFRESH_TOKEN, refresh)?;

    if let Some(user) = &response.user {
        store.set(session::USER, &user.to_string())?;
        let name = user
            .get("name")
            .and_then(non_empty_str)
            .or_else(|| user.get("username").and_then(non_empty_str));
        if let Some(name) = name {
            store.set(session::USERNAME, name)?;
        }
    } else if let Some(name) = response.name.as_deref().filter(|n| !n.is_empty()) {
        store.set(session::USER, &serde_json::json!({ "name": name }).to_string())?;
        store.set(session::USERNAME, name)?;
    }

    Ok(())
}

/// Login-view bookkeeping after the response has been persisted.
///
/// A top-level `username` overrides the stored one. The role is the
/// backend's (top-level, then `user.role`) or else the form's pick, and it
/// picks the landing view.
pub fn complete_login(
    store: &mut dyn SessionStore,
    response: &LoginResponse,
    selected_role: &str,
) -> Result<Landing> {
    if let Some(username) = response.username.as_deref().filter(|u| !u.is_empty()) {
        store.set(session::USERNAME, username)?;
    }

    let role = response
        .role
        .clone()
        .or_else(|| {
            response
                .user
                .as_ref()
                .and_then(|u| u.get("role"))
                .and_then(non_empty_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| selected_role.to_string())
        .to_ascii_lowercase();
    store.set(session::ROLE, &role)?;

    Ok(landing_for(&role))
}

pub fn landing_for(role: &str) -> Landing {
    if role.eq_ignore_ascii_case("admin") {
        Landing::AdminDashboard
    } else {
        Landing::MerchantDashboard
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
