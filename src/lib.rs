//! Fraudwatch: terminal client for the fraud-detection backend.

pub mod activity;
pub mod admin;
pub mod alert;
pub mod api;
pub mod auth;
pub mod charts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod forms;
pub mod session;
