//! User-facing alerts.
//!
//! Views report failures through a [`Notifier`] exactly once per failed
//! action; the terminal implementation prints to stderr.

use std::cell::RefCell;

use colored::Colorize;

pub trait Notifier {
    fn alert(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn alert(&self, message: &str) {
        (**self).alert(message)
    }
}

/// Prints alerts to stderr in red.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{} {}", "!".red().bold(), message.red());
    }
}

/// Keeps alerts in memory for inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.alerts.borrow().len()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}
