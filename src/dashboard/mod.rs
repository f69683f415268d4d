//! Merchant dashboard view.
//!
//! Owns the three chart slots (pre-detection merchant donut, post-detection
//! donut, category bar) and sequences a detection run:
//! upload → summary → donut → optional category bar. Every mutation of view
//! state happens here, on the caller's thread.

pub mod run;

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::activity::{ActivityLog, Outcome};
use crate::alert::Notifier;
use crate::api::{
    CategoryBucket, FraudApi, FraudType, MerchantFraudSummary, Summary, Transaction, UploadFile,
};
use crate::charts::{Chart, ChartSlot, ChartSpec, ResizeDebouncer, Series, SeriesColor};
use crate::config::DashboardConfig;
use crate::export::{self, CsvExport};

pub use run::{CancelToken, Rejection, RunGate, RunOutcome, RunTicket};

pub const MISSING_INPUT_ALERT: &str = "Please select fraud type and choose a file.";
pub const IN_FLIGHT_ALERT: &str = "Detection already in progress.";
pub const DETECTION_FAILED_ALERT: &str = "Detection failed. Please try again.";
pub const CLEAR_FAILED_ALERT: &str = "Failed to clear dashboard.";

/// Clonable handles for signalling a busy view from elsewhere.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    pub gate: RunGate,
    pub cancel: CancelToken,
}

pub struct Dashboard<A: FraudApi, N: Notifier> {
    api: A,
    notifier: N,
    settings: DashboardConfig,
    log: ActivityLog,
    username: String,

    fraud_type: Option<FraudType>,
    file: Option<UploadFile>,

    merchant_summary: Option<MerchantFraudSummary>,
    summary: Option<Summary>,
    category: Vec<CategoryBucket>,

    merchant_donut: ChartSlot,
    donut: ChartSlot,
    bar: ChartSlot,

    gate: RunGate,
    cancel: CancelToken,
    resize: ResizeDebouncer,
    width: u16,
}

impl<A: FraudApi, N: Notifier> Dashboard<A, N> {
    pub fn new(api: A, notifier: N, settings: DashboardConfig, username: impl Into<String>) -> Self {
        let resize = ResizeDebouncer::new(Duration::from_millis(settings.resize_debounce_ms));
        let width = settings.chart_width;
        Self {
            api,
            notifier,
            settings,
            log: ActivityLog::disabled(),
            username: username.into(),
            fraud_type: None,
            file: None,
            merchant_summary: None,
            summary: None,
            category: Vec::new(),
            merchant_donut: ChartSlot::new("merchant-donut"),
            donut: ChartSlot::new("detection-donut"),
            bar: ChartSlot::new("category-bar"),
            gate: RunGate::new(),
            cancel: CancelToken::new(),
            resize,
            width,
        }
    }

    pub fn with_log(mut self, log: ActivityLog) -> Self {
        self.log = log;
        self
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Fetch the merchant's historical split and draw the merchant donut.
    ///
    /// Failure is logged and returned; the view stays usable without it.
    pub fn load(&mut self, merchant: &str) -> Result<()> {
        let started = Instant::now();
        let result = self
            .api
            .merchant_fraud_summary(merchant)
            .with_context(|| format!("failed to load merchant summary for {merchant}"));

        match result {
            Ok(summary) => {
                if self.summary.is_none() {
                    self.merchant_donut.request(merchant_donut(&summary));
                }
                self.merchant_summary = Some(summary);
                self.flush();
                self.log
                    .record("dashboard-load", Outcome::Ok, Some(merchant), Some(started.elapsed()));
                Ok(())
            }
            Err(err) => {
                self.log.record(
                    "dashboard-load",
                    Outcome::Failed,
                    Some(&format!("{err:#}")),
                    Some(started.elapsed()),
                );
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    pub fn select_fraud_type(&mut self, fraud_type: FraudType) {
        self.fraud_type = Some(fraud_type);
    }

    /// Choose the upload. Oversized files are refused and clear the selection.
    pub fn select_file(&mut self, file: UploadFile) -> bool {
        if file.len() as u64 > self.settings.max_upload_bytes() {
            self.reject_oversized();
            return false;
        }
        self.file = Some(file);
        true
    }

    /// Like [`select_file`](Self::select_file), checking the size before reading.
    pub fn select_path(&mut self, path: &Path) -> Result<bool> {
        let len = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();
        if len > self.settings.max_upload_bytes() {
            self.reject_oversized();
            return Ok(false);
        }
        Ok(self.select_file(UploadFile::from_path(path)?))
    }

    fn reject_oversized(&mut self) {
        self.file = None;
        self.notifier.alert(&format!(
            "File too large. Max {}MB.",
            self.settings.max_upload_mb
        ));
    }

    // -----------------------------------------------------------------------
    // Detection run
    // -----------------------------------------------------------------------

    /// Run upload → summary → charts for the selected inputs.
    ///
    /// At most one run is in flight; the loading flag is the gate and clears
    /// on every exit. A failure raises exactly one alert. A teardown while the
    /// chain is pending stops it between steps without alerting.
    pub fn run_detection(&mut self) -> RunOutcome {
        if self.cancel.is_cancelled() {
            return RunOutcome::Rejected(Rejection::TornDown);
        }

        let Some(fraud_type) = self.fraud_type.filter(|_| self.file.is_some()) else {
            self.notifier.alert(MISSING_INPUT_ALERT);
            self.log
                .record("detect", Outcome::Rejected, Some("missing input"), None);
            return RunOutcome::Rejected(Rejection::MissingInput);
        };

        let Some(_ticket) = self.gate.try_begin() else {
            self.notifier.alert(IN_FLIGHT_ALERT);
            self.log
                .record("detect", Outcome::Rejected, Some("run in flight"), None);
            return RunOutcome::Rejected(Rejection::InFlight);
        };

        let started = Instant::now();
        let file = self.file.take().unwrap_or_default();
        let result = self.detection_chain(fraud_type, &file);
        self.file = Some(file);

        let detail = fraud_type.to_string();
        match result {
            Ok(Some(categorical)) => {
                self.log
                    .record("detect", Outcome::Ok, Some(&detail), Some(started.elapsed()));
                RunOutcome::Completed { categorical }
            }
            Ok(None) => {
                self.log
                    .record("detect", Outcome::Cancelled, Some(&detail), Some(started.elapsed()));
                RunOutcome::Cancelled
            }
            Err(err) => {
                self.notifier.alert(DETECTION_FAILED_ALERT);
                self.log.record(
                    "detect",
                    Outcome::Failed,
                    Some(&format!("{fraud_type}: {err:#}")),
                    Some(started.elapsed()),
                );
                RunOutcome::Failed(err)
            }
        }
    }

    /// `Ok(None)` when cancelled, else whether the bar chart was drawn.
    fn detection_chain(&mut self, fraud_type: FraudType, file: &UploadFile) -> Result<Option<bool>> {
        self.api
            .upload_file(fraud_type, &self.username, file)
            .context("upload failed")?;
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        let summary = self.api.temp_summary().context("failed to fetch summary")?;
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        self.merchant_donut.destroy();
        self.donut.request(detection_donut(&summary));
        let summary_type = summary.fraud_type;
        self.summary = Some(summary);
        self.flush();

        // The previous run's breakdown never outlives its summary.
        self.bar.destroy();
        self.category.clear();
        if !self.settings.needs_category(summary_type) {
            return Ok(Some(false));
        }

        let buckets = self
            .api
            .category_summary()
            .context("failed to fetch category breakdown")?;
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        self.bar.request(category_bar(&buckets));
        self.category = buckets;
        self.flush();
        Ok(Some(true))
    }

    // -----------------------------------------------------------------------
    // Close / export
    // -----------------------------------------------------------------------

    /// Clear the server's scratch run and reset to the pre-detection view.
    ///
    /// On failure the view is left exactly as it was.
    pub fn close_dashboard(&mut self) -> bool {
        if let Err(err) = self.api.clear_temp() {
            self.notifier.alert(CLEAR_FAILED_ALERT);
            self.log
                .record("close", Outcome::Failed, Some(&format!("{err:#}")), None);
            return false;
        }

        self.summary = None;
        self.category.clear();
        self.donut.destroy();
        self.bar.destroy();
        if let Some(merchant) = &self.merchant_summary {
            self.merchant_donut.request(merchant_donut(merchant));
            self.flush();
        }
        self.log.record("close", Outcome::Ok, None, None);
        true
    }

    /// Current transactions as CSV, or `None` when there is nothing to export.
    pub fn export_csv(&self) -> Result<Option<CsvExport>> {
        let Some(summary) = &self.summary else {
            return Ok(None);
        };
        let Some(contents) = export::transactions_csv(&summary.transactions)? else {
            return Ok(None);
        };
        self.log.record(
            "export",
            Outcome::Ok,
            Some(&format!("{} transactions", summary.transactions.len())),
            None,
        );
        Ok(Some(CsvExport {
            file_name: format!("{}_transactions.csv", summary.fraud_type),
            contents,
        }))
    }

    // -----------------------------------------------------------------------
    // Chart lifecycle
    // -----------------------------------------------------------------------

    /// Deferred tick: materialize every pending chart. Returns how many.
    pub fn flush(&mut self) -> usize {
        let width = self.width;
        [&mut self.merchant_donut, &mut self.donut, &mut self.bar]
            .into_iter()
            .map(|slot| slot.commit(width))
            .filter(|created| *created)
            .count()
    }

    pub fn on_resize(&mut self, now: Instant, width: u16) {
        self.resize.push(now, width);
    }

    /// Apply a settled resize to every live chart. Returns `true` if one was applied.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        let Some(width) = self.resize.poll(now) else {
            return false;
        };
        self.width = width;
        for slot in [&mut self.merchant_donut, &mut self.donut, &mut self.bar] {
            slot.resize(width);
        }
        true
    }

    /// Destroy all charts and stop any pending chain. Returns charts destroyed.
    pub fn teardown(&mut self) -> usize {
        self.cancel.cancel();
        self.resize.cancel();
        [&mut self.merchant_donut, &mut self.donut, &mut self.bar]
            .into_iter()
            .map(ChartSlot::destroy)
            .filter(|destroyed| *destroyed)
            .count()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn handle(&self) -> DashboardHandle {
        DashboardHandle {
            gate: self.gate.clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn fraud_type(&self) -> Option<FraudType> {
        self.fraud_type
    }

    pub fn file(&self) -> Option<&UploadFile> {
        self.file.as_ref()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.summary
            .as_ref()
            .map(|s| s.transactions.as_slice())
            .unwrap_or_default()
    }

    pub fn category(&self) -> &[CategoryBucket] {
        &self.category
    }

    pub fn merchant_summary(&self) -> Option<&MerchantFraudSummary> {
        self.merchant_summary.as_ref()
    }

    pub fn merchant_donut(&self) -> &ChartSlot {
        &self.merchant_donut
    }

    pub fn donut(&self) -> &ChartSlot {
        &self.donut
    }

    pub fn bar(&self) -> &ChartSlot {
        &self.bar
    }

    /// Live charts in display order.
    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        [&self.merchant_donut, &self.donut, &self.bar]
            .into_iter()
            .filter_map(ChartSlot::chart)
    }

    pub fn width(&self) -> u16 {
        self.width
    }
}

// ---------------------------------------------------------------------------
// Chart specs
// ---------------------------------------------------------------------------

pub fn merchant_donut(summary: &MerchantFraudSummary) -> ChartSpec {
    ChartSpec::doughnut(
        format!("{} fraud history", summary.merchant_name),
        &[
            ("Fraud", summary.fraud_count(), SeriesColor::Red),
            ("Legit", summary.legit_count(), SeriesColor::Green),
        ],
    )
}

pub fn detection_donut(summary: &Summary) -> ChartSpec {
    ChartSpec::doughnut(
        format!("{} detection", summary.fraud_type),
        &[
            ("Fraud", summary.total_fraud, SeriesColor::Red),
            ("Non-Fraud", summary.total_non_fraud, SeriesColor::Green),
        ],
    )
}

/// One stacked bar per bucket: fraud then non-fraud.
pub fn category_bar(buckets: &[CategoryBucket]) -> ChartSpec {
    ChartSpec::stacked_bar(
        "Fraud by category",
        buckets.iter().map(|b| b.label().to_string()).collect(),
        vec![
            Series::new("Fraud", SeriesColor::Red, buckets.iter().map(|b| b.fraud).collect()),
            Series::new(
                "Non-Fraud",
                SeriesColor::Green,
                buckets.iter().map(|b| b.non_fraud).collect(),
            ),
        ],
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
