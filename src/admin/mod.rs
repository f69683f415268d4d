//! Admin aggregate view.
//!
//! Read-only. Loads three independent aggregates, draws one doughnut per
//! fraud type and a grouped bar across merchants, and filters the flat
//! fraudulent-record list by fraud type.

use std::time::Instant;

use anyhow::{Context, Error, Result};

use crate::activity::{ActivityLog, Outcome};
use crate::api::{FraudApi, FraudSummaryRow, FraudulentRecord, MerchantFraudRow};
use crate::charts::{Chart, ChartSlot, ChartSpec, Series, SeriesColor};
use crate::export::{self, CsvExport};

pub const EXPORT_FILE_NAME: &str = "fraudulent_records.csv";

/// Label used for merchants the backend sends without a name.
const UNNAMED_MERCHANT: &str = "(unnamed)";

pub struct AdminDashboard<A: FraudApi> {
    api: A,
    log: ActivityLog,
    width: u16,

    fraud_summary: Vec<FraudSummaryRow>,
    merchants: Vec<MerchantFraudRow>,
    records: Vec<FraudulentRecord>,
    selection: String,

    type_donuts: Vec<ChartSlot>,
    merchant_bar: ChartSlot,
}

impl<A: FraudApi> AdminDashboard<A> {
    pub fn new(api: A, width: u16) -> Self {
        Self {
            api,
            log: ActivityLog::disabled(),
            width,
            fraud_summary: Vec::new(),
            merchants: Vec::new(),
            records: Vec::new(),
            selection: String::new(),
            type_donuts: Vec::new(),
            merchant_bar: ChartSlot::new("merchant-bar"),
        }
    }

    pub fn with_log(mut self, log: ActivityLog) -> Self {
        self.log = log;
        self
    }

    /// Fetch all three aggregates. A failed fetch empties its section, even
    /// on a reload, and does not stop the others; the failures are returned.
    pub fn load(&mut self) -> Vec<Error> {
        let started = Instant::now();
        let mut failures = Vec::new();

        match self
            .api
            .admin_fraud_summary()
            .context("failed to load fraud-type summary")
        {
            Ok(rows) => {
                self.type_donuts = rows
                    .iter()
                    .map(|row| {
                        let mut slot = ChartSlot::new("fraud-type-donut");
                        slot.request(fraud_type_donut(row));
                        slot
                    })
                    .collect();
                self.fraud_summary = rows;
            }
            Err(err) => {
                self.type_donuts.clear();
                self.fraud_summary.clear();
                failures.push(err);
            }
        }

        match self
            .api
            .admin_merchant_fraud()
            .context("failed to load merchant breakdown")
        {
            Ok(rows) => {
                self.merchant_bar.request(merchant_bar(&rows));
                self.merchants = rows;
            }
            Err(err) => {
                self.merchant_bar.destroy();
                self.merchants.clear();
                failures.push(err);
            }
        }

        match self
            .api
            .admin_fraudulent_records()
            .context("failed to load fraudulent records")
        {
            Ok(records) => self.records = records,
            Err(err) => {
                self.records.clear();
                failures.push(err);
            }
        }

        self.flush();

        let outcome = if failures.is_empty() {
            Outcome::Ok
        } else {
            Outcome::Failed
        };
        let detail = failures
            .iter()
            .map(|e| format!("{e:#}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.log.record(
            "admin-load",
            outcome,
            (!detail.is_empty()).then_some(detail.as_str()),
            Some(started.elapsed()),
        );
        failures
    }

    /// Set the fraud-type filter. Empty shows every record.
    pub fn apply_filter(&mut self, selection: &str) {
        self.selection = selection.to_string();
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn filtered(&self) -> Vec<FraudulentRecord> {
        filter_records(&self.records, &self.selection)
    }

    /// Fraud-type values present in the record list, for a filter picker.
    pub fn fraud_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .records
            .iter()
            .filter_map(|r| r.fraud_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// The filtered records as CSV.
    pub fn export_csv(&self) -> Result<CsvExport> {
        let records = self.filtered();
        let contents = export::records_csv(&records)?;
        self.log.record(
            "admin-export",
            Outcome::Ok,
            Some(&format!("{} records", records.len())),
            None,
        );
        Ok(CsvExport {
            file_name: EXPORT_FILE_NAME.to_string(),
            contents,
        })
    }

    /// Deferred tick: materialize pending charts. Returns how many.
    pub fn flush(&mut self) -> usize {
        let width = self.width;
        self.type_donuts
            .iter_mut()
            .chain(std::iter::once(&mut self.merchant_bar))
            .map(|slot| slot.commit(width))
            .filter(|created| *created)
            .count()
    }

    /// Destroy every chart. Returns how many were live or pending.
    pub fn teardown(&mut self) -> usize {
        let destroyed = self
            .type_donuts
            .iter_mut()
            .chain(std::iter::once(&mut self.merchant_bar))
            .map(ChartSlot::destroy)
            .filter(|d| *d)
            .count();
        self.type_donuts.clear();
        destroyed
    }

    pub fn fraud_summary(&self) -> &[FraudSummaryRow] {
        &self.fraud_summary
    }

    pub fn merchants(&self) -> &[MerchantFraudRow] {
        &self.merchants
    }

    pub fn records(&self) -> &[FraudulentRecord] {
        &self.records
    }

    pub fn type_donuts(&self) -> &[ChartSlot] {
        &self.type_donuts
    }

    pub fn merchant_bar(&self) -> &ChartSlot {
        &self.merchant_bar
    }

    /// Live charts in display order.
    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.type_donuts
            .iter()
            .chain(std::iter::once(&self.merchant_bar))
            .filter_map(ChartSlot::chart)
    }
}

/// Empty selection keeps everything; otherwise exact `fraud_type` equality.
pub fn filter_records(records: &[FraudulentRecord], selection: &str) -> Vec<FraudulentRecord> {
    if selection.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.fraud_type.as_deref() == Some(selection))
        .cloned()
        .collect()
}

pub fn fraud_type_donut(row: &FraudSummaryRow) -> ChartSpec {
    ChartSpec::doughnut(
        row.fraud_type.clone(),
        &[
            ("Fraudulent", row.fraudulent, SeriesColor::Red),
            ("Non-Fraudulent", row.non_fraudulent, SeriesColor::Green),
        ],
    )
}

pub fn merchant_bar(rows: &[MerchantFraudRow]) -> ChartSpec {
    ChartSpec::grouped_bar(
        "Fraud by merchant",
        rows.iter()
            .map(|r| r.merchant_name.as_deref().unwrap_or(UNNAMED_MERCHANT).to_string())
            .collect(),
        vec![
            Series::new("Total", SeriesColor::Blue, rows.iter().map(|r| r.total).collect()),
            Series::new(
                "Fraudulent",
                SeriesColor::Red,
                rows.iter().map(|r| r.fraudulent).collect(),
            ),
        ],
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
