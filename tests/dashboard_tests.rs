/// Dashboard view tests.
///
/// Drive the detection sequencer, chart slots, close and export against a
/// canned backend. Chart-slot and renderer unit tests live next to their
/// modules; these cover how the view strings them together.
mod common;

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use common::{FakeApi, buckets, merchant_summary, summary, upload};
use fraudwatch::alert::RecordingNotifier;
use fraudwatch::api::{FraudType, UploadFile};
use fraudwatch::config::DashboardConfig;
use fraudwatch::dashboard::{
    CLEAR_FAILED_ALERT, DETECTION_FAILED_ALERT, Dashboard, IN_FLIGHT_ALERT, MISSING_INPUT_ALERT,
    Rejection, RunOutcome,
};

fn api(fraud_type: &str) -> FakeApi {
    let api = FakeApi {
        merchant: Some(merchant_summary()),
        buckets: buckets(),
        ..FakeApi::default()
    };
    api.set_summary(summary(fraud_type));
    api
}

fn view<'a>(
    api: &'a FakeApi,
    notifier: &'a RecordingNotifier,
) -> Dashboard<&'a FakeApi, &'a RecordingNotifier> {
    Dashboard::new(api, notifier, DashboardConfig::default(), "alice")
}

/// A loaded view with inputs selected, ready to run.
fn ready<'a>(
    api: &'a FakeApi,
    notifier: &'a RecordingNotifier,
    fraud_type: FraudType,
) -> Dashboard<&'a FakeApi, &'a RecordingNotifier> {
    let mut view = view(api, notifier);
    view.load("Retail").unwrap();
    view.select_fraud_type(fraud_type);
    assert!(view.select_file(upload()));
    view
}

// ---------------------------------------------------------------------------
// Successful runs
// ---------------------------------------------------------------------------

#[test]
fn load_draws_merchant_donut() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = view(&api, &notifier);

    view.load("Retail").unwrap();

    assert!(view.merchant_donut().is_rendered());
    let chart = view.merchant_donut().chart().unwrap();
    assert_eq!(chart.spec().labels, vec!["Fraud", "Legit"]);
    assert_eq!(chart.spec().total(), 40);
    assert!(view.donut().is_absent());
    assert!(view.bar().is_absent());
}

#[test]
fn load_failure_is_returned_without_alert() {
    let api = FakeApi::default();
    let notifier = RecordingNotifier::new();
    let mut view = view(&api, &notifier);

    assert!(view.load("Nowhere").is_err());
    assert!(view.merchant_donut().is_absent());
    assert_eq!(notifier.count(), 0);
}

#[test]
fn successful_run_replaces_merchant_donut() {
    let api = api("chargeback");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Chargeback);

    let outcome = view.run_detection();

    assert!(matches!(outcome, RunOutcome::Completed { categorical: false }));
    assert!(view.merchant_donut().is_absent());
    assert!(view.donut().is_rendered());
    assert!(view.bar().is_absent());
    assert_eq!(view.charts().count(), 1);
    assert_eq!(
        api.calls(),
        vec!["merchant_fraud_summary", "upload_file", "temp_summary"]
    );
    assert_eq!(notifier.count(), 0);
    assert!(!view.is_loading());

    let donut = view.donut().chart().unwrap().spec();
    assert_eq!(donut.labels, vec!["Fraud", "Non-Fraud"]);
    assert_eq!(donut.total(), 3);
    assert_eq!(view.transactions().len(), 3);
}

#[test]
fn upload_is_tagged_with_username() {
    let api = api("chargeback");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Chargeback);

    view.run_detection();

    let uploads = api.uploads.borrow();
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        uploads[0],
        (FraudType::Chargeback, "alice".to_string(), "batch.csv".to_string())
    );
}

#[test]
fn categorical_run_draws_bar_matching_buckets() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    let outcome = view.run_detection();

    assert!(matches!(outcome, RunOutcome::Completed { categorical: true }));
    let bar = view.bar().chart().expect("bar chart rendered");
    let bucket_total: u64 = buckets().iter().map(|b| b.count()).sum();
    assert_eq!(bar.spec().total(), bucket_total);
    assert_eq!(bar.spec().labels, vec!["Electronics", "Books"]);
    assert_eq!(view.category().len(), 2);
    assert_eq!(view.charts().count(), 2);
}

#[test]
fn category_types_follow_settings() {
    let api = api("chargeback");
    let notifier = RecordingNotifier::new();
    let settings = DashboardConfig {
        category_fraud_types: vec![FraudType::Chargeback],
        ..DashboardConfig::default()
    };
    let mut view = Dashboard::new(&api, &notifier, settings, "alice");
    view.select_fraud_type(FraudType::Chargeback);
    view.select_file(upload());

    assert!(matches!(
        view.run_detection(),
        RunOutcome::Completed { categorical: true }
    ));
    assert!(view.bar().is_rendered());
}

#[test]
fn non_categorical_run_destroys_previous_bar() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    view.run_detection();
    assert!(view.bar().is_rendered());
    let first_donut = view.donut().chart().unwrap().id();

    api.set_summary(summary("chargeback"));
    view.select_fraud_type(FraudType::Chargeback);
    view.run_detection();

    assert!(view.bar().is_absent());
    assert!(view.category().is_empty());
    assert_ne!(view.donut().chart().unwrap().id(), first_donut);
    assert_eq!(view.charts().count(), 1);
}

#[test]
fn bar_follows_summary_fraud_type() {
    // The backend's summary decides, not the picker.
    let api = api("chargeback");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    assert!(matches!(
        view.run_detection(),
        RunOutcome::Completed { categorical: false }
    ));
    assert!(!api.called("category_summary"));
}

// ---------------------------------------------------------------------------
// Rejections and failures
// ---------------------------------------------------------------------------

#[test]
fn missing_input_alerts_once() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = view(&api, &notifier);
    view.select_fraud_type(FraudType::Payment);

    let outcome = view.run_detection();

    assert!(matches!(
        outcome,
        RunOutcome::Rejected(Rejection::MissingInput)
    ));
    assert_eq!(notifier.alerts(), vec![MISSING_INPUT_ALERT]);
    assert!(api.calls().is_empty());
}

#[test]
fn missing_fraud_type_keeps_selected_file() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = view(&api, &notifier);
    view.select_file(upload());

    view.run_detection();

    assert!(view.file().is_some());
    assert_eq!(notifier.count(), 1);
}

#[test]
fn upload_failure_aborts_chain() {
    let api = api("payment");
    api.fail_upload.set(true);
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    let outcome = view.run_detection();

    assert!(matches!(outcome, RunOutcome::Failed(_)));
    assert_eq!(notifier.alerts(), vec![DETECTION_FAILED_ALERT]);
    assert!(!api.called("temp_summary"));
    assert!(view.summary().is_none());
    assert!(view.merchant_donut().is_rendered());
    assert!(view.donut().is_absent());
    assert!(!view.is_loading());
}

#[test]
fn summary_failure_alerts_once() {
    let api = api("payment");
    api.fail_summary.set(true);
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    assert!(matches!(view.run_detection(), RunOutcome::Failed(_)));
    assert_eq!(notifier.count(), 1);
    assert!(!api.called("category_summary"));
    assert!(view.merchant_donut().is_rendered());
    assert!(!view.is_loading());
}

#[test]
fn category_failure_alerts_once_and_clears_loading() {
    let api = api("payment");
    api.fail_category.set(true);
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    assert!(matches!(view.run_detection(), RunOutcome::Failed(_)));
    assert_eq!(notifier.alerts(), vec![DETECTION_FAILED_ALERT]);
    assert!(view.donut().is_rendered());
    assert!(view.bar().is_absent());
    assert!(!view.is_loading());
}

#[test]
fn category_failure_drops_previous_runs_bar() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);
    view.run_detection();
    assert!(view.bar().is_rendered());
    assert_eq!(view.category().len(), 2);

    api.set_summary(summary("merchant"));
    api.fail_category.set(true);
    view.select_fraud_type(FraudType::Merchant);

    assert!(matches!(view.run_detection(), RunOutcome::Failed(_)));
    assert_eq!(view.summary().unwrap().fraud_type, FraudType::Merchant);
    assert!(view.bar().is_absent());
    assert!(view.category().is_empty());
    assert_eq!(view.charts().count(), 1);
}

#[test]
fn run_is_rejected_while_in_flight() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    let handle = view.handle();
    let _ticket = handle.gate.try_begin().expect("gate idle before run");

    let outcome = view.run_detection();

    assert!(matches!(outcome, RunOutcome::Rejected(Rejection::InFlight)));
    assert_eq!(notifier.alerts(), vec![IN_FLIGHT_ALERT]);
    assert!(!api.called("upload_file"));
    assert!(view.merchant_donut().is_rendered());
}

#[test]
fn gate_is_held_for_the_whole_chain() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    let gate = view.handle().gate;
    let busy_during_upload = Rc::new(Cell::new(false));
    let seen = Rc::clone(&busy_during_upload);
    *api.during_upload.borrow_mut() = Some(Box::new(move || {
        seen.set(gate.is_busy() && gate.try_begin().is_none());
    }));

    assert!(view.run_detection().is_completed());
    assert!(busy_during_upload.get());
    assert!(!view.is_loading());
}

#[test]
fn teardown_cancels_pending_chain_without_alert() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    let cancel = view.handle().cancel;
    *api.during_upload.borrow_mut() = Some(Box::new(move || cancel.cancel()));

    let outcome = view.run_detection();

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert_eq!(notifier.count(), 0);
    assert!(!api.called("temp_summary"));
    assert!(view.summary().is_none());
    assert!(!view.is_loading());

    assert!(matches!(
        view.run_detection(),
        RunOutcome::Rejected(Rejection::TornDown)
    ));
}

#[test]
fn teardown_destroys_every_chart() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);
    view.run_detection();

    assert_eq!(view.teardown(), 2);
    assert_eq!(view.charts().count(), 0);
    assert_eq!(view.teardown(), 0);
}

#[test]
fn oversized_file_is_refused() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let settings = DashboardConfig {
        max_upload_mb: 1,
        ..DashboardConfig::default()
    };
    let mut view = Dashboard::new(&api, &notifier, settings, "alice");

    assert!(view.select_file(upload()));
    let big = UploadFile::new("huge.csv", vec![b'x'; 1024 * 1024 + 1]);
    assert!(!view.select_file(big));

    assert!(view.file().is_none());
    assert_eq!(notifier.alerts(), vec!["File too large. Max 1MB."]);
}

#[test]
fn select_path_checks_size_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.csv");
    std::fs::write(&path, "transaction_id\nt1\n").unwrap();

    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = view(&api, &notifier);

    assert!(view.select_path(&path).unwrap());
    assert_eq!(view.file().unwrap().name, "batch.csv");
    assert!(view.select_path(&dir.path().join("missing.csv")).is_err());
}

// ---------------------------------------------------------------------------
// Close / export
// ---------------------------------------------------------------------------

#[test]
fn close_restores_merchant_donut() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);
    view.run_detection();

    assert!(view.close_dashboard());

    assert!(view.summary().is_none());
    assert!(view.transactions().is_empty());
    assert!(view.donut().is_absent());
    assert!(view.bar().is_absent());
    assert!(view.merchant_donut().is_rendered());
    assert_eq!(notifier.count(), 0);
}

#[test]
fn close_without_merchant_data_leaves_no_charts() {
    let api = FakeApi::default();
    api.set_summary(summary("chargeback"));
    let notifier = RecordingNotifier::new();
    let mut view = view(&api, &notifier);
    view.select_fraud_type(FraudType::Chargeback);
    view.select_file(upload());
    view.run_detection();

    assert!(view.close_dashboard());
    assert_eq!(view.charts().count(), 0);
}

#[test]
fn close_failure_leaves_state_untouched() {
    let api = api("payment");
    api.fail_clear.set(true);
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);
    view.run_detection();
    let donut = view.donut().chart().unwrap().id();

    assert!(!view.close_dashboard());

    assert_eq!(notifier.alerts(), vec![CLEAR_FAILED_ALERT]);
    assert!(view.summary().is_some());
    assert_eq!(view.transactions().len(), 3);
    assert_eq!(view.donut().chart().unwrap().id(), donut);
    assert!(view.bar().is_rendered());
    assert!(view.merchant_donut().is_absent());
}

#[test]
fn export_quotes_every_field() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);
    assert!(view.export_csv().unwrap().is_none());

    view.run_detection();
    let csv = view.export_csv().unwrap().expect("transactions to export");

    assert_eq!(csv.file_name, "payment_transactions.csv");
    assert_eq!(csv.line_count(), 4);
    let lines: Vec<&str> = csv.contents.lines().collect();
    assert_eq!(lines[0], r#""transaction_id","captured_text","status""#);
    assert_eq!(lines[2], r#""t2","Books, used","Non-fraud""#);
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[test]
fn resize_is_debounced_and_applied_to_live_charts() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);
    view.run_detection();

    let start = Instant::now();
    view.on_resize(start, 60);
    view.on_resize(start + Duration::from_millis(50), 72);

    assert!(!view.poll_resize(start + Duration::from_millis(100)));
    assert!(view.charts().all(|c| c.width() == 40));

    assert!(view.poll_resize(start + Duration::from_millis(200)));
    assert_eq!(view.width(), 72);
    assert!(view.charts().all(|c| c.width() == 72));
}

#[test]
fn teardown_drops_pending_resize() {
    let api = api("payment");
    let notifier = RecordingNotifier::new();
    let mut view = ready(&api, &notifier, FraudType::Payment);

    let start = Instant::now();
    view.on_resize(start, 90);
    view.teardown();
    assert!(!view.poll_resize(start + Duration::from_secs(1)));
}
