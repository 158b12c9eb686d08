use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use wics::ingestion::{
    ingest_from_path, CompositeObserver, FileObserver, IngestionContext, IngestionFormat, IngestionObserver,
    IngestionOptions, IngestionSeverity, IngestionStats,
};
use wics::sheets;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<usize>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats.rows);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &wics::IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &wics::IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_file(name: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("wics-{name}-{nanos}.{ext}"))
}

fn options(obs: &Arc<RecordingObserver>) -> IngestionOptions {
    IngestionOptions {
        format: Some(IngestionFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());

    // Missing file -> Io error -> Critical
    let missing = tmp_file("does-not-exist", "csv");
    let _ = ingest_from_path(&missing, &sheets::material_list_schema(), &options(&obs)).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_bad_header() {
    let obs = Arc::new(RecordingObserver::default());
    let path = tmp_file("no-plant", "csv");
    std::fs::write(&path, "Material\nM-1\n").unwrap();

    // Schema mismatch -> Error severity (not Critical) -> should not alert
    let _ = ingest_from_path(&path, &sheets::material_list_schema(), &options(&obs)).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn composite_fans_out_and_file_observer_appends_lines() {
    let obs = Arc::new(RecordingObserver::default());
    let log = tmp_file("observer", "log");
    let observers: Vec<Arc<dyn IngestionObserver>> = vec![obs.clone(), Arc::new(FileObserver::new(&log))];
    let composite = CompositeObserver::new(observers);

    let path = tmp_file("ok", "csv");
    std::fs::write(&path, "Material,Plant\nM-1,P100\nM-2,P100\n").unwrap();
    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };
    let ds = ingest_from_path(&path, &sheets::material_list_schema(), &opts).unwrap();
    assert_eq!(ds.row_count(), 2);

    assert_eq!(obs.successes.lock().unwrap().clone(), vec![2]);
    let written = std::fs::read_to_string(&log).unwrap();
    assert!(written.contains("ok format=Csv"));
    assert!(written.contains("rows=2"));
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(&log);
}

#[test]
fn unknown_extension_is_rejected() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };
    let err = ingest_from_path("counts.txt", &sheets::count_entry_schema(), &opts).unwrap_err();
    assert!(err.to_string().contains("cannot infer format"));
}
