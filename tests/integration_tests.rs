//! Integration tests for the Folder Mirror background tasks.
//!
//! These tests use an async-aware MPSC channel from `tokio::sync` to collect
//! the events a copy run emits, exactly as a front-end would.

use folder_mirror::app::{self, events::UserEvent, proxy::EventProxy, state::AppState};
use folder_mirror::config::{settings, AppConfig};
use folder_mirror::core::{CopyEvent, CopySummary};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tracing_test::traced_test;

/// Contains the test infrastructure.
mod helpers {
    use super::*;
    use std::fs;

    /// A test double for the event proxy using a tokio MPSC channel.
    #[derive(Clone)]
    pub struct TestEventProxy {
        pub sender: mpsc::UnboundedSender<UserEvent>,
    }

    impl EventProxy for TestEventProxy {
        fn send_event(&self, event: UserEvent) {
            if let Err(e) = self.sender.send(event) {
                // Panic in a test if the receiver is dropped, as it indicates a test setup error.
                panic!("Test receiver dropped: {}", e);
            }
        }
    }

    /// `TestHarness` sets up a complete, isolated environment for each test case.
    pub struct TestHarness {
        pub state: Arc<Mutex<AppState>>,
        pub proxy: TestEventProxy,
        pub event_rx: mpsc::UnboundedReceiver<UserEvent>,
        pub source: PathBuf,
        pub destination: PathBuf,
        _temp_dir: TempDir,
    }

    impl TestHarness {
        pub fn new() -> Self {
            let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
            let source = temp_dir.path().join("source");
            let destination = temp_dir.path().join("destination");
            fs::create_dir_all(&source).expect("Failed to create source dir");
            let (event_tx, event_rx) = mpsc::unbounded_channel();

            Self {
                state: Arc::new(Mutex::new(AppState::with_config(AppConfig::default()))),
                proxy: TestEventProxy { sender: event_tx },
                event_rx,
                source,
                destination,
                _temp_dir: temp_dir,
            }
        }

        /// Creates a file inside the source tree.
        pub fn create_file(&self, path: &str, content: &str) {
            let file_path = self.source.join(path);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent dir");
            }
            fs::write(file_path, content).expect("Failed to write file");
        }

        pub fn setup_basic_project(&self) {
            self.create_file("src/main.rs", "fn main() {}");
            self.create_file("src/lib.rs", "// Library code");
            self.create_file("README.md", "# My Project");
            self.create_file("docs/guide.txt", "User guide content");
        }

        pub fn select_folders(&self) {
            let mut state = self.state.lock().unwrap();
            state.config.source = Some(self.source.clone());
            state.config.destination = Some(self.destination.clone());
        }

        /// Collects events until the run finishes, feeding them into the state.
        pub async fn wait_for_completion(&mut self) -> Vec<UserEvent> {
            let mut events = Vec::new();
            loop {
                match tokio::time::timeout(Duration::from_secs(10), self.event_rx.recv()).await {
                    Ok(Some(event)) => {
                        self.state.lock().unwrap().apply_event(&event);
                        let done = matches!(
                            event,
                            UserEvent::Copy(CopyEvent::Finished(_)) | UserEvent::ShowError(_)
                        );
                        events.push(event);
                        if done {
                            return events;
                        }
                    }
                    _ => panic!("Copy did not complete within timeout or channel closed"),
                }
            }
        }
    }
}

fn summary_of(events: &[UserEvent]) -> CopySummary {
    match events.last() {
        Some(UserEvent::Copy(CopyEvent::Finished(summary))) => summary.clone(),
        other => panic!("Expected a Finished event last, got {:?}", other),
    }
}

#[tokio::test]
async fn test_copy_from_state_streams_ordered_events() {
    // --- ARRANGE ---
    let mut harness = helpers::TestHarness::new();
    harness.setup_basic_project();
    harness.select_folders();
    harness.state.lock().unwrap().config.filter = ".rs".to_string();

    // --- ACT ---
    let started = app::tasks::start_copy_from_state(harness.proxy.clone(), harness.state.clone());
    assert!(started);
    let events = harness.wait_for_completion().await;

    // --- ASSERT ---
    let summary = summary_of(&events);
    assert_eq!(summary.files_copied, 2);
    assert_eq!(summary.total, 2);

    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            UserEvent::Copy(CopyEvent::Progress(p)) => Some(p.percent()),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![50, 100]);

    assert!(harness.destination.join("src/main.rs").is_file());
    assert!(harness.destination.join("docs").is_dir());
    assert!(!harness.destination.join("README.md").exists());

    let state = harness.state.lock().unwrap();
    assert!(!state.is_copying);
    assert_eq!(state.progress, 100);
    // 3 directories + 2 files + the completion line
    assert_eq!(state.log.len(), 6);
    assert_eq!(
        state.log.entries().last().map(String::as_str),
        Some("Copy process finished.")
    );
}

#[tokio::test]
async fn test_missing_destination_is_reported_once() {
    let mut harness = helpers::TestHarness::new();
    harness.setup_basic_project();
    harness.state.lock().unwrap().config.source = Some(harness.source.clone());

    let started = app::tasks::start_copy_from_state(harness.proxy.clone(), harness.state.clone());

    assert!(!started);
    let event = harness.event_rx.try_recv().expect("expected an error event");
    assert!(matches!(event, UserEvent::ShowError(ref m) if m.contains("must be selected")));
    assert!(harness.event_rx.try_recv().is_err());
    assert!(!harness.destination.exists());
    assert!(!harness.state.lock().unwrap().is_copying);
}

#[tokio::test]
async fn test_invalid_source_reports_error_event() {
    let mut harness = helpers::TestHarness::new();
    harness.select_folders();
    harness.state.lock().unwrap().config.source = Some(harness.source.join("missing"));

    assert!(app::tasks::start_copy_from_state(
        harness.proxy.clone(),
        harness.state.clone()
    ));
    let events = harness.wait_for_completion().await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], UserEvent::ShowError(m) if m.contains("not a valid directory")));
}

#[tokio::test]
async fn test_dry_run_stream_creates_nothing() {
    let mut harness = helpers::TestHarness::new();
    harness.setup_basic_project();
    harness.select_folders();
    harness.state.lock().unwrap().config.dry_run = true;

    app::tasks::start_copy_from_state(harness.proxy.clone(), harness.state.clone());
    let events = harness.wait_for_completion().await;

    assert_eq!(summary_of(&events).planned, 4);
    assert!(!harness.destination.exists());
}

#[tokio::test]
async fn test_cancelled_run_still_finishes_stream() {
    let mut harness = helpers::TestHarness::new();
    harness.setup_basic_project();
    let job = folder_mirror::core::CopyJob::new(&harness.source, &harness.destination);

    let cancel = Arc::new(AtomicBool::new(true));
    app::tasks::start_copy(job, harness.proxy.clone(), cancel)
        .await
        .unwrap();
    let events = harness.wait_for_completion().await;

    assert!(summary_of(&events).cancelled);
    assert!(!harness.destination.exists());
}

#[tokio::test]
async fn test_spawn_copy_exposes_event_stream() {
    let harness = helpers::TestHarness::new();
    harness.setup_basic_project();
    let mut job = folder_mirror::core::CopyJob::new(&harness.source, &harness.destination);
    job.copy_contents = false;

    let mut handle = app::tasks::spawn_copy(job);
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    handle.join().await.unwrap();

    assert_eq!(summary_of(&events).placeholders_created, 4);
    let readme = harness.destination.join("README.md");
    assert_eq!(std::fs::metadata(readme).unwrap().len(), 0);
}

#[test]
#[traced_test]
fn test_corrupted_settings_are_logged_and_defaulted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ broken").unwrap();

    let config = settings::load_config(Some(&path)).unwrap();

    assert_eq!(config, AppConfig::default());
    assert!(logs_contain("Falling back to default config"));
}
