use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use markcut::app::cut_interactor::{CutSettings, CuttingCoordinator};
use markcut::domain::model::*;
use markcut::ports::{ConfirmationGate, CutObserver, EnginePort};
use markcut::DomainError;

/// Scripted stand-in for the video engine
#[derive(Default)]
struct MockEngine {
    /// Polls answered "not ready" before becoming ready; `None` never becomes ready
    ready_after: Option<usize>,
    polls: AtomicUsize,
    fail_starts: Vec<f64>,
    empty_starts: Vec<f64>,
    fail_removals: bool,
    files: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
    entered: Arc<Notify>,
    release: Option<Arc<Notify>>,
}

impl MockEngine {
    fn ready() -> Self {
        Self {
            ready_after: Some(0),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn scratch_files(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl EnginePort for MockEngine {
    async fn is_ready(&self) -> bool {
        let polls = self.polls.fetch_add(1, Ordering::SeqCst);
        matches!(self.ready_after, Some(after) if polls >= after)
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError> {
        self.record(format!("write {}", name));
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn extract(&self, command: &ExtractCommand) -> Result<(), DomainError> {
        self.record(format!("extract {} {}", command.start_seconds, command.duration_seconds));
        self.entered.notify_one();
        if let Some(release) = &self.release {
            release.notified().await;
        }

        if self.fail_starts.contains(&command.start_seconds) {
            return Err(DomainError::EngineExecution("mock codec failure".to_string()));
        }
        let output = if self.empty_starts.contains(&command.start_seconds) {
            Vec::new()
        } else {
            format!("{}+{}", command.start_seconds, command.duration_seconds).into_bytes()
        };

        let mut files = self.files.lock().unwrap();
        if !files.contains_key(&command.input) {
            return Err(DomainError::EngineExecution("missing input".to_string()));
        }
        files.insert(command.output.clone(), output);
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        self.files
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::EngineExecution(format!("no such file {}", name)))
    }

    async fn remove_file(&self, name: &str) -> Result<(), DomainError> {
        self.record(format!("remove {}", name));
        if self.fail_removals {
            return Err(DomainError::EngineExecution("unlink refused".to_string()));
        }
        self.files.lock().unwrap().remove(name);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingObserver {
    states: Mutex<Vec<CutState>>,
    started: Mutex<Vec<(usize, usize)>>,
    finished: Mutex<Vec<bool>>,
}

impl CutObserver for RecordingObserver {
    fn on_state_changed(&self, state: CutState) {
        self.states.lock().unwrap().push(state);
    }

    fn on_segment_started(&self, index: usize, total: usize, _segment: &Segment) {
        self.started.lock().unwrap().push((index, total));
    }

    fn on_segment_finished(&self, result: &SegmentResult) {
        self.finished.lock().unwrap().push(result.success);
    }
}

struct Decline {
    asked: AtomicUsize,
}

impl ConfirmationGate for Decline {
    fn confirm_large_input(&self, _file_name: &str, _size: u64) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        false
    }
}

fn settings() -> CutSettings {
    CutSettings {
        ready_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        large_input_threshold: 1024,
    }
}

fn source() -> SourceFile {
    SourceFile::new("holiday.webm", b"video bytes".to_vec())
}

fn three_segments() -> Vec<Segment> {
    vec![
        Segment::new(0.0, 5.0),
        Segment::new(10.0, 20.0),
        Segment::new(30.0, 31.5),
    ]
}

#[tokio::test]
async fn test_all_segments_cut_in_order() {
    let engine = Arc::new(MockEngine::ready());
    let observer = Arc::new(RecordingObserver::default());
    let coordinator = CuttingCoordinator::new(engine.clone(), settings())
        .with_observer(observer.clone());

    let results = coordinator.cut_all(&source(), &three_segments()).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(
        results.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(results[1].output.as_deref(), Some(&b"10+10"[..]));
    assert_eq!(results[1].output_size, Some(5));
    assert_eq!(
        results[1].file_name.as_deref(),
        Some("segment_2_00-00-10_to_00-00-20.webm")
    );

    let extracts: Vec<String> = engine
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("extract"))
        .collect();
    assert_eq!(extracts, vec!["extract 0 5", "extract 10 10", "extract 30 1.5"]);

    assert_eq!(
        *observer.states.lock().unwrap(),
        vec![CutState::WaitingForEngine, CutState::Processing, CutState::Idle]
    );
    assert_eq!(*observer.started.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(coordinator.state(), CutState::Idle);
}

#[tokio::test]
async fn test_failed_segment_does_not_stop_the_batch() {
    let engine = Arc::new(MockEngine {
        fail_starts: vec![10.0],
        ..MockEngine::ready()
    });
    let coordinator = CuttingCoordinator::new(engine.clone(), settings());

    let results = coordinator.cut_all(&source(), &three_segments()).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert!(results[2].success);
    assert!(results[1]
        .error_detail
        .as_deref()
        .unwrap()
        .contains("mock codec failure"));
    assert!(results[1].output.is_none());
}

#[tokio::test]
async fn test_scratch_files_removed_on_success_and_failure() {
    let engine = Arc::new(MockEngine {
        fail_starts: vec![0.0],
        ..MockEngine::ready()
    });
    let coordinator = CuttingCoordinator::new(engine.clone(), settings());

    coordinator
        .cut_all(&source(), &three_segments()[..2])
        .await
        .unwrap();

    assert!(engine.scratch_files().is_empty());
    let calls = engine.calls();
    assert!(calls.contains(&"remove input.webm".to_string()));
    assert!(calls.contains(&"remove segment_1.webm".to_string()));
    assert!(calls.contains(&"remove segment_2.webm".to_string()));
}

#[tokio::test]
async fn test_cleanup_failure_is_not_a_segment_failure() {
    let engine = Arc::new(MockEngine {
        fail_removals: true,
        ..MockEngine::ready()
    });
    let coordinator = CuttingCoordinator::new(engine, settings());

    let results = coordinator
        .cut_all(&source(), &[Segment::new(1.0, 2.0)])
        .await
        .unwrap();
    assert!(results[0].success);
}

#[tokio::test]
async fn test_empty_output_is_an_engine_error() {
    let engine = Arc::new(MockEngine {
        empty_starts: vec![0.0],
        ..MockEngine::ready()
    });
    let coordinator = CuttingCoordinator::new(engine, settings());

    let results = coordinator
        .cut_all(&source(), &[Segment::new(0.0, 5.0)])
        .await
        .unwrap();
    assert!(!results[0].success);
    assert!(results[0].error_detail.as_deref().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_degenerate_segment_never_reaches_engine() {
    let engine = Arc::new(MockEngine::ready());
    let coordinator = CuttingCoordinator::new(engine.clone(), settings());

    let results = coordinator
        .cut_all(&source(), &[Segment::new(7.0, 7.0), Segment::new(9.0, 4.0)])
        .await
        .unwrap();

    assert!(results.iter().all(|r| !r.success));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_engine_never_ready() {
    let engine = Arc::new(MockEngine::default());
    let observer = Arc::new(RecordingObserver::default());
    let coordinator =
        CuttingCoordinator::new(engine.clone(), settings()).with_observer(observer.clone());

    let result = coordinator.cut_all(&source(), &three_segments()).await;

    assert!(matches!(result, Err(DomainError::EngineUnavailable(_))));
    assert!(engine.polls.load(Ordering::SeqCst) > 1);
    assert!(engine.calls().is_empty());
    assert!(observer.started.lock().unwrap().is_empty());
    assert_eq!(coordinator.state(), CutState::Idle);
}

#[tokio::test]
async fn test_engine_becomes_ready_while_waiting() {
    let engine = Arc::new(MockEngine {
        ready_after: Some(3),
        ..Default::default()
    });
    let coordinator = CuttingCoordinator::new(engine.clone(), settings());

    let results = coordinator
        .cut_all(&source(), &[Segment::new(0.0, 1.0)])
        .await
        .unwrap();
    assert!(results[0].success);
    assert_eq!(engine.polls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_unrepresentable_ready_deadline_still_waits() {
    let engine = Arc::new(MockEngine {
        ready_after: Some(2),
        ..Default::default()
    });
    let coordinator = CuttingCoordinator::new(
        engine.clone(),
        CutSettings {
            ready_timeout: Duration::MAX,
            ..settings()
        },
    );

    let results = coordinator
        .cut_all(&source(), &[Segment::new(0.0, 1.0)])
        .await
        .unwrap();
    assert!(results[0].success);
    assert_eq!(engine.polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_declined_confirmation_cancels_before_any_segment() {
    let engine = Arc::new(MockEngine::ready());
    let gate = Arc::new(Decline {
        asked: AtomicUsize::new(0),
    });
    let coordinator = CuttingCoordinator::new(engine.clone(), settings()).with_gate(gate.clone());

    let large = SourceFile::new("big.mp4", vec![0; 2048]);
    let result = coordinator.cut_all(&large, &three_segments()).await;

    assert_eq!(result, Err(DomainError::Cancelled));
    assert_eq!(gate.asked.load(Ordering::SeqCst), 1);
    assert!(engine.calls().is_empty());
    assert_eq!(coordinator.state(), CutState::Idle);

    // Small inputs skip the gate entirely.
    coordinator.cut_all(&source(), &three_segments()).await.unwrap();
    assert_eq!(gate.asked.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_overlapping_run_is_busy() {
    let release = Arc::new(Notify::new());
    let engine = Arc::new(MockEngine {
        release: Some(release.clone()),
        ..MockEngine::ready()
    });
    let entered = engine.entered.clone();
    let coordinator = Arc::new(CuttingCoordinator::new(engine, settings()));

    let running = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .cut_all(&source(), &[Segment::new(0.0, 5.0)])
                .await
        })
    };

    entered.notified().await;
    assert_eq!(coordinator.state(), CutState::Processing);

    let second = coordinator.cut_all(&source(), &three_segments()).await;
    assert_eq!(second, Err(DomainError::Busy));
    assert_eq!(coordinator.state(), CutState::Processing);

    release.notify_one();
    let first = running.await.unwrap().unwrap();
    assert_eq!(first.len(), 1);
    assert!(first[0].success);
    assert_eq!(coordinator.state(), CutState::Idle);
}
