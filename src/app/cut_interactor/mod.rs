// Cut interactor - Drives the video engine over a list of segments

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Timing and size limits for a cutting run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutSettings {
    /// Upper bound on the wait for engine readiness
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    /// Inputs larger than this many bytes go through the confirmation gate
    pub large_input_threshold: u64,
}

impl Default for CutSettings {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(500),
            large_input_threshold: 500 * 1024 * 1024,
        }
    }
}

/// Single-flight coordinator feeding segments to the engine one at a time.
///
/// A run moves `Idle -> WaitingForEngine -> Processing -> Idle`. Only
/// pre-flight problems (busy, engine unavailable, cancelled) fail the whole
/// run; everything after that is reported per segment.
pub struct CuttingCoordinator {
    engine: Arc<dyn EnginePort>,
    gate: Arc<dyn ConfirmationGate>,
    observers: Vec<Arc<dyn CutObserver>>,
    settings: CutSettings,
    state: Mutex<CutState>,
}

/// Returns the coordinator to `Idle` however the run ends
struct RunGuard<'a> {
    coordinator: &'a CuttingCoordinator,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.set_state(CutState::Idle);
    }
}

impl CuttingCoordinator {
    pub fn new(engine: Arc<dyn EnginePort>, settings: CutSettings) -> Self {
        Self {
            engine,
            gate: Arc::new(AlwaysProceed),
            observers: Vec::new(),
            settings,
            state: Mutex::new(CutState::Idle),
        }
    }

    /// Replace the large-input confirmation gate
    pub fn with_gate(mut self, gate: Arc<dyn ConfirmationGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CutObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn settings(&self) -> &CutSettings {
        &self.settings
    }

    pub fn state(&self) -> CutState {
        *self.lock_state()
    }

    /// Cut every segment of `source` in list order.
    ///
    /// Returns one result per segment, in the same order. Fails as a whole
    /// only with `Busy`, `EngineUnavailable` or `Cancelled`.
    pub async fn cut_all(
        &self,
        source: &SourceFile,
        segments: &[Segment],
    ) -> Result<Vec<SegmentResult>, DomainError> {
        let _guard = self.begin()?;

        self.wait_for_engine().await?;

        if source.size() > self.settings.large_input_threshold
            && !self.gate.confirm_large_input(&source.name, source.size())
        {
            info!(file = %source.name, size = source.size(), "Cutting cancelled at confirmation");
            return Err(DomainError::Cancelled);
        }

        self.set_state(CutState::Processing);
        info!(
            file = %source.name,
            segments = segments.len(),
            "Cutting started"
        );

        let extension = source.extension();
        let total = segments.len();
        let mut results = Vec::with_capacity(total);

        for (position, segment) in segments.iter().enumerate() {
            let index = position + 1;
            for observer in &self.observers {
                observer.on_segment_started(index, total, segment);
            }

            let result = match self.cut_segment(source, segment, index, &extension).await {
                Ok(bytes) => {
                    let file_name = segment_file_name(segment, index, &extension);
                    info!(index, file = %file_name, size = bytes.len(), "Segment cut");
                    SegmentResult::success(segment.clone(), index, bytes, file_name)
                }
                Err(e) => {
                    warn!(index, error = %e, "Segment failed");
                    SegmentResult::failure(segment.clone(), index, e.to_string())
                }
            };

            for observer in &self.observers {
                observer.on_segment_finished(&result);
            }
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(succeeded, failed = total - succeeded, "Cutting finished");
        Ok(results)
    }

    fn begin(&self) -> Result<RunGuard<'_>, DomainError> {
        {
            let mut state = self.lock_state();
            let current = *state;
            if current != CutState::Idle {
                debug!(state = %current, "Rejecting overlapping cutting run");
                return Err(DomainError::Busy);
            }
            *state = CutState::WaitingForEngine;
        }
        self.notify_state(CutState::WaitingForEngine);
        Ok(RunGuard { coordinator: self })
    }

    async fn wait_for_engine(&self) -> Result<(), DomainError> {
        // An unrepresentable deadline means waiting without a bound.
        let deadline = Instant::now().checked_add(self.settings.ready_timeout);
        loop {
            if self.engine.is_ready().await {
                return Ok(());
            }
            let now = Instant::now();
            let remaining = match deadline {
                Some(deadline) if now >= deadline => {
                    return Err(DomainError::EngineUnavailable(format!(
                        "not ready after {:.1}s",
                        self.settings.ready_timeout.as_secs_f64()
                    )));
                }
                Some(deadline) => deadline - now,
                None => self.settings.poll_interval,
            };
            debug!("Waiting for video engine");
            sleep(self.settings.poll_interval.min(remaining)).await;
        }
    }

    async fn cut_segment(
        &self,
        source: &SourceFile,
        segment: &Segment,
        index: usize,
        extension: &str,
    ) -> Result<Vec<u8>, DomainError> {
        if !segment.is_valid() {
            return Err(DomainError::InvalidSegment {
                start: segment.start,
                end: segment.end,
            });
        }

        let input = format!("input.{}", extension);
        let output = format!("segment_{}.{}", index, extension);

        let outcome = self.extract(source, segment, &input, &output).await;
        self.remove_scratch(&input).await;
        self.remove_scratch(&output).await;
        outcome
    }

    async fn extract(
        &self,
        source: &SourceFile,
        segment: &Segment,
        input: &str,
        output: &str,
    ) -> Result<Vec<u8>, DomainError> {
        self.engine.write_file(input, &source.bytes).await?;

        let command = ExtractCommand {
            input: input.to_string(),
            output: output.to_string(),
            start_seconds: segment.start,
            duration_seconds: segment.duration,
            codec_mode: CodecMode::StreamCopy,
        };
        debug!(start = segment.start, duration = segment.duration, "Extracting segment");
        self.engine.extract(&command).await?;

        let bytes = self.engine.read_file(output).await?;
        if bytes.is_empty() {
            return Err(DomainError::EngineExecution(
                "engine produced an empty output file".to_string(),
            ));
        }
        Ok(bytes)
    }

    async fn remove_scratch(&self, name: &str) {
        if let Err(e) = self.engine.remove_file(name).await {
            warn!(file = name, error = %e, "Could not remove scratch file");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CutState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: CutState) {
        *self.lock_state() = next;
        self.notify_state(next);
    }

    fn notify_state(&self, state: CutState) {
        debug!(state = %state, "Cutting state changed");
        for observer in &self.observers {
            observer.on_state_changed(state);
        }
    }
}

/// Download name of a cut segment, e.g. `segment_1_00-00-05_to_00-00-10.mp4`
pub fn segment_file_name(segment: &Segment, index: usize, extension: &str) -> String {
    format!(
        "segment_{}_{}_to_{}.{}",
        index,
        segment.start_formatted.replace(':', "-"),
        segment.end_formatted.replace(':', "-"),
        extension
    )
}
