// scenesift-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for this crate's unit tests and for downstream crates enabling the
// "test-mocks" feature. All mocks are Sync: the pipeline calls them from
// worker threads.

use super::{Classifier, Detection, FfmpegProcess, FfmpegSpawner, FfprobeExecutor};
use crate::error::{CoreError, CoreResult};
use crate::processing::sampling::frame_file_name;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

#[derive(Default)]
struct SpawnerState {
    expectations: Vec<MockFfmpegExpectation>,
    received_calls: Vec<Vec<String>>,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each call is matched against the first expectation whose pattern occurs in
/// one of the arguments; the expectation is consumed. Calls matching nothing
/// fall back to a successful run that writes an empty output file when the
/// spawner was built with [`MockFfmpegSpawner::succeeding`], and panic
/// otherwise.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    state: Arc<Mutex<SpawnerState>>,
    succeed_by_default: bool,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    /// A spawner where every unmatched call succeeds and creates its output.
    pub fn succeeding() -> Self {
        Self {
            succeed_by_default: true,
            ..Default::default()
        }
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        if let Ok(mut state) = self.state.lock() {
            state.expectations.push(MockFfmpegExpectation {
                arg_pattern: arg_pattern.to_string(),
                result,
                create_dummy_output,
            });
        }
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    /// Adds an expectation for a process exiting with `exit_code`.
    pub fn add_exit_error_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, exit_code: i32) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            // Raw wait status: the exit code lives in the second byte.
            exit_status: ExitStatus::from_raw(exit_code << 8),
        };
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .map(|state| state.received_calls.clone())
            .unwrap_or_default()
    }
}

fn create_dummy_output(args: &[String]) {
    let Some(output_path) = args.last().map(PathBuf::from) else {
        log::warn!("MockFfmpegSpawner couldn't find output path in args to create dummy file.");
        return;
    };
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("MockFfmpegSpawner failed to create parent dir {parent:?}: {e}");
        }
    }
    match std::fs::File::create(&output_path) {
        Ok(_) => log::debug!("MockFfmpegSpawner created dummy output file: {output_path:?}"),
        Err(e) => log::error!("MockFfmpegSpawner failed to create dummy output file {output_path:?}: {e}"),
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();

        let expectation = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| CoreError::OperationFailed("mock spawner lock poisoned".into()))?;
            state.received_calls.push(args.clone());
            let found = state
                .expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));
            found.map(|index| state.expectations.remove(index))
        };

        match expectation {
            Some(expectation) => {
                log::debug!(
                    "MockFfmpegSpawner: Matched expectation with pattern '{}'",
                    expectation.arg_pattern
                );
                if expectation.result.is_ok() && expectation.create_dummy_output {
                    create_dummy_output(&args);
                }
                expectation.result
            }
            None if self.succeed_by_default => {
                create_dummy_output(&args);
                Ok(MockFfmpegProcess {
                    events_to_emit: Vec::new(),
                    exit_status: ExitStatus::from_raw(0),
                })
            }
            None => panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}"),
        }
    }
}

/// Mock implementation of FfprobeExecutor.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    durations: Arc<Mutex<HashMap<PathBuf, f64>>>,
    default_duration: Option<f64>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Every probed file reports `seconds`.
    pub fn with_duration(seconds: f64) -> Self {
        Self {
            default_duration: Some(seconds),
            ..Default::default()
        }
    }

    pub fn expect_duration(&self, input_path: &Path, seconds: f64) {
        if let Ok(mut durations) = self.durations.lock() {
            durations.insert(input_path.to_path_buf(), seconds);
        }
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn get_duration(&self, input_path: &Path) -> CoreResult<f64> {
        let scripted = self
            .durations
            .lock()
            .ok()
            .and_then(|durations| durations.get(input_path).copied());

        scripted.or(self.default_duration).ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "MockFfprobeExecutor: No expectation set for path {}",
                input_path.display()
            ))
        })
    }
}

/// Mock classifier returning scripted labels per image file name.
///
/// Images without a script have no detections. Every call is recorded.
#[derive(Clone, Default)]
pub struct MockClassifier {
    labels: Arc<Mutex<HashMap<String, Vec<Detection>>>>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Default::default()
    }

    /// Scripts the labels of the frame sampled at `timestamp`, all with score 1.0.
    pub fn labels_at(&self, timestamp: f64, labels: &[&str]) {
        let detections = labels
            .iter()
            .map(|label| Detection {
                label: (*label).to_string(),
                score: 1.0,
                bbox: Vec::new(),
            })
            .collect();
        self.detections_at(timestamp, detections);
    }

    pub fn detections_at(&self, timestamp: f64, detections: Vec<Detection>) {
        if let Ok(mut labels) = self.labels.lock() {
            labels.insert(frame_file_name(timestamp), detections);
        }
    }

    /// Makes classification of the frame at `timestamp` fail.
    pub fn fail_at(&self, timestamp: f64) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.push(frame_file_name(timestamp));
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, image: &Path) -> CoreResult<Vec<Detection>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(image.to_path_buf());
        }

        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.failing.lock().is_ok_and(|f| f.contains(&name)) {
            return Err(CoreError::Classifier(format!("scripted failure for {name}")));
        }

        Ok(self
            .labels
            .lock()
            .ok()
            .and_then(|labels| labels.get(&name).cloned())
            .unwrap_or_default())
    }
}
