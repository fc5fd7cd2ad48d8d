// Shared mocking infrastructure for the orchestration integration tests.
//
// The mocks implement the public PipelineBuilder/PipelineHandle/ToolRunner
// traits with scripted expectations and recorded calls, so whole runs can be
// exercised without ffmpeg or the codec executables.

#![allow(dead_code)]

use roundtrip_core::error::{CoreError, CoreResult};
use roundtrip_core::pipeline::{
    BusMessage, PipelineBuilder, PipelineHandle, PipelinePhase, PipelineSpec,
};
use roundtrip_core::external::ToolRunner;
use roundtrip_core::{HarnessConfig, RunParameters};
use std::collections::VecDeque;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// What the mock builder should do for one build call.
pub enum PipelineScript {
    /// Build succeeds; the handle replays these bus messages in order.
    Events(Vec<BusMessage>),
    /// Build fails, naming an unavailable stage.
    BuildError { stage: String, reason: String },
    /// Build succeeds but start fails.
    StartError(String),
}

pub struct MockPipelineHandle {
    messages: VecDeque<BusMessage>,
    start_error: Option<String>,
    running: Arc<AtomicBool>,
}

impl PipelineHandle for MockPipelineHandle {
    fn start(&mut self) -> CoreResult<()> {
        if let Some(detail) = self.start_error.take() {
            return Err(CoreError::PipelineRuntime(detail));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn next_message(&mut self) -> Option<BusMessage> {
        self.messages.pop_front()
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Mock implementation of PipelineBuilder supporting scripted expectations.
#[derive(Clone, Default)]
pub struct MockPipelineBuilder {
    scripts: Arc<Mutex<VecDeque<PipelineScript>>>,
    built_specs: Arc<Mutex<Vec<PipelineSpec>>>,
    running_flags: Arc<Mutex<Vec<Arc<AtomicBool>>>>,
}

impl MockPipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_events(&self, events: Vec<BusMessage>) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(PipelineScript::Events(events));
    }

    pub fn expect_build_error(&self, stage: &str, reason: &str) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(PipelineScript::BuildError {
                stage: stage.to_string(),
                reason: reason.to_string(),
            });
    }

    pub fn expect_start_error(&self, detail: &str) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(PipelineScript::StartError(detail.to_string()));
    }

    /// Phases of every pipeline built so far, in build order.
    pub fn built_phases(&self) -> Vec<PipelinePhase> {
        self.built_specs
            .lock()
            .unwrap()
            .iter()
            .map(|spec| spec.phase)
            .collect()
    }

    pub fn built_specs(&self) -> Vec<PipelineSpec> {
        self.built_specs.lock().unwrap().clone()
    }

    /// True if any pipeline this builder produced is still running.
    pub fn any_pipeline_running(&self) -> bool {
        self.running_flags
            .lock()
            .unwrap()
            .iter()
            .any(|flag| flag.load(Ordering::SeqCst))
    }
}

impl PipelineBuilder for MockPipelineBuilder {
    type Handle = MockPipelineHandle;

    fn build(&self, spec: &PipelineSpec) -> CoreResult<Self::Handle> {
        self.built_specs.lock().unwrap().push(spec.clone());

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                panic!(
                    "MockPipelineBuilder: no expectation for {} build",
                    spec.phase.as_str()
                )
            });

        match script {
            PipelineScript::Events(events) => {
                let running = Arc::new(AtomicBool::new(false));
                self.running_flags.lock().unwrap().push(Arc::clone(&running));
                Ok(MockPipelineHandle {
                    messages: events.into(),
                    start_error: None,
                    running,
                })
            }
            PipelineScript::BuildError { stage, reason } => {
                Err(CoreError::PipelineBuild { stage, reason })
            }
            PipelineScript::StartError(detail) => {
                let running = Arc::new(AtomicBool::new(false));
                self.running_flags.lock().unwrap().push(Arc::clone(&running));
                Ok(MockPipelineHandle {
                    messages: VecDeque::new(),
                    start_error: Some(detail),
                    running,
                })
            }
        }
    }
}

/// Mock implementation of ToolRunner with scripted exit codes and recorded
/// invocations.
#[derive(Clone, Default)]
pub struct MockToolRunner {
    exit_codes: Arc<Mutex<VecDeque<i32>>>,
    calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_exit(&self, code: i32) {
        self.exit_codes.lock().unwrap().push_back(code);
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToolRunner for MockToolRunner {
    fn run(&self, executable: &Path, args: &[String]) -> CoreResult<ExitStatus> {
        self.calls
            .lock()
            .unwrap()
            .push((executable.to_path_buf(), args.to_vec()));

        let code = self
            .exit_codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                panic!(
                    "MockToolRunner: no expectation for invocation of {}",
                    executable.display()
                )
            });

        // Raw wait status: the exit code lives in the high byte.
        Ok(ExitStatus::from_raw(code << 8))
    }
}

/// A harness configuration over throwaway template and working directories.
pub struct TestRun {
    pub config: HarnessConfig,
    pub template_dir: TempDir,
    pub work_dir: TempDir,
}

pub fn standard_params() -> RunParameters {
    RunParameters::new(10, 30, 176, 144).unwrap()
}

/// Routes the harness's log output through RUST_LOG for test debugging.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes the four standard templates and returns a config pointing at them.
pub fn test_run(params: RunParameters) -> TestRun {
    init_logging();

    let template_dir = TempDir::new().expect("create template dir");
    let work_dir = TempDir::new().expect("create work dir");

    write_template(
        template_dir.path(),
        "capture.cfg.template",
        "OutputFile = \"{OutputFile}\"\nFrameCount = {FrameCount}\nFrameRate = {FrameRate}\nWidth = {Width}\nHeight = {Height}\n",
    );
    write_template(
        template_dir.path(),
        "encoder.cfg.template",
        "InputFile = \"{InputFile1}\"\nFramesToBeEncoded = {FramesToBeEncoded}\nFrameRate = {FrameRate}\nSourceWidth = {SourceWidth}\nSourceHeight = {SourceHeight}\nOutputWidth = {OutputWidth}\nOutputHeight = {OutputHeight}\nOutputFile = \"{OutputFile}\"\nObjectDetection = {object_detection_enable}\n",
    );
    write_template(
        template_dir.path(),
        "decoder.cfg.template",
        "InputFile = \"{InputFile}\"\nOutputFile = \"{OutputFile}\"\nRefFile = \"{RefFile}\"\n",
    );
    write_template(
        template_dir.path(),
        "playback.cfg.template",
        "InputFile = \"{InputFile}\"\nFrameCount = {FrameCount}\nFrameRate = {FrameRate}\nWidth = {Width}\nHeight = {Height}\n",
    );

    let config = HarnessConfig::new(
        params,
        template_dir.path().to_path_buf(),
        work_dir.path().to_path_buf(),
        PathBuf::from("lencod"),
        PathBuf::from("ldecod"),
    );

    TestRun {
        config,
        template_dir,
        work_dir,
    }
}

pub fn write_template(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write template");
}

/// N frame admissions followed by end-of-stream.
pub fn frames_then_eos(frames: u64) -> Vec<BusMessage> {
    (1..=frames)
        .map(|frame| BusMessage::Progress { frame })
        .chain(std::iter::once(BusMessage::Eos))
        .collect()
}
