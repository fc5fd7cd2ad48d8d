//! Run orchestrator: the top-level state machine that sequences capture,
//! encode, decode, and playback into one fail-safe validation run.
//!
//! Progression is strictly monotonic; the first fatal condition in any phase
//! short-circuits to `Done` with that phase's failure outcome. There is no
//! automatic retry anywhere: a failed run is re-invoked by the operator.

use crate::config::{HarnessConfig, TemplateValues};
use crate::error::{CoreError, CoreResult};
use crate::external::ToolRunner;
use crate::monitor::EventMonitor;
use crate::pipeline::{PipelineBuilder, PipelineHandle, PipelineSpec, capture_spec, playback_spec};
use crate::render::render_template;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// States of one orchestration attempt, in progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    Idle,
    RenderCaptureConfig,
    Capturing,
    RenderEncodeConfig,
    Encoding,
    RenderDecodeConfig,
    Decoding,
    RenderPlaybackConfig,
    Playing,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::RenderCaptureConfig => "render-capture-config",
            RunState::Capturing => "capturing",
            RunState::RenderEncodeConfig => "render-encode-config",
            RunState::Encoding => "encoding",
            RunState::RenderDecodeConfig => "render-decode-config",
            RunState::Decoding => "decoding",
            RunState::RenderPlaybackConfig => "render-playback-config",
            RunState::Playing => "playing",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal result of one orchestration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    CaptureFailed(String),
    EncodeFailed(String),
    DecodeFailed(String),
    PlaybackFailed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    /// The phase that failed, if any.
    pub fn failed_phase(&self) -> Option<&'static str> {
        match self {
            RunOutcome::Success => None,
            RunOutcome::CaptureFailed(_) => Some("capture"),
            RunOutcome::EncodeFailed(_) => Some("encode"),
            RunOutcome::DecodeFailed(_) => Some("decode"),
            RunOutcome::PlaybackFailed(_) => Some("playback"),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success => write!(f, "round trip completed successfully"),
            RunOutcome::CaptureFailed(d) => write!(f, "capture failed: {d}"),
            RunOutcome::EncodeFailed(d) => write!(f, "encode failed: {d}"),
            RunOutcome::DecodeFailed(d) => write!(f, "decode failed: {d}"),
            RunOutcome::PlaybackFailed(d) => write!(f, "playback failed: {d}"),
        }
    }
}

/// Sequences one validation run over injected pipeline and tool backends.
pub struct Orchestrator<B: PipelineBuilder, R: ToolRunner> {
    config: HarnessConfig,
    builder: B,
    runner: R,
    monitor: EventMonitor,
    cancel: Arc<AtomicBool>,
    state: RunState,
}

impl<B: PipelineBuilder, R: ToolRunner> Orchestrator<B, R> {
    pub fn new(config: HarnessConfig, builder: B, runner: R) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        Self {
            config,
            builder,
            runner,
            monitor: EventMonitor::new(Arc::clone(&cancel)),
            cancel,
            state: RunState::Idle,
        }
    }

    /// Shared flag an interrupt handler raises to abort the run. Any active
    /// pipeline is stopped before the harness gives up control.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the full state machine to its terminal outcome.
    pub fn run(&mut self) -> RunOutcome {
        let paths = self.config.paths();

        if let Err(e) = self.config.ensure_work_dir() {
            return self.finish(RunOutcome::CaptureFailed(e.to_string()));
        }

        // Capture
        self.advance(RunState::RenderCaptureConfig);
        if let Err(e) = self.render(
            &self.config.capture_template(),
            self.config.capture_values(),
            &paths.capture_config,
        ) {
            return self.finish(RunOutcome::CaptureFailed(e.to_string()));
        }
        self.advance(RunState::Capturing);
        let spec = capture_spec(&self.config.params, &paths.capture_output);
        match self.run_media_phase(&spec) {
            Ok(frames) => log::info!("Capture complete after {frames} frames"),
            Err(e) => return self.finish(RunOutcome::CaptureFailed(e.to_string())),
        }

        // Encode
        self.advance(RunState::RenderEncodeConfig);
        if let Err(e) = self.render(
            &self.config.encoder_template(),
            self.config.encoder_values(),
            &paths.encoder_config,
        ) {
            return self.finish(RunOutcome::EncodeFailed(e.to_string()));
        }
        self.advance(RunState::Encoding);
        if let Err(e) = self.run_tool(&self.config.encoder, &paths.encoder_config) {
            return self.finish(RunOutcome::EncodeFailed(e.to_string()));
        }

        // Decode
        self.advance(RunState::RenderDecodeConfig);
        if let Err(e) = self.render(
            &self.config.decoder_template(),
            self.config.decoder_values(),
            &paths.decoder_config,
        ) {
            return self.finish(RunOutcome::DecodeFailed(e.to_string()));
        }
        self.advance(RunState::Decoding);
        if let Err(e) = self.run_tool(&self.config.decoder, &paths.decoder_config) {
            return self.finish(RunOutcome::DecodeFailed(e.to_string()));
        }

        // Playback
        self.advance(RunState::RenderPlaybackConfig);
        if let Err(e) = self.render(
            &self.config.playback_template(),
            self.config.playback_values(),
            &paths.playback_config,
        ) {
            return self.finish(RunOutcome::PlaybackFailed(e.to_string()));
        }
        self.advance(RunState::Playing);
        if let Err(e) = self.run_media_phase(&playback_spec(
            &self.config.params,
            &paths.decoded_output,
        )) {
            return self.finish(RunOutcome::PlaybackFailed(e.to_string()));
        }

        self.finish(RunOutcome::Success)
    }

    fn render(
        &self,
        template: &Path,
        values: TemplateValues,
        target: &Path,
    ) -> CoreResult<()> {
        self.check_cancelled()?;
        render_template(template, &values, target)
    }

    /// Builds, starts, monitors, and tears down one pipeline. The pipeline
    /// never outlives the phase.
    fn run_media_phase(&self, spec: &PipelineSpec) -> CoreResult<u64> {
        let mut handle = self.builder.build(spec)?;
        if let Err(e) = handle.start() {
            handle.stop();
            return Err(e);
        }
        let result = self.monitor.await_terminal(&mut handle);
        handle.stop();
        result
    }

    /// Invokes an external tool with its rendered configuration and blocks
    /// until it exits.
    fn run_tool(&self, executable: &Path, config: &Path) -> CoreResult<()> {
        self.check_cancelled()?;
        let args = vec!["-f".to_string(), config.display().to_string()];
        let status = self.runner.run(executable, &args)?;
        if status.success() {
            Ok(())
        } else {
            Err(CoreError::ExternalTool {
                tool: executable.display().to_string(),
                status,
            })
        }
    }

    fn check_cancelled(&self) -> CoreResult<()> {
        if self.cancel.load(Ordering::SeqCst) {
            Err(CoreError::PipelineRuntime(
                "interrupted by operator".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(next > self.state, "run states must progress monotonically");
        log::info!("Entering state: {next}");
        self.state = next;
    }

    fn finish(&mut self, outcome: RunOutcome) -> RunOutcome {
        self.state = RunState::Done;
        match &outcome {
            RunOutcome::Success => log::info!("{outcome}"),
            _ => log::error!("{outcome}"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_order_matches_the_progression() {
        assert!(RunState::Idle < RunState::RenderCaptureConfig);
        assert!(RunState::RenderCaptureConfig < RunState::Capturing);
        assert!(RunState::Capturing < RunState::RenderEncodeConfig);
        assert!(RunState::Playing < RunState::Done);
    }

    #[test]
    fn outcome_names_its_failed_phase() {
        assert_eq!(RunOutcome::Success.failed_phase(), None);
        assert_eq!(
            RunOutcome::EncodeFailed("exit 1".into()).failed_phase(),
            Some("encode")
        );
        assert!(RunOutcome::Success.is_success());
        assert!(!RunOutcome::DecodeFailed("x".into()).is_success());
    }
}
