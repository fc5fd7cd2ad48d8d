//! Pipeline control: the typed stage graph for the capture and playback
//! phases, and the traits the orchestrator uses to drive a media engine
//! without knowing which one is behind them.
//!
//! The engine is a black box exposing construct-graph, start/stop, and an
//! ordered channel of status messages. The concrete backend lives in
//! `external::sidecar`; tests substitute their own implementations of
//! [`PipelineBuilder`] and [`PipelineHandle`].

use crate::config::RunParameters;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};

/// The two media phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Capture,
    Playback,
}

impl PipelinePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelinePhase::Capture => "capture",
            PipelinePhase::Playback => "playback",
        }
    }
}

/// One typed processing stage in a pipeline graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageKind {
    /// Live source that emits exactly `frames` buffers, then end-of-stream.
    /// This is the sole termination signal for the capture phase.
    Source { frames: u32 },
    /// Reads raw frames back from a file.
    FileSource { path: PathBuf },
    /// Normalizes the pixel format to planar YUV 4:2:0.
    FormatNormalize,
    Scale { width: u32, height: u32 },
    RateNormalize { frame_rate: u32 },
    /// Declares the shape of the raw frames (caps on an untyped byte stream).
    RawFrameShape {
        width: u32,
        height: u32,
        frame_rate: u32,
    },
    /// Decouples the sink from the upstream stages for smooth display.
    Buffer,
    /// Branch point: one leg to a file sink, one leg to the preview sink.
    FanOut { file_sink: PathBuf },
    PreviewSink,
}

impl StageKind {
    /// Stage name used in build diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Source { .. } => "source",
            StageKind::FileSource { .. } => "file-source",
            StageKind::FormatNormalize => "format-normalize",
            StageKind::Scale { .. } => "scale",
            StageKind::RateNormalize { .. } => "rate-normalize",
            StageKind::RawFrameShape { .. } => "raw-frame-shape",
            StageKind::Buffer => "buffer",
            StageKind::FanOut { .. } => "fan-out",
            StageKind::PreviewSink => "preview-sink",
        }
    }
}

/// A directed graph of processing stages for one phase. Stages are connected
/// in order; the fan-out stage carries its own branch targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    pub phase: PipelinePhase,
    pub stages: Vec<StageKind>,
}

/// Capture wiring: source -> format-normalize -> scale -> rate-normalize ->
/// raw-frame-shape -> fan-out (file sink for the encoder input, preview sink).
pub fn capture_spec(params: &RunParameters, output: &Path) -> PipelineSpec {
    PipelineSpec {
        phase: PipelinePhase::Capture,
        stages: vec![
            StageKind::Source {
                frames: params.frames,
            },
            StageKind::FormatNormalize,
            StageKind::Scale {
                width: params.width,
                height: params.height,
            },
            StageKind::RateNormalize {
                frame_rate: params.frame_rate,
            },
            StageKind::RawFrameShape {
                width: params.width,
                height: params.height,
                frame_rate: params.frame_rate,
            },
            StageKind::FanOut {
                file_sink: output.to_path_buf(),
            },
        ],
    }
}

/// Playback wiring: file-source -> raw-frame-shape -> format-normalize ->
/// scale -> rate-normalize -> buffer -> preview-sink. Display only, no file
/// output.
pub fn playback_spec(params: &RunParameters, input: &Path) -> PipelineSpec {
    PipelineSpec {
        phase: PipelinePhase::Playback,
        stages: vec![
            StageKind::FileSource {
                path: input.to_path_buf(),
            },
            StageKind::RawFrameShape {
                width: params.width,
                height: params.height,
                frame_rate: params.frame_rate,
            },
            StageKind::FormatNormalize,
            StageKind::Scale {
                width: params.width,
                height: params.height,
            },
            StageKind::RateNormalize {
                frame_rate: params.frame_rate,
            },
            StageKind::Buffer,
            StageKind::PreviewSink,
        ],
    }
}

/// One status message from a running pipeline's bus, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    /// The pipeline drained its source and shut down normally.
    Eos,
    /// Fatal pipeline condition.
    Error(String),
    /// Recoverable condition; logged, never aborts a phase.
    Warning(String),
    /// One frame admitted through the pipeline.
    Progress { frame: u64 },
    /// Anything else the engine emits.
    Other(String),
}

/// An instantiated pipeline owned by the controller for the duration of one
/// phase.
pub trait PipelineHandle {
    /// Transitions the pipeline to its running state.
    fn start(&mut self) -> CoreResult<()>;

    /// Next bus message, blocking until one is available. `None` means the
    /// bus is closed and no further messages will arrive.
    fn next_message(&mut self) -> Option<BusMessage>;

    /// Releases the pipeline's resources. Idempotent, and safe to call even
    /// if `start` failed partway.
    fn stop(&mut self);
}

/// Something that can turn a [`PipelineSpec`] into a runnable pipeline.
pub trait PipelineBuilder {
    type Handle: PipelineHandle;

    /// Constructs the pipeline graph for `spec`. A stage whose underlying
    /// media capability is unavailable fails the build with
    /// `CoreError::PipelineBuild` naming that stage.
    fn build(&self, spec: &PipelineSpec) -> CoreResult<Self::Handle>;
}
