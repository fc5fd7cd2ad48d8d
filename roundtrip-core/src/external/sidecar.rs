// ============================================================================
// roundtrip-core/src/external/sidecar.rs
// ============================================================================
//
// SIDECAR BACKEND: Media Engine Implementation via ffmpeg-sidecar
//
// Translates the harness's typed stage graph into a single ffmpeg invocation
// and adapts the sidecar event stream to the pipeline bus vocabulary. The
// orchestrator never sees ffmpeg; it only sees PipelineBuilder/PipelineHandle.
//
// Stage mapping: the live source becomes a frame-limited lavfi test source,
// the normalize/scale/rate stages become a filter chain, the raw frame shape
// becomes rawvideo format options, the fan-out becomes a second ffmpeg output
// (SDL preview window, or a null sink for headless runs).

use crate::error::{CoreError, CoreResult};
use crate::external::check_dependency;
use crate::pipeline::{
    BusMessage, PipelineBuilder, PipelineHandle, PipelinePhase, PipelineSpec, StageKind,
};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::iter::FfmpegIterator;

const PREVIEW_WINDOW_TITLE: &str = "roundtrip preview";

/// Builds runnable ffmpeg pipelines from phase specs.
#[derive(Debug, Clone)]
pub struct SidecarPipelineBuilder {
    preview: bool,
}

impl SidecarPipelineBuilder {
    /// `preview` controls whether the preview sink opens an SDL window or
    /// discards frames (headless operation).
    pub fn new(preview: bool) -> Self {
        Self { preview }
    }
}

impl Default for SidecarPipelineBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PipelineBuilder for SidecarPipelineBuilder {
    type Handle = SidecarPipeline;

    fn build(&self, spec: &PipelineSpec) -> CoreResult<Self::Handle> {
        let first_stage = spec
            .stages
            .first()
            .map(StageKind::name)
            .unwrap_or("source");

        check_dependency("ffmpeg").map_err(|e| CoreError::PipelineBuild {
            stage: first_stage.to_string(),
            reason: format!("ffmpeg is not available: {e}"),
        })?;

        let args = translate(spec, self.preview)?;
        log::debug!(
            "Built {} pipeline: ffmpeg {}",
            spec.phase.as_str(),
            args.join(" ")
        );

        Ok(SidecarPipeline {
            phase: spec.phase,
            args: Some(args),
            child: None,
            events: None,
            finished: false,
        })
    }
}

/// Maps the typed stage graph onto ffmpeg arguments.
///
/// Walks the stages once to collect the source, the filter chain, the frame
/// shape, and the sinks, then emits the arguments in ffmpeg's required order
/// (input options, input, per-output options, output).
fn translate(spec: &PipelineSpec, preview: bool) -> CoreResult<Vec<String>> {
    let mut source: Option<&StageKind> = None;
    let mut filters: Vec<String> = Vec::new();
    let mut shape: Option<(u32, u32, u32)> = None;
    let mut file_sink: Option<String> = None;
    let mut preview_sink = false;
    let mut buffered = false;
    let mut frame_limit: Option<u32> = None;

    for stage in &spec.stages {
        match stage {
            StageKind::Source { frames } => {
                source = Some(stage);
                frame_limit = Some(*frames);
            }
            StageKind::FileSource { .. } => {
                source = Some(stage);
            }
            StageKind::FormatNormalize => filters.push("format=yuv420p".to_string()),
            StageKind::Scale { width, height } => {
                filters.push(format!("scale={width}:{height}"));
            }
            StageKind::RateNormalize { frame_rate } => {
                filters.push(format!("fps={frame_rate}"));
            }
            StageKind::RawFrameShape {
                width,
                height,
                frame_rate,
            } => {
                shape = Some((*width, *height, *frame_rate));
            }
            StageKind::Buffer => buffered = true,
            StageKind::FanOut { file_sink: path } => {
                file_sink = Some(path.display().to_string());
                preview_sink = true;
            }
            StageKind::PreviewSink => preview_sink = true,
        }
    }

    let source = source.ok_or_else(|| CoreError::PipelineBuild {
        stage: "source".to_string(),
        reason: "pipeline has no source stage".to_string(),
    })?;

    let mut args: Vec<String> = vec!["-hide_banner".into(), "-y".into()];

    // Input
    match source {
        StageKind::Source { .. } => {
            args.extend(["-f".into(), "lavfi".into(), "-i".into(), "testsrc".into()]);
        }
        StageKind::FileSource { path } => {
            let (width, height, frame_rate) =
                shape.ok_or_else(|| CoreError::PipelineBuild {
                    stage: "raw-frame-shape".to_string(),
                    reason: "file source requires a raw frame shape".to_string(),
                })?;
            if buffered {
                // Pace reading at the declared frame rate so the preview
                // plays in real time instead of draining the file at once.
                args.push("-re".into());
            }
            args.extend([
                "-f".into(),
                "rawvideo".into(),
                "-pix_fmt".into(),
                "yuv420p".into(),
                "-video_size".into(),
                format!("{width}x{height}"),
                "-framerate".into(),
                frame_rate.to_string(),
                "-i".into(),
                path.display().to_string(),
            ]);
        }
        other => {
            return Err(CoreError::PipelineBuild {
                stage: other.name().to_string(),
                reason: "stage cannot act as a pipeline source".to_string(),
            });
        }
    }

    let mut output_options: Vec<String> = Vec::new();
    if !filters.is_empty() {
        output_options.extend(["-vf".into(), filters.join(",")]);
    }
    if let Some(frames) = frame_limit {
        output_options.extend(["-frames:v".into(), frames.to_string()]);
    }

    // File sink branch (raw frames for the encoder)
    if let Some(path) = &file_sink {
        args.extend(output_options.iter().cloned());
        args.extend([
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-f".into(),
            "rawvideo".into(),
            path.clone(),
        ]);
    }

    // Preview sink branch
    if preview_sink {
        args.extend(output_options.iter().cloned());
        if preview {
            args.extend([
                "-pix_fmt".into(),
                "yuv420p".into(),
                "-f".into(),
                "sdl".into(),
                PREVIEW_WINDOW_TITLE.to_string(),
            ]);
        } else {
            args.extend(["-f".into(), "null".into(), "-".into()]);
        }
    }

    if file_sink.is_none() && !preview_sink {
        return Err(CoreError::PipelineBuild {
            stage: "preview-sink".to_string(),
            reason: "pipeline has no sink stage".to_string(),
        });
    }

    Ok(args)
}

/// One running (or not yet started) ffmpeg pipeline.
pub struct SidecarPipeline {
    phase: PipelinePhase,
    args: Option<Vec<String>>,
    child: Option<FfmpegChild>,
    events: Option<FfmpegIterator>,
    finished: bool,
}

impl SidecarPipeline {
    /// Terminal message synthesized from the exit status once the event
    /// stream is exhausted.
    fn final_message(&mut self) -> Option<BusMessage> {
        if self.finished {
            return None;
        }
        self.finished = true;

        let child = self.child.as_mut()?;
        match child.wait() {
            Ok(status) if status.success() => Some(BusMessage::Eos),
            Ok(status) => Some(BusMessage::Error(format!(
                "{} pipeline exited with {status}",
                self.phase.as_str()
            ))),
            Err(e) => Some(BusMessage::Error(format!(
                "failed to wait for {} pipeline: {e}",
                self.phase.as_str()
            ))),
        }
    }
}

impl PipelineHandle for SidecarPipeline {
    fn start(&mut self) -> CoreResult<()> {
        let args = self.args.take().ok_or_else(|| {
            CoreError::PipelineRuntime("pipeline already started".to_string())
        })?;

        let mut cmd = FfmpegCommand::new();
        cmd.args(args.iter().map(String::as_str));

        let mut child = cmd
            .spawn()
            .map_err(|e| CoreError::PipelineRuntime(format!("failed to start ffmpeg: {e}")))?;

        let events = child.iter().map_err(|e| {
            CoreError::PipelineRuntime(format!("failed to open pipeline bus: {e}"))
        })?;

        self.events = Some(events);
        self.child = Some(child);
        log::info!("Started {} pipeline", self.phase.as_str());
        Ok(())
    }

    fn next_message(&mut self) -> Option<BusMessage> {
        if let Some(event) = self.events.as_mut().and_then(Iterator::next) {
            return Some(map_event(event));
        }
        self.events = None;
        self.final_message()
    }

    fn stop(&mut self) {
        self.events = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                log::debug!("Pipeline process already gone: {e}");
            }
            if let Err(e) = child.wait() {
                log::warn!(
                    "Failed to reap {} pipeline process: {e}",
                    self.phase.as_str()
                );
            }
        }
        log::debug!("Stopped {} pipeline", self.phase.as_str());
    }
}

impl Drop for SidecarPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Adapts one sidecar event to the bus vocabulary. Total: everything the
/// engine emits lands in some bus message.
fn map_event(event: FfmpegEvent) -> BusMessage {
    match event {
        FfmpegEvent::Progress(progress) => BusMessage::Progress {
            frame: progress.frame as u64,
        },
        FfmpegEvent::Log(LogLevel::Warning, message) => BusMessage::Warning(message),
        FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => BusMessage::Error(message),
        FfmpegEvent::Error(error) => BusMessage::Error(error),
        FfmpegEvent::Log(_, message) => BusMessage::Other(message),
        other => BusMessage::Other(format!("{other:?}")),
    }
}
