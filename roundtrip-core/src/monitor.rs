//! Event monitor: consumes a pipeline's bus and decides when a media phase
//! is over.
//!
//! Every bus message is classified into exactly one of four branches; the
//! catch-all exists so nothing is dropped silently. The monitor is the only
//! component that declares a phase done: the orchestrator blocks in
//! [`EventMonitor::await_terminal`] until a terminal classification arrives.

use crate::error::{CoreError, CoreResult};
use crate::pipeline::{BusMessage, PipelineHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Harness-level meaning of one bus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Terminal: the phase completed normally.
    EndOfStream,
    /// Terminal: the phase failed.
    Error(String),
    /// Non-terminal: logged and ignored.
    Warning(String),
    /// Non-terminal: logged and ignored.
    Other(String),
}

/// Maps a bus message to its classification. Total over [`BusMessage`].
pub fn classify(message: &BusMessage) -> Classification {
    match message {
        BusMessage::Eos => Classification::EndOfStream,
        BusMessage::Error(detail) => Classification::Error(detail.clone()),
        BusMessage::Warning(detail) => Classification::Warning(detail.clone()),
        BusMessage::Progress { frame } => Classification::Other(format!("frame {frame}")),
        BusMessage::Other(detail) => Classification::Other(detail.clone()),
    }
}

/// Watches one pipeline at a time until it reaches a terminal state.
#[derive(Debug, Clone)]
pub struct EventMonitor {
    cancel: Arc<AtomicBool>,
}

impl EventMonitor {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    /// Blocks until the pipeline reaches a terminal classification and
    /// returns the number of frame admissions observed on the way.
    ///
    /// On `Error` (and on cancellation) the pipeline is stopped *before* the
    /// failure propagates, so no running pipeline leaks on the error path.
    /// A bus that closes without a terminal message is treated as an error.
    pub fn await_terminal<H: PipelineHandle>(&self, handle: &mut H) -> CoreResult<u64> {
        let mut frames_seen: u64 = 0;

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                handle.stop();
                return Err(CoreError::PipelineRuntime(
                    "interrupted by operator".to_string(),
                ));
            }

            let Some(message) = handle.next_message() else {
                handle.stop();
                return Err(CoreError::PipelineRuntime(
                    "bus closed before a terminal event".to_string(),
                ));
            };

            if let BusMessage::Progress { frame } = &message {
                frames_seen = frames_seen.max(*frame);
            }

            match classify(&message) {
                Classification::EndOfStream => {
                    log::info!("End of stream after {frames_seen} frames");
                    return Ok(frames_seen);
                }
                Classification::Error(detail) => {
                    log::error!("Pipeline error: {detail}");
                    handle.stop();
                    return Err(CoreError::PipelineRuntime(detail));
                }
                Classification::Warning(detail) => {
                    log::warn!("Pipeline warning: {detail}");
                }
                Classification::Other(detail) => {
                    log::debug!("Pipeline message: {detail}");
                }
            }
        }
    }
}
