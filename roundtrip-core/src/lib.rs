//! Core library for round-trip validation of an external video codec.
//!
//! The harness captures (or synthesizes) raw video frames, drives an external
//! encoder and decoder over them, and replays the reconstruction so fidelity
//! can be judged. The codec executables and the media engine are opaque
//! collaborators behind the [`external::ToolRunner`] and
//! [`pipeline::PipelineBuilder`] traits; this crate owns the orchestration
//! state machine that sequences them.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use roundtrip_core::{HarnessConfig, Orchestrator, RunParameters};
//! use roundtrip_core::external::{CommandToolRunner, SidecarPipelineBuilder};
//! use std::path::PathBuf;
//!
//! let params = RunParameters::new(10, 30, 176, 144).unwrap();
//! let config = HarnessConfig::new(
//!     params,
//!     PathBuf::from("templates"),
//!     PathBuf::from("tmp"),
//!     PathBuf::from("lencod"),
//!     PathBuf::from("ldecod"),
//! );
//!
//! let mut orchestrator = Orchestrator::new(
//!     config,
//!     SidecarPipelineBuilder::new(true),
//!     CommandToolRunner,
//! );
//! let outcome = orchestrator.run();
//! assert!(outcome.is_success());
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod monitor;
pub mod orchestrator;
pub mod pipeline;
pub mod render;

// Re-exports for public API
pub use config::{DetectionSettings, HarnessConfig, RunParameters, RunPaths, TemplateValues};
pub use error::{CoreError, CoreResult};
pub use monitor::{Classification, EventMonitor, classify};
pub use orchestrator::{Orchestrator, RunOutcome, RunState};
pub use pipeline::{
    BusMessage, PipelineBuilder, PipelineHandle, PipelinePhase, PipelineSpec, StageKind,
    capture_spec, playback_spec,
};
pub use render::render_template;
