// roundtrip-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Roundtrip: codec round-trip validation harness",
    long_about = "Captures raw video frames, runs them through an external \
                  encoder and decoder, and replays the reconstruction so the \
                  codec's fidelity can be judged."
)]
pub struct Cli {
    /// Number of frames to capture and encode
    #[arg(value_name = "FRAME_COUNT", value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,

    /// Frames per second for capture and playback
    #[arg(value_name = "FRAME_RATE", value_parser = clap::value_parser!(u32).range(1..))]
    pub frame_rate: u32,

    /// Frame width in pixels
    #[arg(value_name = "WIDTH", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Frame height in pixels
    #[arg(value_name = "HEIGHT", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Working directory for intermediate files and rendered configurations
    #[arg(long, value_name = "DIR", default_value = "tmp")]
    pub work_dir: PathBuf,

    /// Directory containing the configuration templates
    #[arg(long, value_name = "DIR", default_value = "templates")]
    pub template_dir: PathBuf,

    /// Path to the external encoder executable
    #[arg(long, value_name = "PATH", default_value = "lencod")]
    pub encoder: PathBuf,

    /// Path to the external decoder executable
    #[arg(long, value_name = "PATH", default_value = "ldecod")]
    pub decoder: PathBuf,

    /// Disable the preview window (headless operation)
    #[arg(long, default_value_t = false)]
    pub no_preview: bool,
}
