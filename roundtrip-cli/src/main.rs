// roundtrip-cli/src/main.rs
//
// Command-line interface for the roundtrip codec validation harness.
//
// Responsibilities:
// - Parsing the four positional run parameters and the optional flags.
// - Setting up logging.
// - Installing the ctrl-c handler that raises the orchestrator's cancel flag.
// - Running the orchestration and mapping its outcome to an exit code.

use clap::Parser;
use roundtrip_core::external::{CommandToolRunner, SidecarPipelineBuilder};
use roundtrip_core::{HarnessConfig, Orchestrator, RunParameters};
use std::process::ExitCode;
use std::sync::atomic::Ordering;

mod cli;
mod logging;

use cli::Cli;

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let params = match RunParameters::new(cli.frames, cli.frame_rate, cli.width, cli.height) {
        Ok(params) => params,
        Err(e) => {
            // Unreachable through clap's range validation, but the library
            // boundary still enforces it.
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = HarnessConfig::new(
        params,
        cli.template_dir,
        cli.work_dir,
        cli.encoder,
        cli.decoder,
    );

    log::info!(
        "Starting round trip: {} frames at {} fps, {}x{}",
        params.frames,
        params.frame_rate,
        params.width,
        params.height
    );

    let mut orchestrator = Orchestrator::new(
        config,
        SidecarPipelineBuilder::new(!cli.no_preview),
        CommandToolRunner,
    );

    let cancel = orchestrator.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || {
        log::warn!("Interrupt received, aborting run");
        cancel.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Could not install interrupt handler: {e}");
    }

    let outcome = orchestrator.run();
    println!("{outcome}");

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
