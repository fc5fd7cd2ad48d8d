// roundtrip-cli/src/logging.rs
//
// Logging setup for the CLI. Uses the standard `log` facade with
// `env_logger` as the backend; verbosity is controlled through RUST_LOG:
// - RUST_LOG=info (default): phase transitions and outcomes
// - RUST_LOG=debug: rendered configs, pipeline arguments, bus chatter

use env_logger::Env;

/// Initializes env_logger with an info default.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}
