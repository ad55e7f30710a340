use std::process::ExitCode;

use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    match labeldesk::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
