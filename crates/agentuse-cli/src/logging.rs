use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV_VAR: &str = "AGENTUSE_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the process-wide `tracing` subscriber. `AGENTUSE_LOG` follows
/// the usual `tracing_subscriber::EnvFilter` directive syntax
/// (`agentuse_trial=debug,info`); `-v`/`--verbose` bumps the default floor
/// one level per occurrence when the variable isn't set.
pub fn init(verbose: u8) {
    let default_directive = match verbose {
        0 => DEFAULT_DIRECTIVE,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
