//! Diagnostic logging setup.
//!
//! Logs go to stderr so they never mix with command output on stdout.
//! `STM_LOG` takes an `EnvFilter` directive (e.g. `STM_LOG=stm=debug`);
//! `--verbose` overrides it with `debug`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "STM_LOG";

/// Level used when neither `--verbose` nor `STM_LOG` is given.
const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    let directives = filter_directives(verbose, std::env::var(LOG_ENV).ok().as_deref());
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn filter_directives(verbose: bool, env: Option<&str>) -> String {
    if verbose {
        return "debug".to_string();
    }
    match env.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => DEFAULT_LEVEL.to_string(),
    }
}
