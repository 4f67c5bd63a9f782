//! Logging initialization.
//!
//! Logs go to stderr through `tracing-subscriber`; stdout carries only the
//! enhancement result. `RUST_LOG` overrides everything else.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Initialize the logging subsystem at `level`, pretty or JSON.
pub fn init(level: &str, json_format: bool) {
    // HTTP client internals stay at warn unless RUST_LOG says otherwise
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},hyper=warn,reqwest=warn")));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the config file, with CLI flag overrides.
pub fn init_from_config(
    config: &clarity_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let (level, json_format) = resolve_settings(config, verbose_override, json_logs_override);
    init(level, json_format);
}

/// `--verbose` raises the level to at least debug; unknown levels mean info.
fn resolve_settings(
    config: &clarity_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) -> (&'static str, bool) {
    let configured = config.logging.level.to_ascii_lowercase();
    let level = LEVELS
        .iter()
        .copied()
        .find(|l| *l == configured)
        .unwrap_or("info");
    let level = match (verbose_override, level) {
        (true, "trace") => "trace",
        (true, _) => "debug",
        (false, level) => level,
    };
    let json_format = json_logs_override || config.logging.format.eq_ignore_ascii_case("json");
    (level, json_format)
}
