//! Tracing setup.
//!
//! `RUST_LOG` wins when set. Otherwise the level comes from the verbosity
//! flags (warn by default). `BUILDENV_LOG_FORMAT=json` switches to JSON
//! lines.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Level selected by `--debug` / `--verbose`.
pub fn level_from_flags(debug: bool, verbose: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// usable for documents.
pub fn init(level: LevelFilter) {
    let log_format = std::env::var("BUILDENV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("buildenv={level},buildenv_core={level},mongodb=warn").into()
    });

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
