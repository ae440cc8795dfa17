//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over `LOG_LEVEL` when set, so operators can raise the
//! verbosity of a single module without touching the service settings.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

use crate::config::{LogFormat, Settings};

/// Build the event filter for `settings`.
pub fn env_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(settings))
}

fn default_filter(settings: &Settings) -> EnvFilter {
    let mut directives = settings.log_directives();
    if settings.debug {
        directives.push_str(",tower_http=debug");
    }
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber described by `settings`.
///
/// Returns an error when a subscriber is already installed, which callers
/// may ignore.
pub fn init_tracing(settings: &Settings) -> Result<(), TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_target(true);

    match settings.log_format {
        LogFormat::Text => builder.finish().try_init(),
        LogFormat::Json => builder
            .json()
            .with_thread_ids(true)
            .with_thread_names(true)
            .finish()
            .try_init(),
        LogFormat::Pretty => builder.pretty().finish().try_init(),
        LogFormat::Compact => builder.compact().finish().try_init(),
    }?;

    if let Some(raw) = &settings.log_format_fallback {
        tracing::warn!(log_format = %raw, "Unrecognized LOG_FORMAT, using text output");
    }
    Ok(())
}
