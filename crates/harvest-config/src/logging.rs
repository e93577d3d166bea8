//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` directives apply on top of `harvest=<level>` from the config.
///
/// # Errors
///
/// Fails if the level is not a valid directive or a global subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(directive(config)?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(level = %config.level, "logging initialized");
    Ok(())
}

fn directive(config: &LoggingConfig) -> anyhow::Result<tracing_subscriber::filter::Directive> {
    Ok(format!("harvest={}", config.level.trim().to_lowercase()).parse()?)
}
