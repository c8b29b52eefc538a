use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn filter(directives: &str) -> Result<EnvFilter, ConfigError> {
    // RUST_LOG wins over the configured level when set.
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) if !env.is_empty() => EnvFilter::try_new(env),
        _ => EnvFilter::try_new(directives),
    }
    .map_err(|e| ConfigError::LoggingError(e.to_string()))
}

/// Installs the global tracing subscriber: a console layer, plus a daily-rolling
/// file layer when `settings.directory` is set.
///
/// Must be called once, early in `main`.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), ConfigError> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter(&settings.level)?);

    let file_layer = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &settings.file_prefix);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(appender)
                    .with_filter(filter(&settings.level)?),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))
}
