use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "flipit.log";

/// Install the global subscriber: stderr always, plus a daily-rolling file
/// when `logging.directory` is set. `RUST_LOG` takes precedence over the
/// configured level.
///
/// Keep the returned guard alive until exit so buffered file output is flushed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
  let env_filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(&config.level))
    .map_err(|e| eyre!("Invalid log level '{}': {}", config.level, e))?;

  let stderr_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .boxed();

  let (file_layer, guard) = match &config.directory {
    Some(dir) => {
      std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
      let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .boxed();
      (Some(layer), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(env_filter)
    .with(stderr_layer)
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
