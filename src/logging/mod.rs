use crate::config::LogConfig;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a `-v` count.
pub fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "wiki_scraper=info,warn",
        1 => "wiki_scraper=debug,info",
        _ => "trace",
    }
}

/// Install console + file logging. The returned guard flushes the file
/// writer on drop and must be held by the caller for the life of the program.
pub fn init(config: &LogConfig, verbose: u8) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("Failed to create log directory {:?}", config.directory))?;

    let appender = tracing_appender::rolling::never(&config.directory, &config.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbose))))
        .with(fmt::layer().compact().with_target(false))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
