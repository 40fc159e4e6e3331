use lambda_runtime::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{filter::LevelFilter, prelude::*};

/// Installs the global JSON (bunyan) subscriber writing to stdout.
///
/// `log` records emitted by the AWS clients are forwarded to `tracing`. The returned
/// guard flushes the non-blocking writer when dropped, keep it alive for the whole run.
pub fn init_tracing(level: LevelFilter) -> Result<WorkerGuard, Error> {
    LogTracer::init()?;

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);

    tracing_subscriber::registry()
        .with(level)
        .with(JsonStorageLayer)
        .with(bunyan_formatting_layer)
        .try_init()?;

    Ok(guard)
}
