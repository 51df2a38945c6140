//! Tracing subscriber setup for the CLI

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "LAMBDA_LAYER_RELEASES_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Write to stderr instead of the log file
    pub stderr: bool,
    /// Emit JSON lines
    pub json: bool,
}

fn env_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber
///
/// File output goes to a daily-rolling file in `log_dir`; keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn init(log_dir: &Path, options: LogOptions) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = env_filter(std::env::var(LOG_ENV).ok());

    let (writer, guard) = if options.stderr {
        (BoxMakeWriter::new(std::io::stderr), None)
    } else {
        std::fs::create_dir_all(log_dir)?;
        let appender = tracing_appender::rolling::daily(log_dir, "lambda-layer-releases.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        (BoxMakeWriter::new(non_blocking), Some(guard))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(options.stderr);

    let result = if options.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "info")]
    #[case(Some("debug"), "debug")]
    #[case(Some("lambda_layer_releases=trace"), "lambda_layer_releases=trace")]
    fn env_filter_uses_directives_or_default(
        #[case] directives: Option<&str>,
        #[case] expected: &str,
    ) {
        let filter = env_filter(directives.map(str::to_string));

        assert_eq!(filter.to_string(), expected);
    }

    #[test]
    fn env_filter_falls_back_on_invalid_directives() {
        let filter = env_filter(Some("layer=notalevel".to_string()));

        assert_eq!(filter.to_string(), "info");
    }
}
