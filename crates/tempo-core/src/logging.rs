//! Tracing subscriber setup.
//!
//! `TEMPO_LOG` takes an `EnvFilter` directive (falls back to the config's
//! `log_level`, then `warn`). Output goes to stderr unless `TEMPO_LOG_FILE`
//! names a file, in which case a non-blocking file writer is used and the
//! returned guard must be held until exit.

use std::io::IsTerminal;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TEMPO_LOG";
const LOG_FILE_ENV_VAR: &str = "TEMPO_LOG_FILE";
const DEFAULT_DIRECTIVE: &str = "warn";

fn env_filter(default_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        let directive = default_level
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or(DEFAULT_DIRECTIVE);
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    })
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(default_level: Option<&str>) -> Option<WorkerGuard> {
    let filter = env_filter(default_level);

    if let Ok(file) = std::env::var(LOG_FILE_ENV_VAR)
        && !file.trim().is_empty()
    {
        let path = Path::new(&file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path.file_name().unwrap_or(path.as_os_str());
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(writer)
            .try_init()
            .is_ok();
        return installed.then_some(guard);
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
    None
}
