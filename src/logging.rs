use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result, bail};
use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingRotation};

const LOG_FILE_PREFIX: &str = "faucet.log";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Keeps the non-blocking writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _worker_guard: WorkerGuard,
    run_id: String,
    log_dir: PathBuf,
}

impl LoggingGuard {
    /// Identifies one faucet process in the JSON log stream.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

impl From<&LoggingRotation> for Rotation {
    fn from(rotation: &LoggingRotation) -> Self {
        match rotation {
            LoggingRotation::Daily => Rotation::DAILY,
            LoggingRotation::Hourly => Rotation::HOURLY,
        }
    }
}

/// Installs the process-wide subscriber: JSON events into rotating files
/// under `logging.dir`, plus WARN and above on stderr when enabled. Fails if
/// a global subscriber is already installed.
pub fn init_tracing(logging_config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = build_env_filter(&logging_config.filter)?;
    let log_dir = prepare_log_dir(&logging_config.dir)?;
    let retention = purge_expired_logs(&log_dir, logging_config.retention_days, SystemTime::now());

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::from(&logging_config.rotation))
        .filename_prefix(LOG_FILE_PREFIX)
        .build(&log_dir)
        .with_context(|| format!("failed to open log appender in {}", log_dir.display()))?;
    let (writer, worker_guard) = tracing_appender::non_blocking(appender);

    let json_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(writer)
        .with_filter(env_filter);
    let warn_layer = logging_config.stderr_warn_enabled.then(|| {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr.with_max_level(Level::WARN))
    });

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(json_layer)
        .with(warn_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let run_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "faucet.logging",
        run_id = %run_id,
        dir = %log_dir.display(),
        filter = %logging_config.filter,
        rotation = ?logging_config.rotation,
        expired_removed = retention.removed,
        "logging_initialized"
    );
    for failure in &retention.failures {
        tracing::warn!(target: "faucet.logging", failure = %failure, "log_retention_failed");
    }

    Ok(LoggingGuard {
        _worker_guard: worker_guard,
        run_id,
        log_dir,
    })
}

fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    if filter.trim().is_empty() {
        bail!("logging.filter cannot be empty");
    }
    EnvFilter::try_new(filter).with_context(|| format!("failed to parse logging.filter '{filter}'"))
}

fn prepare_log_dir(dir: &Path) -> Result<PathBuf> {
    if dir.as_os_str().is_empty() {
        bail!("logging.dir cannot be empty");
    }
    let dir = std::path::absolute(dir)
        .with_context(|| format!("failed to resolve logging.dir {}", dir.display()))?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create logging directory {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Default)]
struct RetentionReport {
    removed: usize,
    failures: Vec<String>,
}

/// Deletes `faucet.log*` files whose mtime is older than the retention window.
/// Failures are collected rather than raised so logging still starts.
fn purge_expired_logs(log_dir: &Path, retention_days: usize, now: SystemTime) -> RetentionReport {
    let window = Duration::from_secs((retention_days as u64).saturating_mul(SECONDS_PER_DAY));
    let cutoff = now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH);
    let mut report = RetentionReport::default();

    let expired = match expired_log_files(log_dir, cutoff) {
        Ok(expired) => expired,
        Err(err) => {
            report
                .failures
                .push(format!("failed to scan {}: {err}", log_dir.display()));
            return report;
        }
    };
    for path in expired {
        match fs::remove_file(&path) {
            Ok(()) => report.removed += 1,
            Err(err) => report
                .failures
                .push(format!("failed to remove {}: {err}", path.display())),
        }
    }
    report
}

fn expired_log_files(log_dir: &Path, cutoff: SystemTime) -> std::io::Result<Vec<PathBuf>> {
    let mut expired = Vec::new();
    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let metadata = entry.metadata()?;
        if metadata.is_file() && metadata.modified()? <= cutoff {
            expired.push(entry.path());
        }
    }
    Ok(expired)
}
