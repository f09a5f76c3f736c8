//! File logging with daily rotation.

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use time::macros::format_description;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;

use crate::config::Config;

const LOG_PREFIX: &str = "pattern-sight";
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Install the global subscriber writing to `config.log_path`.
pub fn init(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.log_path)?;
    let removed = prune_logs(&config.log_path, config.log_retention_days)?;

    // Files are named pattern-sight.YYYY-MM-DD
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .max_log_files(config.log_retention_days.max(1) as usize)
        .build(&config.log_path)
        .map_err(|e| anyhow::anyhow!("Failed to create log appender: {}", e))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);

    let time_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(OffsetTime::new(offset, time_format)),
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    // The writer flushes on drop; it has to live as long as the process.
    std::mem::forget(guard);

    tracing::debug!(
        log_path = %config.log_path.display(),
        removed,
        "logging initialised"
    );
    Ok(())
}

/// Delete pattern-sight log files older than `retention_days`.
/// Returns how many files were removed.
pub fn prune_logs(log_path: &Path, retention_days: u64) -> Result<usize> {
    if !log_path.exists() {
        return Ok(0);
    }

    // A retention too long to represent keeps everything.
    let Some(cutoff) = retention_days
        .checked_mul(SECS_PER_DAY)
        .and_then(|secs| SystemTime::now().checked_sub(Duration::from_secs(secs)))
    else {
        return Ok(0);
    };
    let mut removed = 0;

    for entry in fs::read_dir(log_path)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_ours = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_PREFIX));
        if !is_ours {
            continue;
        }

        if let Ok(metadata) = entry.metadata()
            && let Ok(modified) = metadata.modified()
            && modified < cutoff
            && fs::remove_file(&path).is_ok()
        {
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdate(path: &Path, days: u64) {
        let when = SystemTime::now() - Duration::from_secs(days * SECS_PER_DAY);
        let secs = when.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs();
        let stamp = libc::timespec {
            tv_sec: secs as libc::time_t,
            tv_nsec: 0,
        };
        let times = [stamp, stamp];
        let c_path = std::ffi::CString::new(path.to_str().unwrap()).unwrap();
        let ret = unsafe { libc::utimensat(libc::AT_FDCWD, c_path.as_ptr(), times.as_ptr(), 0) };
        assert_eq!(ret, 0, "utimensat failed");
    }

    #[test]
    fn prune_removes_expired_logs_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let old = dir.path().join("pattern-sight.2020-01-01");
        let fresh = dir.path().join("pattern-sight.2026-10-19");
        fs::write(&old, "old").unwrap();
        fs::write(&fresh, "fresh").unwrap();
        backdate(&old, 10);

        let removed = prune_logs(dir.path(), 3).unwrap();

        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn prune_respects_longer_retention() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("pattern-sight.2026-10-10");
        fs::write(&log, "log").unwrap();
        backdate(&log, 5);

        assert_eq!(prune_logs(dir.path(), 7).unwrap(), 0);
        assert!(log.exists());
    }

    #[test]
    fn huge_retention_keeps_everything() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("pattern-sight.2020-01-01");
        fs::write(&log, "log").unwrap();
        backdate(&log, 400);

        assert_eq!(prune_logs(dir.path(), u64::MAX).unwrap(), 0);
        assert_eq!(prune_logs(dir.path(), 1_000_000_000_000_000_000).unwrap(), 0);
        assert!(log.exists());
    }

    #[test]
    fn prune_leaves_foreign_files_and_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let foreign = dir.path().join("other-app.log");
        fs::write(&foreign, "x").unwrap();
        backdate(&foreign, 30);
        fs::create_dir(dir.path().join("pattern-sight.archive")).unwrap();

        assert_eq!(prune_logs(dir.path(), 3).unwrap(), 0);
        assert!(foreign.exists());
    }

    #[test]
    fn prune_missing_dir_is_noop() {
        let missing = Path::new("/tmp/pattern_sight_missing_log_dir");
        assert_eq!(prune_logs(missing, 3).unwrap(), 0);
    }
}
