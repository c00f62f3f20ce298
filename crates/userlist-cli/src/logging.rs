// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File-backed tracing. The terminal belongs to the UI, so log lines go to
//! disk instead of stderr.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_tracing(log_file: &Path, default_level: &str) -> Result<WorkerGuard> {
    let directory = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow!("log file {} has no file name", log_file.display()))?;
    fs::create_dir_all(directory)
        .with_context(|| format!("create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(env_filter(default_level)),
        )
        .try_init()
        .context("install tracing subscriber")?;

    Ok(guard)
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(default_level))
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::{default_filter, init_tracing};
    use anyhow::Result;

    #[test]
    fn invalid_default_level_falls_back_to_info() {
        assert_eq!(default_filter("userlist=verbose").to_string(), "info");
        assert_eq!(default_filter("debug").to_string(), "debug");
    }

    #[test]
    fn init_creates_missing_log_directory() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let log_dir = temp.path().join("state").join("userlist");
        let log_file = log_dir.join("userlist.log");

        let guard = init_tracing(&log_file, "info")?;
        tracing::info!("log directory test");
        drop(guard);

        assert!(log_dir.is_dir());
        assert!(log_file.is_file());
        Ok(())
    }
}

