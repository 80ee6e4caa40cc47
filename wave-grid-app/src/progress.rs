// wave-grid-app/src/progress.rs

use crate::config::ProgressLogLevel;
use anyhow::Result;
use log::Level;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wfc_core::{ProgressCallback, ProgressInfo, WfcError};

/// Trait for reporting the progress of the WFC algorithm.
///
/// Implementors of this trait can display progress information in various ways
/// (e.g., console output, log lines).
pub trait ProgressReporter: Send + Sync {
    /// Called after every iteration with updated progress information.
    fn report(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when the WFC process completes successfully.
    fn finish(&mut self) -> Result<()>;

    /// Called when the WFC process fails with an error.
    fn fail(&mut self, error: &WfcError) -> Result<()>;
}

/// Writes a progress line to the log at most once per `interval`.
#[derive(Debug)]
pub struct LogProgressReporter {
    interval: Duration,
    level: Level,
    last_report: Option<Instant>,
    last_info: Option<ProgressInfo>,
}

impl LogProgressReporter {
    /// Reporter logging at `level` at most once per `interval`.
    pub fn new(interval: Duration, level: ProgressLogLevel) -> Self {
        Self {
            interval,
            level: log_level(level),
            last_report: None,
            last_info: None,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        self.last_report
            .map_or(true, |last| now.duration_since(last) >= self.interval)
    }
}

impl ProgressReporter for LogProgressReporter {
    fn report(&mut self, info: &ProgressInfo) -> Result<()> {
        let now = Instant::now();
        if self.is_due(now) {
            log::log!(self.level, "{}", format_progress(info));
            self.last_report = Some(now);
        }
        self.last_info = Some(info.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(info) = &self.last_info {
            log::log!(self.level, "Finished. {}", format_progress(info));
        }
        Ok(())
    }

    fn fail(&mut self, error: &WfcError) -> Result<()> {
        match &self.last_info {
            Some(info) => log::warn!("Stopped: {}. {}", error, format_progress(info)),
            None => log::warn!("Stopped before the first iteration: {}", error),
        }
        Ok(())
    }
}

/// One human-readable progress line.
pub fn format_progress(info: &ProgressInfo) -> String {
    let elapsed_secs = info.elapsed_time.as_secs_f32();
    let collapse_rate = if elapsed_secs > 0.0 {
        info.collapsed_cells as f32 / elapsed_secs
    } else {
        0.0
    };
    format!(
        "Progress: Iter {}, Collapsed {}/{} ({:.1}%), Elapsed: {:.2?}, Rate: {:.1} cells/s",
        info.iterations,
        info.collapsed_cells,
        info.total_cells,
        info.percentage(),
        info.elapsed_time,
        collapse_rate
    )
}

fn log_level(level: ProgressLogLevel) -> Level {
    match level {
        ProgressLogLevel::Trace => Level::Trace,
        ProgressLogLevel::Debug => Level::Debug,
        ProgressLogLevel::Info => Level::Info,
        ProgressLogLevel::Warn => Level::Warn,
    }
}

/// Adapts a shared reporter to the runner's callback type.
///
/// The caller keeps its handle to call `finish` or `fail` once the run ends.
pub fn into_callback<R>(reporter: Arc<Mutex<R>>) -> ProgressCallback
where
    R: ProgressReporter + 'static,
{
    Box::new(move |info: &ProgressInfo| {
        let mut guard = reporter
            .lock()
            .map_err(|_| WfcError::Callback("Progress reporter mutex poisoned".to_owned()))?;
        guard
            .report(info)
            .map_err(|e| WfcError::Callback(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(collapsed_cells: usize, iterations: u64) -> ProgressInfo {
        ProgressInfo {
            collapsed_cells,
            total_cells: 16,
            elapsed_time: Duration::from_millis(500),
            iterations,
        }
    }

    #[test]
    fn test_format_progress() {
        let line = format_progress(&info(4, 3));
        assert!(line.starts_with("Progress: Iter 3, Collapsed 4/16 (25.0%)"));
        assert!(line.ends_with("Rate: 8.0 cells/s"));
    }

    #[test]
    fn test_reports_are_throttled() {
        let mut reporter = LogProgressReporter::new(Duration::from_secs(3600), ProgressLogLevel::Info);
        reporter.report(&info(1, 1)).unwrap();
        let first = reporter.last_report;
        reporter.report(&info(2, 2)).unwrap();
        assert_eq!(reporter.last_report, first);
        assert_eq!(reporter.last_info, Some(info(2, 2)));
    }

    #[test]
    fn test_callback_forwards_to_reporter() {
        let reporter = Arc::new(Mutex::new(LogProgressReporter::new(
            Duration::ZERO,
            ProgressLogLevel::Debug,
        )));
        let callback = into_callback(Arc::clone(&reporter));
        callback(&info(5, 5)).unwrap();
        callback(&info(6, 6)).unwrap();
        assert_eq!(reporter.lock().unwrap().last_info, Some(info(6, 6)));
        assert!(reporter.lock().unwrap().finish().is_ok());
    }
}
