use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{Config, LoggingConfig};

const LOG_FILE_NAME: &str = "dbdrawer.log";
const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Shared logger that can be used across the application
///
/// Keeps every entry in memory for the UI and, when enabled, appends it to a
/// log file. [`Logger::install`] routes the `log` facade through it.
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<Vec<String>>>,
    file_path: Option<PathBuf>,
}

impl Logger {
    /// In-memory logger without a file.
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            file_path: None,
        }
    }

    /// Logger configured from the `[logging]` section.
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::new());
        }
        Self::with_file(Self::get_log_file_path()?)
    }

    /// Logger that also appends to `path`, creating parent directories.
    pub fn with_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        Ok(Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            file_path: Some(path),
        })
    }

    /// Default log file location in the data directory
    pub fn get_log_file_path() -> Result<PathBuf> {
        Ok(Config::get_data_dir()?.join(LOG_FILE_NAME))
    }

    pub fn is_enabled(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Add a log entry
    pub fn log(&self, message: String) {
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let formatted_message = format!("[{}] {}", timestamp, message);
        self.append_to_file(&formatted_message);
        push(&self.logs, formatted_message);
    }

    /// Get all logs sorted by date (newest first)
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            let mut sorted_logs = logs.clone();
            sorted_logs.reverse();
            sorted_logs
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }

    /// Install a `fern` dispatch feeding this logger as the global logger.
    ///
    /// Only the first install in a process takes effect; later calls are
    /// ignored.
    pub fn install(&self, level: log::LevelFilter) -> Result<()> {
        let memory = self.logs.clone();
        let mut dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{}] {:<5} {}: {}",
                    Utc::now().format(TIMESTAMP_FORMAT),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            .chain(fern::Output::call(move |record| {
                push(&memory, record.args().to_string());
            }));

        if let Some(path) = &self.file_path {
            let file = fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
            dispatch = dispatch.chain(file);
        }

        if dispatch.apply().is_err() {
            log::debug!("global logger already installed");
        }
        Ok(())
    }

    fn append_to_file(&self, line: &str) {
        let Some(path) = &self.file_path else {
            return;
        };
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(err) = written {
            push(&self.logs, format!("failed to write log file {}: {}", path.display(), err));
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

fn push(logs: &Mutex<Vec<String>>, entry: String) {
    if let Ok(mut logs) = logs.lock() {
        logs.push(entry);
    }
}
