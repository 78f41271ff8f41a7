use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

pub trait Service {
    fn get_log_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn add_log_entry(&self, entry: Entry) -> Result<(), Error>;
}

pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Installs a logger that echoes to stderr and keeps each record in `repository`.
///
/// # Errors
///
/// Returns an error if a logger has already been installed.
pub fn init(
    repository: Arc<Mutex<dyn Repository>>,
    max_level: LevelFilter,
) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger::new(repository, max_level)))
        .map(|()| log::set_max_level(max_level))
}

pub struct Logger {
    repository: Arc<Mutex<dyn Repository>>,
    max_level: LevelFilter,
}

impl Logger {
    #[must_use]
    pub fn new(repository: Arc<Mutex<dyn Repository>>, max_level: LevelFilter) -> Self {
        Self {
            repository,
            max_level,
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = Entry {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level: record.level(),
            message: record.args().to_string(),
        };
        eprintln!("{} {:<5} {}", entry.time, entry.level, entry.message);

        let _ = self
            .repository
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_entry(entry);
    }

    fn flush(&self) {}
}
