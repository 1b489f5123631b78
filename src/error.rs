//! Error types for the cracker.
//!
//! A wrong password is never an error: the oracle reports it as
//! [`Verdict::Invalid`](crate::Verdict::Invalid). Everything here is either a
//! configuration problem caught before the search starts or an archive-level
//! failure that ends the whole run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

/// Invalid search parameters. Raised before any worker is spawned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error("password length must be at least 1")]
    ZeroLength,
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,
    #[error("alphabet contains '{0}' more than once")]
    DuplicateSymbol(char),
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("keyspace of {symbols} symbols at length {length} does not fit in 64 bits")]
    KeyspaceTooLarge { symbols: usize, length: usize },
}

/// The archive could not be loaded or is unusable for a password search.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed reading the ZIP file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed ZIP archive")]
    Malformed(#[from] ZipError),
    #[error("archive contains no entries")]
    Empty,
    #[error("archive contains no encrypted entries")]
    NotEncrypted,
}

/// Failures that end a search run.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("worker {worker} hit an archive error")]
    Oracle {
        worker: usize,
        #[source]
        source: ArchiveError,
    },
    #[error("partitions {partitions:?} were not searched to completion")]
    WorkersFailed { partitions: Vec<usize> },
    #[error("failed to start worker thread")]
    Spawn(#[source] io::Error),
}

/// Writing the result file or the extracted entries failed.
#[derive(Debug, Error)]
#[error("failed writing {}", .path.display())]
pub struct ReportError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
