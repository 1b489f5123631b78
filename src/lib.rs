//! Parallel brute-force password recovery for encrypted zip archives.
//!
//! The keyspace (every string of a fixed length over an alphabet) is split
//! into disjoint prefix partitions, one per worker thread. Workers test their
//! candidates against the archive and the first valid password stops them all.

pub use crate::alphabet::{Alphabet, DEFAULT_ALPHABET};
pub use crate::archive::{Archive, ZipVerifier};
pub use crate::candidates::{generate, Candidates};
pub use crate::config::{resolve_workers, SearchConfig, DEFAULT_LENGTH};
pub use crate::coordinator::{crack_archive, Coordinator, Outcome, SearchReport};
pub use crate::error::{ArchiveError, ConfigError, ReportError, SearchError};
pub use crate::keyspace::{Keyspace, Partition};
pub use crate::oracle::{ExtractedEntry, OracleFactory, PasswordOracle, Verdict};
pub use crate::report::{extract_entries, format_elapsed, Reporter, DEFAULT_OUTPUT};
pub use crate::state::{Recovered, SearchState};
pub use crate::worker::{Worker, WorkerReport, WorkerState};

mod alphabet;
mod archive;
mod candidates;
mod config;
mod coordinator;
mod error;
mod keyspace;
mod oracle;
mod report;
mod state;
mod worker;
