use std::path::PathBuf;

use crate::error::ArchiveError;

/// A decrypted archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    pub name: PathBuf,
    pub data: Vec<u8>,
}

/// Outcome of testing one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid(Vec<ExtractedEntry>),
    Invalid,
}

/// Decides whether a candidate opens the archive.
///
/// A wrong password is `Ok(Verdict::Invalid)`. `Err` is reserved for failures
/// of the archive itself, which every other candidate would hit too.
pub trait PasswordOracle {
    fn verify(&mut self, candidate: &str) -> Result<Verdict, ArchiveError>;
}

/// Builds one independent oracle per worker, so no parsed state is shared.
pub trait OracleFactory: Sync {
    type Oracle: PasswordOracle;

    fn instantiate(&self) -> Result<Self::Oracle, ArchiveError>;
}
