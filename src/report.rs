//! Persisting a recovered password.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};

use crate::error::ReportError;
use crate::oracle::ExtractedEntry;

pub const DEFAULT_OUTPUT: &str = "password.txt";

/// Writes the password and the search time to a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reporter {
    path: PathBuf,
}

impl Reporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Line one is the password, line two the elapsed time.
    pub fn write(&self, password: &str, elapsed: Duration) -> Result<(), ReportError> {
        let contents = format!("{password}\n{}\n", format_elapsed(elapsed));
        fs::write(&self.path, contents).map_err(|source| ReportError {
            path: self.path.clone(),
            source,
        })?;
        info!("Password written to {}", self.path.display());
        Ok(())
    }
}

/// `<minutes>m <seconds>.<centiseconds>s`, truncated.
pub fn format_elapsed(elapsed: Duration) -> String {
    let centis = elapsed.as_millis() / 10;
    let (minutes, rest) = (centis / 6000, centis % 6000);
    format!("{minutes}m {}.{:02}s", rest / 100, rest % 100)
}

/// Writes decrypted entries below `dir`, creating directories as needed.
pub fn extract_entries(dir: &Path, entries: &[ExtractedEntry]) -> Result<(), ReportError> {
    for entry in entries {
        let path = dir.join(&entry.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ReportError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &entry.data).map_err(|source| ReportError {
            path: path.clone(),
            source,
        })?;
        debug!("Extracted {} ({} bytes)", path.display(), entry.data.len());
    }
    Ok(())
}
