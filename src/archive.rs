//! The zip-backed password oracle.
//!
//! The archive bytes are read once and shared between workers behind an
//! `Arc`. Every worker parses the central directory into its own
//! [`ZipArchive`], so verification never takes a lock.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use log::debug;
use zip::result::{InvalidPassword, ZipError};
use zip::ZipArchive;

use crate::error::ArchiveError;
use crate::oracle::{ExtractedEntry, OracleFactory, PasswordOracle, Verdict};

/// An encrypted zip archive held in memory.
#[derive(Debug, Clone)]
pub struct Archive {
    bytes: Arc<[u8]>,
    /// File entries to extract, encrypted ones first.
    entries: Arc<[usize]>,
    encrypted: usize,
}

impl Archive {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ArchiveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let bytes: Arc<[u8]> = Arc::from(bytes);
        let mut archive = ZipArchive::new(Cursor::new(bytes.clone()))?;
        if archive.len() == 0 {
            return Err(ArchiveError::Empty);
        }

        let mut encrypted = Vec::new();
        let mut plain = Vec::new();
        for index in 0..archive.len() {
            if archive.by_index_raw(index)?.is_dir() {
                continue;
            }
            match archive.by_index(index) {
                Ok(_) => plain.push(index),
                Err(ZipError::UnsupportedArchive(msg)) if msg == ZipError::PASSWORD_REQUIRED => {
                    encrypted.push(index)
                }
                Err(e) => return Err(e.into()),
            }
        }
        if encrypted.is_empty() {
            return Err(ArchiveError::NotEncrypted);
        }

        debug!(
            "Loaded archive: {} bytes, {} encrypted and {} plain entries",
            bytes.len(),
            encrypted.len(),
            plain.len()
        );
        let count = encrypted.len();
        encrypted.extend(plain);
        Ok(Self {
            bytes,
            entries: encrypted.into(),
            encrypted: count,
        })
    }

    /// Size of the archive file in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Number of encrypted file entries.
    pub fn encrypted_entries(&self) -> usize {
        self.encrypted
    }
}

impl OracleFactory for Archive {
    type Oracle = ZipVerifier;

    fn instantiate(&self) -> Result<ZipVerifier, ArchiveError> {
        Ok(ZipVerifier {
            archive: ZipArchive::new(Cursor::new(self.bytes.clone()))?,
            entries: self.entries.clone(),
            read_buffer: Vec::new(),
        })
    }
}

/// One worker's view of an [`Archive`].
pub struct ZipVerifier {
    archive: ZipArchive<Cursor<Arc<[u8]>>>,
    entries: Arc<[usize]>,
    /// Grows with the data actually decrypted, never with the size an entry
    /// header declares.
    read_buffer: Vec<u8>,
}

impl PasswordOracle for ZipVerifier {
    /// The header check of the first encrypted entry rejects almost every
    /// wrong password. A candidate that gets past it must decrypt every entry
    /// with a matching CRC before it counts as valid.
    fn verify(&mut self, candidate: &str) -> Result<Verdict, ArchiveError> {
        let mut extracted = Vec::new();
        for &index in self.entries.iter() {
            let mut file = match self.archive.by_index_decrypt(index, candidate.as_bytes())? {
                Ok(file) => file,
                Err(InvalidPassword) => return Ok(Verdict::Invalid),
            };

            self.read_buffer.clear();
            if let Err(e) = file.read_to_end(&mut self.read_buffer) {
                // password collision
                debug!("Potential password {candidate} failed on {}: {e}", file.name());
                return Ok(Verdict::Invalid);
            }

            let name = file
                .enclosed_name()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| file.mangled_name());
            extracted.push(ExtractedEntry {
                name,
                data: self.read_buffer.clone(),
            });
        }
        Ok(Verdict::Valid(extracted))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::FileOptions;
    use zip::ZipWriter;

    use super::*;

    fn plain_archive() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("readme.txt", FileOptions::default())
            .unwrap();
        writer.write_all(b"not a secret").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn rejects_garbage() {
        let err = Archive::from_bytes(b"definitely not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }

    #[test]
    fn rejects_unencrypted_archive() {
        let err = Archive::from_bytes(plain_archive()).unwrap_err();
        assert!(matches!(err, ArchiveError::NotEncrypted));
    }

    #[test]
    fn rejects_empty_archive() {
        let bytes = ZipWriter::new(Cursor::new(Vec::new()))
            .finish()
            .unwrap()
            .into_inner();
        let err = Archive::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::Empty));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Archive::load(dir.path().join("missing.zip")).unwrap_err();
        assert!(matches!(err, ArchiveError::Read { .. }));
    }
}
