//! Builds small ZipCrypto archives. The `zip` writer cannot encrypt, so the
//! traditional PKWARE cipher and the container layout are written by hand.

use std::fs;
use std::path::{Path, PathBuf};

pub struct Entry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    /// `None` stores the entry unencrypted.
    pub password: Option<&'a str>,
}

impl<'a> Entry<'a> {
    pub fn locked(name: &'a str, data: &'a [u8], password: &'a str) -> Self {
        Self {
            name,
            data,
            password: Some(password),
        }
    }

    pub fn plain(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            data,
            password: None,
        }
    }
}

fn crc32_step(crc: u32, byte: u8) -> u32 {
    let mut c = (crc ^ u32::from(byte)) & 0xff;
    for _ in 0..8 {
        c = if c & 1 != 0 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
    }
    c ^ (crc >> 8)
}

fn crc32(data: &[u8]) -> u32 {
    !data.iter().fold(!0u32, |crc, &b| crc32_step(crc, b))
}

struct Keys {
    x: u32,
    y: u32,
    z: u32,
}

impl Keys {
    fn new(password: &[u8]) -> Self {
        let mut keys = Self {
            x: 0x1234_5678,
            y: 0x2345_6789,
            z: 0x3456_7890,
        };
        for &b in password {
            keys.update(b);
        }
        keys
    }

    fn update(&mut self, p: u8) {
        self.x = crc32_step(self.x, p);
        self.y = self
            .y
            .wrapping_add(self.x & 0xff)
            .wrapping_mul(134_775_813)
            .wrapping_add(1);
        self.z = crc32_step(self.z, (self.y >> 24) as u8);
    }

    fn encrypt(&mut self, p: u8) -> u8 {
        let t = (self.z | 2) as u16;
        let c = p ^ (t.wrapping_mul(t ^ 1) >> 8) as u8;
        self.update(p);
        c
    }
}

/// A stored (uncompressed) archive holding `entries`.
pub fn archive_bytes(entries: &[Entry]) -> Vec<u8> {
    const DOS_DATE: u16 = 33; // 1980-01-01

    let mut out = Vec::new();
    let mut central = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let crc = crc32(entry.data);
        let (flags, body) = match entry.password {
            Some(password) => {
                let mut keys = Keys::new(password.as_bytes());
                let mut header: Vec<u8> = (0..11u8)
                    .map(|j| (i as u8).wrapping_mul(31).wrapping_add(j * 7 + 1))
                    .collect();
                header.push((crc >> 24) as u8);
                let body: Vec<u8> = header
                    .iter()
                    .chain(entry.data)
                    .map(|&b| keys.encrypt(b))
                    .collect();
                (1u16, body)
            }
            None => (0u16, entry.data.to_vec()),
        };
        let name = entry.name.as_bytes();
        let offset = out.len() as u32;

        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        for v in [20u16, flags, 0, 0, DOS_DATE] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for v in [crc, body.len() as u32, entry.data.len() as u32] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for v in [name.len() as u16, 0] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(name);
        out.extend_from_slice(&body);

        central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        for v in [20u16, 20, flags, 0, 0, DOS_DATE] {
            central.extend_from_slice(&v.to_le_bytes());
        }
        for v in [crc, body.len() as u32, entry.data.len() as u32] {
            central.extend_from_slice(&v.to_le_bytes());
        }
        for v in [name.len() as u16, 0, 0, 0, 0] {
            central.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0u32, offset] {
            central.extend_from_slice(&v.to_le_bytes());
        }
        central.extend_from_slice(name);
    }

    let central_offset = out.len() as u32;
    out.extend_from_slice(&central);
    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    for v in [0u16, 0, entries.len() as u16, entries.len() as u16] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in [central.len() as u32, central_offset] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

/// Writes the archive to `dir/name` and returns its path.
pub fn write_archive(dir: &Path, name: &str, entries: &[Entry]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, archive_bytes(entries)).unwrap();
    path
}

/// Overwrites the uncompressed size recorded for the first entry, in both the
/// local and the central header, without touching the data.
pub fn declare_size(bytes: &mut [u8], size: u32) {
    let end = bytes.len() - 22;
    let central = u32::from_le_bytes([
        bytes[end + 16],
        bytes[end + 17],
        bytes[end + 18],
        bytes[end + 19],
    ]) as usize;
    bytes[22..26].copy_from_slice(&size.to_le_bytes());
    bytes[central + 24..central + 28].copy_from_slice(&size.to_le_bytes());
}
