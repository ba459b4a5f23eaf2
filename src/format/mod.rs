//! Container format handling.
//!
//! Provides version-aware parsing and serialization of the encrypted
//! artifact. Every structural check happens here, before any key is
//! derived, so a damaged file is reported as damaged and never as a
//! wrong password.

use std::fmt;

use serde::Serialize;

use crate::crypto::{IV_LEN, PBKDF2_ITERATIONS, SALT_LEN, TAG_LEN};
use crate::error::{Corruption, Error, Result};

pub mod v1;

/// Magic bytes identifying a vaultkey container ("VK").
pub const MAGIC: &[u8; MAGIC_LEN] = b"VK";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 2;
/// Length of version field.
pub const VER_LEN: usize = 1;
/// Latest format version
pub const CURRENT_VERSION: u8 = v1::VERSION_V1;

/// A decoded container. The sealed fields borrow from the input buffer.
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    version: u8,
    salt: [u8; SALT_LEN],
    iv: [u8; IV_LEN],
    encrypted_name: &'a [u8],
    encrypted_data: &'a [u8],
}

impl<'a> Container<'a> {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// AES-GCM ciphertext-with-tag of the original filename.
    pub fn encrypted_name(&self) -> &'a [u8] {
        self.encrypted_name
    }

    /// AES-GCM ciphertext-with-tag of the file contents.
    pub fn encrypted_data(&self) -> &'a [u8] {
        self.encrypted_data
    }

    pub fn info(&self) -> ContainerInfo {
        ContainerInfo {
            version: self.version(),
            cipher: "aes-256-gcm",
            kdf: "pbkdf2-hmac-sha256",
            iterations: PBKDF2_ITERATIONS,
            salt: hex::encode(self.salt),
            iv: hex::encode(self.iv),
            encrypted_name_len: self.encrypted_name.len(),
            encrypted_data_len: self.encrypted_data.len(),
            plaintext_len: self.encrypted_data.len().saturating_sub(TAG_LEN),
        }
    }
}

/// Non-secret description of a container, for tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub version: u8,
    pub cipher: &'static str,
    pub kdf: &'static str,
    pub iterations: u32,
    pub salt: String,
    pub iv: String,
    pub encrypted_name_len: usize,
    pub encrypted_data_len: usize,
    pub plaintext_len: usize,
}

impl fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format version : {}", self.version)?;
        writeln!(f, "Cipher         : {}", self.cipher)?;
        writeln!(f, "KDF            : {} ({} iterations)", self.kdf, self.iterations)?;
        writeln!(f, "Salt           : {}", self.salt)?;
        writeln!(f, "IV             : {}", self.iv)?;
        writeln!(f, "Sealed name    : {} bytes", self.encrypted_name_len)?;
        write!(
            f,
            "Sealed data    : {} bytes ({})",
            self.encrypted_data_len,
            crate::format_file_size(self.plaintext_len as u64)
        )
    }
}

/// Parses a container.
///
/// Checks, in order: minimum header length, magic, version, then hands
/// off to the version parser.
///
/// # Errors
///
/// Returns [`Error::CorruptedFormat`] if the buffer is too short, the magic
/// bytes are wrong or the layout is inconsistent, and
/// [`Error::UnsupportedVersion`] for an unknown version byte.
pub fn decode(data: &[u8]) -> Result<Container<'_>> {
    if data.len() < v1::HEADER_LEN {
        return Err(Corruption::TooShort.into());
    }

    if &data[..MAGIC_LEN] != MAGIC {
        return Err(Corruption::BadMagic.into());
    }

    match data[MAGIC_LEN] {
        v1::VERSION_V1 => v1::decode(data),
        found => Err(Error::UnsupportedVersion {
            found,
            expected: CURRENT_VERSION,
        }),
    }
}

/// Serializes the sealed parts into a container of the current version.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the encrypted filename length cannot
/// be represented in a valid container.
pub fn encode(
    salt: &[u8; SALT_LEN],
    iv: &[u8; IV_LEN],
    encrypted_name: &[u8],
    encrypted_data: &[u8],
) -> Result<Vec<u8>> {
    v1::encode(salt, iv, encrypted_name, encrypted_data)
}
