use thiserror::Error;

/// Closed set of failure classes a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input exceeds the configured maximum size.
    SizeLimit,
    /// The container layout is structurally invalid.
    CorruptedFormat,
    /// The header is well formed but its version byte is unknown.
    UnsupportedVersion,
    /// An authentication tag did not verify. Wrong password and tampering
    /// are indistinguishable here.
    PasswordOrIntegrity,
    /// Encrypt preconditions were not met (empty password, unusable filename).
    InvalidInput,
    /// The OS random source or the cipher itself failed.
    Platform,
}

/// Why a buffer was rejected as a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    #[error("file is too small to be a valid vaultkey file")]
    TooShort,
    #[error("not a vaultkey encrypted file")]
    BadMagic,
    #[error("invalid filename length {0} in encrypted file")]
    NameLength(u32),
    #[error("file is truncated")]
    Truncated,
    #[error("decrypted filename is not valid UTF-8")]
    FilenameEncoding,
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("file size ({size} bytes) exceeds maximum of {max} bytes")]
    SizeLimit { size: u64, max: u64 },

    #[error("file is corrupted or modified: {0}")]
    CorruptedFormat(Corruption),

    #[error("unsupported file version: {found}, expected version {expected}")]
    UnsupportedVersion { found: u8, expected: u8 },

    #[error("incorrect password or the file was modified")]
    PasswordOrIntegrity,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("platform cryptography failure: {0}")]
    Platform(&'static str),
}

// The reason is rendered in the message, so it is not exposed as a source.
impl From<Corruption> for Error {
    fn from(reason: Corruption) -> Self {
        Error::CorruptedFormat(reason)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SizeLimit { .. } => ErrorKind::SizeLimit,
            Error::CorruptedFormat(_) => ErrorKind::CorruptedFormat,
            Error::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Error::PasswordOrIntegrity => ErrorKind::PasswordOrIntegrity,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Platform(_) => ErrorKind::Platform,
        }
    }

    /// Only a failed authentication can succeed on a second attempt with
    /// another password.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::PasswordOrIntegrity
    }
}

pub type Result<T> = std::result::Result<T, Error>;
