use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which of the three files taking part in a merge or split an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Jpt,
    Jpeg,
    Png,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpt => "JPT",
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        })
    }
}

/// Coarse classification of every failure the crate reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input: missing source, unwritable destination, oversized payload
    Input,
    /// Bytes that do not form a valid JPT container
    Format,
    /// Read or write failure after the paths were accepted
    Io,
}

/// Decode validation failures, in the order they are checked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("truncated header: need at least {needed} bytes, found {found}")]
    TruncatedHeader { needed: u64, found: u64 },

    #[error("bad magic: expected \"JPT\", found {found}")]
    BadMagic { found: String },

    #[error("unsupported JPT version {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("{role} payload length {declared} overruns the container ({available} bytes remain)")]
    LengthOverrun {
        role: FileRole,
        declared: u64,
        available: u64,
    },

    #[error("{0} trailing bytes after the PNG payload")]
    TrailingBytes(u64),
}

#[derive(Error, Debug)]
pub enum JptError {
    #[error("{role} file '{}': {reason}", path.display())]
    Input {
        role: FileRole,
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid JPT container: {0}")]
    Format(#[from] FormatError),

    #[error("IO error on {role} file '{}': {source}", path.display())]
    Io {
        role: FileRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{role} payload is {len} bytes, exceeding the {max} byte limit of the chosen format")]
    PayloadTooLarge { role: FileRole, len: u64, max: u64 },

    #[error("Unsupported format version: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JptError {
    pub fn input(role: FileRole, path: &Path, reason: impl Into<String>) -> Self {
        Self::Input {
            role,
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(role: FileRole, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            role,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input { .. } | Self::PayloadTooLarge { .. } | Self::UnsupportedFormat(_) => {
                ErrorKind::Input
            }
            Self::Format(_) => ErrorKind::Format,
            Self::Io { .. } | Self::Json(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, JptError>;
