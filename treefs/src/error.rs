use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Not a file: {0}")]
    NotAFile(String),
    #[error("Name collision: {0}")]
    NameCollision(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("IO unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt state: {0}")]
    Codec(#[from] CodecError),
}

impl VfsError {
    pub fn code(&self) -> &str {
        match self {
            Self::NotFound(_) => "VFS_NOT_FOUND",
            Self::NotADirectory(_) => "VFS_NOT_DIRECTORY",
            Self::NotAFile(_) => "VFS_NOT_FILE",
            Self::NameCollision(_) => "VFS_NAME_COLLISION",
            Self::InvalidName(_) => "VFS_INVALID_NAME",
            Self::InvalidOperation(_) => "VFS_INVALID_OPERATION",
            Self::Io(_) => "VFS_IO_UNAVAILABLE",
            Self::Codec(_) => "VFS_CORRUPT_STATE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
