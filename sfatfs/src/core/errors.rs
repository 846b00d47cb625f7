// SPDX-License-Identifier: MIT

use std::fmt;

pub use sfatio::errors::*;

/// Coarse classification of every failure the volume store can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DiscFull,
    FileTableFull,
    InvalidFilename,
    InvalidHandle,
    VolumeIOFailure,
    NameInUse,
    NotFound,
    OutOfRange,
    Corrupted,
    InvalidConfig,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfatConfigError {
    Invalid(&'static str),
    Other(&'static str),
}

impl SfatConfigError {
    pub fn msg(&self) -> &'static str {
        match self {
            SfatConfigError::Invalid(msg) => msg,
            SfatConfigError::Other(msg) => msg,
        }
    }
}

impl fmt::Display for SfatConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid configuration: {}", self.msg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfatAllocatorError {
    /// No free data cluster left.
    DiscFull,
    /// Free clusters may exist but the table has no representable slot for them.
    FileTableFull,
    InvalidCluster(u8),
    CorruptChain(u8),
    Other(&'static str),
}

impl SfatAllocatorError {
    pub fn msg(&self) -> &'static str {
        match self {
            SfatAllocatorError::DiscFull => "Disc full",
            SfatAllocatorError::FileTableFull => "File table full",
            SfatAllocatorError::InvalidCluster(_) => "Invalid cluster in allocation table",
            SfatAllocatorError::CorruptChain(_) => "Corrupt cluster chain",
            SfatAllocatorError::Other(msg) => msg,
        }
    }
}

impl fmt::Display for SfatAllocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        match self {
            SfatAllocatorError::InvalidCluster(c) | SfatAllocatorError::CorruptChain(c) => {
                write!(f, " (cluster: {c})")
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfatDirectoryError {
    /// Every directory record is in use.
    DiscFull,
    NameInUse(u8),
    NotFound(u8),
    InvalidRecord(usize),
    Other(&'static str),
}

impl SfatDirectoryError {
    pub fn msg(&self) -> &'static str {
        match self {
            SfatDirectoryError::DiscFull => "Disc full: no free directory record",
            SfatDirectoryError::NameInUse(_) => "File name already in use",
            SfatDirectoryError::NotFound(_) => "File not found",
            SfatDirectoryError::InvalidRecord(_) => "Invalid directory record",
            SfatDirectoryError::Other(msg) => msg,
        }
    }
}

impl fmt::Display for SfatDirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        match self {
            SfatDirectoryError::NameInUse(n) | SfatDirectoryError::NotFound(n) => {
                write!(f, " ({:?})", *n as char)
            }
            SfatDirectoryError::InvalidRecord(i) => write!(f, " (record: {i})"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfatSessionError {
    /// Identifier is not exactly one non-NUL ASCII character.
    InvalidFilename,
    /// Handle was closed, deleted, or no longer matches its directory record.
    InvalidHandle,
    Other(&'static str),
}

impl SfatSessionError {
    pub fn msg(&self) -> &'static str {
        match self {
            SfatSessionError::InvalidFilename => "Wrong filename: length must be 1",
            SfatSessionError::InvalidHandle => "Invalid file handle",
            SfatSessionError::Other(msg) => msg,
        }
    }
}

impl fmt::Display for SfatSessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfatClusterError {
    Allocator(SfatAllocatorError),
    Directory(SfatDirectoryError),
    OutOfRange(usize),
    Other(&'static str),
}

impl SfatClusterError {
    pub fn msg(&self) -> &'static str {
        match self {
            SfatClusterError::Allocator(_) => "Allocator error",
            SfatClusterError::Directory(_) => "Directory error",
            SfatClusterError::OutOfRange(_) => "Cluster index out of range",
            SfatClusterError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<SfatError> {
        match self {
            SfatClusterError::Allocator(e) => Some(SfatError::Allocator(*e)),
            SfatClusterError::Directory(e) => Some(SfatError::Directory(*e)),
            _ => None,
        }
    }
}

impl fmt::Display for SfatClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        if let SfatClusterError::OutOfRange(i) = self {
            write!(f, " (index: {i})")?;
        }
        let mut current = self.source();
        while let Some(src) = current {
            write!(f, "\n  caused by: {}", src.msg())?;
            current = src.source();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfatCheckerError {
    IO(VolumeIOError),
    Invalid(&'static str),
    Other(&'static str),
}

impl SfatCheckerError {
    pub fn msg(&self) -> &'static str {
        match self {
            SfatCheckerError::IO(_) => "IO error",
            SfatCheckerError::Invalid(msg) => msg,
            SfatCheckerError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<SfatError> {
        match self {
            SfatCheckerError::IO(e) => Some(SfatError::IO(*e)),
            _ => None,
        }
    }
}

impl fmt::Display for SfatCheckerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        let mut current = self.source();
        while let Some(src) = current {
            write!(f, "\n  caused by: {}", src.msg())?;
            current = src.source();
        }
        Ok(())
    }
}

/// Top-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfatError {
    IO(VolumeIOError),
    Config(SfatConfigError),
    Allocator(SfatAllocatorError),
    Directory(SfatDirectoryError),
    Session(SfatSessionError),
    Cluster(SfatClusterError),
    Checker(SfatCheckerError),
    Other(&'static str),
}

impl fmt::Display for SfatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        let mut current = self.source();
        while let Some(src) = current {
            write!(f, "\n  caused by: {}", src.msg())?;
            current = src.source();
        }
        Ok(())
    }
}

impl std::error::Error for SfatError {}

impl SfatError {
    pub fn msg(&self) -> &'static str {
        match self {
            SfatError::IO(e) => e.msg(),
            SfatError::Config(e) => e.msg(),
            SfatError::Allocator(e) => e.msg(),
            SfatError::Directory(e) => e.msg(),
            SfatError::Session(e) => e.msg(),
            SfatError::Cluster(e) => e.msg(),
            SfatError::Checker(e) => e.msg(),
            SfatError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<SfatError> {
        match self {
            SfatError::Cluster(e) => e.source(),
            SfatError::Checker(e) => e.source(),
            _ => None,
        }
    }

    /// Innermost classification, looking through wrapping layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SfatError::IO(_) => ErrorKind::VolumeIOFailure,
            SfatError::Config(_) => ErrorKind::InvalidConfig,
            SfatError::Allocator(e) => match e {
                SfatAllocatorError::DiscFull => ErrorKind::DiscFull,
                SfatAllocatorError::FileTableFull => ErrorKind::FileTableFull,
                SfatAllocatorError::InvalidCluster(_) | SfatAllocatorError::CorruptChain(_) => {
                    ErrorKind::Corrupted
                }
                SfatAllocatorError::Other(_) => ErrorKind::Other,
            },
            SfatError::Directory(e) => match e {
                SfatDirectoryError::DiscFull => ErrorKind::DiscFull,
                SfatDirectoryError::NameInUse(_) => ErrorKind::NameInUse,
                SfatDirectoryError::NotFound(_) => ErrorKind::NotFound,
                SfatDirectoryError::InvalidRecord(_) => ErrorKind::Corrupted,
                SfatDirectoryError::Other(_) => ErrorKind::Other,
            },
            SfatError::Session(e) => match e {
                SfatSessionError::InvalidFilename => ErrorKind::InvalidFilename,
                SfatSessionError::InvalidHandle => ErrorKind::InvalidHandle,
                SfatSessionError::Other(_) => ErrorKind::Other,
            },
            SfatError::Cluster(SfatClusterError::OutOfRange(_)) => ErrorKind::OutOfRange,
            SfatError::Cluster(SfatClusterError::Other(_)) => ErrorKind::Other,
            SfatError::Cluster(_) | SfatError::Checker(_) => {
                self.source().map_or(ErrorKind::Other, |src| src.kind())
            }
            SfatError::Other(_) => ErrorKind::Other,
        }
    }
}

// === type Sfat*Result ===

pub type SfatResult<T = ()> = Result<T, SfatError>;
pub type SfatConfigResult<T = ()> = Result<T, SfatConfigError>;
pub type SfatAllocatorResult<T = ()> = Result<T, SfatAllocatorError>;
pub type SfatDirectoryResult<T = ()> = Result<T, SfatDirectoryError>;
pub type SfatSessionResult<T = ()> = Result<T, SfatSessionError>;
pub type SfatClusterResult<T = ()> = Result<T, SfatClusterError>;
pub type SfatCheckerResult<T = ()> = Result<T, SfatCheckerError>;

crate::fs_error_wiring! {
    top => SfatError {
        VolumeIOError      : IO,
        SfatConfigError    : Config,
        SfatAllocatorError : Allocator,
        SfatDirectoryError : Directory,
        SfatSessionError   : Session,
        SfatClusterError   : Cluster,
        SfatCheckerError   : Checker,
    },
    str_into => [
        SfatConfigError,
        SfatAllocatorError,
        SfatDirectoryError,
        SfatSessionError,
        SfatClusterError,
        SfatCheckerError,
    ],
    sub => {
        VolumeIOError      => [ SfatCheckerError::IO ],
        SfatAllocatorError => [ SfatClusterError::Allocator ],
        SfatDirectoryError => [ SfatClusterError::Directory ],
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_display() {
        let top: SfatError = SfatClusterError::from(SfatAllocatorError::DiscFull).into();
        let text = top.to_string();

        assert!(text.starts_with("Allocator error"));
        assert!(text.contains("caused by: Disc full"));
    }

    #[test]
    fn test_kind_looks_through_layers() {
        let wrapped: SfatError = SfatClusterError::Allocator(SfatAllocatorError::FileTableFull).into();
        assert_eq!(wrapped.kind(), ErrorKind::FileTableFull);

        let dir: SfatError = SfatDirectoryError::DiscFull.into();
        assert_eq!(dir.kind(), ErrorKind::DiscFull);

        let io: SfatError = VolumeIOError::OutOfBounds.into();
        assert_eq!(io.kind(), ErrorKind::VolumeIOFailure);

        let session: SfatError = SfatSessionError::InvalidHandle.into();
        assert_eq!(session.kind(), ErrorKind::InvalidHandle);
    }
}
