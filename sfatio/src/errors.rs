// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for VolumeIO operations.
pub type VolumeIOResult<T = ()> = core::result::Result<T, VolumeIOError>;

/// Error type for VolumeIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeIOError {
    Other(&'static str),
    OutOfBounds,
}

impl VolumeIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            VolumeIOError::Other(msg) => msg,
            VolumeIOError::OutOfBounds => "Out of bounds",
        }
    }
}

impl From<&'static str> for VolumeIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        VolumeIOError::Other(msg)
    }
}

impl fmt::Display for VolumeIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VolumeIOError {}
