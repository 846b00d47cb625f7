// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::{vec, vec::Vec};

// Core modules
pub mod errors;
pub mod stats;

// Backend modules
#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod std;

// Prelude re-exports (central entrypoint)
pub mod prelude {
    pub use super::VolumeIO;
    pub use super::VolumeIOExt;
    pub use super::VolumeIOSetLen;
    pub use super::errors::*;
    pub use super::stats::*;

    #[cfg(feature = "mem")]
    pub use super::mem::MemVolumeIO;

    #[cfg(feature = "std")]
    pub use super::std::StdVolumeIO;
}

use errors::*;

/// Size of the stack buffer used by zero fills.
pub const ZERO_BUF_SIZE: usize = 512;

/// Byte-addressed volume backend.
///
/// A volume is a flat blob of bytes; implementations may target RAM or files.
pub trait VolumeIO {
    /// Writes `data` at `offset` (absolute).
    fn write_at(&mut self, offset: u64, data: &[u8]) -> VolumeIOResult;

    /// Reads `buf.len()` bytes into `buf` from `offset` (absolute).
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> VolumeIOResult;

    /// Flushes any buffered data (may be a no-op).
    fn flush(&mut self) -> VolumeIOResult;
}

/// Extension helpers for VolumeIO.
pub trait VolumeIOExt: VolumeIO {
    /// Fills a region with zeroes.
    fn zero_fill(&mut self, offset: u64, len: usize) -> VolumeIOResult {
        const ZERO_BUF: [u8; ZERO_BUF_SIZE] = [0u8; ZERO_BUF_SIZE];
        let mut remaining = len;
        let mut off = offset;
        while remaining > 0 {
            let chunk = remaining.min(ZERO_BUF.len());
            self.write_at(off, &ZERO_BUF[..chunk])?;
            off += chunk as u64;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Reads `len` bytes at `offset` into a fresh buffer, in a single `read_at` call.
    #[cfg(feature = "alloc")]
    fn read_to_vec(&mut self, offset: u64, len: usize) -> VolumeIOResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_at(offset, &mut buf)?;
        Ok(buf)
    }
}

impl<T: VolumeIO + ?Sized> VolumeIOExt for T {}

/// Resizable backends.
pub trait VolumeIOSetLen: VolumeIO {
    /// Sets the length of the storage.
    fn set_len(&mut self, len: u64) -> VolumeIOResult;

    /// Current length of the storage in bytes.
    fn stored_len(&mut self) -> VolumeIOResult<u64>;
}

impl<T: VolumeIO + ?Sized> VolumeIO for &mut T {
    #[inline]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> VolumeIOResult {
        (**self).write_at(offset, data)
    }

    #[inline]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> VolumeIOResult {
        (**self).read_at(offset, buf)
    }

    #[inline]
    fn flush(&mut self) -> VolumeIOResult {
        (**self).flush()
    }
}

impl<T: VolumeIOSetLen + ?Sized> VolumeIOSetLen for &mut T {
    #[inline]
    fn set_len(&mut self, len: u64) -> VolumeIOResult {
        (**self).set_len(len)
    }

    #[inline]
    fn stored_len(&mut self) -> VolumeIOResult<u64> {
        (**self).stored_len()
    }
}
