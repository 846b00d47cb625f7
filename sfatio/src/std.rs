// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{Error, ErrorKind, Read, Seek, SeekFrom, Write};

use crate::{VolumeIO, VolumeIOError, VolumeIOResult, VolumeIOSetLen};

/// `VolumeIO` over any `Read + Write + Seek` (files, cursors).
///
/// Owns `T`; pass `&mut File` to keep ownership on the caller side.
#[derive(Debug)]
pub struct StdVolumeIO<T: Read + Write + Seek> {
    io: T,
}

impl<T: Read + Write + Seek> StdVolumeIO<T> {
    #[inline]
    pub fn new(io: T) -> Self {
        Self { io }
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: Read + Write + Seek> VolumeIO for StdVolumeIO<T> {
    fn write_at(&mut self, offset: u64, data: &[u8]) -> VolumeIOResult {
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.write_all(data)?;
        Ok(())
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> VolumeIOResult {
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.read_exact(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> VolumeIOResult {
        self.io.flush()?;
        Ok(())
    }
}

impl VolumeIOSetLen for StdVolumeIO<File> {
    fn set_len(&mut self, len: u64) -> VolumeIOResult {
        self.io.set_len(len)?;
        self.flush()
    }

    fn stored_len(&mut self) -> VolumeIOResult<u64> {
        Ok(self.io.metadata()?.len())
    }
}

impl VolumeIOSetLen for StdVolumeIO<&mut File> {
    fn set_len(&mut self, len: u64) -> VolumeIOResult {
        self.io.set_len(len)?;
        self.flush()
    }

    fn stored_len(&mut self) -> VolumeIOResult<u64> {
        Ok(self.io.metadata()?.len())
    }
}

impl From<Error> for VolumeIOError {
    #[cold]
    #[inline(never)]
    fn from(e: Error) -> Self {
        if e.kind() == ErrorKind::UnexpectedEof {
            return VolumeIOError::OutOfBounds;
        }
        // Leak the string to produce a 'static str. Acceptable for error mapping.
        let leaked_str: &'static str = Box::leak(e.to_string().into_boxed_str());
        VolumeIOError::Other(leaked_str)
    }
}
