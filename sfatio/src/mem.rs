// SPDX-License-Identifier: MIT

use crate::{VolumeIO, VolumeIOError, VolumeIOResult, VolumeIOSetLen};

/// In-memory implementation of `VolumeIO`.
///
/// Useful for tests, benches and RAM-backed volumes. The logical length can
/// shrink below the borrowed buffer through `set_len`, never grow past it.
#[derive(Debug)]
pub struct MemVolumeIO<'a> {
    buffer: &'a mut [u8],
    logical_len: usize,
}

impl<'a> MemVolumeIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        let logical_len = buffer.len();
        Self {
            buffer,
            logical_len,
        }
    }

    /// Starts with a logical length of zero, like a freshly created file.
    #[inline]
    pub fn empty(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            logical_len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.logical_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.logical_len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.logical_len]
    }

    #[inline]
    fn check_bounds(&self, offset: u64, len: usize) -> VolumeIOResult {
        let end = offset
            .checked_add(len as u64)
            .ok_or(VolumeIOError::OutOfBounds)?;
        if end > self.logical_len as u64 {
            return Err(VolumeIOError::OutOfBounds);
        }
        Ok(())
    }
}

impl<'a> VolumeIO for MemVolumeIO<'a> {
    #[inline(always)]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> VolumeIOResult {
        self.check_bounds(offset, data.len())?;
        let start = offset as usize;
        self.buffer[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> VolumeIOResult {
        self.check_bounds(offset, buf.len())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.buffer[start..start + buf.len()]);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> VolumeIOResult {
        Ok(())
    }
}

impl<'a> VolumeIOSetLen for MemVolumeIO<'a> {
    fn set_len(&mut self, new_len: u64) -> VolumeIOResult {
        if new_len > self.buffer.len() as u64 {
            return Err(VolumeIOError::OutOfBounds);
        }
        self.logical_len = new_len as usize;
        Ok(())
    }

    #[inline]
    fn stored_len(&mut self) -> VolumeIOResult<u64> {
        Ok(self.logical_len as u64)
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_rw() {
        let mut buf = [0u8; 256];
        let mut io = MemVolumeIO::new(&mut buf);
        io.write_at(10, &[1, 2, 3, 4]).unwrap();

        let mut output = [0u8; 4];
        io.read_at(10, &mut output).unwrap();
        assert_eq!(output, [1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_rejects_reads_until_sized() {
        let mut buf = [0u8; 64];
        let mut io = MemVolumeIO::empty(&mut buf);
        let mut out = [0u8; 8];
        assert_eq!(io.read_at(0, &mut out), Err(VolumeIOError::OutOfBounds));

        io.set_len(64).unwrap();
        io.read_at(0, &mut out).unwrap();
        assert_eq!(io.len(), 64);
    }

    #[test]
    fn test_set_len_safe() {
        let mut buf = [0u8; 512];
        let mut io = MemVolumeIO::new(&mut buf);
        io.set_len(512).unwrap();
        assert!(io.set_len(1024).is_err());
        io.set_len(300).unwrap();
        assert_eq!(io.stored_len().unwrap(), 300);
    }

    #[test]
    fn test_zero_fill_and_read_to_vec() {
        let mut buf = [0xFF; 1200];
        let mut io = MemVolumeIO::new(&mut buf);

        io.zero_fill(10, 1100).unwrap();

        let out = io.read_to_vec(10, 1100).unwrap();
        assert!(out.iter().all(|&b| b == 0));
        assert_eq!(io.as_slice()[9], 0xFF);
        assert_eq!(io.as_slice()[1110], 0xFF);
    }
}
