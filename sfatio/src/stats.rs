// SPDX-License-Identifier: MIT

use crate::{VolumeIO, VolumeIOResult, VolumeIOSetLen};

/// Simple counters, no_std friendly.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub read_bytes: u64,
    pub writes: u64,
    pub write_bytes: u64,
    pub flushes: u64,
    pub resizes: u64,

    pub max_read: u64,
    pub max_write: u64,
}

impl IoStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = IoStats::default();
    }
}

/// Transparent instrumentation wrapper.
///
/// Lets tests observe that a volume operation performs whole-image reads and writes.
pub struct IOCounter<'a, IO: VolumeIO + ?Sized> {
    inner: &'a mut IO,
    pub stats: IoStats,
}

impl<'a, IO: VolumeIO + ?Sized> IOCounter<'a, IO> {
    #[inline]
    pub fn new(inner: &'a mut IO) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> IoStats {
        self.stats
    }

    #[inline]
    pub fn into_inner(self) -> &'a mut IO {
        self.inner
    }
}

impl<'a, IO: VolumeIO + ?Sized> VolumeIO for IOCounter<'a, IO> {
    #[inline]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> VolumeIOResult {
        self.stats.writes += 1;
        self.stats.write_bytes += data.len() as u64;
        self.stats.max_write = self.stats.max_write.max(data.len() as u64);
        self.inner.write_at(offset, data)
    }

    #[inline]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> VolumeIOResult {
        self.stats.reads += 1;
        self.stats.read_bytes += buf.len() as u64;
        self.stats.max_read = self.stats.max_read.max(buf.len() as u64);
        self.inner.read_at(offset, buf)
    }

    #[inline]
    fn flush(&mut self) -> VolumeIOResult {
        self.stats.flushes += 1;
        self.inner.flush()
    }
}

impl<'a, IO: VolumeIOSetLen + ?Sized> VolumeIOSetLen for IOCounter<'a, IO> {
    #[inline]
    fn set_len(&mut self, len: u64) -> VolumeIOResult {
        self.stats.resizes += 1;
        self.inner.set_len(len)
    }

    #[inline]
    fn stored_len(&mut self) -> VolumeIOResult<u64> {
        self.inner.stored_len()
    }
}
