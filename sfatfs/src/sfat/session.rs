// SPDX-License-Identifier: MIT

use crate::core::errors::{SfatSessionError, SfatSessionResult};
use crate::ensure;
use crate::sfat::{cluster::WriteOutcome, directory::RootDirectory, meta::ClusterIdx};

/// Lifecycle of a [`FileHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Created or reopened, nothing written through it yet.
    Open,
    Writable,
    Closed,
    Deleted,
}

/// Validates a file identifier: exactly one non-NUL ASCII character.
pub fn validate_name(name: &str) -> SfatSessionResult<u8> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '\0' => Ok(c as u8),
        _ => Err(SfatSessionError::InvalidFilename),
    }
}

/// Transient handle on one open file.
///
/// Not `Clone`: a handle is owned by the caller that opened it.
#[derive(Debug, PartialEq, Eq)]
pub struct FileHandle {
    name: u8,
    origin: usize,
    position: ClusterIdx,
    active_cluster: ClusterIdx,
    size: usize,
    /// Record generation seen when the handle was issued.
    generation: u32,
    state: HandleState,
}

impl FileHandle {
    pub(crate) fn new(
        name: u8,
        origin: usize,
        position: ClusterIdx,
        active_cluster: ClusterIdx,
        size: usize,
        generation: u32,
    ) -> Self {
        Self {
            name,
            origin,
            position,
            active_cluster,
            size,
            generation,
            state: HandleState::Open,
        }
    }

    pub fn name(&self) -> char {
        self.name as char
    }

    /// Directory record index.
    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// First cluster of the chain.
    #[inline]
    pub fn position(&self) -> ClusterIdx {
        self.position
    }

    /// Current chain tail.
    #[inline]
    pub fn active_cluster(&self) -> ClusterIdx {
        self.active_cluster
    }

    /// Chain length in clusters.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn ensure_usable(&self) -> SfatSessionResult {
        ensure!(
            matches!(self.state, HandleState::Open | HandleState::Writable),
            SfatSessionError::InvalidHandle
        );
        Ok(())
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Checks the handle is live and still matches its directory record.
    ///
    /// `generation` is the record's current generation; it changes every time
    /// the record is released.
    pub fn verify<B: AsRef<[u8]>>(
        &self,
        directory: &RootDirectory<'_, B>,
        generation: u32,
    ) -> SfatSessionResult {
        self.ensure_usable()?;
        ensure!(
            generation == self.generation,
            SfatSessionError::InvalidHandle
        );
        let record = directory
            .record(self.origin)
            .map_err(|_| SfatSessionError::InvalidHandle)?;
        ensure!(
            record.name == self.name && record.start_cluster == self.position,
            SfatSessionError::InvalidHandle
        );
        Ok(())
    }

    pub(crate) fn record_write(&mut self, outcome: &WriteOutcome) {
        self.active_cluster = outcome.tail;
        self.size = outcome.clusters;
        self.state = HandleState::Writable;
    }

    pub(crate) fn close(&mut self) -> SfatSessionResult {
        self.ensure_usable()?;
        self.state = HandleState::Closed;
        Ok(())
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.state = HandleState::Deleted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfat::{config::SfatConfig, directory::DirRecord, meta::SfatMeta};

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("a"), Ok(b'a'));
        assert_eq!(validate_name("Z"), Ok(b'Z'));
        assert_eq!(validate_name(""), Err(SfatSessionError::InvalidFilename));
        assert_eq!(validate_name("ab"), Err(SfatSessionError::InvalidFilename));
        assert_eq!(validate_name("\0"), Err(SfatSessionError::InvalidFilename));
        assert_eq!(validate_name("é"), Err(SfatSessionError::InvalidFilename));
    }

    #[test]
    fn test_state_machine() {
        let mut fh = FileHandle::new(b'a', 0, 3, 3, 1, 0);
        assert_eq!(fh.state(), HandleState::Open);

        fh.record_write(&WriteOutcome {
            written: 120,
            tail: 4,
            clusters: 2,
        });
        assert_eq!(fh.state(), HandleState::Writable);
        assert_eq!((fh.active_cluster(), fh.size()), (4, 2));

        fh.close().unwrap();
        assert_eq!(fh.close(), Err(SfatSessionError::InvalidHandle));
        assert_eq!(fh.ensure_usable(), Err(SfatSessionError::InvalidHandle));

        let mut fh = FileHandle::new(b'b', 1, 4, 4, 1, 0);
        fh.mark_deleted();
        assert_eq!(fh.ensure_usable(), Err(SfatSessionError::InvalidHandle));
    }

    #[test]
    fn test_verify_against_directory() {
        let meta = SfatMeta::new(&SfatConfig::default()).unwrap();
        let mut raw = vec![0u8; 100];
        let mut dir = RootDirectory::new(&meta, raw.as_mut_slice());
        dir.write_record(0, DirRecord::new(b'a', 3, 1)).unwrap();

        let fh = FileHandle::new(b'a', 0, 3, 3, 1, 0);
        fh.verify(&dir, 0).unwrap();
        assert_eq!(fh.verify(&dir, 1), Err(SfatSessionError::InvalidHandle));

        dir.write_record(0, DirRecord::new(b'a', 5, 1)).unwrap();
        assert_eq!(fh.verify(&dir, 0), Err(SfatSessionError::InvalidHandle));

        let stray = FileHandle::new(b'a', 90, 3, 3, 1, 0);
        assert_eq!(stray.verify(&dir, 0), Err(SfatSessionError::InvalidHandle));
    }
}
