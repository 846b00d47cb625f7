// SPDX-License-Identifier: MIT

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::core::errors::{SfatDirectoryError, SfatDirectoryResult};
use crate::ensure;
use crate::sfat::{constant::*, meta::*};

/// On-disk root directory record.
#[repr(C)]
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DirRecord {
    /// Single ASCII character; `0` marks a free record.
    pub name: u8,
    pub start_cluster: u8,
    pub cluster_count: u8,
}

impl DirRecord {
    pub fn new(name: u8, start_cluster: ClusterIdx, cluster_count: u8) -> Self {
        Self {
            name,
            start_cluster,
            cluster_count,
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.name == SFAT_NAME_FREE
    }

    #[inline]
    pub fn name_char(&self) -> char {
        self.name as char
    }
}

/// View over the root directory cluster.
pub struct RootDirectory<'m, B> {
    meta: &'m SfatMeta,
    raw: B,
}

impl<'m, B: AsRef<[u8]>> RootDirectory<'m, B> {
    pub fn new(meta: &'m SfatMeta, raw: B) -> Self {
        Self { meta, raw }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.meta.dir_capacity
    }

    pub fn record(&self, index: usize) -> SfatDirectoryResult<DirRecord> {
        ensure!(
            index < self.capacity(),
            SfatDirectoryError::InvalidRecord(index)
        );
        let offset = index * SFAT_DIR_RECORD_SIZE;
        DirRecord::read_from_bytes(&self.raw.as_ref()[offset..offset + SFAT_DIR_RECORD_SIZE])
            .map_err(|_| SfatDirectoryError::InvalidRecord(index))
    }

    /// Active records with their index.
    pub fn entries(&self) -> impl Iterator<Item = (usize, DirRecord)> + '_ {
        (0..self.capacity())
            .filter_map(|i| self.record(i).ok().map(|r| (i, r)))
            .filter(|(_, r)| !r.is_free())
    }

    pub fn find(&self, name: u8) -> Option<usize> {
        self.entries()
            .find(|(_, r)| r.name == name)
            .map(|(i, _)| i)
    }

    pub fn find_free(&self) -> Option<usize> {
        (0..self.capacity()).find(|&i| self.record(i).is_ok_and(|r| r.is_free()))
    }
}

impl<'m, B: AsRef<[u8]> + AsMut<[u8]>> RootDirectory<'m, B> {
    pub fn write_record(&mut self, index: usize, record: DirRecord) -> SfatDirectoryResult {
        ensure!(
            index < self.capacity(),
            SfatDirectoryError::InvalidRecord(index)
        );
        let offset = index * SFAT_DIR_RECORD_SIZE;
        self.raw.as_mut()[offset..offset + SFAT_DIR_RECORD_SIZE].copy_from_slice(record.as_bytes());
        Ok(())
    }

    /// Claims the first free record for `name` with a `(name, 0, 0)` placeholder.
    pub fn create_record(&mut self, name: u8) -> SfatDirectoryResult<usize> {
        ensure!(
            self.find(name).is_none(),
            SfatDirectoryError::NameInUse(name)
        );
        let index = self.find_free().ok_or(SfatDirectoryError::DiscFull)?;
        self.write_record(index, DirRecord::new(name, 0, 0))?;
        Ok(index)
    }

    /// Points the record at its first cluster.
    pub fn bind(&mut self, index: usize, start: ClusterIdx) -> SfatDirectoryResult {
        let mut record = self.active(index)?;
        record.start_cluster = start;
        record.cluster_count = 1;
        self.write_record(index, record)
    }

    pub fn bump_count(&mut self, index: usize) -> SfatDirectoryResult<u8> {
        let mut record = self.active(index)?;
        record.cluster_count = record
            .cluster_count
            .checked_add(1)
            .ok_or(SfatDirectoryError::InvalidRecord(index))?;
        self.write_record(index, record)?;
        Ok(record.cluster_count)
    }

    pub fn clear(&mut self, index: usize) -> SfatDirectoryResult {
        self.write_record(index, DirRecord::default())
    }

    fn active(&self, index: usize) -> SfatDirectoryResult<DirRecord> {
        let record = self.record(index)?;
        ensure!(!record.is_free(), SfatDirectoryError::InvalidRecord(index));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfat::config::SfatConfig;

    fn meta() -> SfatMeta {
        SfatMeta::new(&SfatConfig::default()).unwrap()
    }

    #[test]
    fn test_record_layout() {
        let record = DirRecord::new(b'a', 3, 2);
        assert_eq!(record.as_bytes(), &[b'a', 3, 2]);
        assert_eq!(std::mem::size_of::<DirRecord>(), SFAT_DIR_RECORD_SIZE);
    }

    #[test]
    fn test_create_bind_bump_clear() {
        let meta = meta();
        let mut raw = vec![0u8; 100];
        let mut dir = RootDirectory::new(&meta, raw.as_mut_slice());

        let a = dir.create_record(b'a').unwrap();
        dir.bind(a, 3).unwrap();
        assert_eq!(dir.bump_count(a).unwrap(), 2);
        let b = dir.create_record(b'b').unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(dir.record(b).unwrap(), DirRecord::new(b'b', 0, 0));

        dir.clear(a).unwrap();
        assert_eq!(dir.find(b'a'), None);
        assert_eq!(dir.find(b'b'), Some(1));
        assert_eq!(dir.find_free(), Some(0));
        assert_eq!(&raw[..6], &[0, 0, 0, b'b', 0, 0]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let meta = meta();
        let mut raw = vec![0u8; 100];
        let mut dir = RootDirectory::new(&meta, raw.as_mut_slice());

        dir.create_record(b'x').unwrap();
        assert_eq!(
            dir.create_record(b'x'),
            Err(SfatDirectoryError::NameInUse(b'x'))
        );
    }

    #[test]
    fn test_full_directory() {
        let meta = meta();
        let mut raw = vec![0u8; 100];
        let mut dir = RootDirectory::new(&meta, raw.as_mut_slice());

        for name in (b'A'..).take(meta.dir_capacity) {
            dir.create_record(name).unwrap();
        }
        assert_eq!(dir.entries().count(), 33);
        assert_eq!(dir.create_record(b'z'), Err(SfatDirectoryError::DiscFull));
    }

    #[test]
    fn test_free_record_cannot_be_bound() {
        let meta = meta();
        let mut raw = vec![0u8; 100];
        let mut dir = RootDirectory::new(&meta, raw.as_mut_slice());
        assert_eq!(dir.bind(4, 3), Err(SfatDirectoryError::InvalidRecord(4)));
        assert_eq!(dir.record(40), Err(SfatDirectoryError::InvalidRecord(40)));
    }
}
