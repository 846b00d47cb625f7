// SPDX-License-Identifier: MIT

use crate::core::errors::{SfatError, SfatResult};
use crate::ensure;
use crate::sfat::{cluster::*, constant::*, directory::*, meta::*, table::*};

/// Resident copy of the whole volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeImage {
    bytes: Vec<u8>,
}

impl VolumeImage {
    pub fn zeroed(meta: &SfatMeta) -> Self {
        Self {
            bytes: vec![0u8; meta.capacity as usize],
        }
    }

    pub fn from_bytes(meta: &SfatMeta, bytes: Vec<u8>) -> SfatResult<Self> {
        ensure!(
            bytes.len() as u64 == meta.capacity,
            SfatError::Other("image size does not match volume capacity")
        );
        Ok(Self { bytes })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Superblock contents up to the first NUL.
    pub fn label<'a>(&'a self, meta: &SfatMeta) -> &'a [u8] {
        let superblock = &self.bytes[meta.cluster_range(SFAT_SUPERBLOCK_CLUSTER as usize)];
        let end = superblock.iter().position(|&b| b == 0).unwrap_or(superblock.len());
        &superblock[..end]
    }

    /// True when every reserved cluster is marked terminal.
    pub fn is_formatted(&self, meta: &SfatMeta) -> bool {
        let table = self.table(meta);
        (0..meta.reserved_clusters).all(|c| table.entry(c) == Ok(TableEntry::Terminal))
    }

    pub fn table<'a>(&'a self, meta: &'a SfatMeta) -> ClusterTable<'a, &'a [u8]> {
        ClusterTable::new(meta, &self.bytes[meta.cluster_range(SFAT_TABLE_CLUSTER as usize)])
    }

    pub fn directory<'a>(&'a self, meta: &'a SfatMeta) -> RootDirectory<'a, &'a [u8]> {
        RootDirectory::new(meta, &self.bytes[meta.cluster_range(SFAT_ROOT_CLUSTER as usize)])
    }

    pub fn cluster_io<'a>(&'a self, meta: &'a SfatMeta) -> ClusterIO<'a, &'a [u8]> {
        let cs = meta.cluster_size as usize;
        let data_start = SFAT_STRUCTURAL_CLUSTERS as usize * cs;
        ClusterIO::new(
            meta,
            self.table(meta),
            self.directory(meta),
            DataRegion::new(meta, &self.bytes[data_start..]),
        )
    }

    /// Splits the image into disjoint mutable views.
    pub fn cluster_io_mut<'a>(&'a mut self, meta: &'a SfatMeta) -> ClusterIO<'a, &'a mut [u8]> {
        let cs = meta.cluster_size as usize;
        let (_superblock, rest) = self.bytes.split_at_mut(cs);
        let (table, rest) = rest.split_at_mut(cs);
        let (root, data) = rest.split_at_mut(cs);
        ClusterIO::new(
            meta,
            ClusterTable::new(meta, table),
            RootDirectory::new(meta, root),
            DataRegion::new(meta, data),
        )
    }

    /// Writes `label` into the superblock, truncated to one cluster.
    pub fn set_label(&mut self, meta: &SfatMeta, label: &[u8]) {
        let superblock = &mut self.bytes[meta.cluster_range(SFAT_SUPERBLOCK_CLUSTER as usize)];
        superblock.fill(0);
        let len = label.len().min(superblock.len());
        superblock[..len].copy_from_slice(&label[..len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfat::config::SfatConfig;

    #[test]
    fn test_wrong_size_rejected() {
        let meta = SfatMeta::new(&SfatConfig::default()).unwrap();
        assert!(VolumeImage::from_bytes(&meta, vec![0u8; 100]).is_err());
        assert!(VolumeImage::from_bytes(&meta, vec![0u8; 3000]).is_ok());
    }

    #[test]
    fn test_formatted_detection() {
        let meta = SfatMeta::new(&SfatConfig::default()).unwrap();
        let mut image = VolumeImage::zeroed(&meta);
        assert!(!image.is_formatted(&meta));

        image.cluster_io_mut(&meta).table.reset().unwrap();
        assert!(image.is_formatted(&meta));
        assert_eq!(&image.as_bytes()[100..104], &[0xFF, 0xFF, 0xFF, 0x00]);
    }

    #[test]
    fn test_label_truncated_to_cluster() {
        let meta = SfatMeta::new(&SfatConfig::new(400, 10)).unwrap();
        let mut image = VolumeImage::zeroed(&meta);
        image.set_label(&meta, b"SIMPLE FAT FILE SYSTEM");
        assert_eq!(image.label(&meta), b"SIMPLE FAT");
        assert_eq!(image.as_bytes()[10], 0);
    }
}
