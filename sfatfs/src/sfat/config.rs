// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use crate::core::errors::{SfatConfigError, SfatConfigResult};
use crate::ensure;
use crate::sfat::constant::*;

/// Build/run configuration of a volume.
///
/// Passed explicitly to the store; nothing about the geometry is auto-detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfatConfig {
    /// Total size of the backing blob in bytes.
    pub capacity: u64,
    /// Size of one cluster in bytes.
    pub cluster_size: u32,
    /// Clusters `0..reserved_clusters` are never allocated to files.
    pub reserved_clusters: u8,
    /// Backing file location (file backend only).
    pub path: PathBuf,
}

impl Default for SfatConfig {
    fn default() -> Self {
        Self {
            capacity: SFAT_DEFAULT_CAPACITY,
            cluster_size: SFAT_DEFAULT_CLUSTER_SIZE,
            reserved_clusters: SFAT_DEFAULT_RESERVED_CLUSTERS,
            path: PathBuf::from(SFAT_DEFAULT_DISC_PATH),
        }
    }
}

impl SfatConfig {
    pub fn new(capacity: u64, cluster_size: u32) -> Self {
        Self {
            capacity,
            cluster_size,
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_reserved_clusters(mut self, reserved: u8) -> Self {
        self.reserved_clusters = reserved;
        self
    }

    /// Number of clusters; only meaningful once `validate` passed.
    pub fn cluster_count(&self) -> u64 {
        self.capacity / self.cluster_size.max(1) as u64
    }

    pub fn validate(&self) -> SfatConfigResult {
        ensure!(
            self.cluster_size >= SFAT_MIN_CLUSTER_SIZE,
            SfatConfigError::Invalid("cluster size must be at least 4 bytes")
        );
        ensure!(
            self.capacity % self.cluster_size as u64 == 0,
            SfatConfigError::Invalid("capacity must be a multiple of the cluster size")
        );
        ensure!(
            self.capacity <= usize::MAX as u64,
            SfatConfigError::Invalid("capacity does not fit in memory")
        );
        ensure!(
            self.cluster_count() <= u32::MAX as u64,
            SfatConfigError::Invalid("cluster count does not fit in 32 bits")
        );
        ensure!(
            self.reserved_clusters >= SFAT_STRUCTURAL_CLUSTERS,
            SfatConfigError::Invalid("superblock, table and root clusters must be reserved")
        );

        let table_capacity = (self.cluster_size as usize).min(SFAT_MAX_TABLE_ENTRIES);
        ensure!(
            (self.reserved_clusters as usize) < table_capacity,
            SfatConfigError::Invalid("reserved clusters leave no room in the allocation table")
        );
        ensure!(
            self.cluster_count() > self.reserved_clusters as u64,
            SfatConfigError::Invalid("volume has no data clusters")
        );
        Ok(())
    }
}
