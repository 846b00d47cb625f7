// SPDX-License-Identifier: MIT

pub use crate::core::meta::*;

use std::ops::Range;

use crate::core::errors::SfatConfigResult;
use crate::sfat::{config::SfatConfig, constant::*};

/// Index of a cluster addressable by the allocation table.
pub type ClusterIdx = u8;

/// Geometry derived from a validated [`SfatConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfatMeta {
    pub capacity: u64,
    pub cluster_size: u32,
    pub cluster_count: u32,
    pub reserved_clusters: u8,

    /// Entries the table cluster can describe: `min(cluster_size, 255)`.
    pub table_capacity: u32,
    /// Number of 3-byte records in the root cluster.
    pub dir_capacity: usize,
    /// Payload bytes per data cluster.
    pub usable_bytes: usize,
}

impl SfatMeta {
    pub fn new(config: &SfatConfig) -> SfatConfigResult<Self> {
        config.validate()?;

        let cluster_size = config.cluster_size;
        Ok(Self {
            capacity: config.capacity,
            cluster_size,
            cluster_count: config.cluster_count() as u32,
            reserved_clusters: config.reserved_clusters,
            table_capacity: (cluster_size as usize).min(SFAT_MAX_TABLE_ENTRIES) as u32,
            dir_capacity: cluster_size as usize / SFAT_DIR_RECORD_SIZE,
            usable_bytes: cluster_size as usize - SFAT_CLUSTER_TAIL_BYTES,
        })
    }

    /// One past the last cluster the table can hand out.
    #[inline]
    pub fn allocatable_end(&self) -> u32 {
        self.cluster_count.min(self.table_capacity)
    }

    /// True when part of the volume lies beyond what the table can address.
    #[inline]
    pub fn table_is_capped(&self) -> bool {
        self.cluster_count > self.table_capacity
    }

    /// Byte range of `cluster` inside the image.
    #[inline]
    pub fn cluster_range(&self, cluster: usize) -> Range<usize> {
        let cs = self.cluster_size as usize;
        cluster * cs..(cluster + 1) * cs
    }

    /// Clusters needed to hold `len` payload bytes (at least one per file).
    #[inline]
    pub fn clusters_for(&self, len: usize) -> usize {
        len.div_ceil(self.usable_bytes).max(1)
    }

    pub fn default_label(&self) -> String {
        format!(
            "{SFAT_LABEL_PREFIX} size {} clusters {}\n",
            self.capacity, self.cluster_count
        )
    }
}

impl FsMeta<ClusterIdx> for SfatMeta {
    fn unit_size(&self) -> usize {
        self.cluster_size as usize
    }

    fn unit_offset(&self, unit: ClusterIdx) -> u64 {
        unit as u64 * self.cluster_size as u64
    }

    fn root_unit(&self) -> ClusterIdx {
        SFAT_ROOT_CLUSTER
    }

    fn first_data_unit(&self) -> ClusterIdx {
        self.reserved_clusters
    }

    fn last_data_unit(&self) -> ClusterIdx {
        (self.allocatable_end() - 1) as ClusterIdx
    }

    fn total_units(&self) -> usize {
        (self.allocatable_end() - self.reserved_clusters as u32) as usize
    }

    fn size_bytes(&self) -> u64 {
        self.capacity
    }
}
