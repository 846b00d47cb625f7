// SPDX-License-Identifier: MIT

use crate::core::errors::{SfatAllocatorError, SfatAllocatorResult};
use crate::sfat::{constant::*, meta::*};
use crate::{bail, ensure};

/// Decoded allocation table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEntry {
    Free,
    /// Structural cluster, or last cluster of a chain.
    Terminal,
    Next(ClusterIdx),
}

impl TableEntry {
    #[inline]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            SFAT_ENTRY_FREE => TableEntry::Free,
            SFAT_ENTRY_TERMINAL => TableEntry::Terminal,
            next => TableEntry::Next(next),
        }
    }

    #[inline]
    pub fn to_raw(self) -> u8 {
        match self {
            TableEntry::Free => SFAT_ENTRY_FREE,
            TableEntry::Terminal => SFAT_ENTRY_TERMINAL,
            TableEntry::Next(next) => next,
        }
    }

    #[inline]
    pub fn is_free(self) -> bool {
        self == TableEntry::Free
    }
}

/// View over the allocation table cluster.
///
/// `B` is the raw table cluster; read-only views use `&[u8]`, mutating ones `&mut [u8]`.
pub struct ClusterTable<'m, B> {
    meta: &'m SfatMeta,
    raw: B,
}

impl<'m, B: AsRef<[u8]>> ClusterTable<'m, B> {
    pub fn new(meta: &'m SfatMeta, raw: B) -> Self {
        Self { meta, raw }
    }

    pub fn entry(&self, cluster: ClusterIdx) -> SfatAllocatorResult<TableEntry> {
        ensure!(
            (cluster as u32) < self.meta.allocatable_end(),
            SfatAllocatorError::InvalidCluster(cluster)
        );
        Ok(TableEntry::from_raw(self.raw.as_ref()[cluster as usize]))
    }

    /// First free data cluster, lowest index first.
    pub fn find_free_cluster(&self) -> Option<ClusterIdx> {
        (self.meta.first_data_unit()..=self.meta.last_data_unit())
            .find(|&c| matches!(self.entry(c), Ok(TableEntry::Free)))
    }

    /// Error reported when no cluster can be handed out.
    pub fn exhausted(&self) -> SfatAllocatorError {
        if self.meta.table_is_capped() {
            SfatAllocatorError::FileTableFull
        } else {
            SfatAllocatorError::DiscFull
        }
    }

    /// Clusters of the chain starting at `start`, in chain order.
    ///
    /// The walk is bounded by the number of data clusters; a longer walk means a loop.
    pub fn chain(&self, start: ClusterIdx) -> SfatAllocatorResult<Vec<ClusterIdx>> {
        ensure!(
            self.meta.is_valid_unit(start),
            SfatAllocatorError::InvalidCluster(start)
        );

        let mut chain = Vec::new();
        let mut current = start;
        for _ in 0..self.meta.total_units() {
            chain.push(current);
            match self.entry(current)? {
                TableEntry::Terminal => return Ok(chain),
                TableEntry::Next(next) => {
                    ensure!(
                        self.meta.is_valid_unit(next),
                        SfatAllocatorError::InvalidCluster(next)
                    );
                    current = next;
                }
                TableEntry::Free => bail!(SfatAllocatorError::CorruptChain(current)),
            }
        }
        Err(SfatAllocatorError::CorruptChain(start))
    }

    /// Last cluster of the chain starting at `start`.
    pub fn tail(&self, start: ClusterIdx) -> SfatAllocatorResult<ClusterIdx> {
        let chain = self.chain(start)?;
        chain
            .last()
            .copied()
            .ok_or(SfatAllocatorError::CorruptChain(start))
    }

    pub fn free_clusters(&self) -> usize {
        (self.meta.first_data_unit()..=self.meta.last_data_unit())
            .filter(|&c| matches!(self.entry(c), Ok(TableEntry::Free)))
            .count()
    }

    pub fn used_clusters(&self) -> usize {
        self.meta.total_units() - self.free_clusters()
    }
}

impl<'m, B: AsRef<[u8]> + AsMut<[u8]>> ClusterTable<'m, B> {
    pub fn set(&mut self, cluster: ClusterIdx, entry: TableEntry) -> SfatAllocatorResult {
        ensure!(
            (cluster as u32) < self.meta.allocatable_end(),
            SfatAllocatorError::InvalidCluster(cluster)
        );
        self.raw.as_mut()[cluster as usize] = entry.to_raw();
        Ok(())
    }

    /// Clears every entry, then marks the reserved clusters terminal.
    pub fn reset(&mut self) -> SfatAllocatorResult {
        self.raw.as_mut().fill(SFAT_ENTRY_FREE);
        for cluster in 0..self.meta.reserved_clusters {
            self.set(cluster, TableEntry::Terminal)?;
        }
        Ok(())
    }

    /// Claims the first free cluster as a one-cluster chain.
    pub fn allocate(&mut self) -> SfatAllocatorResult<ClusterIdx> {
        let cluster = self.find_free_cluster().ok_or_else(|| self.exhausted())?;
        self.set(cluster, TableEntry::Terminal)?;
        log::debug!("table: allocated cluster {cluster}");
        Ok(cluster)
    }

    /// Appends a fresh cluster after `tail`; the table is untouched on failure.
    pub fn extend(&mut self, tail: ClusterIdx) -> SfatAllocatorResult<ClusterIdx> {
        ensure!(
            self.entry(tail)? == TableEntry::Terminal && self.meta.is_valid_unit(tail),
            SfatAllocatorError::CorruptChain(tail)
        );
        let next = self.allocate()?;
        self.set(tail, TableEntry::Next(next))?;
        log::debug!("table: chained {tail} -> {next}");
        Ok(next)
    }

    /// Frees every cluster of the chain starting at `start`.
    ///
    /// The whole chain is validated before any entry changes.
    pub fn free_chain(&mut self, start: ClusterIdx) -> SfatAllocatorResult<Vec<ClusterIdx>> {
        let chain = self.chain(start)?;
        for &cluster in &chain {
            self.set(cluster, TableEntry::Free)?;
        }
        log::debug!("table: freed chain {chain:?}");
        Ok(chain)
    }
}
