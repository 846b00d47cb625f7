// SPDX-License-Identifier: MIT

use std::ops::Range;

use crate::core::errors::{SfatAllocatorError, SfatClusterError, SfatClusterResult};
use crate::ensure;
use crate::sfat::{constant::*, directory::*, image::VolumeImage, meta::*, table::*};

/// Data clusters of an image, from the first cluster after the structural ones.
pub struct DataRegion<'m, B> {
    meta: &'m SfatMeta,
    raw: B,
}

impl<'m, B: AsRef<[u8]>> DataRegion<'m, B> {
    pub fn new(meta: &'m SfatMeta, raw: B) -> Self {
        Self { meta, raw }
    }

    fn range(&self, cluster: ClusterIdx) -> SfatClusterResult<Range<usize>> {
        ensure!(
            cluster >= SFAT_STRUCTURAL_CLUSTERS && (cluster as u32) < self.meta.cluster_count,
            SfatClusterError::OutOfRange(cluster as usize)
        );
        Ok(self
            .meta
            .cluster_range((cluster - SFAT_STRUCTURAL_CLUSTERS) as usize))
    }

    pub fn cluster(&self, cluster: ClusterIdx) -> SfatClusterResult<&[u8]> {
        let range = self.range(cluster)?;
        Ok(&self.raw.as_ref()[range])
    }

    /// Offset just past the last non-zero payload byte of `cluster`.
    pub fn fill_level(&self, cluster: ClusterIdx) -> SfatClusterResult<usize> {
        let payload = &self.cluster(cluster)?[..self.meta.usable_bytes];
        Ok(payload.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1))
    }
}

impl<'m, B: AsRef<[u8]> + AsMut<[u8]>> DataRegion<'m, B> {
    pub fn cluster_mut(&mut self, cluster: ClusterIdx) -> SfatClusterResult<&mut [u8]> {
        let range = self.range(cluster)?;
        Ok(&mut self.raw.as_mut()[range])
    }

    pub fn zero(&mut self, cluster: ClusterIdx) -> SfatClusterResult {
        self.cluster_mut(cluster)?.fill(0);
        Ok(())
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub written: usize,
    /// Chain tail after the write.
    pub tail: ClusterIdx,
    /// Chain length after the write.
    pub clusters: usize,
}

/// Table, root directory and data clusters of one image, kept consistent together.
pub struct ClusterIO<'m, B> {
    meta: &'m SfatMeta,
    pub table: ClusterTable<'m, B>,
    pub directory: RootDirectory<'m, B>,
    pub data: DataRegion<'m, B>,
}

impl<'m, B: AsRef<[u8]>> ClusterIO<'m, B> {
    pub fn new(
        meta: &'m SfatMeta,
        table: ClusterTable<'m, B>,
        directory: RootDirectory<'m, B>,
        data: DataRegion<'m, B>,
    ) -> Self {
        Self {
            meta,
            table,
            directory,
            data,
        }
    }

    /// Raw bytes of the `n`-th cluster of the chain starting at `start`.
    pub fn read(&self, start: ClusterIdx, n: usize) -> SfatClusterResult<&[u8]> {
        let chain = self.table.chain(start)?;
        let cluster = *chain.get(n).ok_or(SfatClusterError::OutOfRange(n))?;
        self.data.cluster(cluster)
    }

    /// Payload of the whole chain, each cluster trimmed to its fill level.
    pub fn read_to_end(&self, start: ClusterIdx) -> SfatClusterResult<Vec<u8>> {
        let chain = self.table.chain(start)?;
        let mut out = Vec::with_capacity(chain.len() * self.meta.usable_bytes);
        for cluster in chain {
            let fill = self.data.fill_level(cluster)?;
            out.extend_from_slice(&self.data.cluster(cluster)?[..fill]);
        }
        Ok(out)
    }
}

impl<'m, B: AsRef<[u8]> + AsMut<[u8]>> ClusterIO<'m, B> {
    /// Claims a directory record and a first cluster for `name`.
    pub fn create(&mut self, name: u8) -> SfatClusterResult<(usize, ClusterIdx)> {
        let origin = self.directory.create_record(name)?;
        let start = self.table.allocate()?;
        self.directory.bind(origin, start)?;
        Ok((origin, start))
    }

    /// Writes `payload` after the current end of the chain.
    ///
    /// A new cluster is chained only when a byte needs it; each one bumps
    /// the record's cluster count.
    pub fn write(
        &mut self,
        origin: usize,
        start: ClusterIdx,
        payload: &[u8],
    ) -> SfatClusterResult<WriteOutcome> {
        let chain = self.table.chain(start)?;
        let mut clusters = chain.len();
        let mut tail = *chain
            .last()
            .ok_or(SfatAllocatorError::CorruptChain(start))?;
        let mut fill = self.data.fill_level(tail)?;

        let usable = self.meta.usable_bytes;
        let mut rest = payload;
        while !rest.is_empty() {
            if fill == usable {
                tail = self.table.extend(tail)?;
                self.directory.bump_count(origin)?;
                clusters += 1;
                fill = 0;
                log::debug!("record {origin}: chain extended with cluster {tail}");
            }

            let take = rest.len().min(usable - fill);
            let end = self.meta.unit_offset(tail) + (fill + take) as u64;
            ensure!(end <= self.meta.capacity, SfatAllocatorError::DiscFull);

            self.data.cluster_mut(tail)?[fill..fill + take].copy_from_slice(&rest[..take]);
            fill += take;
            rest = &rest[take..];
        }

        Ok(WriteOutcome {
            written: payload.len(),
            tail,
            clusters,
        })
    }

    /// Frees the chain, zeroes each of its clusters and clears the record.
    pub fn delete(&mut self, origin: usize, start: ClusterIdx) -> SfatClusterResult<Vec<ClusterIdx>> {
        let freed = self.table.free_chain(start)?;
        for &cluster in &freed {
            self.data.zero(cluster)?;
        }
        self.directory.clear(origin)?;
        Ok(freed)
    }
}

/// Role of a cluster in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterKind {
    Superblock,
    Table,
    Root,
    Reserved,
    Data,
    /// Beyond what the allocation table can address.
    Unaddressable,
}

/// Snapshot of one cluster for inspection tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterView {
    pub index: usize,
    pub kind: ClusterKind,
    pub status: Option<TableEntry>,
    pub bytes: Vec<u8>,
}

impl ClusterView {
    pub fn read(image: &VolumeImage, meta: &SfatMeta, index: usize) -> SfatClusterResult<Self> {
        ensure!(
            index < meta.cluster_count as usize,
            SfatClusterError::OutOfRange(index)
        );

        let kind = match index {
            i if i == SFAT_SUPERBLOCK_CLUSTER as usize => ClusterKind::Superblock,
            i if i == SFAT_TABLE_CLUSTER as usize => ClusterKind::Table,
            i if i == SFAT_ROOT_CLUSTER as usize => ClusterKind::Root,
            i if i < meta.reserved_clusters as usize => ClusterKind::Reserved,
            i if (i as u32) < meta.allocatable_end() => ClusterKind::Data,
            _ => ClusterKind::Unaddressable,
        };
        let status = if kind == ClusterKind::Unaddressable {
            None
        } else {
            Some(image.table(meta).entry(index as ClusterIdx)?)
        };

        Ok(Self {
            index,
            kind,
            status,
            bytes: image.as_bytes()[meta.cluster_range(index)].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfat::config::SfatConfig;

    fn formatted(config: &SfatConfig) -> (SfatMeta, VolumeImage) {
        let meta = SfatMeta::new(config).unwrap();
        let mut image = VolumeImage::zeroed(&meta);
        image.cluster_io_mut(&meta).table.reset().unwrap();
        (meta, image)
    }

    #[test]
    fn test_payload_consumes_ceil_clusters() {
        let (meta, mut image) = formatted(&SfatConfig::default());
        let mut io = image.cluster_io_mut(&meta);

        let (origin, start) = io.create(b'a').unwrap();
        let out = io.write(origin, start, &[b'a'; 110]).unwrap();
        assert_eq!(out.clusters, 2);
        assert_eq!(io.directory.record(origin).unwrap().cluster_count, 2);

        let (origin, start) = io.create(b'b').unwrap();
        let out = io.write(origin, start, &[b'b'; 510]).unwrap();
        assert_eq!(out.clusters, 6);
        assert_eq!(io.table.used_clusters(), 8);
    }

    #[test]
    fn test_exact_fit_does_not_extend() {
        let (meta, mut image) = formatted(&SfatConfig::default());
        let mut io = image.cluster_io_mut(&meta);

        let (origin, start) = io.create(b'a').unwrap();
        let out = io.write(origin, start, &[1u8; 99]).unwrap();
        assert_eq!(out.clusters, 1);
        assert_eq!(io.data.fill_level(start).unwrap(), 99);
        assert_eq!(io.data.cluster(start).unwrap()[99], 0);
    }

    #[test]
    fn test_append_resumes_at_tail_fill() {
        let (meta, mut image) = formatted(&SfatConfig::default());
        let mut io = image.cluster_io_mut(&meta);

        let (origin, start) = io.create(b'a').unwrap();
        io.write(origin, start, &[b'a'; 110]).unwrap();
        let out = io.write(origin, start, &[b'z'; 50]).unwrap();
        assert_eq!(out.clusters, 2);

        let content = io.read_to_end(start).unwrap();
        assert_eq!(content.len(), 160);
        assert!(content[110..].iter().all(|&b| b == b'z'));
        assert_eq!(io.read(start, 1).unwrap()[10], b'a');
        assert_eq!(io.read(start, 1).unwrap()[11], b'z');
        assert_eq!(io.read(start, 2), Err(SfatClusterError::OutOfRange(2)));
    }

    #[test]
    fn test_delete_zeroes_chain_and_record() {
        let (meta, mut image) = formatted(&SfatConfig::default());
        let mut io = image.cluster_io_mut(&meta);

        let (a, a_start) = io.create(b'a').unwrap();
        let (b, b_start) = io.create(b'b').unwrap();
        io.write(a, a_start, &[b'a'; 150]).unwrap();
        io.write(b, b_start, &[b'b'; 150]).unwrap();
        io.write(a, a_start, &[b'a'; 100]).unwrap();

        let freed = io.delete(a, a_start).unwrap();
        assert_eq!(freed, vec![3, 5, 7]);
        for cluster in freed {
            assert!(io.data.cluster(cluster).unwrap().iter().all(|&b| b == 0));
        }
        assert!(io.directory.record(a).unwrap().is_free());
        assert_eq!(io.read_to_end(b_start).unwrap(), vec![b'b'; 150]);
    }

    #[test]
    fn test_failed_extend_reports_disc_full() {
        let (meta, mut image) = formatted(&SfatConfig::new(500, 100));
        let mut io = image.cluster_io_mut(&meta);

        let (origin, start) = io.create(b'a').unwrap();
        let err = io.write(origin, start, &[7u8; 300]).unwrap_err();
        assert_eq!(err, SfatClusterError::Allocator(SfatAllocatorError::DiscFull));
    }

    #[test]
    fn test_view_kinds() {
        let (meta, image) = formatted(&SfatConfig::new(2000, 10));
        let view = ClusterView::read(&image, &meta, 1).unwrap();
        assert_eq!(view.kind, ClusterKind::Table);
        assert_eq!(view.status, Some(TableEntry::Terminal));

        let view = ClusterView::read(&image, &meta, 5).unwrap();
        assert_eq!((view.kind, view.status), (ClusterKind::Data, Some(TableEntry::Free)));

        let view = ClusterView::read(&image, &meta, 150).unwrap();
        assert_eq!((view.kind, view.status), (ClusterKind::Unaddressable, None));
        assert_eq!(view.bytes.len(), 10);

        assert!(ClusterView::read(&image, &meta, 200).is_err());
    }
}
