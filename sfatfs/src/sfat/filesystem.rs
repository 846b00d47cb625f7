// SPDX-License-Identifier: MIT

use std::ops::Range;

use sfatio::{VolumeIO, VolumeIOSetLen};

use crate::core::errors::*;
use crate::ensure;
use crate::sfat::{
    checker::*, cluster::*, config::SfatConfig, image::VolumeImage, meta::*, session::*,
    store::VolumeStore,
};

/// Active directory record as seen by listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: char,
    pub origin: usize,
    pub start: ClusterIdx,
    pub clusters: u8,
}

/// Cluster usage summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeStats {
    pub data_clusters: usize,
    pub used_clusters: usize,
    pub free_clusters: usize,
    pub files: usize,
    pub records: usize,
}

/// The volume store facade.
///
/// Every mutating operation reads the whole image, mutates the resident copy
/// and writes the whole image back. Taking `&mut self` keeps those cycles
/// from interleaving.
pub struct SfatFs<IO: VolumeIO> {
    store: VolumeStore<IO>,
    /// Per-record generation, bumped each time the record is released.
    generations: Vec<u32>,
}

impl<IO: VolumeIO> SfatFs<IO> {
    pub fn new(io: IO, config: &SfatConfig) -> SfatResult<Self> {
        let store = VolumeStore::new(io, config)?;
        let generations = vec![0; store.meta().dir_capacity];
        Ok(Self { store, generations })
    }

    #[inline]
    pub fn meta(&self) -> &SfatMeta {
        self.store.meta()
    }

    /// Lays down an empty volume; `None` writes the default label.
    pub fn format(&mut self, label: Option<&str>) -> SfatResult {
        let label = label.map_or_else(|| self.meta().default_label(), str::to_owned);
        self.store.format(label.as_bytes())?;
        for generation in &mut self.generations {
            *generation = generation.wrapping_add(1);
        }
        Ok(())
    }

    /// Persists the current image, flushes and hands the backend back.
    pub fn unmount(mut self) -> SfatResult<IO> {
        let image = self.store.load()?;
        self.store.persist(&image)?;
        log::info!("volume unmounted");
        Ok(self.store.into_inner())
    }

    /// Creates `name` with a one-cluster chain and returns an open handle.
    pub fn create(&mut self, name: &str) -> SfatResult<FileHandle> {
        let name = validate_name(name)?;
        let (origin, start) = self.transact(|io| Ok(io.create(name)?))?;

        log::info!(
            "created file {:?}: record {origin}, cluster {start}",
            name as char
        );
        Ok(FileHandle::new(
            name,
            origin,
            start,
            start,
            1,
            self.generation(origin),
        ))
    }

    /// Returns a handle on an existing file.
    pub fn open(&mut self, name: &str) -> SfatResult<FileHandle> {
        let name = validate_name(name)?;
        let image = self.store.load()?;
        let meta = self.store.meta();

        let directory = image.directory(meta);
        let origin = directory
            .find(name)
            .ok_or(SfatDirectoryError::NotFound(name))?;
        let record = directory.record(origin)?;
        let chain = image.table(meta).chain(record.start_cluster)?;
        let tail = *chain
            .last()
            .ok_or(SfatAllocatorError::CorruptChain(record.start_cluster))?;

        Ok(FileHandle::new(
            name,
            origin,
            record.start_cluster,
            tail,
            chain.len(),
            self.generation(origin),
        ))
    }

    /// Writes `payload` at the end of the file; returns the byte count.
    ///
    /// The volume stores no file length: a cluster ends at its last non-zero
    /// byte. Trailing `0x00` bytes of `payload` are therefore not kept, and
    /// the next write or append starts over them.
    ///
    /// On failure the volume is restored to its state before the call.
    pub fn write(&mut self, fh: &mut FileHandle, payload: &[u8]) -> SfatResult<usize> {
        fh.ensure_usable()?;
        let generation = self.generation(fh.origin());
        let outcome = self.transact(|io| {
            fh.verify(&io.directory, generation)?;
            Ok(io.write(fh.origin(), fh.position(), payload)?)
        })?;

        fh.record_write(&outcome);
        log::info!(
            "wrote {} bytes to {:?} ({} clusters)",
            outcome.written,
            fh.name(),
            outcome.clusters
        );
        Ok(outcome.written)
    }

    /// Same as [`SfatFs::write`]: writes always resume at the chain tail.
    pub fn append(&mut self, fh: &mut FileHandle, payload: &[u8]) -> SfatResult<usize> {
        self.write(fh, payload)
    }

    /// Raw bytes of the `n`-th cluster of the file.
    pub fn read(&mut self, fh: &FileHandle, n: usize) -> SfatResult<Vec<u8>> {
        fh.ensure_usable()?;
        let image = self.store.load()?;
        let io = image.cluster_io(self.store.meta());
        fh.verify(&io.directory, self.generation(fh.origin()))?;
        Ok(io.read(fh.position(), n)?.to_vec())
    }

    /// Payload of the whole file.
    pub fn read_to_end(&mut self, fh: &FileHandle) -> SfatResult<Vec<u8>> {
        fh.ensure_usable()?;
        let image = self.store.load()?;
        let io = image.cluster_io(self.store.meta());
        fh.verify(&io.directory, self.generation(fh.origin()))?;
        Ok(io.read_to_end(fh.position())?)
    }

    /// Frees the chain, zeroes its clusters and the record; the handle becomes unusable.
    pub fn delete(&mut self, fh: &mut FileHandle) -> SfatResult {
        fh.ensure_usable()?;
        let generation = self.generation(fh.origin());
        let freed = self.transact(|io| {
            fh.verify(&io.directory, generation)?;
            Ok(io.delete(fh.origin(), fh.position())?)
        })?;

        self.release(fh.origin());
        fh.mark_deleted();
        log::info!(
            "deleted file {:?}: freed {} clusters",
            fh.name(),
            freed.len()
        );
        Ok(())
    }

    pub fn close(&mut self, fh: &mut FileHandle) -> SfatResult {
        fh.close()?;
        log::info!("closed file {:?}", fh.name());
        Ok(())
    }

    pub fn list(&mut self) -> SfatResult<Vec<DirEntryInfo>> {
        let image = self.store.load()?;
        let entries = image
            .directory(self.store.meta())
            .entries()
            .map(|(origin, r)| DirEntryInfo {
                name: r.name_char(),
                origin,
                start: r.start_cluster,
                clusters: r.cluster_count,
            })
            .collect();
        Ok(entries)
    }

    /// Views of the clusters in `range`.
    pub fn inspect(&mut self, range: Range<usize>) -> SfatResult<Vec<ClusterView>> {
        let meta = self.store.meta();
        ensure!(
            range.end <= meta.cluster_count as usize,
            SfatClusterError::OutOfRange(range.end)
        );

        let image = self.store.load()?;
        let meta = self.store.meta();
        let views = range
            .map(|index| ClusterView::read(&image, meta, index))
            .collect::<SfatClusterResult<Vec<_>>>()?;
        Ok(views)
    }

    pub fn read_cluster(&mut self, index: usize) -> SfatResult<ClusterView> {
        let image = self.store.load()?;
        Ok(ClusterView::read(&image, self.store.meta(), index)?)
    }

    pub fn check(&mut self) -> SfatResult<VerifyReport> {
        self.check_with(&VerifyOptions::default())
    }

    pub fn check_with(&mut self, opts: &VerifyOptions) -> SfatResult<VerifyReport> {
        let image = self.store.load()?;
        Ok(SfatChecker::new(&image, self.store.meta()).check_with(opts)?)
    }

    pub fn stats(&mut self) -> SfatResult<VolumeStats> {
        let image = self.store.load()?;
        let meta = self.store.meta();
        let table = image.table(meta);
        let directory = image.directory(meta);

        Ok(VolumeStats {
            data_clusters: meta.total_units(),
            used_clusters: table.used_clusters(),
            free_clusters: table.free_clusters(),
            files: directory.entries().count(),
            records: directory.capacity(),
        })
    }

    #[inline]
    fn generation(&self, origin: usize) -> u32 {
        self.generations.get(origin).copied().unwrap_or_default()
    }

    fn release(&mut self, origin: usize) {
        if let Some(generation) = self.generations.get_mut(origin) {
            *generation = generation.wrapping_add(1);
        }
    }

    /// Runs one load-mutate-persist cycle.
    ///
    /// The mutated image is persisted on success, the loaded one on failure.
    fn transact<T, F>(&mut self, op: F) -> SfatResult<T>
    where
        F: FnOnce(&mut ClusterIO<'_, &mut [u8]>) -> SfatResult<T>,
    {
        let snapshot = self.store.load()?;
        let mut image = snapshot.clone();

        let result = {
            let mut io = image.cluster_io_mut(self.store.meta());
            op(&mut io)
        };

        match result {
            Ok(value) => {
                self.store.persist(&image)?;
                Ok(value)
            }
            Err(e) => {
                log::debug!("operation failed ({e}), restoring previous image");
                self.store.persist(&snapshot)?;
                Err(e)
            }
        }
    }
}

impl<IO: VolumeIOSetLen> SfatFs<IO> {
    /// Loads the volume, formatting a fresh one when it cannot be read.
    pub fn mount(&mut self) -> SfatResult<VolumeImage> {
        let image = self.store.mount()?;
        log::info!("volume mounted: {} clusters", self.meta().cluster_count);
        Ok(image)
    }
}

#[cfg(feature = "std")]
impl SfatFs<sfatio::prelude::StdVolumeIO<std::fs::File>> {
    /// Opens (or creates) the backing file at `config.path`.
    pub fn open_path(config: &SfatConfig) -> SfatResult<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&config.path)
            .map_err(VolumeIOError::from)?;
        Self::new(sfatio::prelude::StdVolumeIO::new(file), config)
    }
}

#[cfg(all(test, feature = "mem"))]
mod tests {
    use super::*;
    use sfatio::prelude::*;

    fn mounted(buf: &mut [u8]) -> SfatFs<MemVolumeIO<'_>> {
        let mut fs = SfatFs::new(MemVolumeIO::new(buf), &SfatConfig::default()).unwrap();
        fs.mount().unwrap();
        fs
    }

    #[test]
    fn test_create_then_close() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let mut fh = fs.create("a").unwrap();
        assert_eq!((fh.origin(), fh.position(), fh.size()), (0, 3, 1));
        fs.close(&mut fh).unwrap();

        let entries = fs.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].name, entries[0].clusters), ('a', 1));
        assert_eq!(fs.stats().unwrap().used_clusters, 1);
    }

    #[test]
    fn test_closed_handle_rejected() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let mut fh = fs.create("a").unwrap();
        fs.close(&mut fh).unwrap();

        let err = fs.write(&mut fh, b"late").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        assert_eq!(fs.close(&mut fh).unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(fs.delete(&mut fh).unwrap_err().kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_invalid_names() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        for name in ["", "ab", "\0"] {
            assert_eq!(fs.create(name).unwrap_err().kind(), ErrorKind::InvalidFilename);
        }
        assert_eq!(fs.list().unwrap().len(), 0);
    }

    #[test]
    fn test_duplicate_and_missing_names() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        fs.create("a").unwrap();
        assert_eq!(fs.create("a").unwrap_err().kind(), ErrorKind::NameInUse);
        assert_eq!(fs.open("q").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_reopen_sees_written_chain() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let mut fh = fs.create("a").unwrap();
        fs.write(&mut fh, &[b'a'; 200]).unwrap();
        fs.close(&mut fh).unwrap();

        let fh = fs.open("a").unwrap();
        assert_eq!(fh.size(), 3);
        assert_eq!(fh.active_cluster(), 5);
        assert_eq!(fs.read_to_end(&fh).unwrap().len(), 200);
        assert_eq!(fs.read(&fh, 9).unwrap_err().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_stale_handle_after_delete_elsewhere() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let mut first = fs.create("a").unwrap();
        let mut second = fs.open("a").unwrap();
        fs.delete(&mut first).unwrap();

        assert_eq!(fs.write(&mut second, b"x").unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert!(fs.check().unwrap().ok());
    }

    #[test]
    fn test_stale_handle_after_name_is_recreated() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let mut first = fs.create("a").unwrap();
        let mut stale = fs.open("a").unwrap();
        fs.delete(&mut first).unwrap();

        let mut fresh = fs.create("a").unwrap();
        assert_eq!((fresh.origin(), fresh.position()), (stale.origin(), stale.position()));
        fs.write(&mut fresh, b"new").unwrap();

        assert_eq!(fs.write(&mut stale, b"OLD").unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(fs.read_to_end(&stale).unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(fs.delete(&mut stale).unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(fs.read_to_end(&fresh).unwrap(), b"new");
    }

    #[test]
    fn test_format_invalidates_open_handles() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let mut old = fs.create("a").unwrap();
        fs.format(None).unwrap();
        fs.create("a").unwrap();
        assert_eq!(fs.write(&mut old, b"x").unwrap_err().kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_trailing_zero_bytes_are_not_kept() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let mut fh = fs.create("a").unwrap();
        assert_eq!(fs.write(&mut fh, &[1, 2, 0, 0]).unwrap(), 4);
        fs.append(&mut fh, &[9]).unwrap();
        assert_eq!(fs.read_to_end(&fh).unwrap(), vec![1, 2, 9]);
    }

    #[test]
    fn test_inspect_bounds() {
        let mut buf = vec![0u8; 3000];
        let mut fs = mounted(&mut buf);

        let views = fs.inspect(0..4).unwrap();
        assert_eq!(views[0].kind, ClusterKind::Superblock);
        assert_eq!(views[3].kind, ClusterKind::Data);
        assert_eq!(fs.inspect(0..31).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(fs.read_cluster(2).unwrap().kind, ClusterKind::Root);
        assert_eq!(fs.read_cluster(30).unwrap_err().kind(), ErrorKind::OutOfRange);
    }
}
