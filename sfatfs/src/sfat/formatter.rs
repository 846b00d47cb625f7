// SPDX-License-Identifier: MIT

use sfatio::{VolumeIO, VolumeIOExt};

pub use crate::core::formatter::*;

use crate::sfat::{constant::*, meta::*, table::ClusterTable};

/// SfatFormatter:
/// - Zeroes the whole volume.
/// - Writes the label into the superblock (truncated to one cluster).
/// - Marks the reserved clusters terminal; every other entry and record stays zero.
pub struct SfatFormatter<'a, IO: VolumeIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a SfatMeta,
    label: &'a [u8],
}

impl<'a, IO: VolumeIO + ?Sized> SfatFormatter<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a SfatMeta, label: &'a [u8]) -> Self {
        Self { io, meta, label }
    }

    fn write_superblock(&mut self) -> SfatResult {
        let len = self.label.len().min(self.meta.unit_size());
        let offset = self.meta.unit_offset(SFAT_SUPERBLOCK_CLUSTER);
        self.io.write_at(offset, &self.label[..len])?;
        Ok(())
    }

    fn write_table(&mut self) -> SfatResult {
        let mut raw = vec![0u8; self.meta.unit_size()];
        ClusterTable::new(self.meta, raw.as_mut_slice()).reset()?;
        let offset = self.meta.unit_offset(SFAT_TABLE_CLUSTER);
        self.io.write_at(offset, &raw)?;
        Ok(())
    }
}

impl<'a, IO: VolumeIO + ?Sized> FsFormatter for SfatFormatter<'a, IO> {
    fn format(&mut self) -> SfatResult {
        self.io.zero_fill(0, self.meta.capacity as usize)?;
        self.write_superblock()?;
        self.write_table()?;
        self.io.flush()?;

        log::info!(
            "formatted volume: {} bytes, {} clusters of {} bytes",
            self.meta.capacity,
            self.meta.cluster_count,
            self.meta.cluster_size
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfat::config::SfatConfig;
    use sfatio::prelude::*;

    #[test]
    fn test_format_layout() {
        let meta = SfatMeta::new(&SfatConfig::default()).unwrap();
        let mut buf = vec![0xAAu8; 3000];
        let mut io = MemVolumeIO::new(&mut buf);

        let label = meta.default_label();
        SfatFormatter::new(&mut io, &meta, label.as_bytes())
            .format()
            .unwrap();

        assert!(buf.starts_with(label.as_bytes()));
        assert_eq!(buf[label.len()], 0);
        assert_eq!(&buf[100..104], &[0xFF, 0xFF, 0xFF, 0x00]);
        assert!(buf[200..].iter().all(|&b| b == 0));
    }
}
