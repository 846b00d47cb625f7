// SPDX-License-Identifier: MIT

pub use crate::core::checker::*;

use crate::sfat::{constant::SFAT_TABLE_CLUSTER, image::VolumeImage, meta::*, table::TableEntry};

/// Verifies table, directory and chains of a resident image.
pub struct SfatChecker<'a> {
    image: &'a VolumeImage,
    meta: &'a SfatMeta,
}

impl<'a> SfatChecker<'a> {
    pub fn new(image: &'a VolumeImage, meta: &'a SfatMeta) -> Self {
        Self { image, meta }
    }

    /// Chains of every active record that can be walked.
    fn walkable_chains(&self) -> Vec<(char, Vec<ClusterIdx>)> {
        let table = self.image.table(self.meta);
        self.image
            .directory(self.meta)
            .entries()
            .filter_map(|(_, r)| table.chain(r.start_cluster).ok().map(|c| (r.name_char(), c)))
            .collect()
    }
}

impl<'a> FsChecker for SfatChecker<'a> {
    fn check_super(&mut self, rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        let label = self.image.label(self.meta);
        if label.is_empty() {
            rep.push(Finding::warn("SUPER.LABEL", "Superblock carries no label"));
        } else {
            rep.push(Finding::info(
                "SUPER.LABEL",
                format!("Label: {}", String::from_utf8_lossy(label).trim_end()),
            ));
        }
        Ok(())
    }

    fn check_table(&mut self, rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        let table = self.image.table(self.meta);

        for cluster in 0..self.meta.reserved_clusters {
            if table.entry(cluster) != Ok(TableEntry::Terminal) {
                rep.push(Finding::err(
                    "TABLE.RESERVED",
                    format!("Reserved cluster {cluster} is not marked terminal"),
                ));
            }
        }

        let mut bad = 0usize;
        for cluster in self.meta.first_data_unit()..=self.meta.last_data_unit() {
            if let Ok(TableEntry::Next(next)) = table.entry(cluster) {
                if !self.meta.is_valid_unit(next) {
                    bad += 1;
                    rep.push(Finding::err(
                        "TABLE.RANGE",
                        format!("Cluster {cluster} points outside the data area ({next})"),
                    ));
                }
            }
        }

        let cluster_table = &self.image.as_bytes()[self.meta.cluster_range(SFAT_TABLE_CLUSTER as usize)];
        let tail = &cluster_table[self.meta.allocatable_end() as usize..];
        if tail.iter().any(|&b| b != 0) {
            rep.push(Finding::warn(
                "TABLE.RANGE",
                "Non-zero bytes past the last addressable entry",
            ));
        }

        if bad == 0 {
            rep.push(Finding::info(
                "TABLE.RANGE",
                format!(
                    "{} data clusters, {} free",
                    self.meta.total_units(),
                    table.free_clusters()
                ),
            ));
        }
        Ok(())
    }

    fn check_directory(&mut self, rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        let directory = self.image.directory(self.meta);
        let mut seen = [false; 256];
        let mut files = 0usize;

        for (index, record) in directory.entries() {
            files += 1;
            let slot = &mut seen[record.name as usize];
            if *slot {
                rep.push(Finding::err(
                    "DIR.DUP",
                    format!("Duplicate name {:?} at record {index}", record.name_char()),
                ));
            }
            *slot = true;
        }

        rep.push(Finding::info(
            "DIR.RECORDS",
            format!("{files} of {} records in use", directory.capacity()),
        ));
        Ok(())
    }

    fn check_chain(&mut self, rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        let table = self.image.table(self.meta);

        for (index, record) in self.image.directory(self.meta).entries() {
            match table.chain(record.start_cluster) {
                Err(e) => rep.push(Finding::err(
                    "CHAIN.WALK",
                    format!("File {:?} (record {index}): {e}", record.name_char()),
                )),
                Ok(chain) if chain.len() != record.cluster_count as usize => {
                    rep.push(Finding::err(
                        "DIR.COUNT",
                        format!(
                            "File {:?}: record says {} clusters, chain has {}",
                            record.name_char(),
                            record.cluster_count,
                            chain.len()
                        ),
                    ))
                }
                Ok(_) => {}
            }
        }
        Ok(())
    }

    fn check_cross_reference(&mut self, rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        let mut owner: Vec<Option<char>> = vec![None; self.meta.allocatable_end() as usize];

        for (name, chain) in self.walkable_chains() {
            for cluster in chain {
                match owner[cluster as usize] {
                    Some(other) => rep.push(Finding::err(
                        "CHAIN.CROSS",
                        format!("Cluster {cluster} shared by {other:?} and {name:?}"),
                    )),
                    None => owner[cluster as usize] = Some(name),
                }
            }
        }

        let table = self.image.table(self.meta);
        let mut orphans = 0usize;
        for cluster in self.meta.first_data_unit()..=self.meta.last_data_unit() {
            let used = !matches!(table.entry(cluster), Ok(TableEntry::Free));
            if used && owner[cluster as usize].is_none() {
                orphans += 1;
                rep.push(Finding::err(
                    "TABLE.ORPHAN",
                    format!("Cluster {cluster} is allocated but no file reaches it"),
                ));
            }
        }

        if orphans == 0 {
            rep.push(Finding::info("TABLE.ORPHAN", "Every allocated cluster is owned"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfat::{config::SfatConfig, directory::DirRecord};

    fn image() -> (SfatMeta, VolumeImage) {
        let meta = SfatMeta::new(&SfatConfig::default()).unwrap();
        let mut image = VolumeImage::zeroed(&meta);
        image.set_label(&meta, meta.default_label().as_bytes());
        image.cluster_io_mut(&meta).table.reset().unwrap();
        (meta, image)
    }

    #[test]
    fn test_clean_volume_has_no_errors() {
        let (meta, mut image) = image();
        {
            let mut io = image.cluster_io_mut(&meta);
            let (origin, start) = io.create(b'a').unwrap();
            io.write(origin, start, &[b'a'; 250]).unwrap();
        }

        let rep = SfatChecker::new(&image, &meta).check_all().unwrap();
        assert!(rep.ok(), "{}", rep.warn_and_errors());
        assert_eq!(rep.count(Severity::Warn), 0);
    }

    #[test]
    fn test_detects_count_mismatch_and_orphan() {
        let (meta, mut image) = image();
        {
            let mut io = image.cluster_io_mut(&meta);
            let (origin, start) = io.create(b'a').unwrap();
            io.write(origin, start, &[b'a'; 150]).unwrap();
            io.directory
                .write_record(origin, DirRecord::new(b'a', start, 5))
                .unwrap();
            io.table.allocate().unwrap();
        }

        let rep = SfatChecker::new(&image, &meta).check_all().unwrap();
        assert_eq!(rep.with_code("DIR.COUNT").count(), 1);
        assert_eq!(rep.first_error().map(|f| f.code), Some("DIR.COUNT"));
        assert!(rep.with_code("TABLE.ORPHAN").any(|f| f.sev == Severity::Error));
    }

    #[test]
    fn test_detects_cross_linked_chains_and_duplicates() {
        let (meta, mut image) = image();
        {
            let mut io = image.cluster_io_mut(&meta);
            let (_, start) = io.create(b'a').unwrap();
            io.directory.write_record(1, DirRecord::new(b'a', start, 1)).unwrap();
        }

        let rep = SfatChecker::new(&image, &meta).check_all().unwrap();
        assert!(rep.with_code("DIR.DUP").count() == 1);
        assert!(rep.with_code("CHAIN.CROSS").count() == 1);
    }

    #[test]
    fn test_detects_broken_reserved_entry_and_walk() {
        let (meta, mut image) = image();
        {
            let mut io = image.cluster_io_mut(&meta);
            let (_, start) = io.create(b'a').unwrap();
            io.table.set(start, TableEntry::Next(start)).unwrap();
            io.table.set(0, TableEntry::Free).unwrap();
        }

        let opts = VerifyOptions {
            phases: VerifyPhases::TABLE | VerifyPhases::CHAIN,
            fail_fast: false,
        };
        let rep = SfatChecker::new(&image, &meta).check_with(&opts).unwrap();
        assert_eq!(rep.with_code("TABLE.RESERVED").count(), 1);
        assert_eq!(rep.with_code("CHAIN.WALK").count(), 1);
        assert_eq!(rep.with_code("SUPER.LABEL").count(), 0);
    }
}
