use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sfatfs::prelude::{SfatConfig, SfatError};
use sfatfs::sfat::constant::*;

/// `sfat.toml` layout:
///
/// ```toml
/// [volume]
/// capacity = 3000
/// cluster_size = 100
/// reserved_clusters = 3
/// path = "disc"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CtlConfig {
    #[serde(default)]
    pub volume: VolumeSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VolumeSection {
    pub capacity: u64,
    pub cluster_size: u32,
    pub reserved_clusters: u8,
    pub path: PathBuf,
}

impl Default for VolumeSection {
    fn default() -> Self {
        Self {
            capacity: SFAT_DEFAULT_CAPACITY,
            cluster_size: SFAT_DEFAULT_CLUSTER_SIZE,
            reserved_clusters: SFAT_DEFAULT_RESERVED_CLUSTERS,
            path: PathBuf::from(SFAT_DEFAULT_DISC_PATH),
        }
    }
}

impl CtlConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: CtlConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;

        if config.volume.path.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.volume.path = base.join(&config.volume.path);
        }
        Ok(config)
    }

    /// Resolves the volume configuration: file (if any), then `--disc` override.
    pub fn load(path: Option<&Path>, disc: Option<&Path>) -> anyhow::Result<SfatConfig> {
        let ctl = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let mut config = ctl.into_sfat();
        if let Some(disc) = disc {
            config = config.with_path(disc);
        }
        config.validate().map_err(SfatError::Config)?;
        Ok(config)
    }

    pub fn into_sfat(self) -> SfatConfig {
        let v = self.volume;
        SfatConfig::new(v.capacity, v.cluster_size)
            .with_reserved_clusters(v.reserved_clusters)
            .with_path(v.path)
    }
}
