// SPDX-License-Identifier: MIT

pub mod checker;
pub mod cluster;
pub mod config;
pub mod constant;
pub mod directory;
pub mod filesystem;
pub mod formatter;
pub mod image;
pub mod meta;
pub mod session;
pub mod store;
pub mod table;

// === Public Interface ===
pub mod traits {
    pub use super::checker::SfatChecker;
    pub use super::cluster::{ClusterIO, DataRegion};
    pub use super::directory::{DirRecord, RootDirectory};
    pub use super::formatter::SfatFormatter;
    pub use super::meta::{ClusterIdx, SfatMeta};
    pub use super::table::{ClusterTable, TableEntry};
}

pub mod prelude {
    pub use super::cluster::{ClusterKind, ClusterView, WriteOutcome};
    pub use super::config::SfatConfig;
    pub use super::filesystem::{DirEntryInfo, SfatFs, VolumeStats};
    pub use super::image::VolumeImage;
    pub use super::session::{FileHandle, HandleState, validate_name};
    pub use super::store::VolumeStore;
    pub use super::traits::*;
    pub use crate::core::checker::{
        Finding, ReportDisplayOpts, Severity, VerifyOptions, VerifyPhases, VerifyReport,
    };
    pub use crate::core::errors::*;
    pub use crate::core::traits::*;
    pub use sfatio::prelude::*;
}
