// SPDX-License-Identifier: MIT

// === Default Volume Geometry ===

pub const SFAT_DEFAULT_CAPACITY: u64 = 3000;
pub const SFAT_DEFAULT_CLUSTER_SIZE: u32 = 100;
pub const SFAT_DEFAULT_RESERVED_CLUSTERS: u8 = 3;
pub const SFAT_DEFAULT_DISC_PATH: &str = "disc";

// === Structural Clusters ===

pub const SFAT_SUPERBLOCK_CLUSTER: u8 = 0;
pub const SFAT_TABLE_CLUSTER: u8 = 1;
pub const SFAT_ROOT_CLUSTER: u8 = 2;
pub const SFAT_STRUCTURAL_CLUSTERS: u8 = 3;

// === Allocation Table ===

pub const SFAT_ENTRY_FREE: u8 = 0x00;
pub const SFAT_ENTRY_TERMINAL: u8 = 0xFF;
/// Indices 0..=254 fit in an entry; 0xFF is the terminal marker.
pub const SFAT_MAX_TABLE_ENTRIES: usize = SFAT_ENTRY_TERMINAL as usize;

// === Root Directory ===

pub const SFAT_DIR_RECORD_SIZE: usize = 3;
pub const SFAT_NAME_FREE: u8 = 0x00;

// === Data Clusters ===

/// Trailing byte of every data cluster never carries payload.
pub const SFAT_CLUSTER_TAIL_BYTES: usize = 1;
pub const SFAT_MIN_CLUSTER_SIZE: u32 = 4;

// === Superblock ===

pub const SFAT_LABEL_PREFIX: &str = "SIMPLE FAT FILE SYSTEM SIMULATION";
