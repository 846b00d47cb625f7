// SPDX-License-Identifier: MIT

// Core Modules
pub mod core;
pub mod sfat;

// Reusable types and traits
pub use crate::core::errors::*;
pub use crate::core::traits::*;

/// Simple FAT volume store.
///
/// See [`prelude::SfatFs`], [`prelude::ClusterTable`] and [`prelude::RootDirectory`].
pub mod prelude {
    pub use super::sfat::prelude::*;
}
