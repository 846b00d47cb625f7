// SPDX-License-Identifier: MIT

pub use crate::core::errors::{SfatResult, SfatError};

/// A Formatter for a volume layout.
///
/// Implementations encapsulate all required state (target image, geometry, label).
pub trait FsFormatter {
    /// Lay down a fresh, empty volume.
    #[must_use = "format result must be checked for errors"]
    fn format(&mut self) -> SfatResult;
}
