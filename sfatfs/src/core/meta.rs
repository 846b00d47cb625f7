// SPDX-License-Identifier: MIT

/// Trait implemented by each volume geometry structure.
/// Provides the static layout needed during formatting, allocation, I/O and checking.
pub trait FsMeta<Unit: Ord + Copy> {
    /// Size of one allocation unit in bytes.
    fn unit_size(&self) -> usize;

    /// Offset (in bytes) on disk of a given allocation unit.
    fn unit_offset(&self, unit: Unit) -> u64;

    /// Root unit (root directory cluster).
    fn root_unit(&self) -> Unit;

    /// First valid unit for allocation.
    fn first_data_unit(&self) -> Unit;

    /// Last valid unit for allocation.
    fn last_data_unit(&self) -> Unit;

    /// Total number of allocatable units.
    fn total_units(&self) -> usize;

    /// Total size in bytes of the volume.
    fn size_bytes(&self) -> u64;

    /// Check if a given unit is valid for allocation on this volume.
    fn is_valid_unit(&self, unit: Unit) -> bool {
        unit >= self.first_data_unit() && unit <= self.last_data_unit()
    }
}
