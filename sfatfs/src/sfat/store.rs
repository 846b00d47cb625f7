// SPDX-License-Identifier: MIT

use sfatio::{VolumeIO, VolumeIOExt, VolumeIOSetLen};

use crate::core::errors::SfatResult;
use crate::sfat::{config::SfatConfig, formatter::*, image::VolumeImage, meta::SfatMeta};

/// Owns the backing IO and moves whole images in and out of it.
pub struct VolumeStore<IO: VolumeIO> {
    io: IO,
    meta: SfatMeta,
}

impl<IO: VolumeIO> VolumeStore<IO> {
    pub fn new(io: IO, config: &SfatConfig) -> SfatResult<Self> {
        let meta = SfatMeta::new(config)?;
        Ok(Self { io, meta })
    }

    #[inline]
    pub fn meta(&self) -> &SfatMeta {
        &self.meta
    }

    /// Reads the whole image in one call.
    pub fn load(&mut self) -> SfatResult<VolumeImage> {
        let bytes = self.io.read_to_vec(0, self.meta.capacity as usize)?;
        VolumeImage::from_bytes(&self.meta, bytes)
    }

    /// Writes the whole image in one call, then flushes.
    pub fn persist(&mut self, image: &VolumeImage) -> SfatResult {
        self.io.write_at(0, image.as_bytes())?;
        self.io.flush()?;
        Ok(())
    }

    pub fn format(&mut self, label: &[u8]) -> SfatResult<VolumeImage> {
        SfatFormatter::new(&mut self.io, &self.meta, label).format()?;
        self.load()
    }

    pub fn into_inner(self) -> IO {
        self.io
    }
}

impl<IO: VolumeIOSetLen> VolumeStore<IO> {
    /// Loads the image, rebuilding a fresh volume when the backing store
    /// is short, unreadable, or carries no valid table.
    ///
    /// A longer backing store is truncated to the volume capacity.
    pub fn mount(&mut self) -> SfatResult<VolumeImage> {
        match self.load() {
            Ok(image) if image.is_formatted(&self.meta) => {
                let len = self.io.stored_len()?;
                if len != self.meta.capacity {
                    log::warn!("backing store is {len} bytes, trimming to {}", self.meta.capacity);
                    self.io.set_len(self.meta.capacity)?;
                }
                return Ok(image);
            }
            Ok(_) => log::warn!("volume is not formatted, creating a new one"),
            Err(e) => log::warn!("volume mount failed: {e}, creating a new one"),
        }

        self.io.set_len(self.meta.capacity)?;
        let label = self.meta.default_label();
        self.format(label.as_bytes())
    }
}
