use usbd_scsi::{InquiryResponse, StaticDescriptors};

use crate::api::*;

/// Board specific parameters of the mass storage volume
///
/// Everything the host sees is derived from this at compile time; nothing is negotiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Flash address of LBA 0, must be page aligned
    pub flash_base: u32,
    /// Number of 512 byte blocks advertised to the host
    pub block_count: u32,
    pub vendor: &'static str,
    pub product: &'static str,
    pub revision: &'static str,
    /// Up to 11 characters, stored in the boot sector and the root directory
    pub volume_label: &'static str,
}

/// nRF52840 Feather: 4 MiB volume starting 1 MiB into flash
pub const FEATHER52840: DeviceConfig = DeviceConfig {
    flash_base: 0x0010_0000,
    block_count: 8192,
    vendor: "Adafruit",
    product: "Feather52840",
    revision: "1.0",
    volume_label: "FTHR840BOOT",
};

impl Default for DeviceConfig {
    fn default() -> Self { FEATHER52840 }
}

impl DeviceConfig {
    /// Panics on an unaligned base or an empty volume
    pub const fn layout(&self) -> VolumeLayout {
        assert!(self.flash_base as usize % FLASH_PAGE_SIZE == 0);
        assert!(self.block_count > START_CLUSTERS);
        VolumeLayout { flash_base: self.flash_base, block_count: self.block_count }
    }

    pub const fn descriptors(&self) -> StaticDescriptors {
        StaticDescriptors::new(
            InquiryResponse::new(self.vendor, self.product, self.revision),
            self.block_count,
            BLOCK_SIZE as u32,
        )
    }
}

/// Translation between logical blocks and flash addresses
///
/// The whole formatted image lives in flash, so the mapping is linear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeLayout {
    pub flash_base: u32,
    pub block_count: u32,
}

impl VolumeLayout {
    /// True if `len` bytes starting at `lba` stay inside the volume
    pub fn contains(&self, lba: u32, len: usize) -> bool {
        let end = lba as u64 * BLOCK_SIZE as u64 + len as u64;
        end <= self.block_count as u64 * BLOCK_SIZE as u64
    }

    pub fn block_address(&self, lba: u32) -> u32 { self.flash_base + lba * BLOCK_SIZE as u32 }

    pub fn page_address(address: u32) -> u32 { address & !(FLASH_PAGE_SIZE as u32 - 1) }

    pub fn is_metadata(lba: u32) -> bool { lba < START_CLUSTERS }

    pub fn end_address(&self) -> u32 { self.block_address(self.block_count) }
}
