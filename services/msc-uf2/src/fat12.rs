use packing::{Packed, PackedSize};
use usbd_scsi::space_padded;

use crate::api::*;
use crate::config::DeviceConfig;
use crate::read::MetadataSource;

const MEDIA_FIXED_DISK: u8 = 0xF8;
const ATTR_VOLUME_LABEL: u8 = 0x08;
// FAT12 entries are a byte and a half
const FAT_ENTRIES: u32 = SECTORS_PER_FAT * BLOCK_SIZE as u32 * 2 / 3;

/// Smallest power of two cluster size whose cluster count fits the fixed FAT
const fn sectors_per_cluster(block_count: u32) -> u8 {
    let data_sectors = block_count - START_CLUSTERS;
    let mut spc = 1u32;
    while data_sectors / spc + 2 > FAT_ENTRIES {
        spc *= 2;
    }
    assert!(spc <= 128);
    spc as u8
}

/// One 32 byte short-name entry of the root directory
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Packed)]
#[packed(little_endian, lsb0)]
pub struct DirectoryEntry {
    #[pkd(7, 0, 0, 10)]
    pub name: [u8; 11],

    #[pkd(7, 0, 11, 11)]
    pub attrs: u8,

    #[pkd(7, 0, 12, 12)]
    _reserved: u8,

    #[pkd(7, 0, 13, 13)]
    pub create_time_fine: u8,

    #[pkd(7, 0, 14, 15)]
    pub create_time: u16,

    #[pkd(7, 0, 16, 17)]
    pub create_date: u16,

    #[pkd(7, 0, 18, 19)]
    pub last_access_date: u16,

    #[pkd(7, 0, 20, 21)]
    pub high_start_cluster: u16,

    #[pkd(7, 0, 22, 23)]
    pub update_time: u16,

    #[pkd(7, 0, 24, 25)]
    pub update_date: u16,

    #[pkd(7, 0, 26, 27)]
    pub start_cluster: u16,

    #[pkd(7, 0, 28, 31)]
    pub size: u32,
}

impl DirectoryEntry {
    /// Volume label entry: no clusters, no size
    pub fn volume_label(label: [u8; 11]) -> Self {
        DirectoryEntry { name: label, attrs: ATTR_VOLUME_LABEL, ..Default::default() }
    }
}

/// BIOS parameter block and extended boot record
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(little_endian, lsb0)]
pub struct FatBootBlock {
    #[pkd(7, 0, 0, 2)]
    pub jump_instruction: [u8; 3],

    #[pkd(7, 0, 3, 10)]
    pub oem_info: [u8; 8],

    #[pkd(7, 0, 11, 12)]
    pub sector_size: u16,

    #[pkd(7, 0, 13, 13)]
    pub sectors_per_cluster: u8,

    #[pkd(7, 0, 14, 15)]
    pub reserved_sectors: u16,

    #[pkd(7, 0, 16, 16)]
    pub fat_copies: u8,

    #[pkd(7, 0, 17, 18)]
    pub root_directory_entries: u16,

    /// Zero when the volume needs `total_sectors32`
    #[pkd(7, 0, 19, 20)]
    pub total_sectors16: u16,

    #[pkd(7, 0, 21, 21)]
    pub media_descriptor: u8,

    #[pkd(7, 0, 22, 23)]
    pub sectors_per_fat: u16,

    #[pkd(7, 0, 24, 25)]
    pub sectors_per_track: u16,

    #[pkd(7, 0, 26, 27)]
    pub heads: u16,

    #[pkd(7, 0, 28, 31)]
    pub hidden_sectors: u32,

    #[pkd(7, 0, 32, 35)]
    pub total_sectors32: u32,

    #[pkd(7, 0, 36, 36)]
    pub physical_drive_num: u8,

    #[pkd(7, 0, 37, 37)]
    _reserved: u8,

    #[pkd(7, 0, 38, 38)]
    pub extended_boot_sig: u8,

    #[pkd(7, 0, 39, 42)]
    pub volume_serial_number: u32,

    #[pkd(7, 0, 43, 53)]
    pub volume_label: [u8; 11],

    #[pkd(7, 0, 54, 61)]
    pub filesystem_identifier: [u8; 8],
}

impl FatBootBlock {
    pub const fn new(block_count: u32, volume_label: &str) -> Self {
        let small = block_count <= u16::MAX as u32;
        FatBootBlock {
            jump_instruction: [0xEB, 0x3C, 0x90],
            oem_info: space_padded::<8>("UF2 UF2"),
            sector_size: BLOCK_SIZE as u16,
            sectors_per_cluster: sectors_per_cluster(block_count),
            reserved_sectors: RESERVED_SECTORS as u16,
            fat_copies: 1,
            root_directory_entries: ROOT_DIR_ENTRIES as u16,
            total_sectors16: if small { block_count as u16 } else { 0 },
            media_descriptor: MEDIA_FIXED_DISK,
            sectors_per_fat: SECTORS_PER_FAT as u16,
            sectors_per_track: 1,
            heads: 1,
            hidden_sectors: 0,
            total_sectors32: if small { 0 } else { block_count },
            physical_drive_num: 0x80,
            _reserved: 0,
            extended_boot_sig: 0x29,
            volume_serial_number: 0x0042_0042,
            volume_label: space_padded::<11>(volume_label),
            filesystem_identifier: space_padded::<8>("FAT12"),
        }
    }
}

/// Dummy FAT metadata synthesised on the fly instead of read from flash
///
/// Presents an empty volume carrying only its label; the data region still comes from flash.
pub struct Fat12Volume {
    boot_block: FatBootBlock,
}

impl Fat12Volume {
    pub const fn new(config: &DeviceConfig) -> Self {
        Fat12Volume { boot_block: FatBootBlock::new(config.block_count, config.volume_label) }
    }

    pub fn boot_block(&self) -> &FatBootBlock { &self.boot_block }
}

impl MetadataSource for Fat12Volume {
    fn read_metadata(&self, lba: u32, block: &mut [u8]) -> bool {
        if lba >= START_CLUSTERS {
            return false;
        }
        log::trace!("ghost FAT reading block {}", lba);
        // Clear the buffer since we're sending all of it
        block.fill(0);

        let packed = if lba == 0 {
            block[510] = 0x55;
            block[511] = 0xAA;
            self.boot_block.pack(&mut block[..FatBootBlock::BYTES])
        } else if lba == START_FAT0 {
            // cluster 0 carries the media descriptor, cluster 1 is reserved
            block[0] = self.boot_block.media_descriptor;
            block[1] = 0xFF;
            block[2] = 0xFF;
            Ok(())
        } else if lba == START_ROOTDIR {
            DirectoryEntry::volume_label(self.boot_block.volume_label)
                .pack(&mut block[..DirectoryEntry::BYTES])
        } else {
            Ok(())
        };
        if let Err(e) = packed {
            log::error!("ghost FAT block {} failed to pack: {:?}", lba, e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use packing::{Packed, PackedSize};

    use super::*;
    use crate::config::FEATHER52840;

    #[test]
    fn boot_sector_geometry() {
        let volume = Fat12Volume::new(&FEATHER52840);
        let mut block = [0xA5u8; BLOCK_SIZE];
        assert!(volume.read_metadata(0, &mut block));
        assert_eq!(&block[0..3], &[0xEB, 0x3C, 0x90]);
        assert_eq!(&block[3..11], b"UF2 UF2 ");
        assert_eq!(u16::from_le_bytes([block[11], block[12]]), 512);
        assert_eq!(block[13], 4);
        assert_eq!(u16::from_le_bytes([block[14], block[15]]), 1);
        assert_eq!(block[16], 1);
        assert_eq!(u16::from_le_bytes([block[17], block[18]]), 128);
        assert_eq!(u16::from_le_bytes([block[19], block[20]]), 8192);
        assert_eq!(block[21], 0xF8);
        assert_eq!(u16::from_le_bytes([block[22], block[23]]), 7);
        assert_eq!(&block[43..54], b"FTHR840BOOT");
        assert_eq!(&block[54..62], b"FAT12   ");
        assert_eq!(&block[510..], &[0x55, 0xAA]);
        assert!(block[62..510].iter().all(|&b| b == 0));
    }

    #[test]
    fn fat_and_root_directory() {
        let volume = Fat12Volume::new(&FEATHER52840);
        let mut block = [0u8; BLOCK_SIZE];
        assert!(volume.read_metadata(START_FAT0, &mut block));
        assert_eq!(&block[..4], &[0xF8, 0xFF, 0xFF, 0x00]);

        assert!(volume.read_metadata(START_ROOTDIR, &mut block));
        assert_eq!(&block[..11], b"FTHR840BOOT");
        assert_eq!(block[11], 0x08);
        assert!(block[DirectoryEntry::BYTES..].iter().all(|&b| b == 0));

        assert!(volume.read_metadata(START_FAT0 + 1, &mut block));
        assert!(block.iter().all(|&b| b == 0));
        assert!(!volume.read_metadata(START_CLUSTERS, &mut block));
    }

    #[test]
    fn label_entry_layout() {
        let mut raw = [0xFFu8; 32];
        assert_eq!(DirectoryEntry::BYTES, 32);
        DirectoryEntry::volume_label(*b"NO NAME    ").pack(&mut raw).unwrap();
        assert_eq!(&raw[..11], b"NO NAME    ");
        assert_eq!(raw[11], 0x08);
        assert!(raw[12..].iter().all(|&b| b == 0));
        assert_eq!(DirectoryEntry::unpack(&raw).unwrap().attrs, 0x08);
    }

    #[test]
    fn cluster_count_fits_fat() {
        assert_eq!(sectors_per_cluster(8192), 4);
        assert_eq!(sectors_per_cluster(1024), 1);
        let large = FatBootBlock::new(100_000, "BIG");
        assert_eq!(large.total_sectors16, 0);
        assert_eq!(large.total_sectors32, 100_000);
        assert_eq!(large.sectors_per_cluster, 64);
    }
}
