/// Block size of the emulated volume, fixed by the mass storage protocol
pub const BLOCK_SIZE: usize = 512;
/// Smallest erasable unit of the backing NOR flash
pub const FLASH_PAGE_SIZE: usize = 4096;
pub const BLOCKS_PER_PAGE: usize = FLASH_PAGE_SIZE / BLOCK_SIZE;
/// Largest data payload handed to a single WRITE(10) callback
pub const MAX_TRANSFER_BYTES: usize = FLASH_PAGE_SIZE;

// FAT12 geometry of the formatted image
pub const RESERVED_SECTORS: u32 = 1;
pub const SECTORS_PER_FAT: u32 = 7;
pub const ROOT_DIR_SECTORS: u32 = 8;
pub const ROOT_DIR_ENTRIES: u32 = ROOT_DIR_SECTORS * BLOCK_SIZE as u32 / 32;
pub const START_FAT0: u32 = RESERVED_SECTORS;
pub const START_ROOTDIR: u32 = START_FAT0 + SECTORS_PER_FAT;
/// First LBA of the data region; everything below is filesystem metadata
pub const START_CLUSTERS: u32 = START_ROOTDIR + ROOT_DIR_SECTORS;

/// Value of erased NOR flash
pub const ERASED_BYTE: u8 = 0xFF;

const _: () = assert!(FLASH_PAGE_SIZE % BLOCK_SIZE == 0);
const _: () = assert!(START_CLUSTERS == 16);
