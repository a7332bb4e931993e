use usbd_scsi::{AdditionalSenseCode, SenseKey};

use crate::api::BLOCK_SIZE;
use crate::config::VolumeLayout;
use crate::flash::{FlashError, FlashPageStore};

/// Supplies the contents of filesystem metadata blocks (LBA below the data region)
pub trait MetadataSource {
    /// Fill `block` for `lba` and return true, or return false to have it read from flash
    fn read_metadata(&self, lba: u32, block: &mut [u8]) -> bool;
}

/// Metadata is part of the formatted image in flash, like every other block
#[derive(Debug, Default, Clone, Copy)]
pub struct FlashResident;

impl MetadataSource for FlashResident {
    fn read_metadata(&self, _lba: u32, _block: &mut [u8]) -> bool { false }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// Reads always start on a block boundary
    OffsetNotSupported,
    /// The destination is not a whole number of blocks
    UnalignedLength,
    OutOfRange,
    Flash(FlashError),
}

impl From<FlashError> for ReadError {
    fn from(e: FlashError) -> Self { ReadError::Flash(e) }
}

impl ReadError {
    pub fn sense(&self) -> (SenseKey, AdditionalSenseCode) {
        match self {
            ReadError::OffsetNotSupported | ReadError::UnalignedLength => {
                (SenseKey::IllegalRequest, AdditionalSenseCode::InvalidFieldInCdb)
            }
            ReadError::OutOfRange => (SenseKey::IllegalRequest, AdditionalSenseCode::LogicalBlockAddressOutOfRange),
            ReadError::Flash(_) => (SenseKey::MediumError, AdditionalSenseCode::UnrecoveredReadError),
        }
    }
}

/// Copies blocks out of the volume, one block translation at a time
pub struct BlockReadService<M: MetadataSource = FlashResident> {
    layout: VolumeLayout,
    metadata: M,
}

impl<M: MetadataSource> BlockReadService<M> {
    pub fn new(layout: VolumeLayout, metadata: M) -> Self { BlockReadService { layout, metadata } }

    pub fn metadata(&self) -> &M { &self.metadata }

    /// Fill `buf` with consecutive blocks starting at `start_lba`, returns bytes copied
    pub fn read<F: FlashPageStore>(&self, flash: &F, start_lba: u32, buf: &mut [u8]) -> Result<usize, ReadError> {
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(ReadError::UnalignedLength);
        }
        if !self.layout.contains(start_lba, buf.len()) {
            return Err(ReadError::OutOfRange);
        }
        for (lba, block) in (start_lba..).zip(buf.chunks_exact_mut(BLOCK_SIZE)) {
            if VolumeLayout::is_metadata(lba) && self.metadata.read_metadata(lba, block) {
                continue;
            }
            flash.read(self.layout.block_address(lba), block)?;
        }
        Ok(buf.len())
    }
}
