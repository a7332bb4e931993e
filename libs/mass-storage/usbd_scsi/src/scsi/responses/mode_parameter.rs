use packing::{Packed, PackedSize};

use crate::scsi::enums::MediumType;

/// Mode parameter header for MODE SENSE (6) with no block descriptors and no pages
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ModeParameterHeader6 {
    /// Length in bytes of the data following this field
    #[pkd(7, 0, 0, 0)]
    pub mode_data_length: u8,

    #[pkd(7, 0, 1, 1)]
    pub medium_type: MediumType,

    /// Bit 7 is WP (write protected)
    #[pkd(7, 0, 2, 2)]
    pub device_specific_parameter: u8,

    #[pkd(7, 0, 3, 3)]
    pub block_descriptor_length: u8,
}

impl ModeParameterHeader6 {
    pub const DEFAULT: Self = ModeParameterHeader6 {
        mode_data_length: (<Self as PackedSize>::BYTES - 1) as u8,
        medium_type: MediumType::Sbc,
        device_specific_parameter: 0,
        block_descriptor_length: 0,
    };
}

impl Default for ModeParameterHeader6 {
    fn default() -> Self { Self::DEFAULT }
}
