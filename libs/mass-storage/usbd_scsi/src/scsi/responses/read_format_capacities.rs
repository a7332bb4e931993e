use packing::Packed;

/// Descriptor type of the current/maximum capacity descriptor
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
pub enum DescriptorType {
    Unformatted = 0x01,
    Formatted = 0x02,
    NoMedia = 0x03,
}

/// READ FORMAT CAPACITIES response: a capacity list header followed by the current/maximum
/// capacity descriptor. No formattable capacity descriptors are reported.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ReadFormatCapacitiesResponse {
    /// Length in bytes of the descriptors following the header
    #[pkd(7, 0, 3, 3)]
    pub capacity_list_length: u8,

    #[pkd(7, 0, 4, 7)]
    pub number_of_blocks: u32,

    #[pkd(1, 0, 8, 8)]
    pub descriptor_type: DescriptorType,

    #[pkd(7, 0, 9, 11)]
    pub block_length: u32,
}

impl ReadFormatCapacitiesResponse {
    // One current/maximum capacity descriptor
    const CAPACITY_LIST_LENGTH: u8 = 8;

    pub const fn formatted(number_of_blocks: u32, block_length: u32) -> Self {
        assert!(block_length <= 0x00FF_FFFF);
        ReadFormatCapacitiesResponse {
            capacity_list_length: Self::CAPACITY_LIST_LENGTH,
            number_of_blocks,
            descriptor_type: DescriptorType::Formatted,
            block_length,
        }
    }
}
