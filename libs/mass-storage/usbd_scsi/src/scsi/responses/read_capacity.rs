use packing::Packed;

/// READ CAPACITY (10) parameter data
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ReadCapacity10Response {
    /// Address of the last addressable block, i.e. block count minus one
    #[pkd(7, 0, 0, 3)]
    pub max_lba: u32,

    /// Length in bytes of each logical block
    #[pkd(7, 0, 4, 7)]
    pub block_size: u32,
}
