use packing::{Packed, PackedSize};

use crate::scsi::{enums::SenseKey, Sense};

/// Fixed format sense data, current errors
const RESPONSE_CODE_CURRENT_FIXED: u8 = 0x70;

/// REQUEST SENSE response in fixed format (SPC-4 4.5.3) without additional sense bytes
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct RequestSenseResponse {
    #[pkd(7, 7, 0, 0)]
    pub valid: bool,

    #[pkd(6, 0, 0, 0)]
    pub response_code: u8,

    #[pkd(3, 0, 2, 2)]
    pub sense_key: SenseKey,

    #[pkd(7, 0, 3, 6)]
    pub information: u32,

    /// n-7
    #[pkd(7, 0, 7, 7)]
    pub additional_sense_length: u8,

    #[pkd(7, 0, 8, 11)]
    pub command_specific_information: u32,

    #[pkd(7, 0, 12, 12)]
    pub additional_sense_code: u8,

    #[pkd(7, 0, 13, 13)]
    pub additional_sense_code_qualifier: u8,

    #[pkd(7, 0, 14, 14)]
    pub field_replaceable_unit_code: u8,

    #[pkd(7, 7, 15, 15)]
    pub sense_key_specific_valid: bool,

    #[pkd(6, 0, 15, 17)]
    pub sense_key_specific: u32,
}

impl RequestSenseResponse {
    pub const fn new(sense: Sense) -> Self {
        RequestSenseResponse {
            valid: false,
            response_code: RESPONSE_CODE_CURRENT_FIXED,
            sense_key: sense.key,
            information: 0,
            additional_sense_length: (<Self as PackedSize>::BYTES - 8) as u8,
            command_specific_information: 0,
            additional_sense_code: sense.asc,
            additional_sense_code_qualifier: sense.ascq,
            field_replaceable_unit_code: 0,
            sense_key_specific_valid: false,
            sense_key_specific: 0,
        }
    }
}

impl Default for RequestSenseResponse {
    fn default() -> Self { Self::new(Sense::NONE) }
}
