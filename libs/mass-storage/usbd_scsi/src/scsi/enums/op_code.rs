use num_traits::FromPrimitive;

/// SCSI op codes as defined by SPC-3
///
/// Only the first group is answered by the responder; the data-class commands are listed so
/// the owner of the block storage can recognise them when routing a CDB.
#[derive(Clone, Copy, Eq, PartialEq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum OpCode {
    TestUnitReady = 0x00,
    RequestSense = 0x03,
    Inquiry = 0x12,
    ModeSense6 = 0x1A,
    PreventAllowMediumRemoval = 0x1E,
    ReadFormatCapacities = 0x23,
    ReadCapacity10 = 0x25,

    Read10 = 0x28,
    Write10 = 0x2A,
    StartStopUnit = 0x1B,
    Verify10 = 0x2F,
    SynchronizeCache10 = 0x35,
    ModeSense10 = 0x5A,
}

impl OpCode {
    pub fn from_byte(op_code: u8) -> Option<Self> { FromPrimitive::from_u8(op_code) }

    /// READ(10) and WRITE(10) move blocks and never go through the responder
    pub fn is_data_transfer(&self) -> bool { matches!(self, OpCode::Read10 | OpCode::Write10) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_and_unknown_bytes() {
        assert_eq!(OpCode::from_byte(0x12), Some(OpCode::Inquiry));
        assert_eq!(OpCode::from_byte(0x25), Some(OpCode::ReadCapacity10));
        assert_eq!(OpCode::from_byte(0x1E), Some(OpCode::PreventAllowMediumRemoval));
        assert_eq!(OpCode::from_byte(0xA0), None);
        assert!(OpCode::Write10.is_data_transfer());
        assert!(!OpCode::Inquiry.is_data_transfer());
    }
}
