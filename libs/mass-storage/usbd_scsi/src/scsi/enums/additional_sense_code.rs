// There are many more variants (see asc-num.txt) but these are the ones the mass storage
// volume reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdditionalSenseCode {
    /// ASC 0x0, ASCQ: 0x0 - NO ADDITIONAL SENSE INFORMATION
    NoAdditionalSenseInformation,
    /// ASC 0x4, ASCQ: 0x7 - LOGICAL UNIT NOT READY, OPERATION IN PROGRESS
    OperationInProgress,
    /// ASC 0xC, ASCQ: 0x0 - WRITE ERROR
    WriteError,
    /// ASC 0x11, ASCQ: 0x0 - UNRECOVERED READ ERROR
    UnrecoveredReadError,
    /// ASC 0x21, ASCQ: 0x0 - LOGICAL BLOCK ADDRESS OUT OF RANGE
    LogicalBlockAddressOutOfRange,
    /// ASC 0x24, ASCQ: 0x0 - INVALID FIELD IN CDB
    InvalidFieldInCdb,
    /// ASC 0x51, ASCQ: 0x0 - ERASE FAILURE
    EraseFailure,
}

impl AdditionalSenseCode {
    /// Returns the ASC code for this variant
    pub const fn asc(&self) -> u8 {
        match self {
            AdditionalSenseCode::NoAdditionalSenseInformation => 0x00,
            AdditionalSenseCode::OperationInProgress => 0x04,
            AdditionalSenseCode::WriteError => 0x0C,
            AdditionalSenseCode::UnrecoveredReadError => 0x11,
            AdditionalSenseCode::LogicalBlockAddressOutOfRange => 0x21,
            AdditionalSenseCode::InvalidFieldInCdb => 0x24,
            AdditionalSenseCode::EraseFailure => 0x51,
        }
    }

    /// Returns the ASCQ code for this variant
    pub const fn ascq(&self) -> u8 {
        match self {
            AdditionalSenseCode::OperationInProgress => 0x07,
            _ => 0x00,
        }
    }
}

impl Default for AdditionalSenseCode {
    fn default() -> Self { AdditionalSenseCode::NoAdditionalSenseInformation }
}
