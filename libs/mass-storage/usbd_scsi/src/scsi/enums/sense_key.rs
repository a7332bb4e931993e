use packing::Packed;

/// Sense keys from SPC-4 table 48, only the low nibble of byte 2 in fixed format sense data
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
pub enum SenseKey {
    /// No specific sense key information to be reported
    NoSense = 0x0,
    RecoveredError = 0x1,
    /// The logical unit is not accessible, e.g. an operation is still in progress
    NotReady = 0x2,
    /// Non-recovered error probably caused by a flaw in the medium or the recorded data
    MediumError = 0x3,
    /// Non-recoverable hardware failure detected while performing the command
    HardwareError = 0x4,
    /// Illegal parameter in the CDB or an unsupported command
    IllegalRequest = 0x5,
    UnitAttention = 0x6,
    DataProtect = 0x7,
    BlankCheck = 0x8,
    VendorSpecific = 0x9,
    CopyAborted = 0xA,
    AbortedCommand = 0xB,
    VolumeOverflow = 0xD,
    Miscompare = 0xE,
    Completed = 0xF,
}

impl Default for SenseKey {
    fn default() -> Self { SenseKey::NoSense }
}
