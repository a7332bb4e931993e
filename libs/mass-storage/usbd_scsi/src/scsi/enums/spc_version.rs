use packing::Packed;

/// VERSION field of the standard INQUIRY data
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
pub enum SpcVersion {
    // The device server does not claim conformance to any standard.
    None = 0x00,
    // ANSI X3.131:1994 (SCSI-2). Mass storage hosts accept this from bulk-only devices.
    Scsi2 = 0x02,
    // The device server complies to ANSI INCITS 408-2005 (SPC-3).
    Spc3 = 0x05,
    // The device server complies to SPC-4.
    Spc4 = 0x06,
}

impl Default for SpcVersion {
    fn default() -> Self { SpcVersion::Scsi2 }
}
