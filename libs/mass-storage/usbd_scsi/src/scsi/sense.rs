use crate::scsi::enums::{AdditionalSenseCode, SenseKey};

/// The "last error" record reported by REQUEST SENSE
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Sense {
    pub key: SenseKey,
    /// Additional sense code
    pub asc: u8,
    /// Additional sense code qualifier
    pub ascq: u8,
}

impl Sense {
    pub const NONE: Sense = Sense { key: SenseKey::NoSense, asc: 0, ascq: 0 };

    pub const fn new(key: SenseKey, code: AdditionalSenseCode) -> Self {
        Sense { key, asc: code.asc(), ascq: code.ascq() }
    }

    pub fn is_error(&self) -> bool { *self != Sense::NONE }

    pub fn reset(&mut self) { *self = Sense::NONE; }
}
