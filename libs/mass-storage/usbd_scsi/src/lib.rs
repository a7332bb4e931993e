//! Responder for the small slice of the SCSI transparent command set that a USB mass storage
//! volume needs to answer before the host will mount it.
//!
//! Data-class commands (READ(10)/WRITE(10)) are not handled here; the owner of the block
//! storage services them and only routes the inquiry/status class through
//! [CommandResponder](struct.CommandResponder.html).
//!
//! # Glossary
//!
//! | Term   | Description | More Info |
//! |--------|-------------|-----------|
//! | LBA    | Logical block address, zero based index of a block on the medium | SBC-3 |
//! | Sense  | Key, additional sense code and qualifier describing the last error | Section 4.5 SPC-4 |
//! | ASC    | Additional sense code | Section 4.5.6 SPC-4 |
//! | ASCQ   | Additional sense code qualifier | Section 4.5.6 SPC-4 |
//! | CDB    | Command descriptor block, the command bytes sent by the host | Section 4.2 SPC-4 |
//!

#![cfg_attr(target_os = "none", no_std)]

mod scsi;
pub use scsi::*;

mod logging {
    pub use log::debug as trace_scsi_command;
}
