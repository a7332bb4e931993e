use packing::Packed;

use crate::{
    logging::*,
    scsi::{
        enums::{AdditionalSenseCode, OpCode, SenseKey},
        responses::*,
        Error, Sense,
    },
};

/// Answers the status-class commands of the SCSI transparent command set
///
/// Owns the sense record. After any answered command other than REQUEST SENSE the record is
/// cleared, so an initiator has to ask for sense immediately after the failing command to
/// observe it.
pub struct CommandResponder {
    descriptors: StaticDescriptors,
    sense: Sense,
}

impl CommandResponder {
    pub const fn new(descriptors: StaticDescriptors) -> Self {
        CommandResponder { descriptors, sense: Sense::NONE }
    }

    pub fn descriptors(&self) -> &StaticDescriptors { &self.descriptors }

    pub fn sense(&self) -> Sense { self.sense }

    /// Records an error for the next REQUEST SENSE
    pub fn set_sense(&mut self, key: SenseKey, code: AdditionalSenseCode) {
        self.sense = Sense::new(key, code);
    }

    pub fn clear_sense(&mut self) { self.sense.reset(); }

    /// Writes the response for `op_code` into `buf` and returns its length
    ///
    /// Unsupported op codes (including the data-class commands, which belong to the block
    /// layer) return an error and leave the sense record untouched.
    ///
    /// Panics if `buf` is shorter than the response; every response has a fixed size so a
    /// short buffer is a wiring mistake, and a truncated response would be corrupt.
    pub fn respond(&mut self, op_code: u8, buf: &mut [u8]) -> Result<usize, Error> {
        let command = match OpCode::from_byte(op_code) {
            Some(c) if !c.is_data_transfer() => c,
            _ => {
                trace_scsi_command!("unhandled op code {:#04x}", op_code);
                return Err(Error::UnhandledOpCode(op_code));
            }
        };
        trace_scsi_command!("COMMAND> {:?}", command);

        let len = match command {
            OpCode::Inquiry => pack_response(buf, &self.descriptors.inquiry)?,
            OpCode::ReadCapacity10 => pack_response(buf, &self.descriptors.read_capacity)?,
            OpCode::RequestSense => pack_response(buf, &RequestSenseResponse::new(self.sense))?,
            OpCode::ReadFormatCapacities => pack_response(buf, &self.descriptors.format_capacities)?,
            OpCode::ModeSense6 => pack_response(buf, &self.descriptors.mode_sense)?,
            OpCode::TestUnitReady | OpCode::PreventAllowMediumRemoval => 0,
            _ => {
                trace_scsi_command!("unhandled command {:?}", command);
                return Err(Error::UnhandledOpCode(op_code));
            }
        };

        if command != OpCode::RequestSense {
            self.sense.reset();
        }
        Ok(len)
    }
}

fn pack_response<T: Packed<Error = packing::Error>>(buf: &mut [u8], response: &T) -> Result<usize, Error> {
    assert!(buf.len() >= T::BYTES, "response of {} bytes exceeds buffer of {}", T::BYTES, buf.len());
    let out = &mut buf[..T::BYTES];
    out.fill(0);
    response.pack(out)?;
    Ok(T::BYTES)
}
