use usbd_scsi::{AdditionalSenseCode, SenseKey};

use crate::api::{BLOCK_SIZE, FLASH_PAGE_SIZE};
use crate::config::VolumeLayout;
use crate::flash::{CompletionMailbox, FlashError, FlashOp, FlashPageStore};
use crate::logging::*;
use crate::staging::StagingBuffer;

/// Phase of the page write session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePhase {
    Idle,
    /// Page image merged into the staging buffer, erase issued
    Erasing,
    /// Erase confirmed, program not yet issued
    Erased,
    /// Program issued from the staging buffer
    Writing,
    /// Program confirmed, waiting for the caller to collect the result
    Written,
    /// The primitive reported a failed erase or program
    Failed,
}

/// Outcome of a write call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// This many bytes from the start of the data are on flash
    Accepted(usize),
    /// Flash is still working on the request, call again with the same data
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// Reading back the current page contents failed
    Flash(FlashError),
    EraseRejected(FlashError),
    /// The erased page and staged image are kept. Retrying issues the program again, and any
    /// other write programs the staged page before it starts its own session
    ProgramRejected(FlashError),
    EraseFailed,
    ProgramFailed,
    /// A different write arrived while a page session is outstanding
    SessionConflict,
    /// The write runs past the end of the volume, or starts beyond the end of the block
    OutOfRange,
}

impl From<FlashError> for WriteError {
    fn from(e: FlashError) -> Self { WriteError::Flash(e) }
}

impl WriteError {
    /// Sense data reported to the host for this error
    pub fn sense(&self) -> (SenseKey, AdditionalSenseCode) {
        match self {
            WriteError::EraseRejected(_) | WriteError::EraseFailed => {
                (SenseKey::MediumError, AdditionalSenseCode::EraseFailure)
            }
            WriteError::Flash(_) | WriteError::ProgramRejected(_) | WriteError::ProgramFailed => {
                (SenseKey::MediumError, AdditionalSenseCode::WriteError)
            }
            WriteError::SessionConflict => (SenseKey::NotReady, AdditionalSenseCode::OperationInProgress),
            WriteError::OutOfRange => (SenseKey::IllegalRequest, AdditionalSenseCode::LogicalBlockAddressOutOfRange),
        }
    }
}

/// The one page being rewritten, and the request that started it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WriteSession {
    page_address: u32,
    address: u32,
    len: usize,
}

/// Turns retried block writes into the erase, merge, program sequence of one flash page
///
/// Every call returns immediately. `Busy` tells the transport that nothing was consumed and
/// the same data has to be offered again; flash progress is picked up from the completion
/// mailbox at the top of the next call. Only one page session exists at a time; a request
/// for anything else while it is outstanding gets [`WriteError::SessionConflict`].
///
/// Once a rejected program has been reported, the session is detached from its caller: other
/// requests get `Busy` while the staged page is programmed on their calls, and take over once
/// it has landed.
pub struct BlockWriteController {
    layout: VolumeLayout,
    phase: WritePhase,
    session: Option<WriteSession>,
    /// The owner of `session` has been handed an error and may not come back
    detached: bool,
    failed_op: FlashOp,
    /// A program reading from `staging` has been accepted and its completion not seen yet.
    /// Survives [`reset`](Self::reset), as the primitive keeps reading the buffer.
    program_in_flight: bool,
    staging: StagingBuffer,
    mailbox: &'static CompletionMailbox,
}

impl BlockWriteController {
    pub const fn new(layout: VolumeLayout, mailbox: &'static CompletionMailbox) -> Self {
        BlockWriteController {
            layout,
            phase: WritePhase::Idle,
            session: None,
            detached: false,
            failed_op: FlashOp::Erase,
            program_in_flight: false,
            staging: StagingBuffer::new(),
            mailbox,
        }
    }

    pub fn phase(&self) -> WritePhase { self.phase }

    /// Abandon any session and forget stale completions
    pub fn reset(&mut self) {
        if self.phase != WritePhase::Idle {
            log::info!("abandoning write session {:x?} in {:?}", self.session, self.phase);
        }
        while let Some(completion) = self.mailbox.take() {
            if completion.op == FlashOp::Program {
                self.program_in_flight = false;
            }
        }
        if self.program_in_flight {
            log::info!("staging buffer held until the abandoned program completes");
        }
        self.release();
    }

    /// Write `data` at byte `offset` of block `lba`
    ///
    /// Data running past the end of the flash page is clipped; the accepted count tells the
    /// caller how much to re-issue for the next page.
    pub fn write<F: FlashPageStore>(
        &mut self,
        flash: &mut F,
        lba: u32,
        offset: usize,
        data: &[u8],
    ) -> Result<WriteStatus, WriteError> {
        self.poll();

        if offset >= BLOCK_SIZE || !self.layout.contains(lba, offset + data.len()) {
            return Err(WriteError::OutOfRange);
        }
        let address = self.layout.block_address(lba) + offset as u32;
        let page_address = VolumeLayout::page_address(address);
        let page_offset = (address - page_address) as usize;
        let len = data.len().min(FLASH_PAGE_SIZE - page_offset);
        let data = &data[..len];
        if len == 0 {
            return Ok(WriteStatus::Accepted(0));
        }

        match self.phase {
            WritePhase::Failed => {
                let e = match self.failed_op {
                    FlashOp::Erase => WriteError::EraseFailed,
                    FlashOp::Program => WriteError::ProgramFailed,
                };
                log::warn!("reporting {:?} for session {:x?}", e, self.session);
                self.release();
                Err(e)
            }
            WritePhase::Idle => self.start(flash, WriteSession { page_address, address, len }, data),
            phase => {
                let request = WriteSession { page_address, address, len };
                if self.session != Some(request) {
                    if self.detached {
                        return self.finish_detached(flash, request, data);
                    }
                    log::warn!("write {:x?} conflicts with outstanding {:x?}", request, self.session);
                    return Err(WriteError::SessionConflict);
                }
                match phase {
                    WritePhase::Erased => self.program(flash, page_address),
                    WritePhase::Written => {
                        trace_write_state!("page {:x} committed", page_address);
                        self.release();
                        Ok(WriteStatus::Accepted(len))
                    }
                    _ => Ok(WriteStatus::Busy),
                }
            }
        }
    }

    /// Push a detached session to completion on behalf of `request`, then start `request`
    fn finish_detached<F: FlashPageStore>(
        &mut self,
        flash: &mut F,
        request: WriteSession,
        data: &[u8],
    ) -> Result<WriteStatus, WriteError> {
        match self.phase {
            WritePhase::Erased => {
                let Some(session) = self.session else { return Ok(WriteStatus::Busy) };
                match flash.program_async(session.page_address, self.staging.as_page()) {
                    Ok(()) => {
                        self.program_in_flight = true;
                        self.set_phase(WritePhase::Writing);
                        Ok(WriteStatus::Busy)
                    }
                    Err(FlashError::Busy) => Ok(WriteStatus::Busy),
                    Err(e) => {
                        log::error!("dropping detached session {:x?}, page left erased: {:?}", session, e);
                        self.release();
                        self.start(flash, request, data)
                    }
                }
            }
            WritePhase::Written => {
                trace_write_state!("detached session {:x?} committed", self.session);
                self.release();
                self.start(flash, request, data)
            }
            _ => Ok(WriteStatus::Busy),
        }
    }

    /// Apply a pending completion, if it belongs to the outstanding session
    pub fn poll(&mut self) {
        let Some(completion) = self.mailbox.take() else { return };
        if completion.op == FlashOp::Program {
            self.program_in_flight = false;
        }
        let matches_session = self.session.map(|s| s.page_address) == Some(completion.page_address);
        let next = match (self.phase, completion.op) {
            (WritePhase::Erasing, FlashOp::Erase) if matches_session => {
                if completion.success { WritePhase::Erased } else { WritePhase::Failed }
            }
            (WritePhase::Writing, FlashOp::Program) if matches_session => {
                if completion.success { WritePhase::Written } else { WritePhase::Failed }
            }
            _ => {
                log::warn!("discarding stale completion {:x?} in {:?}", completion, self.phase);
                return;
            }
        };
        if next == WritePhase::Failed {
            log::error!("flash {:?} of page {:x} failed", completion.op, completion.page_address);
            self.failed_op = completion.op;
        }
        self.set_phase(next);
    }

    fn start<F: FlashPageStore>(
        &mut self,
        flash: &mut F,
        session: WriteSession,
        data: &[u8],
    ) -> Result<WriteStatus, WriteError> {
        if self.program_in_flight {
            trace_write_state!("{:x} waits for the staging buffer", session.address);
            return Ok(WriteStatus::Busy);
        }
        let offset = (session.address - session.page_address) as usize;
        if self.staging.already_programmed(flash, session.page_address, offset, data)? {
            trace_write_state!("{:x}..+{} already holds the data", session.address, session.len);
            return Ok(WriteStatus::Accepted(session.len));
        }
        self.staging.merge(flash, session.page_address, offset, data)?;
        match flash.erase_async(session.page_address) {
            Ok(()) => (),
            // an abandoned operation is still running
            Err(FlashError::Busy) => return Ok(WriteStatus::Busy),
            Err(e) => {
                log::warn!("erase of {:x} rejected: {:?}", session.page_address, e);
                return Err(WriteError::EraseRejected(e));
            }
        }
        self.session = Some(session);
        self.set_phase(WritePhase::Erasing);
        Ok(WriteStatus::Busy)
    }

    fn program<F: FlashPageStore>(&mut self, flash: &mut F, page_address: u32) -> Result<WriteStatus, WriteError> {
        if let Err(e) = flash.program_async(page_address, self.staging.as_page()) {
            log::warn!("program of {:x} rejected: {:?}", page_address, e);
            self.detached = true;
            return Err(WriteError::ProgramRejected(e));
        }
        self.program_in_flight = true;
        self.detached = false;
        self.set_phase(WritePhase::Writing);
        Ok(WriteStatus::Busy)
    }

    fn release(&mut self) {
        self.session = None;
        self.detached = false;
        self.set_phase(WritePhase::Idle);
    }

    fn set_phase(&mut self, phase: WritePhase) {
        if phase != self.phase {
            trace_write_state!("write phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FEATHER52840;
    use crate::hosted::HostedFlash;

    fn setup() -> (BlockWriteController, HostedFlash) {
        let mailbox: &'static CompletionMailbox = Box::leak(Box::new(CompletionMailbox::new()));
        let mut flash = HostedFlash::for_config(&FEATHER52840);
        flash.register(mailbox);
        (BlockWriteController::new(FEATHER52840.layout(), mailbox), flash)
    }

    #[test]
    fn staging_is_held_while_an_abandoned_program_runs() {
        let (mut writer, mut flash) = setup();
        let first = [0x5Au8; BLOCK_SIZE];
        let second = [0xA5u8; BLOCK_SIZE];
        assert_eq!(writer.write(&mut flash, 100, 0, &first), Ok(WriteStatus::Busy));
        flash.complete_pending();
        assert_eq!(writer.write(&mut flash, 100, 0, &first), Ok(WriteStatus::Busy));
        assert_eq!(writer.phase(), WritePhase::Writing);
        let staged = *writer.staging.as_page();

        writer.reset();
        assert!(writer.program_in_flight);
        assert_eq!(writer.write(&mut flash, 900, 0, &second), Ok(WriteStatus::Busy));
        assert_eq!(writer.phase(), WritePhase::Idle);
        assert_eq!(writer.staging.as_page(), &staged);
        assert_eq!(flash.erase_count(), 1);

        // the stale program completion releases the buffer
        flash.complete_pending();
        assert_eq!(writer.write(&mut flash, 900, 0, &second), Ok(WriteStatus::Busy));
        assert!(!writer.program_in_flight);
        assert_eq!(writer.phase(), WritePhase::Erasing);
        assert_eq!(flash.contents(FEATHER52840.layout().block_address(100), BLOCK_SIZE), &first[..]);
    }

    #[test]
    fn reset_with_the_program_completion_queued_frees_staging() {
        let (mut writer, mut flash) = setup();
        let data = [0x3Cu8; BLOCK_SIZE];
        assert_eq!(writer.write(&mut flash, 40, 0, &data), Ok(WriteStatus::Busy));
        flash.complete_pending();
        assert_eq!(writer.write(&mut flash, 40, 0, &data), Ok(WriteStatus::Busy));
        flash.complete_pending();

        writer.reset();
        assert!(!writer.program_in_flight);
        assert_eq!(writer.write(&mut flash, 40, 0, &data), Ok(WriteStatus::Accepted(BLOCK_SIZE)));
    }
}
