//! USB mass storage volume backed by on-chip NOR flash, used for drag-and-drop UF2 updates
//!
//! The transport hands over one command at a time. Status-class commands are answered by the
//! [`usbd_scsi::CommandResponder`], READ(10) goes to the [`BlockReadService`] and WRITE(10)
//! drives the [`BlockWriteController`], which never blocks: it answers "busy" until the
//! asynchronous erase and program of the target page have completed.

#![cfg_attr(target_os = "none", no_std)]

pub mod api;
pub mod config;
pub mod fat12;
pub mod flash;
#[cfg(not(target_os = "none"))]
pub mod hosted;
pub mod read;
mod staging;
pub mod write;

pub use config::{DeviceConfig, VolumeLayout, FEATHER52840};
pub use fat12::Fat12Volume;
pub use flash::{Completion, CompletionMailbox, FlashError, FlashOp, FlashPageStore};
pub use read::{BlockReadService, FlashResident, MetadataSource, ReadError};
pub use staging::StagingBuffer;
use usbd_scsi::{AdditionalSenseCode, CommandResponder, Sense, SenseKey};
pub use write::{BlockWriteController, WriteError, WritePhase, WriteStatus};

mod logging {
    pub use log::debug as trace_flash;
    pub use log::debug as trace_write_state;
}

/// Result code the transport reads as "stall / failed"
const CB_FAILURE: i32 = -1;

/// The mass storage device: responder, block services and the flash they sit on
///
/// Constructed once at startup; [`on_mount`](MscUf2::on_mount) is the only reset.
pub struct MscUf2<F: FlashPageStore, M: MetadataSource = FlashResident> {
    flash: F,
    responder: CommandResponder,
    reader: BlockReadService<M>,
    writer: BlockWriteController,
    mailbox: &'static CompletionMailbox,
}

impl<F: FlashPageStore> MscUf2<F, FlashResident> {
    pub fn new(config: &DeviceConfig, flash: F, mailbox: &'static CompletionMailbox) -> Self {
        Self::with_metadata(config, flash, mailbox, FlashResident)
    }
}

impl<F: FlashPageStore, M: MetadataSource> MscUf2<F, M> {
    pub fn with_metadata(config: &DeviceConfig, flash: F, mailbox: &'static CompletionMailbox, metadata: M) -> Self {
        let layout = config.layout();
        MscUf2 {
            flash,
            responder: CommandResponder::new(config.descriptors()),
            reader: BlockReadService::new(layout, metadata),
            writer: BlockWriteController::new(layout, mailbox),
            mailbox,
        }
    }

    /// Connect the flash primitive's completions to the write path
    pub fn on_init(&mut self) {
        log::info!("mass storage init, registering flash completion mailbox");
        self.flash.register(self.mailbox);
    }

    /// A new host session starts from Idle; anything in flight is abandoned
    pub fn on_mount(&mut self) {
        log::info!("mass storage mounted");
        self.writer.reset();
    }

    /// Flash operations still running finish on their own
    pub fn on_unmount(&mut self) {
        log::info!("mass storage unmounted");
    }

    /// Pick up a flash completion between transfers; writes also do this on entry
    pub fn poll(&mut self) { self.writer.poll(); }

    pub fn scsi_command(&mut self, op_code: u8, buf: &mut [u8]) -> Result<usize, usbd_scsi::Error> {
        self.responder.respond(op_code, buf)
    }

    /// READ(10): `buf` receives whole blocks starting at `lba`
    pub fn read10(&mut self, lba: u32, offset: u32, buf: &mut [u8]) -> Result<usize, ReadError> {
        let result = if offset != 0 {
            Err(ReadError::OffsetNotSupported)
        } else {
            self.reader.read(&self.flash, lba, buf)
        };
        match result {
            Ok(_) => self.responder.clear_sense(),
            Err(e) => {
                log::warn!("read of lba {} offset {} len {} failed: {:?}", lba, offset, buf.len(), e);
                let (key, code) = e.sense();
                self.responder.set_sense(key, code);
            }
        }
        result
    }

    /// WRITE(10): offer `data` for `lba`, again with the same data while the result is `Busy`
    pub fn write10(&mut self, lba: u32, offset: u32, data: &[u8]) -> Result<WriteStatus, WriteError> {
        let result = self.writer.write(&mut self.flash, lba, offset as usize, data);
        match result {
            Ok(WriteStatus::Accepted(_)) => self.responder.clear_sense(),
            Ok(WriteStatus::Busy) => {}
            Err(e) => {
                let (key, code) = e.sense();
                self.responder.set_sense(key, code);
            }
        }
        result
    }

    /// Transport callback for non-data commands: response length, or -1 to stall
    pub fn scsi_cb(&mut self, cmd: &[u8], buf: &mut [u8]) -> i32 {
        let result = match cmd.first() {
            Some(&op_code) => self.scsi_command(op_code, buf),
            None => Err(usbd_scsi::Error::EmptyCommand),
        };
        match result {
            Ok(len) => len as i32,
            Err(e) => {
                log::debug!("scsi command failed: {:?}", e);
                CB_FAILURE
            }
        }
    }

    /// Transport callback for READ(10): bytes copied, or -1
    pub fn read10_cb(&mut self, lba: u32, offset: u32, buf: &mut [u8]) -> i32 {
        match self.read10(lba, offset, buf) {
            Ok(len) => len as i32,
            Err(_) => CB_FAILURE,
        }
    }

    /// Transport callback for WRITE(10): bytes consumed, 0 to have the transport retry, or -1
    pub fn write10_cb(&mut self, lba: u32, offset: u32, data: &[u8]) -> i32 {
        match self.write10(lba, offset, data) {
            Ok(WriteStatus::Accepted(len)) => len as i32,
            Ok(WriteStatus::Busy) => 0,
            Err(_) => CB_FAILURE,
        }
    }

    pub fn write_phase(&self) -> WritePhase { self.writer.phase() }

    pub fn sense(&self) -> Sense { self.responder.sense() }

    pub fn set_sense(&mut self, key: SenseKey, code: AdditionalSenseCode) { self.responder.set_sense(key, code); }

    pub fn flash(&self) -> &F { &self.flash }

    pub fn flash_mut(&mut self) -> &mut F { &mut self.flash }
}
