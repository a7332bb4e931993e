//! RAM backed flash primitive for hosted builds and tests

use std::collections::VecDeque;

use crate::api::{ERASED_BYTE, FLASH_PAGE_SIZE};
use crate::config::DeviceConfig;
use crate::flash::{Completion, CompletionMailbox, FlashError, FlashOp, FlashPageStore};
use crate::logging::*;

enum PendingOp {
    Erase(u32),
    Program(u32, Box<[u8; FLASH_PAGE_SIZE]>),
}

/// NOR flash simulator
///
/// Erase sets a page to 0xFF; program can only clear bits, and asking it to set one reports
/// a failed program. Accepted operations queue up and complete when
/// [`complete_pending`](HostedFlash::complete_pending) is called, unless auto completion is on.
pub struct HostedFlash {
    base: u32,
    memory: Vec<u8>,
    pending: VecDeque<PendingOp>,
    mailbox: Option<&'static CompletionMailbox>,
    auto_complete: bool,
    fail_next: Option<FlashOp>,
    reject_next: Option<(FlashOp, FlashError)>,
    erase_count: usize,
    program_count: usize,
}

impl HostedFlash {
    /// `len` bytes of erased flash starting at `base`
    pub fn new(base: u32, len: usize) -> Self {
        assert!(base as usize % FLASH_PAGE_SIZE == 0 && len % FLASH_PAGE_SIZE == 0);
        HostedFlash {
            base,
            memory: vec![ERASED_BYTE; len],
            pending: VecDeque::new(),
            mailbox: None,
            auto_complete: false,
            fail_next: None,
            reject_next: None,
            erase_count: 0,
            program_count: 0,
        }
    }

    /// Exactly the region backing the volume described by `config`
    pub fn for_config(config: &DeviceConfig) -> Self {
        let layout = config.layout();
        Self::new(layout.flash_base, (layout.end_address() - layout.flash_base) as usize)
    }

    /// Complete each operation as soon as it is accepted
    pub fn set_auto_complete(&mut self, auto_complete: bool) { self.auto_complete = auto_complete; }

    /// Report failure for the next accepted operation of kind `op`
    pub fn fail_next(&mut self, op: FlashOp) { self.fail_next = Some(op); }

    /// Refuse the next request of kind `op` with `error`
    pub fn reject_next(&mut self, op: FlashOp, error: FlashError) { self.reject_next = Some((op, error)); }

    /// Number of accepted erase requests
    pub fn erase_count(&self) -> usize { self.erase_count }

    /// Number of accepted program requests
    pub fn program_count(&self) -> usize { self.program_count }

    pub fn pending(&self) -> usize { self.pending.len() }

    /// Write straight into the backing store, bypassing NOR rules
    pub fn load(&mut self, address: u32, data: &[u8]) {
        let start = (address - self.base) as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn contents(&self, address: u32, len: usize) -> &[u8] {
        let start = (address - self.base) as usize;
        &self.memory[start..start + len]
    }

    /// Run every queued operation and post its completion, returns how many ran
    pub fn complete_pending(&mut self) -> usize {
        let mut count = 0;
        while let Some(op) = self.pending.pop_front() {
            let completion = self.apply(op);
            match self.mailbox {
                Some(mailbox) => mailbox.post(completion),
                None => log::warn!("no mailbox registered, dropping {:x?}", completion),
            }
            count += 1;
        }
        count
    }

    fn apply(&mut self, op: PendingOp) -> Completion {
        let (page_address, kind) = match &op {
            PendingOp::Erase(page) => (*page, FlashOp::Erase),
            PendingOp::Program(page, _) => (*page, FlashOp::Program),
        };
        if self.fail_next == Some(kind) {
            self.fail_next = None;
            trace_flash!("injected {:?} failure at {:x}", kind, page_address);
            return Completion { page_address, op: kind, success: false };
        }
        let start = (page_address - self.base) as usize;
        let page = &mut self.memory[start..start + FLASH_PAGE_SIZE];
        let success = match op {
            PendingOp::Erase(_) => {
                page.fill(ERASED_BYTE);
                true
            }
            PendingOp::Program(_, data) => {
                let mut clean = true;
                for (cell, &new) in page.iter_mut().zip(data.iter()) {
                    clean &= *cell & new == new;
                    *cell &= new;
                }
                clean
            }
        };
        Completion { page_address, op: kind, success }
    }

    fn accept(&mut self, kind: FlashOp, page_address: u32) -> Result<(), FlashError> {
        if let Some((op, error)) = self.reject_next {
            if op == kind {
                self.reject_next = None;
                return Err(error);
            }
        }
        let end = self.base as usize + self.memory.len();
        if page_address < self.base
            || page_address as usize + FLASH_PAGE_SIZE > end
            || page_address as usize % FLASH_PAGE_SIZE != 0
        {
            return Err(FlashError::InvalidAddress);
        }
        if !self.pending.is_empty() {
            return Err(FlashError::Busy);
        }
        Ok(())
    }

    fn queued(&mut self) {
        if self.auto_complete {
            self.complete_pending();
        }
    }
}

impl FlashPageStore for HostedFlash {
    fn read(&self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        let end = self.base as usize + self.memory.len();
        if address < self.base || address as usize + buf.len() > end {
            return Err(FlashError::InvalidAddress);
        }
        buf.copy_from_slice(self.contents(address, buf.len()));
        Ok(())
    }

    fn erase_async(&mut self, page_address: u32) -> Result<(), FlashError> {
        self.accept(FlashOp::Erase, page_address)?;
        trace_flash!("erase {:x}", page_address);
        self.erase_count += 1;
        self.pending.push_back(PendingOp::Erase(page_address));
        self.queued();
        Ok(())
    }

    fn program_async(&mut self, page_address: u32, data: &[u8; FLASH_PAGE_SIZE]) -> Result<(), FlashError> {
        self.accept(FlashOp::Program, page_address)?;
        trace_flash!("program {:x}", page_address);
        self.program_count += 1;
        self.pending.push_back(PendingOp::Program(page_address, Box::new(*data)));
        self.queued();
        Ok(())
    }

    fn register(&mut self, mailbox: &'static CompletionMailbox) { self.mailbox = Some(mailbox); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailbox() -> &'static CompletionMailbox { Box::leak(Box::new(CompletionMailbox::new())) }

    #[test]
    fn program_only_clears_bits() {
        let mb = mailbox();
        let mut flash = HostedFlash::new(0x1000, 2 * FLASH_PAGE_SIZE);
        flash.register(mb);

        let mut page = [0xFFu8; FLASH_PAGE_SIZE];
        page[0] = 0x0F;
        flash.program_async(0x1000, &page).unwrap();
        assert_eq!(flash.contents(0x1000, 1), &[0xFF]);
        assert_eq!(flash.complete_pending(), 1);
        assert_eq!(mb.take(), Some(Completion { page_address: 0x1000, op: FlashOp::Program, success: true }));
        assert_eq!(flash.contents(0x1000, 2), &[0x0F, 0xFF]);

        page[0] = 0xF0;
        flash.program_async(0x1000, &page).unwrap();
        flash.complete_pending();
        assert_eq!(mb.take().map(|c| c.success), Some(false));

        flash.erase_async(0x1000).unwrap();
        flash.complete_pending();
        assert_eq!(mb.take().map(|c| c.success), Some(true));
        assert_eq!(flash.contents(0x1000, 1), &[0xFF]);
        assert_eq!((flash.erase_count(), flash.program_count()), (1, 2));
    }

    #[test]
    fn rejects_bad_addresses_and_overlap() {
        let mut flash = HostedFlash::new(0x1000, FLASH_PAGE_SIZE);
        assert_eq!(flash.erase_async(0x0000), Err(FlashError::InvalidAddress));
        assert_eq!(flash.erase_async(0x1800), Err(FlashError::InvalidAddress));
        assert_eq!(flash.erase_async(0x2000), Err(FlashError::InvalidAddress));
        assert_eq!(flash.erase_async(0x1000), Ok(()));
        assert_eq!(flash.erase_async(0x1000), Err(FlashError::Busy));
        flash.reject_next(FlashOp::Program, FlashError::Rejected);
        assert_eq!(flash.program_async(0x1000, &[0; FLASH_PAGE_SIZE]), Err(FlashError::Rejected));
        assert_eq!(flash.erase_count(), 1);
    }
}
