use core::sync::atomic::{AtomicU32, Ordering};

use num_traits::{FromPrimitive, ToPrimitive};

use crate::api::FLASH_PAGE_SIZE;
use crate::logging::*;

/// Kind of a page operation on the flash primitive
#[derive(num_derive::FromPrimitive, num_derive::ToPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    Erase = 0,
    Program = 1,
}

/// Completion notice for one erase or program, delivered out of band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub page_address: u32,
    pub op: FlashOp,
    pub success: bool,
}

/// Immediate rejections from the flash primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// The primitive refused the request, e.g. its queue is full
    Rejected,
    /// Address outside the region the primitive is allowed to touch, or not page aligned
    InvalidAddress,
    /// Another operation is still running on the primitive
    Busy,
}

/// Asynchronous page erase/program primitive backing the volume
///
/// `erase_async` and `program_async` return as soon as the request is accepted or rejected.
/// Accepted requests later post exactly one [`Completion`] to the mailbox given to
/// [`register`](FlashPageStore::register), possibly from interrupt context.
pub trait FlashPageStore {
    /// Copy `buf.len()` bytes starting at `address`
    fn read(&self, address: u32, buf: &mut [u8]) -> Result<(), FlashError>;

    /// Start erasing the page at `page_address` to all 0xFF
    fn erase_async(&mut self, page_address: u32) -> Result<(), FlashError>;

    /// Start programming a full page
    ///
    /// The caller leaves `data` untouched until the completion is posted, also when the
    /// session that issued it is abandoned by a remount, so a DMA style implementation may
    /// keep reading from it.
    fn program_async(&mut self, page_address: u32, data: &[u8; FLASH_PAGE_SIZE]) -> Result<(), FlashError>;

    /// Hook up the completion channel; called once from init
    fn register(&mut self, mailbox: &'static CompletionMailbox);
}

const SLOT_FULL: u32 = 1 << 0;
const SLOT_OP_SHIFT: u32 = 1;
const SLOT_OK: u32 = 1 << 2;
const SLOT_PAGE_MASK: u32 = !(FLASH_PAGE_SIZE as u32 - 1);

/// Single-slot handoff from the completion context to the write path
///
/// Page addresses are page aligned, so the op kind and status travel in the low bits of the
/// same word and one atomic swap publishes the whole notice. The flash primitive posts; the
/// write path takes at the top of every call.
pub struct CompletionMailbox {
    slot: AtomicU32,
}

impl CompletionMailbox {
    pub const fn new() -> Self { CompletionMailbox { slot: AtomicU32::new(0) } }

    /// Publish a completion. Only one operation is ever outstanding, so a full slot means a
    /// notice from an abandoned session is being replaced.
    pub fn post(&self, completion: Completion) {
        let op = completion.op.to_u32().unwrap_or(0);
        let mut word = (completion.page_address & SLOT_PAGE_MASK) | (op << SLOT_OP_SHIFT) | SLOT_FULL;
        if completion.success {
            word |= SLOT_OK;
        }
        let previous = self.slot.swap(word, Ordering::AcqRel);
        if previous & SLOT_FULL != 0 {
            log::warn!("completion mailbox overwritten, dropped {:x?}", decode(previous));
        }
        trace_flash!("posted {:x?}", completion);
    }

    pub fn take(&self) -> Option<Completion> {
        let word = self.slot.swap(0, Ordering::AcqRel);
        if word & SLOT_FULL == 0 { None } else { decode(word) }
    }

    pub fn is_empty(&self) -> bool { self.slot.load(Ordering::Acquire) & SLOT_FULL == 0 }
}

impl Default for CompletionMailbox {
    fn default() -> Self { Self::new() }
}

fn decode(word: u32) -> Option<Completion> {
    Some(Completion {
        page_address: word & SLOT_PAGE_MASK,
        op: FlashOp::from_u32((word >> SLOT_OP_SHIFT) & 1)?,
        success: word & SLOT_OK != 0,
    })
}
