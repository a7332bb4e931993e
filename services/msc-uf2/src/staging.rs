use crate::api::FLASH_PAGE_SIZE;
use crate::flash::{FlashError, FlashPageStore};

/// One flash page worth of scratch, used to assemble the full new image of a page
#[repr(C, align(4))]
pub struct StagingBuffer {
    page: [u8; FLASH_PAGE_SIZE],
}

impl StagingBuffer {
    pub const fn new() -> Self { StagingBuffer { page: [0; FLASH_PAGE_SIZE] } }

    pub fn as_page(&self) -> &[u8; FLASH_PAGE_SIZE] { &self.page }

    /// True if flash at `page_address + offset` already holds `data`
    ///
    /// Uses the matching slice of the buffer as the read target, so it must not be called
    /// while a program from this buffer is outstanding.
    pub fn already_programmed<F: FlashPageStore>(
        &mut self,
        flash: &F,
        page_address: u32,
        offset: usize,
        data: &[u8],
    ) -> Result<bool, FlashError> {
        let current = &mut self.page[offset..offset + data.len()];
        flash.read(page_address + offset as u32, current)?;
        Ok(current == data)
    }

    /// Rebuild the page image: unmodified prefix and suffix from flash, `data` in between
    ///
    /// `offset + data.len()` must not run past the page.
    pub fn merge<F: FlashPageStore>(
        &mut self,
        flash: &F,
        page_address: u32,
        offset: usize,
        data: &[u8],
    ) -> Result<(), FlashError> {
        let end = offset + data.len();
        assert!(end <= FLASH_PAGE_SIZE);
        if offset > 0 {
            flash.read(page_address, &mut self.page[..offset])?;
        }
        self.page[offset..end].copy_from_slice(data);
        if end < FLASH_PAGE_SIZE {
            flash.read(page_address + end as u32, &mut self.page[end..])?;
        }
        Ok(())
    }
}

impl Default for StagingBuffer {
    fn default() -> Self { Self::new() }
}
