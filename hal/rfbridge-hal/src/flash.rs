//! Flash storage abstractions
//!
//! The bridge persists exactly one 32-bit word (the radio channel). The
//! trait below mirrors what a small NOR flash controller offers: word reads,
//! page erases and word writes, where erase/write may be refused because the
//! page belongs to the bootloader/softdevice or to the running program.

/// Flash page size in bytes
pub const FLASH_PAGE_SIZE: u32 = 1024;

/// Value of an erased flash word
pub const ERASED_WORD: u32 = 0xFFFF_FFFF;

/// Errors from flash erase/write operations
///
/// Neither error is retryable: the page layout does not change at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The page is reserved by the firmware (bootloader, radio stack)
    PageReserved,
    /// The page is occupied by the running program
    PageInUse,
}

/// Byte address of the first word of `page`
pub const fn address_of_page(page: u32) -> u32 {
    page * FLASH_PAGE_SIZE
}

/// Page number containing byte address `addr`
pub const fn page_from_address(addr: u32) -> u32 {
    addr / FLASH_PAGE_SIZE
}

/// Word-addressed non-volatile storage
///
/// Implementations must be non-blocking from the caller's point of view in
/// the sense that they complete synchronously; they are invoked from the
/// radio receive callback during a channel change.
pub trait WordStorage {
    /// Read the word at `addr`. Erased flash reads back as [`ERASED_WORD`].
    fn read_word(&self, addr: u32) -> u32;

    /// Erase a whole page, setting every word to [`ERASED_WORD`]
    fn erase_page(&mut self, page: u32) -> Result<(), FlashError>;

    /// Program the word at `addr`
    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashError>;
}

impl<T: WordStorage + ?Sized> WordStorage for &mut T {
    fn read_word(&self, addr: u32) -> u32 {
        (**self).read_word(addr)
    }

    fn erase_page(&mut self, page: u32) -> Result<(), FlashError> {
        (**self).erase_page(page)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashError> {
        (**self).write_word(addr, word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_addressing() {
        assert_eq!(address_of_page(251), 251 * 1024);
        assert_eq!(page_from_address(address_of_page(251)), 251);
        assert_eq!(page_from_address(address_of_page(251) + FLASH_PAGE_SIZE - 4), 251);
    }
}
