//! Persisted channel number

use rfbridge_hal::flash::{address_of_page, ERASED_WORD};
use rfbridge_hal::{FlashError, WordStorage};

/// Lowest usable radio channel
pub const CHANNEL_MIN: u8 = 0;

/// Highest usable radio channel
pub const CHANNEL_MAX: u8 = 25;

/// Channel used when nothing has been persisted yet
pub const DEFAULT_CHANNEL: u8 = CHANNEL_MAX;

/// Stored word meaning "no channel set"
pub const CHANNEL_UNSET: u32 = ERASED_WORD;

/// Flash page holding the channel word
pub const CHANNEL_PAGE: u32 = 251;

/// Channel could not be persisted
///
/// None of the variants is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// The storage page is reserved
    PageReserved,
    /// The storage page is used by the program
    PageInUse,
    /// The write failed and the previous channel could not be put back
    Corrupted,
}

impl From<FlashError> for ChannelError {
    fn from(err: FlashError) -> Self {
        match err {
            FlashError::PageReserved => ChannelError::PageReserved,
            FlashError::PageInUse => ChannelError::PageInUse,
        }
    }
}

impl ChannelError {
    /// Diagnostic line reported to the PC
    pub fn message(&self) -> &'static [u8] {
        match self {
            ChannelError::PageReserved => b"Error - the flash page is reserved",
            ChannelError::PageInUse => b"Error - the flash page is used by the sketch",
            ChannelError::Corrupted => b"Error - the stored channel was lost",
        }
    }
}

/// Reads and writes the channel word
#[derive(Debug)]
pub struct ChannelManager<S> {
    storage: S,
    page: u32,
}

impl<S: WordStorage> ChannelManager<S> {
    pub const fn new(storage: S) -> Self {
        Self::with_page(storage, CHANNEL_PAGE)
    }

    /// Use a different flash page
    pub const fn with_page(storage: S, page: u32) -> Self {
        Self { storage, page }
    }

    fn address(&self) -> u32 {
        address_of_page(self.page)
    }

    /// Raw stored word
    pub fn raw(&self) -> u32 {
        self.storage.read_word(self.address())
    }

    /// Nothing has been persisted yet
    pub fn needs_channel(&self) -> bool {
        self.raw() == CHANNEL_UNSET
    }

    /// Stored channel, `None` when unset
    ///
    /// A corrupt word above the limit reads back as the highest channel.
    pub fn get_channel(&self) -> Option<u8> {
        match self.raw() {
            CHANNEL_UNSET => None,
            word => Some(word.min(CHANNEL_MAX as u32) as u8),
        }
    }

    /// Persist `channel`, clamped to the valid range
    ///
    /// Returns the value actually stored. If the erase is refused the word
    /// is untouched. If the write is refused the previous value is written
    /// back; when that fails too the page is left erased and
    /// [`ChannelError::Corrupted`] is returned.
    pub fn set_channel(&mut self, channel: u8) -> Result<u8, ChannelError> {
        let channel = channel.min(CHANNEL_MAX);
        let addr = self.address();
        let previous = self.raw();

        self.storage.erase_page(self.page).map_err(|err| {
            warn!("channel page erase failed: {}", err);
            ChannelError::from(err)
        })?;

        if let Err(err) = self.storage.write_word(addr, channel as u32) {
            warn!("channel write failed: {}", err);
            if previous != ERASED_WORD {
                if let Err(restore) = self.storage.write_word(addr, previous) {
                    warn!("channel restore failed: {}", restore);
                    return Err(ChannelError::Corrupted);
                }
            }
            return Err(err.into());
        }

        debug!("channel number set: {}", channel);
        Ok(channel)
    }

    /// Persist `default` if no channel is stored, returning the active channel
    pub fn ensure_initialised(&mut self, default: u8) -> Result<u8, ChannelError> {
        match self.get_channel() {
            Some(channel) => Ok(channel),
            None => {
                info!("no stored channel, using {}", default);
                self.set_channel(default)
            }
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
