//! Single page buffer

use rfbridge_protocol::MAX_PAGE_SIZE;

/// A payload would not fit in the page buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageOverflow;

/// Buffer reassembling one page from its frames
///
/// Lifecycle: empty → receiving → complete → flushing → (drained) empty.
/// A flushing buffer never accepts bytes; only [`RadioPageBuffer::reset`]
/// makes it usable again.
#[derive(Debug, Clone)]
pub struct RadioPageBuffer {
    data: [u8; MAX_PAGE_SIZE],
    /// Bytes received so far
    position_write: usize,
    /// Bytes already written to the local serial port
    position_read: usize,
    /// Index of the last accepted frame; the next must be one lower
    last_index: u8,
    got_all_packets: bool,
    flushing: bool,
}

impl Default for RadioPageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPageBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            data: [0; MAX_PAGE_SIZE],
            position_write: 0,
            position_read: 0,
            last_index: 0,
            got_all_packets: false,
            flushing: false,
        }
    }

    /// Clear cursors and flags
    pub fn reset(&mut self) {
        self.position_write = 0;
        self.position_read = 0;
        self.last_index = 0;
        self.got_all_packets = false;
        self.flushing = false;
    }

    /// No page data and no page in progress
    pub fn is_empty(&self) -> bool {
        self.position_write == 0 && !self.got_all_packets
    }

    /// The last frame (index 0) of the page has been received
    pub fn is_complete(&self) -> bool {
        self.got_all_packets
    }

    /// The page is being drained to the local serial port
    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Empty and not draining, so a new page may start here
    pub fn ready_for_new_page(&self) -> bool {
        self.is_empty() && !self.flushing
    }

    /// True if `index` is the frame that must follow the last one accepted
    pub fn expects(&self, index: u8) -> bool {
        self.last_index.checked_sub(1) == Some(index)
    }

    /// Start a new page with its first frame
    pub fn start_page(&mut self, index: u8, payload: &[u8]) -> Result<(), PageOverflow> {
        self.position_write = 0;
        self.position_read = 0;
        self.append(index, payload)
    }

    /// Append the next frame of the page in progress
    pub fn append(&mut self, index: u8, payload: &[u8]) -> Result<(), PageOverflow> {
        if self.flushing {
            return Err(PageOverflow);
        }
        let end = self.position_write + payload.len();
        if end > self.data.len() {
            return Err(PageOverflow);
        }

        self.data[self.position_write..end].copy_from_slice(payload);
        self.position_write = end;
        self.last_index = index;
        if index == 0 {
            self.got_all_packets = true;
        }
        Ok(())
    }

    /// Mark a complete page as draining
    ///
    /// Returns false (and changes nothing) if the page is not complete.
    pub fn begin_flush(&mut self) -> bool {
        if !self.got_all_packets {
            return false;
        }
        self.flushing = true;
        true
    }

    /// Bytes not yet written to the local serial port
    pub fn pending(&self) -> &[u8] {
        &self.data[self.position_read..self.position_write]
    }

    /// Record that `count` pending bytes were written
    ///
    /// Resets the buffer once everything has been drained and returns true
    /// in that case.
    pub fn consume(&mut self, count: usize) -> bool {
        self.position_read = (self.position_read + count).min(self.position_write);
        if self.flushing && self.position_read == self.position_write {
            self.reset();
            return true;
        }
        false
    }

    /// Whole page received so far
    pub fn data(&self) -> &[u8] {
        &self.data[..self.position_write]
    }

    /// Write cursor
    pub fn len(&self) -> usize {
        self.position_write
    }
}
