//! Serial ingest paging
//!
//! Bytes read from the local serial port are stored in fixed 31-byte slots,
//! one slot per radio frame. The slots queued so far form one page whose
//! frames are sent with a countdown index: with three slots queued the
//! frames go out as index 2, 1, 0.

use rfbridge_hal::{RadioTransport, SerialRx};
use rfbridge_protocol::{RadioFrame, MAX_PAGE_FRAMES, MAX_PAYLOAD_SIZE};

/// Number of slots (a page can be at most this many frames)
pub const SERIAL_SLOT_COUNT: usize = MAX_PAGE_FRAMES;

/// Default quiet time on the serial line before a page is sent
pub const DEFAULT_SERIAL_QUIET_MS: u32 = 1;

/// Result of draining the serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchOutcome {
    /// No bytes were available
    Idle,
    /// This many bytes were stored
    Received(usize),
    /// The slots ran out; the buffer was cleared and the rest of the input
    /// available in this drain was discarded
    Overflow,
}

#[derive(Debug, Clone, Copy)]
struct PacketSlot {
    data: [u8; MAX_PAYLOAD_SIZE],
    position_write: usize,
}

impl PacketSlot {
    const fn new() -> Self {
        Self {
            data: [0; MAX_PAYLOAD_SIZE],
            position_write: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.position_write >= MAX_PAYLOAD_SIZE
    }

    fn payload(&self) -> &[u8] {
        &self.data[..self.position_write]
    }
}

/// Fixed ring of outbound frame slots
#[derive(Debug, Clone)]
pub struct SerialPageBuffer {
    slots: [PacketSlot; SERIAL_SLOT_COUNT],
    /// Slot currently being written
    current: usize,
    pages_queued: u8,
    pages_sent: u8,
    last_activity_ms: u32,
    quiet_ms: u32,
}

impl Default for SerialPageBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SERIAL_QUIET_MS)
    }
}

impl SerialPageBuffer {
    /// Create an empty buffer with the given serial quiet threshold
    pub const fn new(quiet_ms: u32) -> Self {
        Self {
            slots: [PacketSlot::new(); SERIAL_SLOT_COUNT],
            current: 0,
            pages_queued: 0,
            pages_sent: 0,
            last_activity_ms: 0,
            quiet_ms,
        }
    }

    /// Empty every slot and zero both counters
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.position_write = 0;
        }
        self.current = 0;
        self.pages_queued = 0;
        self.pages_sent = 0;
    }

    /// Slots holding data (frames in the page)
    pub fn pages_queued(&self) -> u8 {
        self.pages_queued
    }

    /// Frames of the page already transmitted
    pub fn pages_sent(&self) -> u8 {
        self.pages_sent
    }

    /// Frames remain to be transmitted
    pub fn has_pending_data(&self) -> bool {
        self.pages_sent < self.pages_queued
    }

    /// Every queued frame has been transmitted
    pub fn is_drained(&self) -> bool {
        self.pages_queued != 0 && self.pages_sent == self.pages_queued
    }

    /// The serial line has been quiet for longer than the threshold
    pub fn timeout_elapsed(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_activity_ms) > self.quiet_ms
    }

    /// Store one byte
    ///
    /// Returns false on overflow, in which case the buffer has been cleared.
    pub fn push_byte(&mut self, byte: u8, now_ms: u32) -> bool {
        self.last_activity_ms = now_ms;

        if self.pages_queued == 0 {
            self.pages_queued = 1;
        }

        if self.slots[self.current].is_full() {
            if self.current + 1 >= SERIAL_SLOT_COUNT {
                self.clear();
                return false;
            }
            self.current += 1;
            self.pages_queued += 1;
        }

        let slot = &mut self.slots[self.current];
        slot.data[slot.position_write] = byte;
        slot.position_write += 1;
        true
    }

    /// Drain every available byte from `serial`
    ///
    /// `on_byte` sees each byte that was stored (the device feeds its stream
    /// recognizer from here).
    pub fn fetch<P: SerialRx>(
        &mut self,
        serial: &mut P,
        now_ms: u32,
        mut on_byte: impl FnMut(u8),
    ) -> FetchOutcome {
        let mut received = 0usize;
        let mut overflowed = false;

        loop {
            let byte = match serial.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => break,
                Err(_) => {
                    warn!("serial read failed");
                    break;
                }
            };

            if overflowed {
                self.last_activity_ms = now_ms;
                continue;
            }

            if self.push_byte(byte, now_ms) {
                received += 1;
                on_byte(byte);
            } else {
                warn!("serial ingest overflow after {} bytes", received);
                overflowed = true;
            }
        }

        if overflowed {
            FetchOutcome::Overflow
        } else if received == 0 {
            FetchOutcome::Idle
        } else {
            FetchOutcome::Received(received)
        }
    }

    /// Payload stored in slot `index`
    pub fn slot_payload(&self, index: usize) -> &[u8] {
        self.slots.get(index).map_or(&[][..], PacketSlot::payload)
    }

    /// Frame for the next unsent slot and its countdown index
    pub fn next_frame(&self) -> Option<(u8, RadioFrame)> {
        if !self.has_pending_data() {
            return None;
        }
        let index = self.pages_queued - self.pages_sent - 1;
        let payload = self.slot_payload(self.pages_sent as usize);
        RadioFrame::data(false, index, payload)
            .ok()
            .map(|frame| (index, frame))
    }

    /// Record that the frame from [`Self::next_frame`] went out
    pub fn mark_sent(&mut self) {
        if self.pages_sent < self.pages_queued {
            self.pages_sent += 1;
        }
    }

    /// Peer reported a bad checksum: resend the last frame
    pub fn rewind_one(&mut self) {
        self.pages_sent = self.pages_sent.saturating_sub(1);
    }

    /// Peer missed a frame: resend the whole page
    pub fn rewind_page(&mut self) {
        self.pages_sent = 0;
    }

    /// Transmit the first frame of the page
    ///
    /// Only fires when something is queued and nothing has been sent yet.
    /// Returns the index that was sent.
    pub fn send_first_page<R: RadioTransport>(
        &mut self,
        radio: &mut R,
    ) -> Result<Option<u8>, R::Error> {
        if self.pages_queued == 0 || self.pages_sent != 0 {
            return Ok(None);
        }
        let Some((index, frame)) = self.next_frame() else {
            return Ok(None);
        };

        radio.send_to_peer(frame.as_bytes())?;
        self.pages_sent = 1;
        trace!("S->{}:{}", index, frame.len());
        Ok(Some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRadio, MockSerial};
    use rfbridge_protocol::{classify, FrameKind};

    fn fill(buffer: &mut SerialPageBuffer, count: usize) {
        for i in 0..count {
            assert!(buffer.push_byte(i as u8, 0));
        }
    }

    #[test]
    fn test_sixty_five_bytes_make_three_pages() {
        let mut buffer = SerialPageBuffer::default();
        let mut serial = MockSerial::with_input(&[0x55; 65]);

        let outcome = buffer.fetch(&mut serial, 10, |_| {});
        assert_eq!(outcome, FetchOutcome::Received(65));
        assert_eq!(buffer.pages_queued(), 3);
        assert_eq!(buffer.slot_payload(0).len(), 31);
        assert_eq!(buffer.slot_payload(1).len(), 31);
        assert_eq!(buffer.slot_payload(2).len(), 3);

        let mut radio = MockRadio::default();
        assert_eq!(buffer.send_first_page(&mut radio), Ok(Some(2)));
        assert_eq!(buffer.pages_sent(), 1);

        let sent = radio.sent(0);
        assert_eq!(sent.len(), 32);
        match classify(sent) {
            FrameKind::Data(frame) => {
                assert!(frame.verify());
                assert_eq!(frame.byte_id().index(), 2);
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn test_send_first_page_only_once() {
        let mut buffer = SerialPageBuffer::default();
        fill(&mut buffer, 5);
        let mut radio = MockRadio::default();

        assert_eq!(buffer.send_first_page(&mut radio), Ok(Some(0)));
        assert_eq!(buffer.send_first_page(&mut radio), Ok(None));
        assert_eq!(radio.sent_count(), 1);
    }

    #[test]
    fn test_send_first_page_with_nothing_queued() {
        let mut buffer = SerialPageBuffer::default();
        let mut radio = MockRadio::default();
        assert_eq!(buffer.send_first_page(&mut radio), Ok(None));
        assert_eq!(radio.sent_count(), 0);
    }

    #[test]
    fn test_exactly_one_slot() {
        let mut buffer = SerialPageBuffer::default();
        fill(&mut buffer, 31);
        assert_eq!(buffer.pages_queued(), 1);
        fill(&mut buffer, 1);
        assert_eq!(buffer.pages_queued(), 2);
    }

    #[test]
    fn test_countdown_indices() {
        let mut buffer = SerialPageBuffer::default();
        fill(&mut buffer, 70);

        let mut indices = [0u8; 3];
        for slot in indices.iter_mut() {
            let (index, _) = buffer.next_frame().unwrap();
            *slot = index;
            buffer.mark_sent();
        }
        assert_eq!(indices, [2, 1, 0]);
        assert!(buffer.next_frame().is_none());
        assert!(buffer.is_drained());
        assert!(!buffer.has_pending_data());
    }

    #[test]
    fn test_rewind() {
        let mut buffer = SerialPageBuffer::default();
        fill(&mut buffer, 40);
        buffer.mark_sent();
        buffer.mark_sent();

        buffer.rewind_one();
        assert_eq!(buffer.pages_sent(), 1);
        assert_eq!(buffer.next_frame().unwrap().0, 0);

        buffer.rewind_page();
        assert_eq!(buffer.pages_sent(), 0);
        assert_eq!(buffer.next_frame().unwrap().0, 1);
    }

    #[test]
    fn test_mark_sent_never_passes_queued() {
        let mut buffer = SerialPageBuffer::default();
        fill(&mut buffer, 3);
        buffer.mark_sent();
        buffer.mark_sent();
        assert_eq!(buffer.pages_sent(), 1);
        assert!(buffer.pages_sent() <= buffer.pages_queued());
    }

    #[test]
    fn test_overflow_clears_buffer() {
        let mut buffer = SerialPageBuffer::default();
        let input = [0x11u8; SERIAL_SLOT_COUNT * MAX_PAYLOAD_SIZE + 10];
        let mut serial = MockSerial::with_input(&input);

        assert_eq!(buffer.fetch(&mut serial, 0, |_| {}), FetchOutcome::Overflow);
        assert_eq!(buffer.pages_queued(), 0);
        assert_eq!(buffer.pages_sent(), 0);
        assert!(!buffer.has_pending_data());
        // the rest of the input was consumed and dropped
        assert_eq!(buffer.fetch(&mut serial, 0, |_| {}), FetchOutcome::Idle);
    }

    #[test]
    fn test_full_capacity_is_not_overflow() {
        let mut buffer = SerialPageBuffer::default();
        fill(&mut buffer, SERIAL_SLOT_COUNT * MAX_PAYLOAD_SIZE);
        assert_eq!(buffer.pages_queued() as usize, SERIAL_SLOT_COUNT);
        assert_eq!(buffer.next_frame().unwrap().0, 15);
    }

    #[test]
    fn test_quiet_timeout() {
        let mut buffer = SerialPageBuffer::new(5);
        buffer.push_byte(1, 100);
        assert!(!buffer.timeout_elapsed(103));
        assert!(!buffer.timeout_elapsed(105));
        assert!(buffer.timeout_elapsed(106));
    }

    #[test]
    fn test_fetch_reports_each_byte() {
        let mut buffer = SerialPageBuffer::default();
        let mut serial = MockSerial::with_input(b"abc");
        let mut seen = heapless::Vec::<u8, 8>::new();

        buffer.fetch(&mut serial, 0, |b| {
            let _ = seen.push(b);
        });
        assert_eq!(&seen[..], b"abc");
    }
}
