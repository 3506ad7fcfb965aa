//! Bytes waiting for the local serial port
//!
//! Writes happen from the main loop only. Each queue keeps whatever the port
//! did not accept and resumes from there on the next pass.

use heapless::Deque;
use rfbridge_hal::SerialTx;
use rfbridge_protocol::host::DIAGNOSTIC_TERMINATOR;
use rfbridge_protocol::STREAM_OUTPUT_SIZE;

/// Capacity of the byte outbox
pub const OUTBOX_CAPACITY: usize = 256;

/// Stream packets that may wait for the serial port
pub const STREAM_QUEUE_DEPTH: usize = 16;

/// Short replies and diagnostic lines for the local serial port
#[derive(Debug, Default)]
pub struct LocalOutbox {
    bytes: Deque<u8, OUTBOX_CAPACITY>,
}

impl LocalOutbox {
    pub const fn new() -> Self {
        Self {
            bytes: Deque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Queue one byte; false if the outbox is full
    pub fn push_byte(&mut self, byte: u8) -> bool {
        if self.bytes.push_back(byte).is_err() {
            warn!("outbox full, dropped byte");
            return false;
        }
        true
    }

    /// Queue a diagnostic line followed by the `$$$` terminator
    ///
    /// The line is dropped whole if it does not fit.
    pub fn push_diagnostic(&mut self, text: &[u8]) -> bool {
        let needed = text.len() + DIAGNOSTIC_TERMINATOR.len();
        if self.bytes.capacity() - self.bytes.len() < needed {
            warn!("outbox full, dropped diagnostic");
            return false;
        }
        for &b in text.iter().chain(DIAGNOSTIC_TERMINATOR) {
            let _ = self.bytes.push_back(b);
        }
        true
    }

    /// Write as much as the port accepts
    pub fn drain<T: SerialTx>(&mut self, tx: &mut T) -> Result<usize, T::Error> {
        let mut total = 0;
        while !self.bytes.is_empty() {
            let (front, _) = self.bytes.as_slices();
            let front_len = front.len();
            let written = tx.write(front)?;
            for _ in 0..written {
                self.bytes.pop_front();
            }
            total += written;
            if written < front_len {
                break;
            }
        }
        Ok(total)
    }
}

/// Re-framed stream packets waiting for the host's serial port
#[derive(Debug, Default)]
pub struct StreamPacketQueue {
    packets: Deque<[u8; STREAM_OUTPUT_SIZE], STREAM_QUEUE_DEPTH>,
    /// Bytes of the front packet already written
    offset: usize,
}

impl StreamPacketQueue {
    pub const fn new() -> Self {
        Self {
            packets: Deque::new(),
            offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn clear(&mut self) {
        self.packets.clear();
        self.offset = 0;
    }

    /// Queue one packet; it is dropped if the queue is full
    pub fn push(&mut self, packet: [u8; STREAM_OUTPUT_SIZE]) -> bool {
        if self.packets.push_back(packet).is_err() {
            warn!("stream queue full, dropped packet");
            return false;
        }
        true
    }

    /// Write queued packets in order until the port stops accepting bytes
    pub fn drain<T: SerialTx>(&mut self, tx: &mut T) -> Result<usize, T::Error> {
        let mut total = 0;
        while let Some(packet) = self.packets.front() {
            let written = tx.write(&packet[self.offset..])?;
            total += written;
            self.offset += written;
            if self.offset < STREAM_OUTPUT_SIZE {
                break;
            }
            self.packets.pop_front();
            self.offset = 0;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSerial;

    #[test]
    fn test_diagnostic_terminator() {
        let mut outbox = LocalOutbox::new();
        assert!(outbox.push_diagnostic(b"Channel: 25"));

        let mut serial = MockSerial::default();
        assert_eq!(outbox.drain(&mut serial), Ok(14));
        assert_eq!(serial.output(), b"Channel: 25$$$");
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_partial_write_resumes() {
        let mut outbox = LocalOutbox::new();
        outbox.push_diagnostic(b"abcdef");

        let mut serial = MockSerial::default();
        serial.set_write_limit(Some(4));
        assert_eq!(outbox.drain(&mut serial), Ok(4));
        assert_eq!(outbox.len(), 5);

        serial.set_write_limit(None);
        outbox.drain(&mut serial).unwrap();
        assert_eq!(serial.output(), b"abcdef$$$");
    }

    #[test]
    fn test_diagnostic_dropped_whole_when_full() {
        let mut outbox = LocalOutbox::new();
        for _ in 0..OUTBOX_CAPACITY - 2 {
            outbox.push_byte(0);
        }
        assert!(!outbox.push_diagnostic(b"x"));
        assert_eq!(outbox.len(), OUTBOX_CAPACITY - 2);
    }

    #[test]
    fn test_stream_queue_keeps_order() {
        let mut queue = StreamPacketQueue::new();
        let mut first = [0u8; STREAM_OUTPUT_SIZE];
        first[0] = 1;
        let mut second = [0u8; STREAM_OUTPUT_SIZE];
        second[0] = 2;
        queue.push(first);
        queue.push(second);

        let mut serial = MockSerial::default();
        serial.set_write_limit(Some(40));
        assert_eq!(queue.drain(&mut serial), Ok(40));
        assert_eq!(queue.len(), 1);

        serial.set_write_limit(None);
        assert_eq!(queue.drain(&mut serial), Ok(26));
        assert!(queue.is_empty());
        assert_eq!(serial.output()[0], 1);
        assert_eq!(serial.output()[STREAM_OUTPUT_SIZE], 2);
    }

    #[test]
    fn test_stream_queue_full() {
        let mut queue = StreamPacketQueue::new();
        for _ in 0..STREAM_QUEUE_DEPTH {
            assert!(queue.push([0; STREAM_OUTPUT_SIZE]));
        }
        assert!(!queue.push([0; STREAM_OUTPUT_SIZE]));
        assert_eq!(queue.len(), STREAM_QUEUE_DEPTH);
    }
}
