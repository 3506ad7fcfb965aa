//! In-memory collaborators for unit tests

use core::cell::Cell;

use heapless::{Deque, Vec};
use rfbridge_hal::flash::{page_from_address, ERASED_WORD};
use rfbridge_hal::{Clock, FlashError, RadioTransport, SerialRx, SerialTx, WordStorage};
use rfbridge_protocol::MAX_FRAME_SIZE;

/// Error returned by the mocks when told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Serial port with scripted input and captured output
#[derive(Debug, Default)]
pub struct MockSerial {
    input: Deque<u8, 1024>,
    output: Vec<u8, 4096>,
    /// Bytes still accepted by `write`; `None` for unlimited
    write_budget: Option<usize>,
    flushes: usize,
}

impl MockSerial {
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut serial = Self::default();
        serial.push_input(bytes);
        serial
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.input.push_back(b).unwrap();
        }
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    pub fn set_write_limit(&mut self, budget: Option<usize>) {
        self.write_budget = budget;
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl SerialTx for MockSerial {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<usize, MockError> {
        let count = match self.write_budget {
            Some(budget) => data.len().min(budget),
            None => data.len(),
        };
        self.output.extend_from_slice(&data[..count]).unwrap();
        if let Some(budget) = self.write_budget.as_mut() {
            *budget -= count;
        }
        Ok(count)
    }

    fn flush(&mut self) -> Result<(), MockError> {
        self.flushes += 1;
        Ok(())
    }
}

impl SerialRx for MockSerial {
    type Error = MockError;

    fn read_byte(&mut self) -> Result<Option<u8>, MockError> {
        Ok(self.input.pop_front())
    }
}

/// Radio that records every frame it is asked to send
#[derive(Debug, Default)]
pub struct MockRadio {
    sent: Vec<Vec<u8, MAX_FRAME_SIZE>, 64>,
    channel: u8,
    fail_sends: bool,
}

impl MockRadio {
    pub fn sent(&self, index: usize) -> &[u8] {
        &self.sent[index]
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    pub fn last_sent(&self) -> Option<&[u8]> {
        self.sent.last().map(|frame| &frame[..])
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }

    pub fn set_fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }
}

impl RadioTransport for MockRadio {
    type Error = MockError;

    fn send_to_peer(&mut self, data: &[u8]) -> Result<(), MockError> {
        if self.fail_sends {
            return Err(MockError);
        }
        self.sent.push(Vec::from_slice(data).unwrap()).unwrap();
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) {
        self.channel = channel;
    }

    fn channel(&self) -> u8 {
        self.channel
    }
}

/// Word storage backed by a small map
#[derive(Debug, Default)]
pub struct MemStorage {
    words: Vec<(u32, u32), 16>,
    reserved: Vec<u32, 4>,
    fail_with: Option<FlashError>,
    failing_writes: u8,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse erases and writes on `page` from now on
    pub fn reserve_page(&mut self, page: u32) {
        self.reserved.push(page).unwrap();
    }

    /// Make the next `write_word` fail once
    pub fn fail_next_write(&mut self, err: FlashError) {
        self.fail_writes(err, 1);
    }

    /// Make the next `count` calls to `write_word` fail
    pub fn fail_writes(&mut self, err: FlashError, count: u8) {
        self.fail_with = Some(err);
        self.failing_writes = count;
    }
}

impl WordStorage for MemStorage {
    fn read_word(&self, addr: u32) -> u32 {
        self.words
            .iter()
            .find(|(a, _)| *a == addr)
            .map_or(ERASED_WORD, |(_, w)| *w)
    }

    fn erase_page(&mut self, page: u32) -> Result<(), FlashError> {
        if self.reserved.contains(&page) {
            return Err(FlashError::PageReserved);
        }
        self.words.retain(|(a, _)| page_from_address(*a) != page);
        Ok(())
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            if let Some(err) = self.fail_with {
                return Err(err);
            }
        }
        if self.reserved.contains(&page_from_address(addr)) {
            return Err(FlashError::PageReserved);
        }
        match self.words.iter_mut().find(|(a, _)| *a == addr) {
            Some(entry) => entry.1 = word,
            None => self.words.push((addr, word)).unwrap(),
        }
        Ok(())
    }
}

/// Clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    us: Cell<u32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: u32) {
        self.advance_us(ms.wrapping_mul(1_000));
    }

    pub fn advance_us(&self, us: u32) {
        self.us.set(self.us.get().wrapping_add(us));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.us.get() / 1_000
    }

    fn now_us(&self) -> u32 {
        self.us.get()
    }
}
