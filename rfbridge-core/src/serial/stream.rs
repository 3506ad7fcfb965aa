//! Stream packet recognizer
//!
//! Watches the device's serial input for `HEAD | 31 bytes | 0xFX`. Once the
//! tail arrives the packet waits for a short quiet period. Any further byte
//! in that window means the input was not a stream packet after all (for
//! example a firmware upload that happened to contain the head byte).

use rfbridge_protocol::{
    is_stream_tail, RadioFrame, STREAM_PACKET_HEAD, STREAM_PAYLOAD_SIZE,
};

/// Default quiet period after the tail before a packet is launched
pub const DEFAULT_STREAM_QUIET_US: u32 = 100;

/// Recognizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    /// Waiting for a head byte
    Idle,
    /// Collecting payload bytes, then expecting the tail
    GotHead,
    /// Tail seen, waiting for the quiet period
    ReadyForLaunch,
}

/// Buffer for one candidate stream packet
#[derive(Debug, Clone)]
pub struct StreamFrameBuffer {
    state: StreamState,
    data: [u8; STREAM_PAYLOAD_SIZE],
    bytes_in: usize,
    type_byte: u8,
    tail_time_us: u32,
    quiet_us: u32,
}

impl Default for StreamFrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_QUIET_US)
    }
}

impl StreamFrameBuffer {
    pub const fn new(quiet_us: u32) -> Self {
        Self {
            state: StreamState::Idle,
            data: [0; STREAM_PAYLOAD_SIZE],
            bytes_in: 0,
            type_byte: 0,
            tail_time_us: 0,
            quiet_us,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Packet type (low nibble of the tail), valid once ready for launch
    pub fn packet_type(&self) -> u8 {
        self.type_byte & 0x0F
    }

    pub fn reset(&mut self) {
        self.state = StreamState::Idle;
        self.bytes_in = 0;
        self.type_byte = 0;
    }

    /// Feed one byte from the serial input
    pub fn process_char(&mut self, byte: u8, now_us: u32) {
        match self.state {
            StreamState::ReadyForLaunch => {
                trace!("stream packet aborted");
                self.reset();
            }
            StreamState::GotHead if self.bytes_in < STREAM_PAYLOAD_SIZE => {
                self.data[self.bytes_in] = byte;
                self.bytes_in += 1;
            }
            StreamState::GotHead => {
                if is_stream_tail(byte) {
                    self.type_byte = byte;
                    self.tail_time_us = now_us;
                    self.state = StreamState::ReadyForLaunch;
                } else if byte == STREAM_PACKET_HEAD {
                    // Not a stream packet, but this byte may start one
                    self.bytes_in = 0;
                } else {
                    self.reset();
                }
            }
            StreamState::Idle => {
                if byte == STREAM_PACKET_HEAD {
                    self.bytes_in = 0;
                    self.state = StreamState::GotHead;
                }
            }
        }
    }

    /// Tail seen and the line has stayed quiet long enough
    pub fn ready_to_launch(&self, now_us: u32) -> bool {
        self.state == StreamState::ReadyForLaunch
            && now_us.wrapping_sub(self.tail_time_us) > self.quiet_us
    }

    /// Build the stream frame and reset
    ///
    /// Returns `None` unless a packet was captured.
    pub fn launch_frame(&mut self) -> Option<RadioFrame> {
        if self.state != StreamState::ReadyForLaunch {
            return None;
        }
        let frame = RadioFrame::data(true, self.packet_type(), &self.data).ok();
        self.reset();
        frame
    }
}
