//! Ping-pong reassembly engine
//!
//! Frames are applied to the *current* buffer. When the current buffer holds
//! a complete page (draining or waiting to drain) a new page is steered into
//! the other buffer, provided that one is free. If it is not, the frame is
//! refused without touching either buffer and the sender's own retry timer
//! takes care of it.

use super::page::RadioPageBuffer;

/// Which of the two page buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferSlot {
    A,
    B,
}

impl BufferSlot {
    /// The other buffer
    pub fn other(self) -> Self {
        match self {
            BufferSlot::A => BufferSlot::B,
            BufferSlot::B => BufferSlot::A,
        }
    }

    fn index(self) -> usize {
        match self {
            BufferSlot::A => 0,
            BufferSlot::B => 1,
        }
    }
}

/// The other buffer still holds data or is draining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchError;

/// Result of applying one frame, with the buffer it landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReassemblyOutcome {
    /// One-frame page, complete
    LastSingle(BufferSlot),
    /// First frame of a multi-frame page
    NotLastFirst(BufferSlot),
    /// Continuation frame
    NotLastMiddle(BufferSlot),
    /// Final frame of a multi-frame page, complete
    LastMulti(BufferSlot),
    /// Index gap on a non-final frame; page discarded
    MissedNotLast(BufferSlot),
    /// Index gap on the final frame; page discarded
    MissedLast(BufferSlot),
    /// Switched buffers, one-frame page complete in the new buffer
    SwitchLast(BufferSlot),
    /// Switched buffers, first frame of a page in the new buffer
    SwitchNotLast(BufferSlot),
    /// Both buffers busy, final frame refused
    FailSwitchLast,
    /// Both buffers busy, non-final frame refused
    FailSwitchNotLast,
}

impl ReassemblyOutcome {
    /// The frame was stored
    pub fn is_accepted(&self) -> bool {
        !self.is_missed() && !self.is_failed_switch()
    }

    /// The page was discarded and must be restarted by the sender
    pub fn is_missed(&self) -> bool {
        matches!(
            self,
            ReassemblyOutcome::MissedNotLast(_) | ReassemblyOutcome::MissedLast(_)
        )
    }

    /// The frame was refused because no buffer was free
    pub fn is_failed_switch(&self) -> bool {
        matches!(
            self,
            ReassemblyOutcome::FailSwitchLast | ReassemblyOutcome::FailSwitchNotLast
        )
    }

    /// The frame completed a page
    pub fn page_complete(&self) -> bool {
        matches!(
            self,
            ReassemblyOutcome::LastSingle(_)
                | ReassemblyOutcome::LastMulti(_)
                | ReassemblyOutcome::SwitchLast(_)
        )
    }

    /// Buffer affected by this outcome, if any
    pub fn slot(&self) -> Option<BufferSlot> {
        match *self {
            ReassemblyOutcome::LastSingle(slot)
            | ReassemblyOutcome::NotLastFirst(slot)
            | ReassemblyOutcome::NotLastMiddle(slot)
            | ReassemblyOutcome::LastMulti(slot)
            | ReassemblyOutcome::MissedNotLast(slot)
            | ReassemblyOutcome::MissedLast(slot)
            | ReassemblyOutcome::SwitchLast(slot)
            | ReassemblyOutcome::SwitchNotLast(slot) => Some(slot),
            ReassemblyOutcome::FailSwitchLast | ReassemblyOutcome::FailSwitchNotLast => None,
        }
    }
}

/// Two page buffers and the selector of the one being filled
#[derive(Debug, Clone)]
pub struct ReassemblyEngine {
    buffers: [RadioPageBuffer; 2],
    current: BufferSlot,
}

impl Default for ReassemblyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReassemblyEngine {
    /// Create an engine with both buffers empty, filling A first
    pub const fn new() -> Self {
        Self {
            buffers: [RadioPageBuffer::new(), RadioPageBuffer::new()],
            current: BufferSlot::A,
        }
    }

    /// Reset both buffers and select A
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.reset();
        }
        self.current = BufferSlot::A;
    }

    /// Buffer currently being filled
    pub fn current(&self) -> BufferSlot {
        self.current
    }

    /// Read access to one buffer
    pub fn buffer(&self, slot: BufferSlot) -> &RadioPageBuffer {
        &self.buffers[slot.index()]
    }

    /// Empty and not draining
    pub fn ready_for_new_page(&self, slot: BufferSlot) -> bool {
        self.buffer(slot).ready_for_new_page()
    }

    /// Point the selector at the other buffer if it is free
    ///
    /// Never touches buffer contents.
    pub fn switch_to_other_buffer(&mut self) -> Result<BufferSlot, SwitchError> {
        let other = self.current.other();
        if !self.ready_for_new_page(other) {
            return Err(SwitchError);
        }
        self.current = other;
        Ok(other)
    }

    /// Apply one checksum-verified, non-stream frame
    pub fn process_incoming_frame(&mut self, index: u8, payload: &[u8]) -> ReassemblyOutcome {
        let is_last = index == 0;
        let slot = self.current;

        if self.buffers[slot.index()].is_complete() {
            let next = match self.switch_to_other_buffer() {
                Ok(next) => next,
                Err(SwitchError) => {
                    return if is_last {
                        ReassemblyOutcome::FailSwitchLast
                    } else {
                        ReassemblyOutcome::FailSwitchNotLast
                    };
                }
            };

            if self.buffers[next.index()].start_page(index, payload).is_err() {
                return self.discard(next, is_last);
            }
            return if is_last {
                ReassemblyOutcome::SwitchLast(next)
            } else {
                ReassemblyOutcome::SwitchNotLast(next)
            };
        }

        let buffer = &mut self.buffers[slot.index()];

        if buffer.is_empty() {
            if buffer.start_page(index, payload).is_err() {
                return self.discard(slot, is_last);
            }
            return if is_last {
                ReassemblyOutcome::LastSingle(slot)
            } else {
                ReassemblyOutcome::NotLastFirst(slot)
            };
        }

        if !buffer.expects(index) || buffer.append(index, payload).is_err() {
            return self.discard(slot, is_last);
        }

        if is_last {
            ReassemblyOutcome::LastMulti(slot)
        } else {
            ReassemblyOutcome::NotLastMiddle(slot)
        }
    }

    fn discard(&mut self, slot: BufferSlot, is_last: bool) -> ReassemblyOutcome {
        self.buffers[slot.index()].reset();
        if is_last {
            ReassemblyOutcome::MissedLast(slot)
        } else {
            ReassemblyOutcome::MissedNotLast(slot)
        }
    }

    /// Buffer that should be written to the local serial port next
    ///
    /// A buffer already draining comes first, then a complete buffer that is
    /// not being filled (it completed earlier), then the current one.
    pub fn next_to_flush(&self) -> Option<BufferSlot> {
        let current = self.current;
        let other = current.other();

        [other, current]
            .into_iter()
            .find(|&slot| self.buffer(slot).is_flushing())
            .or_else(|| {
                [other, current]
                    .into_iter()
                    .find(|&slot| self.buffer(slot).is_complete())
            })
    }

    /// Mark a complete buffer as draining
    pub fn begin_flush(&mut self, slot: BufferSlot) -> bool {
        self.buffers[slot.index()].begin_flush()
    }

    /// Bytes of `slot` not yet written out
    pub fn pending(&self, slot: BufferSlot) -> &[u8] {
        self.buffer(slot).pending()
    }

    /// Record that `count` bytes of `slot` were written; true once drained
    pub fn consume(&mut self, slot: BufferSlot, count: usize) -> bool {
        self.buffers[slot.index()].consume(count)
    }
}
