//! Poll/keepalive timing
//!
//! The device is the only side allowed to start an exchange, so it polls the
//! host with an empty frame whenever it has been silent for a poll interval.
//! The host only listens: it remembers when it last heard from the device.

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 80;

/// Silence, in poll intervals, after which the host reports the link lost
pub const LINK_LOST_INTERVALS: u32 = 2;

/// Host-side view of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    Alive,
    Lost,
}

/// Last-activity timestamp and poll interval
#[derive(Debug, Clone, Copy)]
pub struct PollTimer {
    last_ms: u32,
    interval_ms: u32,
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL_MS)
    }
}

impl PollTimer {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            last_ms: 0,
            interval_ms,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Record activity at `now_ms`
    ///
    /// On the device this is every transmission; on the host every frame
    /// heard from the device.
    pub fn refresh(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    /// Milliseconds since the last refresh
    pub fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_ms)
    }

    /// The device should send a keepalive
    pub fn poll_due(&self, now_ms: u32) -> bool {
        self.elapsed(now_ms) > self.interval_ms
    }

    pub fn link_status(&self, now_ms: u32) -> LinkStatus {
        if self.elapsed(now_ms) > self.interval_ms.saturating_mul(LINK_LOST_INTERVALS) {
            LinkStatus::Lost
        } else {
            LinkStatus::Alive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_due_after_interval() {
        let mut timer = PollTimer::new(80);
        timer.refresh(1_000);
        assert!(!timer.poll_due(1_050));
        assert!(!timer.poll_due(1_080));
        assert!(timer.poll_due(1_081));

        timer.refresh(1_081);
        assert!(!timer.poll_due(1_100));
    }

    #[test]
    fn test_link_lost_after_two_intervals() {
        let mut timer = PollTimer::new(80);
        timer.refresh(0);
        assert_eq!(timer.link_status(160), LinkStatus::Alive);
        assert_eq!(timer.link_status(161), LinkStatus::Lost);
        timer.refresh(161);
        assert_eq!(timer.link_status(200), LinkStatus::Alive);
    }

    #[test]
    fn test_wrapping_clock() {
        let mut timer = PollTimer::new(80);
        timer.refresh(u32::MAX - 10);
        assert!(!timer.poll_due(20));
        assert!(timer.poll_due(70));
        assert_eq!(timer.elapsed(5), 16);
    }
}
