//! Monotonic time source
//!
//! Both counters wrap; callers compare with `wrapping_sub`.

/// Monotonic clock with millisecond and microsecond resolution
pub trait Clock {
    /// Milliseconds since boot (wrapping)
    fn now_ms(&self) -> u32;

    /// Microseconds since boot (wrapping)
    fn now_us(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        embassy_time::Instant::now().as_millis() as u32
    }

    fn now_us(&self) -> u32 {
        embassy_time::Instant::now().as_micros() as u32
    }
}
