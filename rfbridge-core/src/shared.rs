//! Bridge shared between the main loop and the radio callback
//!
//! On the target the radio stack delivers frames from interrupt context, so
//! both entry points take a critical section around the whole call. Each
//! callback therefore sees and leaves the buffers in a consistent state.
//!
//! ```ignore
//! static BRIDGE: SharedBridge<Radio, Flash, EmbassyClock> =
//!     SharedBridge::new(Bridge::new(CONFIG, Radio::new(), Flash::new(), EmbassyClock));
//!
//! fn on_receive(peer: PeerId, rssi: i8, data: &[u8]) {
//!     BRIDGE.on_deliver(peer, rssi, data);
//! }
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use rfbridge_hal::{Clock, PeerId, RadioTransport, SerialPort, WordStorage};

use crate::bridge::{Bridge, LoopStatus};
use crate::channel::ChannelError;

/// [`Bridge`] behind a critical-section mutex
pub struct SharedBridge<R, S, C> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Bridge<R, S, C>>>,
}

impl<R, S, C> SharedBridge<R, S, C>
where
    R: RadioTransport,
    S: WordStorage,
    C: Clock,
{
    pub const fn new(bridge: Bridge<R, S, C>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(bridge)),
        }
    }

    pub fn begin(&self) -> Result<u8, ChannelError> {
        self.with(|bridge| bridge.begin())
    }

    /// Radio receive callback
    pub fn on_deliver(&self, peer: PeerId, rssi: i8, data: &[u8]) {
        self.with(|bridge| bridge.on_deliver(peer, rssi, data));
    }

    /// Main-loop body
    pub fn poll<P: SerialPort>(&self, serial: &mut P) -> LoopStatus {
        self.with(|bridge| bridge.poll(serial))
    }

    /// Run `f` with exclusive access to the bridge
    pub fn with<T>(&self, f: impl FnOnce(&mut Bridge<R, S, C>) -> T) -> T {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
