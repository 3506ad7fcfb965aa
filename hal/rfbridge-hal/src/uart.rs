//! UART serial communication abstractions
//!
//! The local serial link is a raw byte stream. Reads and writes are
//! non-blocking: the bridge polls them from its main loop and never waits.

/// UART transmitter
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Queue as many bytes of `data` as the transmitter will take
    ///
    /// Returns the number of bytes accepted, which may be less than
    /// `data.len()` (including zero) when the TX buffer is full.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait SerialRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is available
    ///
    /// Returns `Ok(None)` when the RX buffer is empty.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Combined serial port
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait SerialPort: SerialTx + SerialRx {}

// Blanket implementation
impl<T: SerialTx + SerialRx> SerialPort for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// RX pin, `None` for the board's default serial pins
    pub rx_pin: Option<u8>,
    /// TX pin, `None` for the board's default serial pins
    pub tx_pin: Option<u8>,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            rx_pin: None,
            tx_pin: None,
        }
    }
}

impl UartConfig {
    /// Configuration with explicit RX/TX pins
    pub const fn with_pins(baudrate: u32, rx_pin: u8, tx_pin: u8) -> Self {
        Self {
            baudrate,
            rx_pin: Some(rx_pin),
            tx_pin: Some(tx_pin),
        }
    }
}
