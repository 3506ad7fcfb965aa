//! Channel-change handshake
//!
//! The host is authoritative:
//!
//! 1. Host sends CHANGE_CHANNEL_HOST_REQUEST (host: Idle → HostRequested)
//! 2. Device replies DEVICE_READY (device: Idle → DeviceReady)
//! 3. Host switches, persists and replies with the raw channel number
//!    (host: HostRequested → Committed)
//! 4. Device persists, switches and polls (device: DeviceReady → Idle); the
//!    host sees that poll on the new channel (host: Committed → Idle)

/// Handshake progress on one side of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    #[default]
    Idle,
    /// Host sent the request and waits for DEVICE_READY
    HostRequested,
    /// Device waits for the channel number
    DeviceReady,
    /// Host switched and waits for the device to poll on the new channel
    Committed,
}

/// Events driving [`HandshakeState::transition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeEvent {
    /// Host sent CHANGE_CHANNEL_HOST_REQUEST
    RequestSent,
    /// Device received CHANGE_CHANNEL_HOST_REQUEST
    RequestReceived,
    /// Host received DEVICE_READY
    DeviceReadyReceived,
    /// Device received the new channel number
    ChannelReceived,
    /// Host heard the device on the new channel
    Confirmed,
    /// The peer answered INVALID_CODE_RECEIVED
    Rejected,
    /// The host stopped hearing the device
    LinkLost,
}

impl HandshakeState {
    /// A change is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, HandshakeState::Idle)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: HandshakeEvent) -> Self {
        use HandshakeEvent::*;
        use HandshakeState::*;

        match (self, event) {
            // Host side
            (Idle, RequestSent) => HostRequested,
            (HostRequested, DeviceReadyReceived) => Committed,
            (HostRequested, Rejected) => Idle,
            (Committed, Confirmed) => Idle,
            (HostRequested, LinkLost) => Idle,
            (Committed, LinkLost) => Idle,

            // Device side
            (Idle, RequestReceived) => DeviceReady,
            (DeviceReady, ChannelReceived) => Idle,
            (DeviceReady, Rejected) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

/// Handshake state plus the channels involved
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelHandshake {
    state: HandshakeState,
    /// Channel being moved to (host only)
    target: Option<u8>,
    /// Channel in use before the change (host only)
    previous: Option<u8>,
}

impl ChannelHandshake {
    pub const fn new() -> Self {
        Self {
            state: HandshakeState::Idle,
            target: None,
            previous: None,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn target(&self) -> Option<u8> {
        self.target
    }

    pub fn previous(&self) -> Option<u8> {
        self.previous
    }

    /// The device expects the next length-1 frame to be a channel number
    pub fn awaiting_channel(&self) -> bool {
        self.state == HandshakeState::DeviceReady
    }

    /// Apply an event, returning the new state
    pub fn apply(&mut self, event: HandshakeEvent) -> HandshakeState {
        let next = self.state.transition(event);
        if next != self.state {
            debug!("handshake {} -> {}", self.state, next);
        }
        self.state = next;
        if next == HandshakeState::Idle {
            self.target = None;
            self.previous = None;
        }
        next
    }

    /// Host step 1: remember where we are going and where we came from
    pub fn request(&mut self, target: u8, previous: u8) -> HandshakeState {
        let next = self.apply(HandshakeEvent::RequestSent);
        if next == HandshakeState::HostRequested {
            self.target = Some(target);
            self.previous = Some(previous);
        }
        next
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
