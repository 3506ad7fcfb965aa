//! Receive dispatcher and main-loop body
//!
//! [`Bridge`] owns every buffer. The radio stack calls
//! [`Bridge::on_deliver`] for each frame it receives and the main loop calls
//! [`Bridge::poll`]. Only `poll` touches the local serial port: anything the
//! receive path wants to tell the PC goes through the local outbox.
//!
//! The device starts every exchange. The host can only answer, so each host
//! reply (next frame, control code or nothing) is attached to the frame the
//! device just sent.

use core::fmt::Write;

use heapless::String;
use rfbridge_hal::{Clock, PeerId, RadioTransport, SerialPort, WordStorage};
use rfbridge_protocol::host::{
    HOST_CHANNEL_CHANGE_INVALID, HOST_CHANNEL_CHANGE_SUCCESS, HOST_TIME_SYNC_ACK,
};
use rfbridge_protocol::{
    classify, encode_stream_output, ControlCode, DataFrame, FrameKind, HostCommand, RadioFrame,
};

use crate::channel::{
    ChannelError, ChannelHandshake, ChannelManager, HandshakeEvent, HandshakeState, CHANNEL_MAX,
};
use crate::config::{BridgeConfig, RoleConfig};
use crate::poll::{LinkStatus, PollTimer};
use crate::radio::ReassemblyEngine;
use crate::serial::{
    FetchOutcome, LocalOutbox, SerialPageBuffer, StreamFrameBuffer, StreamPacketQueue,
};

/// Longest diagnostic line built at runtime
const LINE_LEN: usize = 48;

/// What a pass of [`Bridge::poll`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopStatus {
    /// Nothing to do
    Idle,
    /// Bytes were moved
    Busy,
    /// The host stopped hearing from the device (reported once per outage)
    LinkLost,
    /// The serial input overflowed on the device; the board should reset
    /// the attached microcontroller
    RestartRequested,
}

/// Bridge context for one radio
pub struct Bridge<R, S, C> {
    config: BridgeConfig,
    role: RoleConfig,
    radio: R,
    clock: C,
    channels: ChannelManager<S>,
    handshake: ChannelHandshake,
    engine: ReassemblyEngine,
    ingest: SerialPageBuffer,
    stream: StreamFrameBuffer,
    stream_queue: StreamPacketQueue,
    outbox: LocalOutbox,
    /// Last stream packet sent, kept for a BAD_CHECKSUM resend
    last_stream: Option<RadioFrame>,
    poll_timer: PollTimer,
    link_lost: bool,
    restart_requested: bool,
}

impl<R, S, C> Bridge<R, S, C>
where
    R: RadioTransport,
    S: WordStorage,
    C: Clock,
{
    pub const fn new(config: BridgeConfig, radio: R, storage: S, clock: C) -> Self {
        Self {
            role: RoleConfig::for_role(config.role),
            radio,
            clock,
            channels: ChannelManager::new(storage),
            handshake: ChannelHandshake::new(),
            engine: ReassemblyEngine::new(),
            ingest: SerialPageBuffer::new(config.serial_quiet_ms),
            stream: StreamFrameBuffer::new(config.stream_quiet_us),
            stream_queue: StreamPacketQueue::new(),
            outbox: LocalOutbox::new(),
            last_stream: None,
            poll_timer: PollTimer::new(config.poll_interval_ms),
            link_lost: false,
            restart_requested: false,
            config,
        }
    }

    /// Bring the bridge up
    ///
    /// Stores the default channel on first boot, tunes the radio and clears
    /// the buffers selected by the role. If the channel cannot be stored the
    /// radio still comes up on the default channel and the error is
    /// returned.
    pub fn begin(&mut self) -> Result<u8, ChannelError> {
        if !self.role.radio_enabled {
            info!("pass-through mode, radio disabled");
            return Ok(self.radio.channel());
        }

        let stored = self.channels.ensure_initialised(self.config.default_channel);
        let channel = match stored {
            Ok(channel) => channel,
            Err(err) => {
                error!("cannot store channel: {}", err);
                if self.role.is_host() {
                    self.outbox.push_diagnostic(err.message());
                }
                self.config.default_channel.min(CHANNEL_MAX)
            }
        };
        self.radio.set_channel(channel);

        let reset = self.role.boot_reset;
        if reset.radio {
            self.engine.reset();
        }
        if reset.serial {
            self.ingest.clear();
        }
        if reset.stream {
            self.stream.reset();
            self.stream_queue.clear();
        }
        self.last_stream = None;
        self.handshake.reset();
        self.poll_timer.refresh(self.clock.now_ms());

        if self.role.is_host() && self.config.announce {
            self.outbox.push_diagnostic(b"Host radio up");
            self.push_line(format_args!("Channel: {}", channel));
        }
        info!("{} up on channel {}", self.role.role, channel);

        stored
    }

    /// Handle one frame delivered by the radio
    ///
    /// Runs to completion; every reply is sent from here.
    pub fn on_deliver(&mut self, peer: PeerId, rssi: i8, data: &[u8]) {
        if !self.role.radio_enabled {
            return;
        }
        trace!("rx {} bytes from {} rssi {}", data.len(), peer.0, rssi);

        if self.role.is_host() {
            self.poll_timer.refresh(self.clock.now_ms());
            if self.link_lost {
                self.link_lost = false;
                info!("link restored");
            }
        }

        match classify(data) {
            FrameKind::Keepalive => self.on_keepalive(),
            FrameKind::Control(byte) => self.on_control(byte),
            FrameKind::Data(frame) => self.on_data(frame),
        }
    }

    fn on_keepalive(&mut self) {
        if self.role.is_host() && self.handshake.state() == HandshakeState::Committed {
            self.handshake.apply(HandshakeEvent::Confirmed);
            self.outbox.push_byte(HOST_CHANNEL_CHANGE_SUCCESS);
            info!("channel change confirmed");
            return;
        }
        self.continue_exchange(false);
    }

    fn on_control(&mut self, byte: u8) {
        if self.handshake.awaiting_channel() {
            if byte == ControlCode::InvalidCodeReceived.to_byte() {
                warn!("host abandoned the channel change");
                self.handshake.apply(HandshakeEvent::Rejected);
            } else {
                self.apply_new_channel(byte);
            }
            return;
        }

        match ControlCode::from_byte(byte) {
            Some(code) if code.is_retry_request() => self.resend(code),
            Some(code) if code.is_handshake() => self.on_handshake_code(code),
            Some(ControlCode::DeviceSerialOverflow) => {
                warn!("device serial overflow");
                if self.role.is_host() {
                    self.outbox.push_diagnostic(b"Device serial overflow");
                }
            }
            Some(ControlCode::InvalidCodeReceived) => {
                warn!("peer rejected our last code");
                if self.handshake.state() == HandshakeState::HostRequested {
                    self.handshake.apply(HandshakeEvent::Rejected);
                    self.outbox.push_byte(HOST_CHANNEL_CHANGE_INVALID);
                }
            }
            Some(_) | None => {
                warn!("unknown control code {=u8:#x}", byte);
                self.send_control(ControlCode::InvalidCodeReceived);
            }
        }
    }

    /// The peer asked for the last frame (BAD_CHECKSUM) or page
    /// (PACKET_MISSED) again
    fn resend(&mut self, code: ControlCode) {
        if code == ControlCode::BadChecksum {
            debug!("R<-B");
            if let Some(frame) = self.last_stream.take() {
                if self.send(frame.as_bytes()) {
                    trace!("S->stream");
                }
                self.last_stream = Some(frame);
                return;
            }
            self.ingest.rewind_one();
        } else {
            debug!("R<-M");
            self.ingest.rewind_page();
        }
        self.send_next_frame(true);
    }

    fn on_handshake_code(&mut self, code: ControlCode) {
        if code == ControlCode::ChangeChannelHostRequest {
            debug!("R<-CCHR");
            if self.role.handshake_responder && !self.role.channel_change_initiator {
                self.handshake.apply(HandshakeEvent::RequestReceived);
                self.send_control(ControlCode::ChangeChannelDeviceReady);
            } else {
                self.send_control(ControlCode::InvalidCodeReceived);
            }
            return;
        }

        debug!("R<-CCDR");
        if self.role.is_host() && self.handshake.state() == HandshakeState::HostRequested {
            self.commit_channel_change();
        } else {
            self.send_control(ControlCode::InvalidCodeReceived);
        }
    }

    fn on_data(&mut self, frame: DataFrame<'_>) {
        if !frame.verify() {
            debug!("S->B");
            self.send_control(ControlCode::BadChecksum);
            return;
        }

        let byte_id = frame.byte_id();
        if byte_id.is_stream() {
            self.stream_queue.push(encode_stream_output(frame.as_bytes()));
            self.continue_exchange(true);
            return;
        }

        let index = byte_id.index();
        trace!("R<-{}", index);
        let outcome = self.engine.process_incoming_frame(index, frame.payload());

        if outcome.is_missed() {
            debug!("S->M");
            self.send_control(ControlCode::PacketMissed);
        } else if outcome.is_failed_switch() {
            // The sender retries on its own; a reply would only add traffic
            warn!("both page buffers busy, dropped frame {}", index);
        } else {
            self.continue_exchange(true);
        }
    }

    /// Send more of the outbound page, or tidy up once it is all sent
    fn continue_exchange(&mut self, after_data: bool) {
        let now = self.clock.now_ms();

        if self.ingest.has_pending_data() {
            // Line still busy; the next device poll picks it up
            if self.ingest.timeout_elapsed(now) {
                self.send_next_frame(false);
            }
        } else if self.ingest.is_drained() {
            self.ingest.clear();
        } else if after_data && self.role.is_device() {
            self.send_keepalive();
        }
    }

    fn send_next_frame(&mut self, retry: bool) {
        let Some((index, frame)) = self.ingest.next_frame() else {
            return;
        };
        self.last_stream = None;

        if self.role.channel_change_initiator && self.ingest.pages_queued() == 1 && index == 0 {
            if let Some(command) = HostCommand::parse(self.ingest.slot_payload(0)) {
                self.run_host_command(command, &frame, retry);
                return;
            }
        }

        if self.send(frame.as_bytes()) {
            trace!("S->{}", index);
            self.ingest.mark_sent();
        }
    }

    fn run_host_command(&mut self, command: HostCommand, frame: &RadioFrame, retry: bool) {
        match command {
            HostCommand::TimeSync => {
                if !retry {
                    self.outbox.push_byte(HOST_TIME_SYNC_ACK);
                }
                if self.send(frame.as_bytes()) {
                    self.ingest.mark_sent();
                }
            }
            HostCommand::ChannelQuery => {
                let channel = self.current_channel();
                self.outbox.push_byte(channel);
                self.ingest.clear();
            }
            HostCommand::ChannelChange(channel) => {
                if channel > CHANNEL_MAX || self.handshake.state().is_active() {
                    self.outbox.push_byte(HOST_CHANNEL_CHANGE_INVALID);
                    self.ingest.mark_sent();
                    return;
                }
                debug!("new channel: {}", channel);
                let previous = self.current_channel();
                if self.send_control(ControlCode::ChangeChannelHostRequest) {
                    self.handshake.request(channel, previous);
                    self.ingest.mark_sent();
                }
            }
        }
    }

    /// Host, step 3: hand the device its new channel and move there
    fn commit_channel_change(&mut self) {
        let Some(target) = self.handshake.target() else {
            self.send_control(ControlCode::InvalidCodeReceived);
            return;
        };
        if !self.send(&[target]) {
            return;
        }
        // A storage error is already reported; the radio still moves
        let _ = self.store_channel(target);
        self.radio.set_channel(target);
        self.handshake.apply(HandshakeEvent::DeviceReadyReceived);
        info!("switched to channel {}, waiting for device", target);
    }

    /// Device, step 4: store and use the channel, then poll the host there
    fn apply_new_channel(&mut self, channel: u8) {
        self.handshake.apply(HandshakeEvent::ChannelReceived);
        self.poll_timer.refresh(self.clock.now_ms());

        match self.store_channel(channel) {
            Ok(channel) => {
                self.radio.set_channel(channel);
                info!("moved to channel {}", channel);
                self.send_keepalive();
            }
            Err(err) => {
                // Stay put; the host loses us and falls back
                error!("cannot store channel {}: {}", channel, err);
            }
        }
    }

    /// Main-loop body
    pub fn poll<P: SerialPort>(&mut self, serial: &mut P) -> LoopStatus {
        if !self.role.radio_enabled {
            return LoopStatus::Idle;
        }

        let now_ms = self.clock.now_ms();
        let now_us = self.clock.now_us();
        let mut busy = false;

        let stream_enabled = self.role.stream_initiator;
        let stream = &mut self.stream;
        let fetched = self.ingest.fetch(serial, now_ms, |byte| {
            if stream_enabled {
                stream.process_char(byte, now_us);
            }
        });

        match fetched {
            FetchOutcome::Idle => {}
            FetchOutcome::Received(_) => {
                busy = true;
                if self.role.polls {
                    self.poll_timer.refresh(now_ms);
                }
            }
            FetchOutcome::Overflow => {
                busy = true;
                self.stream.reset();
                if self.role.is_device() {
                    self.send_control(ControlCode::DeviceSerialOverflow);
                    self.restart_requested = true;
                } else {
                    self.outbox.push_diagnostic(b"Input too large!");
                }
            }
        }

        if self.role.is_device() {
            busy |= self.device_transmit(now_ms, now_us);
        }

        let status = if self.role.is_host() {
            self.check_link(now_ms)
        } else {
            None
        };

        if let Some(slot) = self.engine.next_to_flush() {
            self.engine.begin_flush(slot);
            match serial.write(self.engine.pending(slot)) {
                Ok(written) => {
                    if self.engine.consume(slot, written) {
                        trace!("page flushed from {}", slot);
                    }
                    busy |= written > 0;
                }
                Err(_) => warn!("serial write failed"),
            }
        }

        match self.stream_queue.drain(serial) {
            Ok(written) => busy |= written > 0,
            Err(_) => warn!("serial write failed"),
        }
        match self.outbox.drain(serial) {
            Ok(written) if written > 0 => {
                busy = true;
                if serial.flush().is_err() {
                    warn!("serial flush failed");
                }
            }
            Ok(_) => {}
            Err(_) => warn!("serial write failed"),
        }

        if self.restart_requested {
            self.restart_requested = false;
            return LoopStatus::RestartRequested;
        }
        match status {
            Some(status) => status,
            None if busy => LoopStatus::Busy,
            None => LoopStatus::Idle,
        }
    }

    /// Device transmissions started from the loop
    fn device_transmit(&mut self, now_ms: u32, now_us: u32) -> bool {
        if self.stream.ready_to_launch(now_us) {
            if let Some(frame) = self.stream.launch_frame() {
                if self.send(frame.as_bytes()) {
                    trace!("S->stream");
                }
                self.last_stream = Some(frame);
                // The packet bytes were paged as serial data too
                self.ingest.clear();
                return true;
            }
        }

        let first_page_waiting = self.ingest.has_pending_data() && self.ingest.pages_sent() == 0;
        if first_page_waiting {
            if self.ingest.timeout_elapsed(now_ms) {
                return self.send_first_page().is_some();
            }
            return false;
        }

        if self.poll_timer.poll_due(now_ms) {
            self.send_keepalive();
            return true;
        }
        false
    }

    /// Send the first frame of the outbound page
    ///
    /// Returns the index sent, if any.
    pub fn send_first_page(&mut self) -> Option<u8> {
        match self.ingest.send_first_page(&mut self.radio) {
            Ok(Some(index)) => {
                trace!("Si->{}", index);
                self.last_stream = None;
                self.poll_timer.refresh(self.clock.now_ms());
                Some(index)
            }
            Ok(None) => None,
            Err(_) => {
                warn!("radio send failed");
                None
            }
        }
    }

    /// Edge-triggered link loss on the host
    fn check_link(&mut self, now_ms: u32) -> Option<LoopStatus> {
        if self.poll_timer.link_status(now_ms) == LinkStatus::Alive || self.link_lost {
            return None;
        }
        self.link_lost = true;
        warn!("no poll from device for {} ms", self.poll_timer.elapsed(now_ms));

        if self.handshake.state().is_active() {
            self.revert_channel_change();
        }
        Some(LoopStatus::LinkLost)
    }

    fn revert_channel_change(&mut self) {
        let previous = self.handshake.previous();
        self.handshake.apply(HandshakeEvent::LinkLost);

        let Some(previous) = previous else {
            return;
        };
        if self.radio.channel() != previous {
            self.radio.set_channel(previous);
            let _ = self.store_channel(previous);
        }
        warn!("channel change failed, back on {}", previous);
        self.push_line(format_args!("Channel change failed, back on {}", previous));
    }

    /// Persist a channel and tell the local serial port how it went
    fn store_channel(&mut self, channel: u8) -> Result<u8, ChannelError> {
        let stored = self.channels.set_channel(channel);
        match stored {
            Ok(_) => {
                self.outbox.push_diagnostic(b"Channel Number Set");
            }
            Err(err) => {
                if self.role.is_host() {
                    self.outbox.push_diagnostic(err.message());
                }
            }
        }
        stored
    }

    fn send(&mut self, data: &[u8]) -> bool {
        match self.radio.send_to_peer(data) {
            Ok(()) => {
                if self.role.polls {
                    self.poll_timer.refresh(self.clock.now_ms());
                }
                true
            }
            Err(_) => {
                warn!("radio send failed");
                false
            }
        }
    }

    fn send_control(&mut self, code: ControlCode) -> bool {
        self.send(&[code.to_byte()])
    }

    fn send_keepalive(&mut self) -> bool {
        self.send(&[])
    }

    fn push_line(&mut self, args: core::fmt::Arguments<'_>) {
        let mut line: String<LINE_LEN> = String::new();
        if line.write_fmt(args).is_ok() {
            self.outbox.push_diagnostic(line.as_bytes());
        }
    }

    /// Stored channel, or the radio's if storage is unset
    pub fn current_channel(&self) -> u8 {
        self.channels
            .get_channel()
            .unwrap_or_else(|| self.radio.channel())
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn role_config(&self) -> &RoleConfig {
        &self.role
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn channels(&self) -> &ChannelManager<S> {
        &self.channels
    }

    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake.state()
    }

    pub fn engine(&self) -> &ReassemblyEngine {
        &self.engine
    }

    pub fn ingest(&self) -> &SerialPageBuffer {
        &self.ingest
    }

    pub fn outbox(&self) -> &LocalOutbox {
        &self.outbox
    }

    pub fn stream_queue(&self) -> &StreamPacketQueue {
        &self.stream_queue
    }

    pub fn link_lost(&self) -> bool {
        self.link_lost
    }
}
