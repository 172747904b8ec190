//! See [`Console`] for more details.

use arrayvec::ArrayVec;
use log::{debug, trace, warn};
use snafu::ensure;

use crate::buffer::LineBuffer;
use crate::dispatch::{CommandHandler, OutboundLink, ReadyHandler, Registry};
use crate::event::{CdcEvent, ControlReply, DeviceEvent};
use crate::nom_parser::{parse_run, RunToken};
use crate::transfer::{Direction, Transport, TransferSlot, TransferStatus};
use crate::types::{not_configured, ConnectionState, ControlLineState, Error, LineCoding};
use crate::{BUFFER_SIZE, RESET_LINE_RESPONSE, SUPPORTED_CONFIGURATION};

/// Line console over a CDC virtual serial port.
///
/// The console never performs I/O itself. The transport driver feeds it
/// [`DeviceEvent`]s and [`CdcEvent`]s, and the console calls back into the
/// [`Transport`] to start reads and writes. Everything runs in the caller's
/// context and nothing blocks.
///
/// Received bytes are echoed back and collected into a line. A carriage
/// return completes the line and hands it to the command handler, BEL or
/// backspace throws the line away.
///
/// # Example
///
/// ```
/// use cdc_console::{
///     CdcEvent, Console, DeviceEvent, Outbound, TransferHandle, TransferStatus, Transport,
///     TransportError,
/// };
///
/// #[derive(Default)]
/// struct Loopback {
///     sent: Vec<u8>,
/// }
///
/// impl Transport for Loopback {
///     fn start_read(&mut self, _capacity: usize) -> Result<TransferHandle, TransportError> {
///         Ok(TransferHandle(1))
///     }
///     fn start_write(&mut self, data: &[u8]) -> Result<TransferHandle, TransportError> {
///         self.sent.extend_from_slice(data);
///         Ok(TransferHandle(2))
///     }
/// }
///
/// let mut console = Console::new(Loopback::default());
/// console.register_command_handler(|line: &[u8], out: &mut dyn Outbound| {
///     assert_eq!(line, b"led on");
///     let _ = out.write("\r\nok\r\n");
/// });
/// console.on_device_event(DeviceEvent::Configured { configuration: 1 });
///
/// console.on_cdc_event(CdcEvent::ReadComplete {
///     data: b"led on\r",
///     status: TransferStatus::Complete,
/// });
/// assert_eq!(console.transport().sent, b"\r\nok\r\n");
/// ```
#[derive(Debug)]
pub struct Console<T: Transport> {
    transport: T,
    state: ConnectionState,
    line_coding: LineCoding,
    host_line_coding: Option<LineCoding>,
    control_lines: ControlLineState,
    break_duration: u16,
    rx: TransferSlot,
    tx: TransferSlot,
    line: LineBuffer,
    registry: Registry,
}

/// Read-only snapshot of the session.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SessionState {
    pub connection: ConnectionState,
    /// The line coding reported to the host.
    pub line_coding: LineCoding,
    /// The line coding last set by the host, if any.
    pub host_line_coding: Option<LineCoding>,
    pub control_lines: ControlLineState,
    /// Duration of the last break requested by the host, in milliseconds.
    pub break_duration: u16,
    pub read_pending: bool,
    pub write_pending: bool,
    /// Number of bytes collected for the current line.
    pub line_len: usize,
}

type EchoBuffer = ArrayVec<u8, BUFFER_SIZE>;

impl<T: Transport> Console<T> {
    /// Create an unattached console. Nothing is started until the
    /// transport reports a configuration.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionState::Unattached,
            line_coding: LineCoding::DEFAULT,
            host_line_coding: None,
            control_lines: ControlLineState::default(),
            break_duration: 0,
            rx: TransferSlot::new(Direction::Inbound),
            tx: TransferSlot::new(Direction::Outbound),
            line: LineBuffer::new(),
            registry: Registry::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn session_state(&self) -> SessionState {
        SessionState {
            connection: self.state,
            line_coding: self.line_coding,
            host_line_coding: self.host_line_coding,
            control_lines: self.control_lines,
            break_duration: self.break_duration,
            read_pending: self.rx.is_outstanding(),
            write_pending: self.tx.is_outstanding(),
            line_len: self.line.len(),
        }
    }

    /// The bytes collected so far for the current line.
    pub fn pending_line(&self) -> &[u8] {
        self.line.as_ref()
    }

    /// Clear the line and, if configured, arm the first read.
    ///
    /// # Errors
    /// [`Error::NotConfigured`] before the session is configured, or the
    /// error from starting the read.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.line.clear();
        if !self.tx.is_outstanding() {
            self.tx.reset();
        }
        ensure!(self.state == ConnectionState::Configured, not_configured());
        self.rx.start_read(&mut self.transport, self.state)
    }

    /// Start sending `text` to the host.
    ///
    /// Never blocks and never queues: a write while another one is
    /// outstanding fails with [`Error::SlotBusy`].
    pub fn write(&mut self, text: &str) -> Result<(), Error> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_bytes(&mut self, text: &[u8]) -> Result<(), Error> {
        self.tx.start_write(&mut self.transport, self.state, text)
    }

    pub fn register_command_handler(&mut self, handler: impl CommandHandler + 'static) {
        self.registry.register_command_handler(handler);
    }

    pub fn unregister_command_handler(&mut self) {
        self.registry.unregister_command_handler();
    }

    pub fn register_ready_handler(&mut self, handler: impl ReadyHandler + 'static) {
        self.registry.register_ready_handler(handler);
    }

    pub fn unregister_ready_handler(&mut self) {
        self.registry.unregister_ready_handler();
    }

    /// The line coding reported to the host.
    pub fn line_coding(&self) -> LineCoding {
        self.line_coding
    }

    /// Change the line coding reported to the host.
    pub fn set_line_coding(&mut self, line_coding: LineCoding) {
        self.line_coding = line_coding;
    }

    /// The line coding last requested by the host.
    pub fn host_line_coding(&self) -> Option<LineCoding> {
        self.host_line_coding
    }

    pub fn set_control_line_state(&mut self, dtr: bool, carrier: bool) {
        self.control_lines = ControlLineState { dtr, carrier };
    }

    /// Handle a device level event.
    pub fn on_device_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Configured { configuration } => self.configured(configuration),
            DeviceEvent::Reset | DeviceEvent::Detached => {
                self.set_state(ConnectionState::Unattached)
            }
            DeviceEvent::PowerDetected => self.transport.attach(),
            DeviceEvent::PowerRemoved => {
                self.transport.detach();
                self.set_state(ConnectionState::Unattached);
            }
            DeviceEvent::Suspended if self.state == ConnectionState::Configured => {
                self.set_state(ConnectionState::Suspended)
            }
            DeviceEvent::Resumed if self.state == ConnectionState::Suspended => {
                self.set_state(ConnectionState::Configured)
            }
            DeviceEvent::Attached
            | DeviceEvent::Suspended
            | DeviceEvent::Resumed
            | DeviceEvent::Error => {}
        }
    }

    /// Handle a CDC class event. The reply tells the transport how to
    /// finish the control request, if the event was one.
    pub fn on_cdc_event(&mut self, event: CdcEvent<'_>) -> ControlReply {
        use CdcEvent::*;

        match event {
            GetLineCoding => ControlReply::LineCoding(self.line_coding),
            SetLineCoding(line_coding) => {
                debug!("Host line coding {:?}", line_coding);
                self.host_line_coding = Some(line_coding);
                ControlReply::Ok
            }
            SetControlLineState(lines) => {
                self.set_control_line_state(lines.dtr, lines.carrier);
                ControlReply::Ok
            }
            SendBreak { duration } => {
                self.break_duration = duration;
                ControlReply::Ok
            }
            ReadComplete { data, status } => {
                self.read_complete(data, status);
                ControlReply::None
            }
            WriteComplete { status } => {
                self.tx.complete(status);
                ControlReply::None
            }
            ControlTransferDataReceived => ControlReply::Ok,
            ControlTransferDataSent => ControlReply::None,
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!("Connection {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn configured(&mut self, configuration: u8) {
        if configuration != SUPPORTED_CONFIGURATION {
            warn!("Ignoring unsupported configuration {}", configuration);
            return;
        }
        match self.state {
            ConnectionState::Configured => return,
            // still the same configuration, transfers in flight stay valid
            ConnectionState::Suspended => {
                self.set_state(ConnectionState::Configured);
                return;
            }
            ConnectionState::Unattached => self.set_state(ConnectionState::Configured),
        }
        // a new configuration aborts whatever was in flight
        self.rx.reset();
        self.tx.reset();

        match self.initialize() {
            Ok(()) => {
                let mut out = OutboundLink {
                    slot: &mut self.tx,
                    transport: &mut self.transport,
                    state: self.state,
                };
                self.registry.dispatch_ready(&mut out);
            }
            Err(err) => warn!("Console not ready: {}", err),
        }
    }

    fn read_complete(&mut self, data: &[u8], status: TransferStatus) {
        if !self.rx.complete_read(data, status) {
            return;
        }

        let mut echo = EchoBuffer::new();
        let mut reset = false;
        let mut run = self.rx.data();
        trace!("Received {:?}", run);

        loop {
            match parse_run(run) {
                (0, _) => break,
                (consumed, token) => {
                    run = &run[consumed..];
                    match token {
                        RunToken::Text(text) => {
                            let stored = self.line.write(text);
                            if stored < text.len() {
                                warn!("Line full, dropped {} bytes", text.len() - stored);
                            }
                            let _ = echo.try_extend_from_slice(&text[..stored]);
                        }
                        RunToken::Terminator => {
                            let mut out = OutboundLink {
                                slot: &mut self.tx,
                                transport: &mut self.transport,
                                state: self.state,
                            };
                            self.registry.dispatch_command(self.line.as_ref(), &mut out);
                            self.line.clear();
                            break;
                        }
                        RunToken::Reset => {
                            debug!("Line reset");
                            self.line.clear();
                            reset = true;
                            break;
                        }
                        RunToken::NeedData => break,
                    }
                }
            }
        }

        if let Err(err) = self.rx.start_read(&mut self.transport, self.state) {
            warn!("Failed to re-arm read: {}", err);
        }

        let reply: &[u8] = if reset {
            RESET_LINE_RESPONSE.as_bytes()
        } else {
            &echo
        };
        if !reply.is_empty() {
            if let Err(err) = self.tx.start_write(&mut self.transport, self.state, reply) {
                debug!("Echo dropped: {}", err);
            }
        }
    }
}
