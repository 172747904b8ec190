//! This module defines the session value types exchanged with the host and
//! the error type shared by the fallible console operations.

use core::convert::TryInto;

use snafu::Snafu;

/// Error type for the console operations.
///
/// Every error is local: the session is left unchanged and still usable.
#[derive(Debug, Snafu, PartialEq, Eq, Clone, Copy)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// The session has not reached the configured state.
    #[snafu(display("Session is not configured"))]
    NotConfigured,
    /// A transfer is already outstanding on the slot.
    #[snafu(display("Transfer slot is busy"))]
    SlotBusy,
    /// Nothing to write.
    #[snafu(display("Empty write"))]
    EmptyWrite,
    /// The text does not fit in the outbound transfer buffer.
    #[snafu(display("Write of {} bytes exceeds the transfer buffer", len))]
    TooLong { len: usize },
    /// The transport refused to start the transfer.
    #[snafu(display("Transport rejected the transfer: {:?}", reason))]
    Transport { reason: TransportError },
}

pub(crate) const fn not_configured() -> NotConfiguredSnafu {
    NotConfiguredSnafu
}

pub(crate) const fn slot_busy() -> SlotBusySnafu {
    SlotBusySnafu
}

pub(crate) const fn empty_write() -> EmptyWriteSnafu {
    EmptyWriteSnafu
}

/// Immediate failure reported by the transport when starting a transfer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransportError {
    /// The endpoint queue can't take another transfer.
    QueueFull,
    /// The device or endpoint is not in a state that allows transfers.
    InvalidState,
    /// Any other refusal.
    Rejected,
}

/// Connection state of the session, driven by transport events only.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConnectionState {
    Unattached,
    Configured,
    Suspended,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Unattached
    }
}

/// A CDC line coding record.
///
/// The values are passed through verbatim; the console never interprets
/// them. `parity` and `stop_bits` use the CDC encoding (`0` is no parity
/// and one stop bit respectively).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LineCoding {
    pub data_rate: u32,
    pub stop_bits: u8,
    pub parity: u8,
    pub data_bits: u8,
}

/// Size of a line coding record in a control transfer.
pub const LINE_CODING_LEN: usize = 7;

impl LineCoding {
    /// What the console reports until told otherwise: 9600 baud, 8N1.
    pub const DEFAULT: LineCoding = LineCoding {
        data_rate: 9600,
        stop_bits: 0,
        parity: 0,
        data_bits: 8,
    };

    /// The control transfer layout: rate (little endian), stop bits,
    /// parity, data bits.
    pub const fn to_bytes(self) -> [u8; LINE_CODING_LEN] {
        let rate = self.data_rate.to_le_bytes();
        [
            rate[0],
            rate[1],
            rate[2],
            rate[3],
            self.stop_bits,
            self.parity,
            self.data_bits,
        ]
    }

    /// Parse a control transfer payload. Returns `None` if it is too short.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < LINE_CODING_LEN {
            return None;
        }
        let rate: [u8; 4] = bytes[..4].try_into().ok()?;
        Some(Self {
            data_rate: u32::from_le_bytes(rate),
            stop_bits: bytes[4],
            parity: bytes[5],
            data_bits: bytes[6],
        })
    }
}

impl Default for LineCoding {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Control line state set by the host.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct ControlLineState {
    /// Data terminal ready.
    pub dtr: bool,
    /// Carrier control, sent by the host as RTS.
    pub carrier: bool,
}

impl ControlLineState {
    /// Decode the `wValue` of a SET_CONTROL_LINE_STATE request.
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            dtr: bits & 0x01 != 0,
            carrier: bits & 0x02 != 0,
        }
    }
}
