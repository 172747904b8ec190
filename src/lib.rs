#![cfg_attr(not(any(feature = "std", test)), no_std)]
//! Sans-io line console for a USB CDC virtual serial port.
//!
//! The USB stack owns the wire. It feeds device and class events into a
//! [`Console`], which assembles received bytes into command lines, echoes
//! them, and hands finished lines to the registered [`CommandHandler`].
//! Replies go out through the [`Transport`] trait, one write at a time.

extern crate alloc;

mod buffer;
pub mod console;
pub mod dispatch;
pub mod event;
mod nom_parser;
pub mod transfer;
pub mod types;

pub use console::{Console, SessionState};
pub use dispatch::{CommandHandler, Outbound, ReadyHandler, Registry};
pub use event::{CdcEvent, ControlReply, DeviceEvent};
pub use transfer::{Direction, TransferHandle, TransferSlot, TransferStatus, Transport};
pub use types::{ConnectionState, ControlLineState, Error, LineCoding, TransportError};

/// Capacity of the line buffer and of each transfer buffer.
pub const BUFFER_SIZE: usize = 512;

/// Completes a command line.
pub const LINE_TERMINATOR: u8 = ascii::CR;

/// Bytes that throw away the line being typed.
pub const RESET_CHARS: [u8; 2] = [ascii::BEL, ascii::BS];

/// Sent back after a line reset.
pub const RESET_LINE_RESPONSE: &str = "\n\rReset line\r\n";

/// The only configuration value the console accepts.
pub const SUPPORTED_CONFIGURATION: u8 = 1;

pub(crate) mod ascii {
    pub(crate) const BEL: u8 = 0x07;
    pub(crate) const BS: u8 = 0x08;
    pub(crate) const CR: u8 = 0x0d;
}
