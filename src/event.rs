//! Events delivered by the transport driver.

use crate::transfer::TransferStatus;
use crate::types::{ControlLineState, LineCoding};

/// Device level events.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeviceEvent {
    Attached,
    Detached,
    /// Bus reset. The host will enumerate the device again.
    Reset,
    /// The host selected a configuration.
    Configured { configuration: u8 },
    Suspended,
    Resumed,
    /// Bus power appeared, the device may attach.
    PowerDetected,
    PowerRemoved,
    Error,
}

/// CDC class events, including transfer completions.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CdcEvent<'a> {
    /// The host asks for the current line coding.
    GetLineCoding,
    /// The host sets the line coding.
    SetLineCoding(LineCoding),
    SetControlLineState(ControlLineState),
    /// The host requests a break of `duration` milliseconds.
    SendBreak { duration: u16 },
    /// The outstanding read finished, `data` holds the received bytes.
    ReadComplete {
        data: &'a [u8],
        status: TransferStatus,
    },
    WriteComplete { status: TransferStatus },
    /// Data stage of the last control transfer was received.
    ControlTransferDataReceived,
    /// Data stage of the last control transfer was sent.
    ControlTransferDataSent,
}

/// What the transport should do to finish a control request.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ControlReply {
    /// Nothing to send.
    None,
    /// Send this line coding as the data stage.
    LineCoding(LineCoding),
    /// Complete the status stage with success.
    Ok,
}
