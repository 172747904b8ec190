//! Bookkeeping for the one asynchronous transfer allowed per direction,
//! and the seam to the transport that performs it.

use arrayvec::ArrayVec;
use log::{debug, warn};
use snafu::ensure;

use crate::types::{
    empty_write, not_configured, slot_busy, ConnectionState, Error, TooLongSnafu,
    TransportError, TransportSnafu,
};
use crate::BUFFER_SIZE;

/// Identifies a transfer accepted by the transport.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct TransferHandle(pub u32);

/// Completion status reported by the transport.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransferStatus {
    Complete,
    Failed,
}

/// The outward operations the console needs from the transport driver.
///
/// Both `start_*` calls must return immediately. An `Ok` means a
/// completion event will be delivered later, exactly once.
pub trait Transport {
    /// Arm a read of at most `capacity` bytes. The bytes arrive with
    /// the read completion event.
    fn start_read(&mut self, capacity: usize) -> Result<TransferHandle, TransportError>;

    /// Start sending `data`. The transport must copy or finish with
    /// `data` before returning.
    fn start_write(&mut self, data: &[u8]) -> Result<TransferHandle, TransportError>;

    /// Request that the device attaches to the bus.
    fn attach(&mut self) {}

    /// Request that the device detaches from the bus.
    fn detach(&mut self) {}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// A single-owner transfer slot.
///
/// At most one transfer is outstanding at any time; starting another one
/// fails fast instead of queuing.
#[derive(Debug)]
pub struct TransferSlot {
    direction: Direction,
    outstanding: bool,
    handle: Option<TransferHandle>,
    data: ArrayVec<u8, BUFFER_SIZE>,
}

impl TransferSlot {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            outstanding: false,
            handle: None,
            data: ArrayVec::new(),
        }
    }

    pub const fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// The slot buffer: received bytes on the inbound slot, the bytes
    /// being sent on the outbound slot.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Start a transfer over the slot buffer.
    ///
    /// Fails without side effects if the session isn't configured or a
    /// transfer is already outstanding. If the transport refuses, the
    /// slot is free again when this returns.
    pub fn try_start(
        &mut self,
        transport: &mut dyn Transport,
        state: ConnectionState,
    ) -> Result<(), Error> {
        ensure!(state == ConnectionState::Configured, not_configured());
        ensure!(!self.outstanding, slot_busy());

        self.outstanding = true;
        let started = match self.direction {
            Direction::Inbound => transport.start_read(BUFFER_SIZE),
            Direction::Outbound => transport.start_write(&self.data),
        };
        match started {
            Ok(handle) => {
                debug!("{:?} transfer started ({:?})", self.direction, handle);
                self.handle = Some(handle);
                Ok(())
            }
            Err(reason) => {
                warn!("{:?} transfer rejected: {:?}", self.direction, reason);
                self.outstanding = false;
                self.handle = None;
                TransportSnafu { reason }.fail()
            }
        }
    }

    /// Arm the next read. The previous contents are discarded.
    pub fn start_read(
        &mut self,
        transport: &mut dyn Transport,
        state: ConnectionState,
    ) -> Result<(), Error> {
        debug_assert_eq!(self.direction, Direction::Inbound);
        ensure!(!self.outstanding, slot_busy());
        self.data.clear();
        self.try_start(transport, state)
    }

    /// Copy `text` into the slot and start sending it.
    pub fn start_write(
        &mut self,
        transport: &mut dyn Transport,
        state: ConnectionState,
        text: &[u8],
    ) -> Result<(), Error> {
        debug_assert_eq!(self.direction, Direction::Outbound);
        ensure!(!text.is_empty(), empty_write());
        ensure!(text.len() <= BUFFER_SIZE, TooLongSnafu { len: text.len() });
        ensure!(state == ConnectionState::Configured, not_configured());
        ensure!(!self.outstanding, slot_busy());

        self.data.clear();
        // can't fail, the length was checked above
        let _ = self.data.try_extend_from_slice(text);
        self.try_start(transport, state)
    }

    /// Retire the outstanding transfer.
    ///
    /// Returns `false` for a completion with nothing outstanding, which
    /// leaves the slot untouched.
    pub fn complete(&mut self, status: TransferStatus) -> bool {
        if !self.outstanding {
            warn!("{:?} completion with no transfer outstanding", self.direction);
            return false;
        }
        if status == TransferStatus::Failed {
            warn!("{:?} transfer {:?} failed", self.direction, self.handle);
        }
        self.outstanding = false;
        self.handle = None;
        true
    }

    /// Retire the outstanding read and keep the received bytes.
    ///
    /// Bytes beyond the slot capacity are dropped.
    pub fn complete_read(&mut self, received: &[u8], status: TransferStatus) -> bool {
        if !self.complete(status) {
            return false;
        }
        self.data.clear();
        if status == TransferStatus::Complete {
            let n = received.len().min(BUFFER_SIZE);
            if n < received.len() {
                warn!("Read overran the buffer, dropped {} bytes", received.len() - n);
            }
            let _ = self.data.try_extend_from_slice(&received[..n]);
        }
        true
    }

    /// Forget any outstanding transfer. Used when the transport has
    /// aborted all transfers, e.g. on a new configuration.
    pub fn reset(&mut self) {
        self.outstanding = false;
        self.handle = None;
        self.data.clear();
    }
}
