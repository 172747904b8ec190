#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use cdc_console::{
    CdcEvent, Console, DeviceEvent, TransferHandle, TransferStatus, Transport, TransportError,
};

/// What the console asked the transport to do.
#[derive(Default)]
pub struct TransportLog {
    pub reads: usize,
    pub writes: Vec<Vec<u8>>,
    pub attached: bool,
    next_handle: u32,
    reject_read: Option<TransportError>,
    reject_write: Option<TransportError>,
}

impl TransportLog {
    pub fn new() -> Rc<RefCell<TransportLog>> {
        Rc::new(RefCell::new(TransportLog::default()))
    }

    pub fn trigger_read_error(&mut self, err: TransportError) {
        self.reject_read = Some(err);
    }

    pub fn trigger_write_error(&mut self, err: TransportError) {
        self.reject_write = Some(err);
    }

    /// All written bytes, concatenated.
    pub fn sent(&self) -> Vec<u8> {
        self.writes.concat()
    }

    fn handle(&mut self) -> TransferHandle {
        self.next_handle += 1;
        TransferHandle(self.next_handle)
    }
}

pub struct MockTransport(Rc<RefCell<TransportLog>>);

impl MockTransport {
    pub fn new(log: &Rc<RefCell<TransportLog>>) -> MockTransport {
        MockTransport(log.clone())
    }
}

impl Transport for MockTransport {
    fn start_read(&mut self, _capacity: usize) -> Result<TransferHandle, TransportError> {
        let mut inner = self.0.borrow_mut();
        if let Some(err) = inner.reject_read.take() {
            return Err(err);
        }
        inner.reads += 1;
        Ok(inner.handle())
    }

    fn start_write(&mut self, data: &[u8]) -> Result<TransferHandle, TransportError> {
        let mut inner = self.0.borrow_mut();
        if let Some(err) = inner.reject_write.take() {
            return Err(err);
        }
        inner.writes.push(data.to_vec());
        Ok(inner.handle())
    }

    fn attach(&mut self) {
        self.0.borrow_mut().attached = true;
    }

    fn detach(&mut self) {
        self.0.borrow_mut().attached = false;
    }
}

pub fn new_console() -> (Console<MockTransport>, Rc<RefCell<TransportLog>>) {
    let log = TransportLog::new();
    (Console::new(MockTransport::new(&log)), log)
}

pub fn configure(console: &mut Console<MockTransport>) {
    console.on_device_event(DeviceEvent::Configured { configuration: 1 });
}

pub fn receive(console: &mut Console<MockTransport>, data: &[u8]) {
    console.on_cdc_event(CdcEvent::ReadComplete {
        data,
        status: TransferStatus::Complete,
    });
}

pub fn write_done(console: &mut Console<MockTransport>) {
    console.on_cdc_event(CdcEvent::WriteComplete {
        status: TransferStatus::Complete,
    });
}

/// Collects every dispatched line.
pub fn record_commands(console: &mut Console<MockTransport>) -> Rc<RefCell<Vec<Vec<u8>>>> {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lines);
    console.register_command_handler(move |line: &[u8], _out: &mut dyn cdc_console::Outbound| {
        sink.borrow_mut().push(line.to_vec());
    });
    lines
}
