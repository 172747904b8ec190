//! Handler registration and dispatch.
//!
//! At most one command handler and one ready handler are registered at a
//! time. Handlers run inside event processing, so they get an [`Outbound`]
//! to reply through instead of the console itself.

use alloc::boxed::Box;

use log::debug;

use crate::transfer::{Transport, TransferSlot};
use crate::types::{ConnectionState, Error};

/// Write access to the outbound slot from inside a handler.
pub trait Outbound {
    /// Start sending `text`. Same rules as [`Console::write`](crate::Console::write).
    fn write_bytes(&mut self, text: &[u8]) -> Result<(), Error>;

    /// Whether a write is still outstanding.
    fn is_busy(&self) -> bool;

    fn write(&mut self, text: &str) -> Result<(), Error> {
        self.write_bytes(text.as_bytes())
    }
}

pub(crate) struct OutboundLink<'a> {
    pub(crate) slot: &'a mut TransferSlot,
    pub(crate) transport: &'a mut dyn Transport,
    pub(crate) state: ConnectionState,
}

impl Outbound for OutboundLink<'_> {
    fn write_bytes(&mut self, text: &[u8]) -> Result<(), Error> {
        self.slot.start_write(self.transport, self.state, text)
    }

    fn is_busy(&self) -> bool {
        self.slot.is_outstanding()
    }
}

/// Receives completed command lines.
///
/// The line is passed as typed, without the terminator. Nothing checks
/// that it is valid UTF-8.
pub trait CommandHandler {
    fn on_command(&mut self, line: &[u8], out: &mut dyn Outbound);
}

impl<F> CommandHandler for F
where
    F: FnMut(&[u8], &mut dyn Outbound),
{
    fn on_command(&mut self, line: &[u8], out: &mut dyn Outbound) {
        self(line, out)
    }
}

/// Notified when the console becomes usable.
pub trait ReadyHandler {
    fn on_ready(&mut self, out: &mut dyn Outbound);
}

impl<F> ReadyHandler for F
where
    F: FnMut(&mut dyn Outbound),
{
    fn on_ready(&mut self, out: &mut dyn Outbound) {
        self(out)
    }
}

/// Holds the registered handlers. Registering replaces, there is no chaining.
#[derive(Default)]
pub struct Registry {
    command: Option<Box<dyn CommandHandler>>,
    ready: Option<Box<dyn ReadyHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_command_handler(&mut self, handler: impl CommandHandler + 'static) {
        self.command = Some(Box::new(handler));
    }

    pub fn unregister_command_handler(&mut self) {
        self.command = None;
    }

    pub fn register_ready_handler(&mut self, handler: impl ReadyHandler + 'static) {
        self.ready = Some(Box::new(handler));
    }

    pub fn unregister_ready_handler(&mut self) {
        self.ready = None;
    }

    pub fn has_command_handler(&self) -> bool {
        self.command.is_some()
    }

    pub fn has_ready_handler(&self) -> bool {
        self.ready.is_some()
    }

    /// Hand `line` to the command handler. Returns `false` if there is none,
    /// in which case the line is discarded.
    pub fn dispatch_command(&mut self, line: &[u8], out: &mut dyn Outbound) -> bool {
        match self.command.as_mut() {
            Some(handler) => {
                debug!("Dispatching command {:?}", line);
                handler.on_command(line, out);
                true
            }
            None => {
                debug!("No command handler, discarding {:?}", line);
                false
            }
        }
    }

    pub fn dispatch_ready(&mut self, out: &mut dyn Outbound) -> bool {
        match self.ready.as_mut() {
            Some(handler) => {
                handler.on_ready(out);
                true
            }
            None => false,
        }
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("command", &self.has_command_handler())
            .field("ready", &self.has_ready_handler())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Sink {
        written: Vec<Vec<u8>>,
    }

    impl Outbound for Sink {
        fn write_bytes(&mut self, text: &[u8]) -> Result<(), Error> {
            self.written.push(text.to_vec());
            Ok(())
        }

        fn is_busy(&self) -> bool {
            false
        }
    }

    struct Upper;

    impl CommandHandler for Upper {
        fn on_command(&mut self, line: &[u8], out: &mut dyn Outbound) {
            let _ = out.write_bytes(&line.to_ascii_uppercase());
        }
    }

    #[test]
    fn test_dispatch_without_handler() {
        let mut reg = Registry::new();
        let mut sink = Sink::default();
        assert!(!reg.dispatch_command(b"abc", &mut sink));
        assert!(!reg.dispatch_ready(&mut sink));
        assert!(sink.written.is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reg = Registry::new();
        let mut sink = Sink::default();

        let first = Rc::clone(&seen);
        reg.register_command_handler(move |line: &[u8], _out: &mut dyn Outbound| {
            first
                .borrow_mut()
                .push(format!("first {}", String::from_utf8_lossy(line)));
        });
        assert!(reg.dispatch_command(b"a", &mut sink));

        reg.register_command_handler(Upper);
        assert!(reg.dispatch_command(b"b", &mut sink));
        assert_eq!(*seen.borrow(), vec!["first a".to_string()]);
        assert_eq!(sink.written, vec![b"B".to_vec()]);

        reg.unregister_command_handler();
        assert!(!reg.has_command_handler());
        assert!(!reg.dispatch_command(b"c", &mut sink));
    }

    #[test]
    fn test_ready_handler() {
        let mut reg = Registry::new();
        let mut sink = Sink::default();
        reg.register_ready_handler(|out: &mut dyn Outbound| {
            let _ = out.write("ready\r\n");
        });
        assert!(reg.dispatch_ready(&mut sink));
        assert_eq!(sink.written, vec![b"ready\r\n".to_vec()]);
        reg.unregister_ready_handler();
        assert!(!reg.dispatch_ready(&mut sink));
    }
}
