//! Runs the LED menu console on a serial port, e.g. one end of a pty pair.
//!
//! `cargo run --example serial_console -- /dev/pts/3`

use std::cell::Cell;
use std::io::{ErrorKind, Read, Write};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use serialport::SerialPort;

use cdc_console::{
    CdcEvent, Console, DeviceEvent, LineCoding, Outbound, TransferHandle, TransferStatus,
    Transport, TransportError,
};

const MENU: &str = concat!(
    "       Console over USB CDC\r\n",
    "Type a command followed by [ENTER]:\r\n",
    "Turn on led\r\n",
    "Turn off led\r\n",
    "Toggle led\r\n",
    "\r\n",
);

/// Sends writes straight to the port. Completions are reported by the
/// main loop, after the console has returned.
struct SerialTransport {
    port: Box<dyn SerialPort>,
    completed: Option<TransferStatus>,
    transfers: u32,
}

impl Transport for SerialTransport {
    fn start_read(&mut self, _capacity: usize) -> Result<TransferHandle, TransportError> {
        self.transfers += 1;
        Ok(TransferHandle(self.transfers))
    }

    fn start_write(&mut self, data: &[u8]) -> Result<TransferHandle, TransportError> {
        let status = match self.port.write_all(data) {
            Ok(()) => TransferStatus::Complete,
            Err(err) => {
                warn!("Serial write failed: {}", err);
                TransferStatus::Failed
            }
        };
        self.completed = Some(status);
        self.transfers += 1;
        Ok(TransferHandle(self.transfers))
    }
}

fn decode_command(line: &[u8], led: &Cell<bool>) -> &'static str {
    match line {
        b"Turn on led" => {
            led.set(true);
            "\r\nled is on\r\n"
        }
        b"Turn off led" => {
            led.set(false);
            "\r\nled is off\r\n"
        }
        b"Toggle led" => {
            led.set(!led.get());
            "\r\nled is toggled\r\n"
        }
        _ => "\r\nUnknown command\r\n",
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args();
    args.next(); // Skip program name
    let path = args.next().unwrap_or_else(|| "/dev/ttyACM0".to_string());
    let baud = 115_200;

    let port = serialport::new(&path, baud)
        .timeout(Duration::from_millis(100))
        .open()
        .with_context(|| format!("Failed to open serial port {}", path))?;

    let mut console = Console::new(SerialTransport {
        port,
        completed: None,
        transfers: 0,
    });
    console.set_line_coding(LineCoding {
        data_rate: baud,
        ..LineCoding::DEFAULT
    });

    let led = Rc::new(Cell::new(false));
    let state = Rc::clone(&led);
    console.register_command_handler(move |line: &[u8], out: &mut dyn Outbound| {
        if line.is_empty() {
            return;
        }
        let reply = format!("{}\r\n{}", decode_command(line, &state), MENU);
        if let Err(err) = out.write(&reply) {
            warn!("Reply dropped: {}", err);
        }
        info!("led {}", if state.get() { "on" } else { "off" });
    });
    console.register_ready_handler(|out: &mut dyn Outbound| {
        let _ = out.write(MENU);
    });

    console.on_device_event(DeviceEvent::PowerDetected);
    console.on_device_event(DeviceEvent::Configured { configuration: 1 });

    let mut data_in = [0; 64];
    loop {
        if let Some(status) = console.transport_mut().completed.take() {
            console.on_cdc_event(CdcEvent::WriteComplete { status });
        }

        match console.transport_mut().port.read(&mut data_in) {
            Ok(0) => break,
            Ok(len) => {
                console.on_cdc_event(CdcEvent::ReadComplete {
                    data: &data_in[..len],
                    status: TransferStatus::Complete,
                });
            }
            Err(err) if err.kind() == ErrorKind::TimedOut => continue,
            Err(err) => return Err(err).context("Serial read failed"),
        }
    }
    console.on_device_event(DeviceEvent::Detached);
    Ok(())
}
