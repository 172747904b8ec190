use std::error::Error;
use std::io::{self, Read, Write};

use cdc_console::{
    CdcEvent, Console, DeviceEvent, Outbound, TransferHandle, TransferStatus, Transport,
    TransportError,
};

/// Loops the console over stdin/stdout. Writes are buffered until the main
/// loop flushes them and reports the completion.
#[derive(Default)]
struct Stdio {
    pending: Vec<u8>,
    writing: bool,
    transfers: u32,
}

impl Transport for Stdio {
    fn start_read(&mut self, _capacity: usize) -> Result<TransferHandle, TransportError> {
        self.transfers += 1;
        Ok(TransferHandle(self.transfers))
    }

    fn start_write(&mut self, data: &[u8]) -> Result<TransferHandle, TransportError> {
        if self.writing {
            return Err(TransportError::QueueFull);
        }
        self.pending.extend_from_slice(data);
        self.writing = true;
        self.transfers += 1;
        Ok(TransferHandle(self.transfers))
    }
}

fn echo_main_loop() -> Result<(), Box<dyn Error>> {
    let mut console = Console::new(Stdio::default());
    console.register_ready_handler(|out: &mut dyn Outbound| {
        let _ = out.write("Console ready, type a line followed by [ENTER]\r\n");
    });
    console.register_command_handler(|line: &[u8], out: &mut dyn Outbound| {
        let _ = out.write(&format!("\r\n> {}\r\n", String::from_utf8_lossy(line)));
    });
    console.on_device_event(DeviceEvent::PowerDetected);
    console.on_device_event(DeviceEvent::Configured { configuration: 1 });

    let mut stdout = io::stdout();
    loop {
        let stdio = console.transport_mut();
        if stdio.writing {
            stdout.write_all(&stdio.pending)?;
            stdout.flush()?;
            stdio.pending.clear();
            stdio.writing = false;
            console.on_cdc_event(CdcEvent::WriteComplete {
                status: TransferStatus::Complete,
            });
        }

        let mut data_in = [0; 64];
        let len = io::stdin().read(&mut data_in)?;
        if len == 0 {
            break;
        }
        // the terminal hands over lines ending in '\n'
        for byte in data_in[..len].iter_mut() {
            if *byte == b'\n' {
                *byte = b'\r';
            }
        }
        console.on_cdc_event(CdcEvent::ReadComplete {
            data: &data_in[..len],
            status: TransferStatus::Complete,
        });
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    echo_main_loop()
}
