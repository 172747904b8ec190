mod common;

use cdc_console::{CdcEvent, ControlLineState, ControlReply, LineCoding, TransferStatus};
use common::*;

#[test]
fn line_coding_requests() {
    let (mut console, _log) = new_console();
    assert_eq!(
        console.on_cdc_event(CdcEvent::GetLineCoding),
        ControlReply::LineCoding(LineCoding::DEFAULT)
    );
    assert_eq!(console.host_line_coding(), None);

    let host = LineCoding {
        data_rate: 115_200,
        stop_bits: 0,
        parity: 2,
        data_bits: 7,
    };
    assert_eq!(
        console.on_cdc_event(CdcEvent::SetLineCoding(host)),
        ControlReply::Ok
    );
    assert_eq!(console.host_line_coding(), Some(host));
    // what the host sets is stored, not reported back
    assert_eq!(console.line_coding(), LineCoding::DEFAULT);

    console.set_line_coding(host);
    assert_eq!(
        console.on_cdc_event(CdcEvent::GetLineCoding),
        ControlReply::LineCoding(host)
    );
}

#[test]
fn control_lines_and_break() {
    let (mut console, _log) = new_console();
    let lines = ControlLineState::from_bits(0x01);
    assert_eq!(
        console.on_cdc_event(CdcEvent::SetControlLineState(lines)),
        ControlReply::Ok
    );
    assert_eq!(
        console.on_cdc_event(CdcEvent::SendBreak { duration: 250 }),
        ControlReply::Ok
    );

    let state = console.session_state();
    assert!(state.control_lines.dtr);
    assert!(!state.control_lines.carrier);
    assert_eq!(state.break_duration, 250);

    console.set_control_line_state(false, true);
    assert_eq!(
        console.session_state().control_lines,
        ControlLineState {
            dtr: false,
            carrier: true
        }
    );
}

#[test]
fn transfer_events_need_no_reply() {
    let (mut console, _log) = new_console();
    configure(&mut console);
    assert_eq!(
        console.on_cdc_event(CdcEvent::ControlTransferDataReceived),
        ControlReply::Ok
    );
    assert_eq!(
        console.on_cdc_event(CdcEvent::ControlTransferDataSent),
        ControlReply::None
    );
    assert_eq!(
        console.on_cdc_event(CdcEvent::ReadComplete {
            data: b"x",
            status: TransferStatus::Complete
        }),
        ControlReply::None
    );
    assert_eq!(
        console.on_cdc_event(CdcEvent::WriteComplete {
            status: TransferStatus::Failed
        }),
        ControlReply::None
    );
    assert!(!console.session_state().write_pending);
}

#[test]
fn line_coding_survives_reconfiguration() {
    let (mut console, _log) = new_console();
    let host = LineCoding::from_bytes(&[0x00, 0xc2, 0x01, 0x00, 0, 0, 8]).unwrap();
    assert_eq!(host.data_rate, 115_200);
    console.on_cdc_event(CdcEvent::SetLineCoding(host));
    configure(&mut console);
    console.on_device_event(cdc_console::DeviceEvent::Detached);
    configure(&mut console);
    assert_eq!(console.session_state().host_line_coding, Some(host));
}
