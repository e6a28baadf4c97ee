//! Integration tests for hidlink host-testable logic.
//!
//! Whole control transfers are replayed the way a low-speed transport
//! delivers them: a raw 8-byte setup packet, then one call per chunk.

use hidlink::config::{DEBUG_REPORT_ID, MAX_CHUNK_SIZE};
use hidlink::usb::descriptor::{DESCRIPTOR_CONFIGURATION, DESCRIPTOR_STRING};
use hidlink::{
    ControlTransfer, DataPhase, DescriptorDispatcher, FifoChannel, ProgrammerStream, QueueStream,
    SerialFifo, SerialSink, SetupPacket, WorkingMode,
};

#[derive(Default)]
struct Uart {
    sent: heapless::Vec<u8, 128>,
}

impl SerialSink for Uart {
    fn put_byte(&mut self, byte: u8) {
        self.sent.push(byte).unwrap();
    }
}

type Device = ControlTransfer<QueueStream<512>, SerialFifo<128>, Uart>;

fn device() -> Device {
    ControlTransfer::new(QueueStream::new(), SerialFifo::new(), Uart::default())
}

/// bmRequestType 0xA1 / 0x21: class request to the interface.
fn hid_setup(direction_in: bool, request: u8, report_id: u8, length: u16) -> [u8; 8] {
    let bm = if direction_in { 0xA1 } else { 0x21 };
    let len = length.to_le_bytes();
    [bm, request, report_id, 0x03, 0x00, 0x00, len[0], len[1]]
}

/// Host side of a GET_REPORT: chunks until `length` bytes arrived.
fn host_read(dev: &mut Device, report_id: u8, length: usize) -> heapless::Vec<u8, 512> {
    let raw = hid_setup(true, 0x01, report_id, length as u16);
    let setup = SetupPacket::parse(&raw).unwrap();
    assert_eq!(dev.classify_setup(&setup), DataPhase::Chunked);

    let mut out = heapless::Vec::new();
    while out.len() < length {
        let want = (length - out.len()).min(MAX_CHUNK_SIZE);
        let mut chunk = [0u8; MAX_CHUNK_SIZE];
        let n = dev.read_chunk(&mut chunk[..want]);
        out.extend_from_slice(&chunk[..n]).unwrap();
        if n < want {
            break;
        }
    }
    out
}

/// Host side of a SET_REPORT: `report` already carries ID and length.
/// Returns how many chunks were sent before the short packet.
fn host_write(dev: &mut Device, report: &[u8]) -> usize {
    let raw = hid_setup(false, 0x09, report[0], report.len() as u16);
    let setup = SetupPacket::parse(&raw).unwrap();
    assert_eq!(dev.classify_setup(&setup), DataPhase::Chunked);

    let mut sent = 0;
    for chunk in report.chunks(MAX_CHUNK_SIZE) {
        sent += 1;
        if dev.write_chunk(chunk) {
            break;
        }
    }
    sent
}

#[test]
fn programmer_command_and_reply() {
    let mut dev = device();

    // Report 1 (14 bytes): ID, length 3, STK500 "get sync" + padding.
    let mut report = [0u8; 14];
    report[0] = 1;
    report[1] = 3;
    report[2..5].copy_from_slice(&[0x30, 0x20, 0x00]);
    assert_eq!(host_write(&mut dev, &report), 2);

    let engine = dev.programmer_mut();
    assert_eq!(engine.received_len(), 3);
    assert_eq!(engine.receive(), Some(0x30));
    assert_eq!(engine.receive(), Some(0x20));
    assert_eq!(engine.receive(), Some(0x00));
    assert_eq!(engine.receive(), None);

    // Engine answers INSYNC/OK.
    engine.send_all(&[0x14, 0x10]).unwrap();
    let reply = host_read(&mut dev, 1, 14);
    assert_eq!(reply.len(), 14);
    assert_eq!(&reply[..4], &[1, 2, 0x14, 0x10]);
    assert!(reply[4..].iter().all(|&b| b == 0));
}

#[test]
fn long_programmer_reply_spans_reports() {
    let mut dev = device();
    let payload: heapless::Vec<u8, 300> = (0..300u16).map(|i| (i % 251) as u8).collect();
    dev.programmer_mut().send_all(&payload).unwrap();

    // Report 4 is 126 bytes: header + 124 payload bytes.
    let first = host_read(&mut dev, 4, 126);
    assert_eq!(first[0], 4);
    assert_eq!(first[1], 255);
    assert_eq!(&first[2..], &payload[..124]);

    let second = host_read(&mut dev, 4, 126);
    assert_eq!(second[1], 176);
    assert_eq!(&second[2..], &payload[124..248]);

    let third = host_read(&mut dev, 4, 126);
    assert_eq!(third[1], 52);
    assert_eq!(&third[2..54], &payload[248..]);
    assert_eq!(dev.programmer().pending_count(), 0);
}

#[test]
fn long_write_delivers_exactly_declared_bytes() {
    let mut dev = device();
    // Report 3 is 62 bytes; declare 40.
    let mut report = [0xEEu8; 62];
    report[0] = 3;
    report[1] = 40;
    for (i, b) in report[2..42].iter_mut().enumerate() {
        *b = i as u8;
    }
    host_write(&mut dev, &report);

    let engine = dev.programmer_mut();
    assert_eq!(engine.received_len(), 40);
    for i in 0..40u8 {
        assert_eq!(engine.receive(), Some(i));
    }
}

#[cfg(feature = "debug-interface")]
#[test]
fn debug_channel_round_trip() {
    let mut dev = device();
    for &b in b"boot ok\r\n" {
        dev.fifo_mut().push(b).unwrap();
    }

    let report = host_read(&mut dev, DEBUG_REPORT_ID, 16);
    assert_eq!(report[0], DEBUG_REPORT_ID);
    assert_eq!(report[1], 9);
    assert_eq!(&report[2..11], b"boot ok\r\n");
    assert!(!dev.fifo().has_data());

    let mut out = [0u8; 16];
    out[0] = DEBUG_REPORT_ID;
    out[1] = 4;
    out[2..6].copy_from_slice(b"AT\r\n");
    host_write(&mut dev, &out);
    assert_eq!(dev.serial().sent.as_slice(), b"AT\r\n");
    assert_eq!(dev.programmer().received_len(), 0);
}

#[cfg(not(feature = "debug-interface"))]
#[test]
fn debug_report_is_inert_without_debug_interface() {
    let mut dev = device();
    for &b in b"boot ok\r\n" {
        dev.fifo_mut().push(b).unwrap();
    }

    let report = host_read(&mut dev, DEBUG_REPORT_ID, 16);
    assert!(report.is_empty());
    assert_eq!(dev.fifo().occupancy(), 9);

    let mut out = [0u8; 16];
    out[0] = DEBUG_REPORT_ID;
    out[1] = 4;
    out[2..6].copy_from_slice(b"AT\r\n");
    host_write(&mut dev, &out);
    assert!(dev.serial().sent.is_empty());
    assert_eq!(dev.programmer().received_len(), 0);
}

#[test]
fn vendor_requests_bypass_reports() {
    let mut dev = device();

    // Vendor OUT, request 1: one byte in wValue.
    let raw = [0x40, 0x01, b'!', 0x00, 0x00, 0x00, 0x00, 0x00];
    let setup = SetupPacket::parse(&raw).unwrap();
    if cfg!(feature = "debug-interface") {
        assert_eq!(dev.classify_setup(&setup), DataPhase::None);
        assert_eq!(dev.serial().sent.as_slice(), b"!");
    } else {
        assert_eq!(dev.classify_setup(&setup), DataPhase::Unhandled);
    }

    // Vendor IN, request 2: raw FIFO drain.
    for &b in b"log" {
        dev.fifo_mut().push(b).unwrap();
    }
    let raw = [0xC0, 0x02, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00];
    let setup = SetupPacket::parse(&raw).unwrap();
    let phase = dev.classify_setup(&setup);
    if cfg!(feature = "debug-interface") {
        assert_eq!(phase, DataPhase::Chunked);
        let mut chunk = [0u8; 8];
        assert_eq!(dev.read_chunk(&mut chunk), 3);
        assert_eq!(&chunk[..3], b"log");
    } else {
        assert_eq!(phase, DataPhase::Unhandled);
    }
}

#[test]
fn descriptors_follow_working_mode() {
    let legacy = DescriptorDispatcher::new(WorkingMode::from(1));
    let rf = DescriptorDispatcher::new(WorkingMode::from(0));

    assert_ne!(
        legacy.describe_descriptor(DESCRIPTOR_STRING, 2).bytes(),
        rf.describe_descriptor(DESCRIPTOR_STRING, 2).bytes()
    );
    assert_eq!(
        legacy.describe_descriptor(DESCRIPTOR_CONFIGURATION, 0).bytes(),
        rf.describe_descriptor(DESCRIPTOR_CONFIGURATION, 0).bytes()
    );
}
