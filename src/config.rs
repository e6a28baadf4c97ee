//! Crate-wide constants and compile-time configuration.
//!
//! Transport framing, report IDs, USB identity and FIFO sizing live here
//! so they can be tuned in one place.

// Control-transfer framing

/// Largest data chunk the transport hands over per host transaction.
/// Low-speed control endpoints are limited to 8 bytes.
pub const MAX_CHUNK_SIZE: usize = 8;

/// First chunk of a report: byte 0 = report ID, byte 1 = length.
pub const CHUNK_HEADER_LEN: usize = 2;

/// Length fields are a single byte; longer streams are reported as this.
pub const REPORT_LENGTH_CAP: u8 = 255;

// Report IDs

/// Report ID reserved for the debug/serial pass-through channel.
/// Every other ID addresses the programmer stream.
pub const DEBUG_REPORT_ID: u8 = 5;

/// Payload sizes of the programmer feature reports 1..=4 (excluding the
/// report ID byte). The host picks the smallest report that fits.
pub const PROGRAMMER_REPORT_SIZES: [u8; 4] = [13, 29, 61, 125];

/// Payload size of the debug-data feature report.
pub const DEBUG_REPORT_SIZE: u8 = 125;

// Vendor requests (debug interface)

/// Vendor request: push `wValue` low byte to the serial transmitter.
pub const VENDOR_WRITE_BYTE: u8 = 1;

/// Vendor request: read pending bytes from the serial receive FIFO.
pub const VENDOR_READ_STREAM: u8 = 2;

// Serial FIFO

/// Backing storage of the serial receive FIFO. heapless queues keep one
/// slot free, so at most `SERIAL_FIFO_CAPACITY - 1` bytes are buffered and
/// the occupancy always fits the one-byte length field.
pub const SERIAL_FIFO_CAPACITY: usize = 128;

// USB identity

/// Shared obdev VID/PID pair for vendor-class HID devices.
pub const USB_VID: u16 = 0x16C0;
pub const USB_PID: u16 = 0x05DF;

/// Device release number (BCD).
pub const USB_DEVICE_RELEASE: u16 = 0x0102;

/// Bus power budget (mA).
pub const USB_MAX_POWER_MA: u16 = 100;

/// Interrupt-IN poll interval (ms). Data moves over control transfers,
/// the endpoint only exists because HID requires one.
pub const USB_HID_POLL_MS: u8 = 100;

/// Language ID reported by string descriptor 0 (US English).
pub const USB_LANGUAGE_ID: u16 = 0x0409;
