//! Control-request setup packets.
//!
//! Layout (8 bytes, little-endian):
//! ```text
//! Byte 0:   bmRequestType  bit 7 = direction, bits 6..5 = type,
//!                          bits 4..0 = recipient
//! Byte 1:   bRequest
//! Byte 2-3: wValue         (low byte first; report ID for HID requests)
//! Byte 4-5: wIndex
//! Byte 6-7: wLength
//! ```

use crate::error::{Error, Result};

/// Setup packet size in bytes.
pub const SETUP_PACKET_SIZE: usize = 8;

/// HID class request: host reads a report.
pub const HID_GET_REPORT: u8 = 0x01;
/// HID class request: host writes a report.
pub const HID_SET_REPORT: u8 = 0x09;

/// Standard request: GET_DESCRIPTOR.
pub const GET_DESCRIPTOR: u8 = 0x06;

/// Data-phase direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Host to device.
    Out,
    /// Device to host.
    In,
}

/// `bmRequestType` type field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestKind {
    Standard,
    Class,
    Vendor,
    Reserved,
}

impl From<u8> for RequestKind {
    /// Decode from a full `bmRequestType` byte.
    fn from(bm_request_type: u8) -> Self {
        match (bm_request_type >> 5) & 0x03 {
            0 => RequestKind::Standard,
            1 => RequestKind::Class,
            2 => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }
}

/// `bmRequestType` recipient field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Recipient {
    Device,
    Interface,
    Endpoint,
    Other,
}

impl From<u8> for Recipient {
    fn from(bm_request_type: u8) -> Self {
        match bm_request_type & 0x1F {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            _ => Recipient::Other,
        }
    }
}

/// A decoded setup packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupPacket {
    pub direction: Direction,
    pub kind: RequestKind,
    pub recipient: Recipient,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl SetupPacket {
    /// Decode the 8 setup bytes delivered by the transport. Extra bytes
    /// are ignored.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SETUP_PACKET_SIZE {
            return Err(Error::ShortSetupPacket);
        }
        let bm_request_type = data[0];
        Ok(Self {
            direction: if bm_request_type & 0x80 != 0 {
                Direction::In
            } else {
                Direction::Out
            },
            kind: RequestKind::from(bm_request_type),
            recipient: Recipient::from(bm_request_type),
            request: data[1],
            value: u16::from_le_bytes([data[2], data[3]]),
            index: u16::from_le_bytes([data[4], data[5]]),
            length: u16::from_le_bytes([data[6], data[7]]),
        })
    }

    /// Build a class request addressed to the HID interface.
    pub const fn class(direction: Direction, request: u8, value: u16, length: u16) -> Self {
        Self {
            direction,
            kind: RequestKind::Class,
            recipient: Recipient::Interface,
            request,
            value,
            index: 0,
            length,
        }
    }

    /// Build a vendor request addressed to the device.
    pub const fn vendor(direction: Direction, request: u8, value: u16, length: u16) -> Self {
        Self {
            direction,
            kind: RequestKind::Vendor,
            recipient: Recipient::Device,
            request,
            value,
            index: 0,
            length,
        }
    }

    /// Low byte of `wValue` (report ID / string index / vendor payload).
    pub fn value_low(&self) -> u8 {
        (self.value & 0xFF) as u8
    }

    /// High byte of `wValue` (report type / descriptor type).
    pub fn value_high(&self) -> u8 {
        (self.value >> 8) as u8
    }

    /// Whether an interface owning `interface` should answer this request.
    /// Class requests must name that interface in `wIndex`; vendor and
    /// standard requests are not filtered here.
    pub fn targets_interface(&self, interface: u8) -> bool {
        match self.kind {
            RequestKind::Class => {
                self.recipient == Recipient::Interface && self.index == u16::from(interface)
            }
            _ => true,
        }
    }
}
