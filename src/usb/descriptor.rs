//! Static USB descriptors and the descriptor dispatcher.
//!
//! All descriptors are immutable byte constants. A query resolves to a
//! [`DescriptorRef`] - a (blob, offset, length) triple - through a lookup
//! keyed by descriptor type, working mode and string index. There is no
//! failure path: unknown descriptor types get the HID class descriptor
//! embedded in the configuration descriptor, unknown string indices an
//! empty slice.

use crate::config::{
    DEBUG_REPORT_ID, DEBUG_REPORT_SIZE, MAX_CHUNK_SIZE, PROGRAMMER_REPORT_SIZES,
    USB_DEVICE_RELEASE, USB_HID_POLL_MS, USB_LANGUAGE_ID, USB_MAX_POWER_MA, USB_PID, USB_VID,
};
use crate::mode::WorkingMode;

/// Descriptor type codes (high byte of `wValue` in GET_DESCRIPTOR).
pub const DESCRIPTOR_DEVICE: u8 = 0x01;
pub const DESCRIPTOR_CONFIGURATION: u8 = 0x02;
pub const DESCRIPTOR_STRING: u8 = 0x03;
pub const DESCRIPTOR_HID: u8 = 0x21;
pub const DESCRIPTOR_HID_REPORT: u8 = 0x22;

/// Offset of the HID class descriptor inside [`CONFIGURATION_DESCRIPTOR`]
/// (after the 9-byte configuration and 9-byte interface descriptors).
pub const HID_DESCRIPTOR_OFFSET: usize = 18;
/// Length of the HID class descriptor.
pub const HID_DESCRIPTOR_LEN: usize = 9;

/// Descriptor types the dispatcher distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DescriptorType {
    Device,
    Configuration,
    String,
    Other(u8),
}

impl From<u8> for DescriptorType {
    fn from(code: u8) -> Self {
        match code {
            DESCRIPTOR_DEVICE => DescriptorType::Device,
            DESCRIPTOR_CONFIGURATION => DescriptorType::Configuration,
            DESCRIPTOR_STRING => DescriptorType::String,
            other => DescriptorType::Other(other),
        }
    }
}

/// A window into one of the static descriptor blobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorRef {
    blob: &'static [u8],
    offset: usize,
    len: usize,
}

impl DescriptorRef {
    /// The whole blob.
    pub const fn whole(blob: &'static [u8]) -> Self {
        Self {
            blob,
            offset: 0,
            len: blob.len(),
        }
    }

    pub const fn slice(blob: &'static [u8], offset: usize, len: usize) -> Self {
        Self { blob, offset, len }
    }

    pub const fn empty() -> Self {
        Self::whole(&[])
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The referenced bytes. A window reaching past its blob yields nothing.
    pub fn bytes(&self) -> &'static [u8] {
        self.offset
            .checked_add(self.len)
            .and_then(|end| self.blob.get(self.offset..end))
            .unwrap_or(&[])
    }
}

// HID report descriptor

/// Vendor-defined feature reports. IDs 1..=4 carry the programmer stream
/// in increasing sizes, ID 5 the debug channel. Every report starts with a
/// length byte after the report ID.
pub const HID_REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, //       Usage (Vendor Usage 1)
    0xA1, 0x01, //       Collection (Application)
    0x15, 0x00, //         Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //         Report Size (8)
    //
    0x85, 0x01, //         Report ID (1)
    0x95, PROGRAMMER_REPORT_SIZES[0], // Report Count
    0x09, 0x00, //         Usage (Undefined)
    0xB2, 0x02, 0x01, //   Feature (Data, Var, Abs, Buffered Bytes)
    //
    0x85, 0x02, //         Report ID (2)
    0x95, PROGRAMMER_REPORT_SIZES[1],
    0x09, 0x00,
    0xB2, 0x02, 0x01,
    //
    0x85, 0x03, //         Report ID (3)
    0x95, PROGRAMMER_REPORT_SIZES[2],
    0x09, 0x00,
    0xB2, 0x02, 0x01,
    //
    0x85, 0x04, //         Report ID (4)
    0x95, PROGRAMMER_REPORT_SIZES[3],
    0x09, 0x00,
    0xB2, 0x02, 0x01,
    //
    0x85, DEBUG_REPORT_ID, // Report ID (debug)
    0x95, DEBUG_REPORT_SIZE,
    0x09, 0x00,
    0xB2, 0x02, 0x01,
    //
    0xC0, // End Collection
];

const REPORT_DESCRIPTOR_LEN: u16 = HID_REPORT_DESCRIPTOR.len() as u16;

/// HID class descriptor body, also returned for unknown descriptor types.
pub const HID_CLASS_DESCRIPTOR: [u8; HID_DESCRIPTOR_LEN] = [
    9,    // bLength
    DESCRIPTOR_HID,
    0x01, 0x01, // bcdHID 1.01
    0x00, // bCountryCode
    0x01, // bNumDescriptors
    DESCRIPTOR_HID_REPORT,
    REPORT_DESCRIPTOR_LEN as u8,
    (REPORT_DESCRIPTOR_LEN >> 8) as u8,
];

// Device and configuration descriptors

pub const DEVICE_DESCRIPTOR: [u8; 18] = [
    18, // bLength
    DESCRIPTOR_DEVICE,
    0x10, 0x01, // bcdUSB 1.1
    0x00, // bDeviceClass (per interface)
    0x00, // bDeviceSubClass
    0x00, // bDeviceProtocol
    MAX_CHUNK_SIZE as u8, // bMaxPacketSize0
    USB_VID as u8,
    (USB_VID >> 8) as u8,
    USB_PID as u8,
    (USB_PID >> 8) as u8,
    USB_DEVICE_RELEASE as u8,
    (USB_DEVICE_RELEASE >> 8) as u8,
    1, // iManufacturer
    2, // iProduct
    3, // iSerialNumber
    1, // bNumConfigurations
];

const CONFIGURATION_TOTAL_LEN: usize = 9 + 9 + HID_DESCRIPTOR_LEN + 7;

pub const CONFIGURATION_DESCRIPTOR: [u8; CONFIGURATION_TOTAL_LEN] = [
    // Configuration
    9,
    DESCRIPTOR_CONFIGURATION,
    CONFIGURATION_TOTAL_LEN as u8,
    0,
    1,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes: bus powered
    (USB_MAX_POWER_MA / 2) as u8,
    // Interface 0: HID, no boot protocol
    9,
    0x04,
    0,    // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    0x03, // bInterfaceClass: HID
    0,
    0,
    0,
    // HID class descriptor (offset 18)
    HID_CLASS_DESCRIPTOR[0],
    HID_CLASS_DESCRIPTOR[1],
    HID_CLASS_DESCRIPTOR[2],
    HID_CLASS_DESCRIPTOR[3],
    HID_CLASS_DESCRIPTOR[4],
    HID_CLASS_DESCRIPTOR[5],
    HID_CLASS_DESCRIPTOR[6],
    HID_CLASS_DESCRIPTOR[7],
    HID_CLASS_DESCRIPTOR[8],
    // Endpoint 1 IN, interrupt
    7,
    0x05,
    0x81,
    0x03,
    MAX_CHUNK_SIZE as u8,
    0,
    USB_HID_POLL_MS,
];

// String descriptors

/// Vendor, product and serial-number strings of one working mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StringSet {
    pub manufacturer: &'static str,
    pub product: &'static str,
    pub serial_number: &'static str,
}

pub const LEGACY_STRINGS: StringSet = StringSet {
    manufacturer: "obdev.at",
    product: "AVR-Doper",
    serial_number: "0000",
};

pub const RF_AP_STRINGS: StringSet = StringSet {
    manufacturer: "RoboPeak",
    product: "RP USB Connector",
    serial_number: "RPUC-0001",
};

/// Strings presented in `mode`.
pub const fn strings(mode: WorkingMode) -> StringSet {
    match mode {
        WorkingMode::LegacyProgrammer => LEGACY_STRINGS,
        WorkingMode::RfAccessPoint => RF_AP_STRINGS,
    }
}

const fn string_descriptor_len(s: &str) -> usize {
    2 + 2 * s.len()
}

/// UTF-16LE string descriptor from an ASCII string, built at compile time.
const fn string_descriptor<const N: usize>(s: &str) -> [u8; N] {
    let bytes = s.as_bytes();
    let mut out = [0u8; N];
    out[0] = N as u8;
    out[1] = DESCRIPTOR_STRING;
    let mut i = 0;
    while i < bytes.len() && 3 + 2 * i < N {
        out[2 + 2 * i] = bytes[i];
        i += 1;
    }
    out
}

const LANGUAGE_IDS: [u8; 4] = [
    4,
    DESCRIPTOR_STRING,
    USB_LANGUAGE_ID as u8,
    (USB_LANGUAGE_ID >> 8) as u8,
];

const LEGACY_MANUFACTURER: [u8; string_descriptor_len(LEGACY_STRINGS.manufacturer)] =
    string_descriptor(LEGACY_STRINGS.manufacturer);
const LEGACY_PRODUCT: [u8; string_descriptor_len(LEGACY_STRINGS.product)] =
    string_descriptor(LEGACY_STRINGS.product);
const LEGACY_SERIAL: [u8; string_descriptor_len(LEGACY_STRINGS.serial_number)] =
    string_descriptor(LEGACY_STRINGS.serial_number);

const RF_AP_MANUFACTURER: [u8; string_descriptor_len(RF_AP_STRINGS.manufacturer)] =
    string_descriptor(RF_AP_STRINGS.manufacturer);
const RF_AP_PRODUCT: [u8; string_descriptor_len(RF_AP_STRINGS.product)] =
    string_descriptor(RF_AP_STRINGS.product);
const RF_AP_SERIAL: [u8; string_descriptor_len(RF_AP_STRINGS.serial_number)] =
    string_descriptor(RF_AP_STRINGS.serial_number);

/// String descriptors by `[mode][index]`; index 0 is the language list.
static STRING_TABLE: [[DescriptorRef; 4]; 2] = [
    // WorkingMode::RfAccessPoint
    [
        DescriptorRef::whole(&LANGUAGE_IDS),
        DescriptorRef::whole(&RF_AP_MANUFACTURER),
        DescriptorRef::whole(&RF_AP_PRODUCT),
        DescriptorRef::whole(&RF_AP_SERIAL),
    ],
    // WorkingMode::LegacyProgrammer
    [
        DescriptorRef::whole(&LANGUAGE_IDS),
        DescriptorRef::whole(&LEGACY_MANUFACTURER),
        DescriptorRef::whole(&LEGACY_PRODUCT),
        DescriptorRef::whole(&LEGACY_SERIAL),
    ],
];

/// Resolve a descriptor query.
pub fn describe(descriptor_type: DescriptorType, index: u8, mode: WorkingMode) -> DescriptorRef {
    match descriptor_type {
        DescriptorType::Device => DescriptorRef::whole(&DEVICE_DESCRIPTOR),
        DescriptorType::Configuration => DescriptorRef::whole(&CONFIGURATION_DESCRIPTOR),
        DescriptorType::String => {
            let row = match mode {
                WorkingMode::RfAccessPoint => 0,
                WorkingMode::LegacyProgrammer => 1,
            };
            STRING_TABLE[row]
                .get(index as usize)
                .copied()
                .unwrap_or(DescriptorRef::empty())
        }
        DescriptorType::Other(_) => DescriptorRef::slice(
            &CONFIGURATION_DESCRIPTOR,
            HID_DESCRIPTOR_OFFSET,
            HID_DESCRIPTOR_LEN,
        ),
    }
}

/// Answers GET_DESCRIPTOR for the working mode it was built with.
#[derive(Clone, Copy, Debug)]
pub struct DescriptorDispatcher {
    mode: WorkingMode,
}

impl DescriptorDispatcher {
    pub const fn new(mode: WorkingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> WorkingMode {
        self.mode
    }

    /// Look up by raw descriptor type code and string index.
    pub fn describe_descriptor(&self, descriptor_type: u8, index: u8) -> DescriptorRef {
        describe(DescriptorType::from(descriptor_type), index, self.mode)
    }

    /// Look up by the `wValue` of a GET_DESCRIPTOR request
    /// (high byte = type, low byte = index).
    pub fn describe_request(&self, value: u16) -> &'static [u8] {
        self.describe_descriptor((value >> 8) as u8, value as u8)
            .bytes()
    }
}
