//! `embassy-usb` transport adapter.
//!
//! `embassy-usb` buffers a whole control data stage and hands it to a
//! [`Handler`] in one call. [`ControlBridge`] replays that data stage into
//! the transfer state machine 8 bytes at a time, exactly as a low-speed
//! transport delivers it, so both transports share one implementation.

use core::cell::RefCell;

use crate::config::{MAX_CHUNK_SIZE, USB_DEVICE_RELEASE, USB_HID_POLL_MS, USB_MAX_POWER_MA, USB_PID, USB_VID};
use crate::fifo::FifoChannel;
use crate::mode::WorkingMode;
use crate::stream::{ProgrammerStream, SerialSink};
use crate::transfer::{ControlTransfer, DataPhase};
use crate::usb::descriptor::{
    self, DESCRIPTOR_HID, DESCRIPTOR_HID_REPORT, HID_CLASS_DESCRIPTOR, HID_REPORT_DESCRIPTOR,
};
use crate::usb::setup::{self, GET_DESCRIPTOR};
use defmt::{debug, info};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_usb::control::{InResponse, OutResponse, Recipient, Request, RequestType};
use embassy_usb::driver::{Direction, Driver};
use embassy_usb::types::InterfaceNumber;
use embassy_usb::{Builder, Config, Handler};

/// HID interface class code.
const USB_CLASS_HID: u8 = 0x03;

/// Translate an `embassy-usb` request into our setup packet.
fn to_setup(req: &Request) -> setup::SetupPacket {
    setup::SetupPacket {
        direction: match req.direction {
            Direction::In => setup::Direction::In,
            Direction::Out => setup::Direction::Out,
        },
        kind: match req.request_type {
            RequestType::Standard => setup::RequestKind::Standard,
            RequestType::Class => setup::RequestKind::Class,
            RequestType::Vendor => setup::RequestKind::Vendor,
            RequestType::Reserved => setup::RequestKind::Reserved,
        },
        recipient: match req.recipient {
            Recipient::Device => setup::Recipient::Device,
            Recipient::Interface => setup::Recipient::Interface,
            Recipient::Endpoint => setup::Recipient::Endpoint,
            _ => setup::Recipient::Other,
        },
        request: req.request,
        value: req.value,
        index: req.index,
        length: req.length,
    }
}

/// Device-level configuration for `mode`: identity, strings and an
/// 8-byte control endpoint.
pub fn usb_config(mode: WorkingMode) -> Config<'static> {
    let strings = descriptor::strings(mode);

    let mut config = Config::new(USB_VID, USB_PID);
    config.manufacturer = Some(strings.manufacturer);
    config.product = Some(strings.product);
    config.serial_number = Some(strings.serial_number);
    config.device_release = USB_DEVICE_RELEASE;
    config.device_class = 0x00;
    config.device_sub_class = 0x00;
    config.device_protocol = 0x00;
    config.composite_with_iads = false;
    config.max_power = USB_MAX_POWER_MA;
    config.max_packet_size_0 = MAX_CHUNK_SIZE as u8;
    config
}

/// Register the HID interface (class descriptor + interrupt-IN endpoint).
///
/// Returns the interface number for [`ControlBridge::new`] and the
/// endpoint, which only exists because HID requires one.
pub fn configure<'d, D: Driver<'d>>(builder: &mut Builder<'d, D>) -> (InterfaceNumber, D::EndpointIn) {
    let mut func = builder.function(USB_CLASS_HID, 0x00, 0x00);
    let mut iface = func.interface();
    let number = iface.interface_number();
    let mut alt = iface.alt_setting(USB_CLASS_HID, 0x00, 0x00, None);
    // `descriptor()` writes bLength/bDescriptorType itself.
    alt.descriptor(DESCRIPTOR_HID, &HID_CLASS_DESCRIPTOR[2..]);
    let ep_in = alt.endpoint_interrupt_in(MAX_CHUNK_SIZE as u16, USB_HID_POLL_MS);
    (number, ep_in)
}

/// Control-request handler that feeds the transfer state machine.
pub struct ControlBridge<P, F, S> {
    transfer: ControlTransfer<P, F, S>,
    interface: InterfaceNumber,
}

impl<P, F, S> ControlBridge<P, F, S>
where
    P: ProgrammerStream,
    F: FifoChannel,
    S: SerialSink,
{
    pub fn new(interface: InterfaceNumber, transfer: ControlTransfer<P, F, S>) -> Self {
        info!("HID control bridge on interface {}", interface.0);
        Self {
            transfer,
            interface,
        }
    }

    pub fn transfer(&mut self) -> &mut ControlTransfer<P, F, S> {
        &mut self.transfer
    }

    /// Interface GET_DESCRIPTOR for the HID class and report descriptors.
    fn hid_descriptor(&self, req: &Request) -> Option<&'static [u8]> {
        if req.request_type != RequestType::Standard
            || req.recipient != Recipient::Interface
            || req.request != GET_DESCRIPTOR
            || req.index != self.interface.0 as u16
        {
            return None;
        }
        match (req.value >> 8) as u8 {
            DESCRIPTOR_HID_REPORT => Some(HID_REPORT_DESCRIPTOR),
            DESCRIPTOR_HID => Some(&HID_CLASS_DESCRIPTOR),
            _ => None,
        }
    }
}

impl<P, F, S> Handler for ControlBridge<P, F, S>
where
    P: ProgrammerStream,
    F: FifoChannel,
    S: SerialSink,
{
    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        let setup = to_setup(&req);
        if !setup.targets_interface(self.interface.0) {
            return None;
        }
        match self.transfer.classify_setup(&setup) {
            DataPhase::Unhandled => None,
            DataPhase::None => Some(OutResponse::Accepted),
            DataPhase::Chunked => {
                for chunk in data.chunks(MAX_CHUNK_SIZE) {
                    if self.transfer.write_chunk(chunk) {
                        break;
                    }
                }
                Some(OutResponse::Accepted)
            }
        }
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if let Some(desc) = self.hid_descriptor(&req) {
            let len = desc.len().min(req.length as usize).min(buf.len());
            buf[..len].copy_from_slice(&desc[..len]);
            return Some(InResponse::Accepted(&buf[..len]));
        }

        let setup = to_setup(&req);
        if !setup.targets_interface(self.interface.0) {
            return None;
        }
        match self.transfer.classify_setup(&setup) {
            DataPhase::Unhandled => None,
            DataPhase::None => Some(InResponse::Accepted(&[])),
            DataPhase::Chunked => {
                let wanted = (req.length as usize).min(buf.len());
                let mut total = 0;
                for chunk in buf[..wanted].chunks_mut(MAX_CHUNK_SIZE) {
                    let n = self.transfer.read_chunk(chunk);
                    total += n;
                    if n < chunk.len() {
                        break;
                    }
                }
                debug!("control IN: {} of {} bytes", total, wanted);
                Some(InResponse::Accepted(&buf[..total]))
            }
        }
    }
}

/// A programmer stream stored behind a critical-section mutex, shared
/// between the USB handler and the engine task.
pub struct SharedStream<'a, T> {
    inner: &'a Mutex<CriticalSectionRawMutex, RefCell<T>>,
}

impl<'a, T> SharedStream<'a, T> {
    pub fn new(inner: &'a Mutex<CriticalSectionRawMutex, RefCell<T>>) -> Self {
        Self { inner }
    }
}

impl<T: ProgrammerStream> ProgrammerStream for SharedStream<'_, T> {
    fn pull_byte(&mut self) -> Option<u8> {
        self.inner.lock(|cell| cell.borrow_mut().pull_byte())
    }

    fn pending_count(&self) -> usize {
        self.inner.lock(|cell| cell.borrow().pending_count())
    }

    fn push_byte(&mut self, byte: u8) {
        self.inner.lock(|cell| cell.borrow_mut().push_byte(byte))
    }
}
