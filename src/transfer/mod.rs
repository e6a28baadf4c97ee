//! Control-transfer state machine.
//!
//! One HID interface carries two unrelated byte streams: the programmer
//! engine (any report ID) and the debug/serial channel (report ID 5, plus
//! vendor requests). The transport only delivers 8-byte chunks, so a
//! logical report is spread over several independently scheduled calls:
//!
//! 1. [`classify_setup`](ControlTransfer::classify_setup) inspects the setup
//!    packet and records which channel owns the transfer.
//! 2. [`read_chunk`](ControlTransfer::read_chunk) /
//!    [`write_chunk`](ControlTransfer::write_chunk) are then called once per
//!    chunk until the transport has moved the whole data stage.
//!
//! First chunk of a report:
//! ```text
//! Byte 0:   report ID
//! Byte 1:   length (read: bytes ready, capped at 255; write: declared payload)
//! Byte 2-7: payload
//! ```
//! Subsequent chunks are 8 bytes of payload.
//!
//! A new setup always reclassifies and discards whatever transfer was in
//! progress.

mod read;
mod write;


use crate::config::{DEBUG_REPORT_ID, REPORT_LENGTH_CAP};
use crate::fifo::FifoChannel;
use crate::stream::{ProgrammerStream, SerialSink};
use crate::usb::setup::{RequestKind, SetupPacket, HID_GET_REPORT, HID_SET_REPORT};

#[cfg(feature = "debug-interface")]
use crate::config::{VENDOR_READ_STREAM, VENDOR_WRITE_BYTE};

/// Which branch of the chunk logic owns the current transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestType {
    /// Idle. Nothing is read or written.
    #[default]
    LineCoding,
    /// Programmer report, header chunk not seen yet.
    HidFirstChunk,
    /// Programmer report, header already handled.
    HidSubsequentChunk,
    /// Debug-channel report (report ID 5).
    DebugData,
    /// Vendor read-stream request: raw FIFO bytes, no header.
    VendorStream,
}

/// What the transport should do after the setup stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataPhase {
    /// Handled entirely in the setup stage; no data stage follows.
    None,
    /// Not a request of ours. No data stage; the transport stalls it.
    Unhandled,
    /// A data stage follows. Its length is driven by the transport's own
    /// byte counter through repeated read/write chunk calls.
    Chunked,
}

/// Cross-call state of one logical transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferState {
    request_type: RequestType,
    /// Report ID from the setup packet.
    report_id: u8,
    /// Write path: payload bytes still expected.
    remaining: u8,
    /// Debug channel: header chunk already handled.
    started: bool,
    /// Read path: the stream ran dry; never pulled again in this transfer.
    exhausted: bool,
}

impl TransferState {
    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn report_id(&self) -> u8 {
        self.report_id
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Input to [`ControlTransfer::transition`].
#[derive(Debug)]
pub enum Event<'a> {
    Setup(SetupPacket),
    /// Host pulls one chunk; the buffer is the chunk to fill.
    Read(&'a mut [u8]),
    /// Host pushes one chunk.
    Write(&'a [u8]),
}

/// Transport-facing result of one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    DataPhase(DataPhase),
    /// Bytes placed in the chunk.
    Read(usize),
    /// `true` marks the final chunk of the message.
    Write { short_packet: bool },
}

/// Outcome of [`ControlTransfer::transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    pub state: RequestType,
    pub response: Response,
}

/// Clamp a byte count to the one-byte length field.
pub(crate) fn cap_length(count: usize) -> u8 {
    if count > REPORT_LENGTH_CAP as usize {
        REPORT_LENGTH_CAP
    } else {
        count as u8
    }
}

/// The transfer handler with its three collaborators: the programmer
/// engine, the serial receive FIFO and the serial transmitter.
pub struct ControlTransfer<P, F, S> {
    state: TransferState,
    programmer: P,
    fifo: F,
    serial: S,
}

impl<P, F, S> ControlTransfer<P, F, S>
where
    P: ProgrammerStream,
    F: FifoChannel,
    S: SerialSink,
{
    pub fn new(programmer: P, fifo: F, serial: S) -> Self {
        Self {
            state: TransferState::default(),
            programmer,
            fifo,
            serial,
        }
    }

    pub fn state(&self) -> &TransferState {
        &self.state
    }

    pub fn request_type(&self) -> RequestType {
        self.state.request_type
    }

    pub fn programmer(&self) -> &P {
        &self.programmer
    }

    pub fn programmer_mut(&mut self) -> &mut P {
        &mut self.programmer
    }

    pub fn fifo(&self) -> &F {
        &self.fifo
    }

    pub fn fifo_mut(&mut self) -> &mut F {
        &mut self.fifo
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn into_parts(self) -> (P, F, S) {
        (self.programmer, self.fifo, self.serial)
    }

    /// Setup stage: classify the request and reset all per-transfer state.
    ///
    /// HID GET_REPORT / SET_REPORT select the debug channel for report ID 5
    /// and the programmer stream otherwise. With the debug interface
    /// compiled in, vendor request 1 sends `wValue` low byte straight to
    /// the serial transmitter and vendor request 2 streams the FIFO.
    pub fn classify_setup(&mut self, setup: &SetupPacket) -> DataPhase {
        self.state = TransferState::default();

        let phase = match setup.kind {
            RequestKind::Class
                if setup.request == HID_GET_REPORT || setup.request == HID_SET_REPORT =>
            {
                let report_id = setup.value_low();
                self.state.report_id = report_id;
                self.state.request_type = if report_id == DEBUG_REPORT_ID {
                    RequestType::DebugData
                } else {
                    RequestType::HidFirstChunk
                };
                DataPhase::Chunked
            }
            #[cfg(feature = "debug-interface")]
            RequestKind::Vendor => match setup.request {
                VENDOR_WRITE_BYTE => {
                    self.serial.put_byte(setup.value_low());
                    DataPhase::None
                }
                VENDOR_READ_STREAM => {
                    self.state.request_type = RequestType::VendorStream;
                    DataPhase::Chunked
                }
                _ => DataPhase::Unhandled,
            },
            _ => DataPhase::Unhandled,
        };

        #[cfg(feature = "defmt")]
        {
            if phase == DataPhase::Unhandled {
                defmt::debug!(
                    "setup {:?} request 0x{:02x}: unhandled",
                    setup.kind,
                    setup.request
                );
            } else {
                defmt::trace!(
                    "setup {:?} report {} -> {:?}",
                    setup.kind,
                    self.state.report_id,
                    self.state.request_type
                );
            }
        }

        phase
    }

    /// Drive the state machine with one transport event.
    pub fn transition(&mut self, event: Event<'_>) -> Step {
        let response = match event {
            Event::Setup(setup) => Response::DataPhase(self.classify_setup(&setup)),
            Event::Read(chunk) => Response::Read(self.read_chunk(chunk)),
            Event::Write(chunk) => Response::Write {
                short_packet: self.write_chunk(chunk),
            },
        };
        Step {
            state: self.state.request_type,
            response,
        }
    }
}
