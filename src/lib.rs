//! Device-side HID control-transfer multiplexer.
//!
//! A single vendor-defined HID interface carries two unrelated byte
//! streams over 8-byte control-transfer chunks:
//!
//! - the in-circuit-programmer engine, on feature reports 1..=4
//! - a debug/serial pass-through channel, on feature report 5 and two
//!   vendor requests
//!
//! The pure logic (setup classification, chunked reads and writes, the
//! descriptor tables) lives here and is host-testable with no hardware.
//! The `embedded` feature adds the `embassy-usb` adapter.
//!
//! Usage: `cargo test` (default features) or
//! `cargo test --no-default-features` for a build without the debug
//! interface.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod fifo;
pub mod mode;
pub mod stream;
pub mod transfer;
pub mod usb;

pub use error::{Error, Result};
pub use fifo::{FifoChannel, SerialFifo};
pub use mode::WorkingMode;
pub use stream::{ProgrammerStream, QueueStream, SerialSink};
pub use transfer::{ControlTransfer, DataPhase, Event, RequestType, Response, Step};
pub use usb::descriptor::{DescriptorDispatcher, DescriptorRef};
pub use usb::setup::SetupPacket;
