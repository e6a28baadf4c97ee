//! USB-facing pieces: setup-packet decoding, static descriptors and,
//! with the `embedded` feature, the `embassy-usb` adapter.
//!
//! The device presents a single vendor-defined HID interface on a low-speed
//! style 8-byte control endpoint. All payload moves through HID feature
//! reports (GET_REPORT / SET_REPORT) and, for the debug interface, two
//! vendor requests.

pub mod descriptor;
pub mod setup;

#[cfg(feature = "embedded")]
pub mod embassy;
