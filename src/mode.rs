//! Bridge working mode.
//!
//! Chosen by device bring-up before enumeration and handed to the
//! descriptor dispatcher; this crate only reads it.

/// Which personality the device presents to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkingMode {
    /// RF access-point bridge.
    #[default]
    RfAccessPoint,
    /// Legacy AVR-Doper compatible in-circuit programmer.
    LegacyProgrammer,
}

impl From<u8> for WorkingMode {
    /// Decode the raw mode flag. `1` selects the legacy programmer, any
    /// other value the RF access point.
    fn from(raw: u8) -> Self {
        match raw {
            1 => WorkingMode::LegacyProgrammer,
            _ => WorkingMode::RfAccessPoint,
        }
    }
}

impl WorkingMode {
    pub fn is_legacy(self) -> bool {
        matches!(self, WorkingMode::LegacyProgrammer)
    }
}
