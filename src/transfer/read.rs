//! Device-to-host data stage.

use super::{cap_length, ControlTransfer, RequestType};
use crate::fifo::FifoChannel;
use crate::stream::{ProgrammerStream, SerialSink};

/// Write the `[report ID, length]` header into as much of `chunk` as fits
/// and return the header length actually written.
fn write_header(chunk: &mut [u8], report_id: u8, length: u8) -> usize {
    let header = [report_id, length];
    let n = header.len().min(chunk.len());
    chunk[..n].copy_from_slice(&header[..n]);
    n
}

impl<P, F, S> ControlTransfer<P, F, S>
where
    P: ProgrammerStream,
    F: FifoChannel,
    S: SerialSink,
{
    /// Fill one chunk for the host.
    ///
    /// Returns the number of valid bytes. Report channels always return the
    /// full chunk length; bytes past the end of the stream are zeroed. The
    /// vendor stream returns only what the FIFO held, which ends the
    /// transfer short.
    pub fn read_chunk(&mut self, chunk: &mut [u8]) -> usize {
        match self.state.request_type {
            RequestType::LineCoding => 0,
            RequestType::VendorStream => self.read_vendor_stream(chunk),
            RequestType::DebugData => self.read_debug_report(chunk),
            RequestType::HidFirstChunk | RequestType::HidSubsequentChunk => {
                self.read_programmer_report(chunk)
            }
        }
    }

    fn read_vendor_stream(&mut self, chunk: &mut [u8]) -> usize {
        if !cfg!(feature = "debug-interface") {
            return 0;
        }
        self.fifo.read_block(chunk)
    }

    fn read_debug_report(&mut self, chunk: &mut [u8]) -> usize {
        if !cfg!(feature = "debug-interface") {
            return 0;
        }

        let mut offset = 0;
        if !self.state.started {
            let occupancy = cap_length(self.fifo.occupancy());
            offset = write_header(chunk, self.state.report_id, occupancy);
            self.state.started = true;
        }

        let payload = &mut chunk[offset..];
        if self.state.exhausted {
            payload.fill(0);
        } else {
            let copied = self.fifo.read_block(payload);
            payload[copied..].fill(0);
            if !self.fifo.has_data() {
                #[cfg(feature = "defmt")]
                defmt::debug!("debug report: FIFO drained");
                self.state.exhausted = true;
            }
        }
        chunk.len()
    }

    fn read_programmer_report(&mut self, chunk: &mut [u8]) -> usize {
        let mut offset = 0;
        if self.state.request_type == RequestType::HidFirstChunk {
            let ready = cap_length(self.programmer.pending_count());
            offset = write_header(chunk, self.state.report_id, ready);
            self.state.request_type = RequestType::HidSubsequentChunk;
        }

        for slot in chunk[offset..].iter_mut() {
            *slot = if self.state.exhausted {
                0
            } else if let Some(byte) = self.programmer.pull_byte() {
                byte
            } else {
                #[cfg(feature = "defmt")]
                defmt::debug!("programmer report: stream drained");
                self.state.exhausted = true;
                0
            };
        }
        chunk.len()
    }
}
