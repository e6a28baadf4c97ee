//! Host-to-device data stage.

use super::{ControlTransfer, RequestType};
use crate::config::{CHUNK_HEADER_LEN, MAX_CHUNK_SIZE};
use crate::fifo::FifoChannel;
use crate::stream::{ProgrammerStream, SerialSink};

/// Split a first chunk into its declared payload length and payload.
/// Missing header bytes read as a zero length.
fn split_header(chunk: &[u8]) -> (u8, &[u8]) {
    let declared = chunk.get(1).copied().unwrap_or(0);
    let payload = chunk.get(CHUNK_HEADER_LEN..).unwrap_or(&[]);
    (declared, payload)
}

/// Hand bytes to `push` until `remaining` hits zero. The rest of the
/// chunk is dropped.
fn consume(remaining: &mut u8, payload: &[u8], mut push: impl FnMut(u8)) {
    for &byte in payload {
        if *remaining == 0 {
            break;
        }
        push(byte);
        *remaining -= 1;
    }
}

impl<P, F, S> ControlTransfer<P, F, S>
where
    P: ProgrammerStream,
    F: FifoChannel,
    S: SerialSink,
{
    /// Consume one chunk from the host.
    ///
    /// Returns `true` when the chunk is not a full 8 bytes, telling the
    /// transport this was the final (short) packet of the message.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> bool {
        match self.state.request_type {
            RequestType::LineCoding | RequestType::VendorStream => {}
            RequestType::DebugData => self.write_debug_report(chunk),
            RequestType::HidFirstChunk | RequestType::HidSubsequentChunk => {
                self.write_programmer_report(chunk)
            }
        }
        chunk.len() != MAX_CHUNK_SIZE
    }

    fn write_debug_report(&mut self, chunk: &[u8]) {
        if !cfg!(feature = "debug-interface") {
            return;
        }

        let payload = if self.state.started {
            chunk
        } else {
            let (declared, payload) = split_header(chunk);
            self.state.remaining = declared;
            self.state.started = true;
            payload
        };

        let serial = &mut self.serial;
        consume(&mut self.state.remaining, payload, |b| serial.put_byte(b));
    }

    fn write_programmer_report(&mut self, chunk: &[u8]) {
        let payload = if self.state.request_type == RequestType::HidFirstChunk {
            let (declared, payload) = split_header(chunk);
            self.state.remaining = declared;
            self.state.request_type = RequestType::HidSubsequentChunk;
            payload
        } else {
            chunk
        };

        let programmer = &mut self.programmer;
        consume(&mut self.state.remaining, payload, |b| {
            programmer.push_byte(b)
        });
    }
}
