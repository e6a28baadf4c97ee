//! Byte-level interfaces to the programmer engine and the serial transmitter.
//!
//! The programmer protocol engine is opaque here: the transfer state
//! machine only pulls reply bytes out of it, asks how many are ready, and
//! pushes host bytes into it. [`QueueStream`] is a heapless pipe that
//! gives the engine a matching pair of queues.

use crate::error::{Error, Result};
use heapless::spsc::{Producer, Queue};

/// Pull/push interface of the in-circuit-programmer byte engine.
pub trait ProgrammerStream {
    /// Next byte the engine wants to send to the host, or `None` when its
    /// transmit side is empty.
    fn pull_byte(&mut self) -> Option<u8>;

    /// Number of bytes ready to be pulled.
    fn pending_count(&self) -> usize;

    /// Feed one byte received from the host into the engine.
    fn push_byte(&mut self, byte: u8);
}

/// Serial transmitter fed by the debug channel.
pub trait SerialSink {
    fn put_byte(&mut self, byte: u8);
}

impl<T: ProgrammerStream + ?Sized> ProgrammerStream for &mut T {
    fn pull_byte(&mut self) -> Option<u8> {
        (**self).pull_byte()
    }

    fn pending_count(&self) -> usize {
        (**self).pending_count()
    }

    fn push_byte(&mut self, byte: u8) {
        (**self).push_byte(byte)
    }
}

impl<T: SerialSink + ?Sized> SerialSink for &mut T {
    fn put_byte(&mut self, byte: u8) {
        (**self).put_byte(byte)
    }
}

/// The USB side of a serial TX queue; the UART task owns the consumer.
/// Bytes arriving while the queue is full are dropped.
impl<const N: usize> SerialSink for Producer<'_, u8, N> {
    fn put_byte(&mut self, byte: u8) {
        if self.enqueue(byte).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial TX queue full, dropping 0x{:02x}", byte);
        }
    }
}

/// Bidirectional byte pipe between the USB side and the programmer engine.
///
/// `to_host` holds engine replies waiting for a HID read, `from_host` holds
/// bytes the host wrote that the engine has not consumed yet.
pub struct QueueStream<const N: usize> {
    to_host: Queue<u8, N>,
    from_host: Queue<u8, N>,
}

impl<const N: usize> QueueStream<N> {
    pub const fn new() -> Self {
        Self {
            to_host: Queue::new(),
            from_host: Queue::new(),
        }
    }

    /// Engine side: queue a reply byte for the host.
    pub fn send(&mut self, byte: u8) -> Result<()> {
        self.to_host.enqueue(byte).map_err(|_| Error::BufferOverflow)
    }

    /// Engine side: queue a whole reply. Stops at the first byte that
    /// does not fit.
    pub fn send_all(&mut self, bytes: &[u8]) -> Result<()> {
        bytes.iter().try_for_each(|&b| self.send(b))
    }

    /// Engine side: next byte written by the host.
    pub fn receive(&mut self) -> Option<u8> {
        self.from_host.dequeue()
    }

    /// Engine side: bytes written by the host and not yet received.
    pub fn received_len(&self) -> usize {
        self.from_host.len()
    }
}

impl<const N: usize> Default for QueueStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ProgrammerStream for QueueStream<N> {
    fn pull_byte(&mut self) -> Option<u8> {
        self.to_host.dequeue()
    }

    fn pending_count(&self) -> usize {
        self.to_host.len()
    }

    fn push_byte(&mut self, byte: u8) {
        if self.from_host.enqueue(byte).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("programmer RX queue full, dropping 0x{:02x}", byte);
        }
    }
}
