//! Serial receive FIFO backing the debug channel.
//!
//! Bytes arrive from the UART (usually in interrupt context) and leave
//! through debug-data reports or the vendor read-stream request. The
//! queue is a lock-free single-producer/single-consumer ring, so once it
//! has been [`split`](SerialFifo::split) the producer can live in the
//! interrupt handler while the USB side owns the consumer.

use crate::config::SERIAL_FIFO_CAPACITY;
use crate::error::{Error, Result};
use heapless::spsc::{Consumer, Producer, Queue};

/// Consumer-side view of the FIFO, as the transfer state machine sees it.
pub trait FifoChannel {
    /// Take the oldest byte.
    fn pop(&mut self) -> Option<u8>;

    /// Bytes currently buffered.
    fn occupancy(&self) -> usize;

    fn has_data(&self) -> bool {
        self.occupancy() > 0
    }

    /// Move up to `dest.len()` bytes into `dest`, oldest first.
    /// Returns how many were copied; fewer than requested once the FIFO runs dry.
    fn read_block(&mut self, dest: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in dest.iter_mut() {
            match self.pop() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }
}

impl<T: FifoChannel + ?Sized> FifoChannel for &mut T {
    fn pop(&mut self) -> Option<u8> {
        (**self).pop()
    }

    fn occupancy(&self) -> usize {
        (**self).occupancy()
    }
}

/// Fixed-capacity serial receive buffer.
pub struct SerialFifo<const N: usize = SERIAL_FIFO_CAPACITY> {
    queue: Queue<u8, N>,
}

impl<const N: usize> SerialFifo<N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Append a received byte. A full FIFO drops the byte.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.queue.enqueue(byte).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial FIFO full, dropping 0x{:02x}", byte);
            Error::FifoFull
        })
    }

    /// Maximum number of bytes the FIFO can hold.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Split into an interrupt-side producer and a USB-side consumer.
    pub fn split(&mut self) -> (Producer<'_, u8, N>, Consumer<'_, u8, N>) {
        self.queue.split()
    }
}

impl<const N: usize> Default for SerialFifo<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FifoChannel for SerialFifo<N> {
    fn pop(&mut self) -> Option<u8> {
        self.queue.dequeue()
    }

    fn occupancy(&self) -> usize {
        self.queue.len()
    }
}

impl<const N: usize> FifoChannel for Consumer<'_, u8, N> {
    fn pop(&mut self) -> Option<u8> {
        self.dequeue()
    }

    fn occupancy(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_preserves_order() {
        let mut fifo: SerialFifo<8> = SerialFifo::new();
        for b in [3, 1, 4, 1, 5] {
            fifo.push(b).unwrap();
        }
        assert_eq!(fifo.occupancy(), 5);
        assert!(fifo.has_data());

        let mut out = [0u8; 8];
        assert_eq!(fifo.read_block(&mut out), 5);
        assert_eq!(&out[..5], &[3, 1, 4, 1, 5]);
        assert!(!fifo.has_data());
    }

    #[test]
    fn fifo_rejects_push_when_full() {
        let mut fifo: SerialFifo<4> = SerialFifo::new();
        assert_eq!(fifo.capacity(), 3);
        fifo.push(1).unwrap();
        fifo.push(2).unwrap();
        fifo.push(3).unwrap();
        assert_eq!(fifo.push(4), Err(Error::FifoFull));
        assert_eq!(fifo.pop(), Some(1));
    }

    #[test]
    fn read_block_stops_short_on_empty() {
        let mut fifo: SerialFifo<8> = SerialFifo::new();
        fifo.push(0xAB).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(fifo.read_block(&mut out), 1);
        assert_eq!(out, [0xAB, 0, 0, 0]);
        assert_eq!(fifo.read_block(&mut out), 0);
    }

    #[test]
    fn split_halves_share_the_ring() {
        let mut fifo: SerialFifo<8> = SerialFifo::new();
        let (mut producer, mut consumer) = fifo.split();
        producer.enqueue(b'h').unwrap();
        producer.enqueue(b'i').unwrap();
        assert_eq!(FifoChannel::occupancy(&consumer), 2);
        assert_eq!(FifoChannel::pop(&mut consumer), Some(b'h'));
        assert_eq!(FifoChannel::pop(&mut consumer), Some(b'i'));
        assert!(!FifoChannel::has_data(&consumer));
    }

    #[test]
    fn default_capacity_fits_length_byte() {
        let fifo: SerialFifo = SerialFifo::new();
        assert!(fifo.capacity() <= 255);
    }
}
