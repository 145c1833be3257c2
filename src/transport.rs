// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborators supplied by the host environment.

use crate::frame::Coil;

/// Half-duplex serial line the slave is attached to.
pub trait Serial {
    /// Configure the line, called once before the first poll.
    fn begin(&mut self, baud_rate: u32);

    /// Number of received bytes that are ready to be read.
    ///
    /// Must not block.
    fn available(&mut self) -> usize;

    /// Read the next received byte.
    ///
    /// Only called if [`Serial::available`] reported at least one byte.
    fn read(&mut self) -> u8;

    /// Transmit all bytes in order, blocking until they are queued.
    fn write(&mut self, bytes: &[u8]);
}

/// Blocking millisecond delay.
pub trait Delay {
    /// Block the calling thread for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Sink for the coils that drive discrete outputs (LEDs, relays, ...).
pub trait DiscreteOutputs {
    /// Apply the state of output `index`.
    fn set_output(&mut self, index: usize, state: Coil);
}

impl<T: Serial + ?Sized> Serial for &mut T {
    fn begin(&mut self, baud_rate: u32) {
        (**self).begin(baud_rate);
    }

    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read(&mut self) -> u8 {
        (**self).read()
    }

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes);
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}
