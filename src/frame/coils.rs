// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Coil;

/// Bit-packed coil values of a write request.
///
/// The first coil is the least significant bit of the first byte.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedCoils<'r> {
    quantity: usize,
    bytes: &'r [u8],
}

impl<'r> PackedCoils<'r> {
    /// `quantity` coils packed into `bytes`.
    #[must_use]
    pub const fn new(quantity: usize, bytes: &'r [u8]) -> Self {
        Self { quantity, bytes }
    }

    /// Announced number of coils.
    #[must_use]
    pub const fn quantity(&self) -> usize {
        self.quantity
    }

    /// Number of payload bytes.
    #[must_use]
    pub const fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload carries all announced coils.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.bytes.len() * 8 >= self.quantity
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Coil> {
        if idx >= self.quantity {
            return None;
        }
        let byte = self.bytes.get(idx / 8)?;
        Some(byte & (1 << (idx % 8)) != 0)
    }

    /// The coils in address order.
    ///
    /// Stops early if the payload is incomplete.
    pub fn bits(self) -> impl Iterator<Item = Coil> + 'r {
        (0..self.quantity).map_while(move |idx| self.get(idx))
    }

    /// Copy the coils into `target`, returns the number of copied coils.
    pub fn unpack_into(self, target: &mut [Coil]) -> usize {
        let mut count = 0;
        for (slot, coil) in target.iter_mut().zip(self.bits()) {
            *slot = coil;
            count += 1;
        }
        count
    }
}
