// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Word, read_word};

/// Big-endian register values of a write request.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedWords<'r> {
    quantity: usize,
    bytes: &'r [u8],
}

impl<'r> PackedWords<'r> {
    /// `quantity` registers encoded in `bytes`.
    #[must_use]
    pub const fn new(quantity: usize, bytes: &'r [u8]) -> Self {
        Self { quantity, bytes }
    }

    /// Announced number of registers.
    #[must_use]
    pub const fn quantity(&self) -> usize {
        self.quantity
    }

    /// Number of payload bytes.
    #[must_use]
    pub const fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the byte count matches the quantity exactly.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.bytes.len() == 2 * self.quantity
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Word> {
        if idx >= self.quantity {
            return None;
        }
        read_word(self.bytes, idx * 2)
    }

    /// The registers in address order.
    pub fn words(self) -> impl Iterator<Item = Word> + 'r {
        (0..self.quantity).map_while(move |idx| self.get(idx))
    }

    /// Copy the registers into `target`, returns the number of copied registers.
    pub fn unpack_into(self, target: &mut [Word]) -> usize {
        let mut count = 0;
        for (slot, word) in target.iter_mut().zip(self.words()) {
            *slot = word;
            count += 1;
        }
        count
    }
}
