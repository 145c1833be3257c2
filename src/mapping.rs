// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory register map of the slave.

use core::ops::Range;

use byteorder::{BigEndian, ByteOrder};

use crate::{
    config::{DEFAULT_TABLE_LEN, MappingConfig, TableConfig},
    error::Error,
    frame::{Address, Coil, Word},
    util::pack_coils,
};

/// Byte order of a 32 bit float spread over two registers.
///
/// `A` is the most significant byte of the IEEE 754 value, the
/// variant names the order of the bytes on the wire.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordOrder {
    /// Big endian, high word first.
    #[default]
    Abcd,
    /// Little endian, low word first with swapped bytes.
    Dcba,
    /// High word first with swapped bytes.
    Badc,
    /// Low word first.
    Cdab,
}

impl WordOrder {
    // Every permutation is its own inverse.
    const fn reorder(self, [a, b, c, d]: [u8; 4]) -> [u8; 4] {
        match self {
            Self::Abcd => [a, b, c, d],
            Self::Dcba => [d, c, b, a],
            Self::Badc => [b, a, d, c],
            Self::Cdab => [c, d, a, b],
        }
    }
}

/// A table of coils, discrete inputs or registers.
///
/// The table can be shifted in the Modbus address space to reduce
/// memory consumption, it doesn't have to start at address zero.
/// `N` is the capacity, the configured extent never exceeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<T, const N: usize> {
    start: Address,
    len: usize,
    values: [T; N],
}

impl<T: Copy + Default, const N: usize> Table<T, N> {
    /// Create a zero initialized table.
    ///
    /// The extent is clamped to the capacity `N`.
    #[must_use]
    pub fn new(cfg: TableConfig) -> Self {
        Self {
            start: cfg.start,
            len: cfg.count.min(N),
            values: [T::default(); N],
        }
    }
}

impl<T, const N: usize> Table<T, N> {
    /// Modbus address of the first entry.
    #[must_use]
    pub const fn start(&self) -> Address {
        self.start
    }

    /// Number of addressable entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no entry is addressable.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Translate a Modbus address range into an index range.
    ///
    /// Returns `None` unless all `quantity` entries starting
    /// at `address` are covered by the table.
    #[must_use]
    pub fn index(&self, address: Address, quantity: usize) -> Option<Range<usize>> {
        let first = usize::from(address.checked_sub(self.start)?);
        let end = first.checked_add(quantity)?;
        (end <= self.len).then_some(first..end)
    }

    /// Entries of a Modbus address range.
    #[must_use]
    pub fn get(&self, address: Address, quantity: usize) -> Option<&[T]> {
        let range = self.index(address, quantity)?;
        self.values.get(range)
    }

    /// Mutable entries of a Modbus address range.
    pub fn get_mut(&mut self, address: Address, quantity: usize) -> Option<&mut [T]> {
        let range = self.index(address, quantity)?;
        self.values.get_mut(range)
    }

    /// All addressable entries.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values[..self.len]
    }

    /// All addressable entries.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values[..self.len]
    }
}

/// Multi-register values.
///
/// Integers are stored with the high word first.
impl<const N: usize> Table<Word, N> {
    fn read_bytes<const B: usize>(&self, address: Address) -> Option<[u8; B]> {
        let words = self.get(address, B / 2)?;
        let mut bytes = [0; B];
        BigEndian::write_u16_into(words, &mut bytes);
        Some(bytes)
    }

    fn write_bytes<const B: usize>(
        &mut self,
        address: Address,
        bytes: [u8; B],
    ) -> Result<(), Error> {
        let words = self
            .get_mut(address, B / 2)
            .ok_or(Error::DataAddress(address))?;
        BigEndian::read_u16_into(&bytes, words);
        Ok(())
    }

    /// Read a `u32` from two registers starting at `address`.
    #[must_use]
    pub fn get_u32(&self, address: Address) -> Option<u32> {
        self.read_bytes::<4>(address).map(|b| BigEndian::read_u32(&b))
    }

    /// Store a `u32` into two registers starting at `address`.
    pub fn set_u32(&mut self, address: Address, value: u32) -> Result<(), Error> {
        let mut bytes = [0; 4];
        BigEndian::write_u32(&mut bytes, value);
        self.write_bytes(address, bytes)
    }

    /// Read a `u64` from four registers starting at `address`.
    #[must_use]
    pub fn get_u64(&self, address: Address) -> Option<u64> {
        self.read_bytes::<8>(address).map(|b| BigEndian::read_u64(&b))
    }

    /// Store a `u64` into four registers starting at `address`.
    pub fn set_u64(&mut self, address: Address, value: u64) -> Result<(), Error> {
        let mut bytes = [0; 8];
        BigEndian::write_u64(&mut bytes, value);
        self.write_bytes(address, bytes)
    }

    /// Read an IEEE 754 `f32` from two registers starting at `address`.
    #[must_use]
    pub fn get_f32(&self, address: Address, order: WordOrder) -> Option<f32> {
        self.read_bytes::<4>(address)
            .map(|bytes| BigEndian::read_f32(&order.reorder(bytes)))
    }

    /// Store an IEEE 754 `f32` into two registers starting at `address`.
    pub fn set_f32(
        &mut self,
        address: Address,
        value: f32,
        order: WordOrder,
    ) -> Result<(), Error> {
        let mut bytes = [0; 4];
        BigEndian::write_f32(&mut bytes, value);
        self.write_bytes(address, order.reorder(bytes))
    }
}

impl<const N: usize> Table<Coil, N> {
    /// Pack up to 8 bits starting at `address` into a byte, LSB first.
    ///
    /// Returns `None` if `count` exceeds 8 or the range is not covered.
    #[must_use]
    pub fn get_byte(&self, address: Address, count: usize) -> Option<u8> {
        if count > 8 {
            return None;
        }
        let mut byte = [0];
        pack_coils(self.get(address, count)?, &mut byte).ok()?;
        Some(byte[0])
    }
}

/// The four data tables of a Modbus slave.
///
/// Discrete inputs and input registers are read-only for the
/// Modbus master, the application updates them between polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMap<const N: usize = DEFAULT_TABLE_LEN> {
    pub coils: Table<Coil, N>,
    pub discrete_inputs: Table<Coil, N>,
    pub holding_registers: Table<Word, N>,
    pub input_registers: Table<Word, N>,
}

impl<const N: usize> RegisterMap<N> {
    #[must_use]
    pub fn new(cfg: &MappingConfig) -> Self {
        Self {
            coils: Table::new(cfg.coils),
            discrete_inputs: Table::new(cfg.discrete_inputs),
            holding_registers: Table::new(cfg.holding_registers),
            input_registers: Table::new(cfg.input_registers),
        }
    }

    /// Snapshot of the first `K` coils, e.g. to drive indicator outputs.
    ///
    /// Coils beyond the configured extent are reported as `false`.
    #[must_use]
    pub fn outputs<const K: usize>(&self) -> [Coil; K] {
        let mut outputs = [false; K];
        for (out, coil) in outputs.iter_mut().zip(self.coils.values()) {
            *out = *coil;
        }
        outputs
    }
}

impl<const N: usize> Default for RegisterMap<N> {
    fn default() -> Self {
        Self::new(&MappingConfig::default())
    }
}
