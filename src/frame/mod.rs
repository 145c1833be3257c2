// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Modbus PDU as seen by a slave.

use core::fmt;

use byteorder::{BigEndian, ByteOrder};

mod coils;
pub(crate) mod rtu;
mod words;

pub use self::{coils::*, words::*};

/// Maximum number of bits that can be read with a single request.
pub const MAX_READ_BITS: Quantity = 2000;

/// Maximum number of bits that can be written with a single request.
pub const MAX_WRITE_BITS: Quantity = 1968;

/// Maximum number of registers that can be read with a single request.
pub const MAX_READ_REGISTERS: Quantity = 125;

/// Maximum number of registers that can be written with a single request.
pub const MAX_WRITE_REGISTERS: Quantity = 123;

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// The function code byte of a PDU.
///
/// Any byte is a valid function code, the constants name
/// the ones the slave knows about.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionCode(pub u8);

impl FunctionCode {
    pub const READ_COILS: Self = Self(0x01);
    pub const READ_DISCRETE_INPUTS: Self = Self(0x02);
    pub const READ_HOLDING_REGISTERS: Self = Self(0x03);
    pub const READ_INPUT_REGISTERS: Self = Self(0x04);
    pub const WRITE_SINGLE_COIL: Self = Self(0x05);
    pub const WRITE_SINGLE_REGISTER: Self = Self(0x06);
    pub const READ_EXCEPTION_STATUS: Self = Self(0x07);
    pub const WRITE_MULTIPLE_COILS: Self = Self(0x0F);
    pub const WRITE_MULTIPLE_REGISTERS: Self = Self(0x10);
    pub const REPORT_SLAVE_ID: Self = Self(0x11);
    pub const MASK_WRITE_REGISTER: Self = Self(0x16);
    pub const READ_WRITE_MULTIPLE_REGISTERS: Self = Self(0x17);

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Function byte of an exception response (high bit set).
    #[must_use]
    pub const fn exception_value(self) -> u8 {
        self.0 | 0x80
    }
}

impl From<u8> for FunctionCode {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:0>2X}", self.0)
    }
}

/// The two bit tables of a slave.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitTable {
    Coils,
    /// Read-only for the master.
    DiscreteInputs,
}

impl BitTable {
    #[must_use]
    pub const fn read_function(self) -> FunctionCode {
        match self {
            Self::Coils => FunctionCode::READ_COILS,
            Self::DiscreteInputs => FunctionCode::READ_DISCRETE_INPUTS,
        }
    }
}

/// The two register tables of a slave.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterTable {
    HoldingRegisters,
    /// Read-only for the master.
    InputRegisters,
}

impl RegisterTable {
    #[must_use]
    pub const fn read_function(self) -> FunctionCode {
        match self {
            Self::HoldingRegisters => FunctionCode::READ_HOLDING_REGISTERS,
            Self::InputRegisters => FunctionCode::READ_INPUT_REGISTERS,
        }
    }
}

/// A request of the master, borrowing the payload of the received frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'r> {
    ReadBits(BitTable, Address, Quantity),
    ReadRegisters(RegisterTable, Address, Quantity),
    WriteSingleCoil(Address, Coil),
    WriteSingleRegister(Address, Word),
    WriteMultipleCoils(Address, PackedCoils<'r>),
    WriteMultipleRegisters(Address, PackedWords<'r>),
    /// A function the slave does not execute.
    Unsupported(FunctionCode),
}

impl Request<'_> {
    #[must_use]
    pub const fn function(&self) -> FunctionCode {
        match self {
            Self::ReadBits(table, _, _) => table.read_function(),
            Self::ReadRegisters(table, _, _) => table.read_function(),
            Self::WriteSingleCoil(_, _) => FunctionCode::WRITE_SINGLE_COIL,
            Self::WriteSingleRegister(_, _) => FunctionCode::WRITE_SINGLE_REGISTER,
            Self::WriteMultipleCoils(_, _) => FunctionCode::WRITE_MULTIPLE_COILS,
            Self::WriteMultipleRegisters(_, _) => FunctionCode::WRITE_MULTIPLE_REGISTERS,
            Self::Unsupported(function) => *function,
        }
    }
}

/// The response to an executed request.
///
/// Read responses borrow the requested range of the register map.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'r> {
    ReadBits(BitTable, &'r [Coil]),
    ReadRegisters(RegisterTable, &'r [Word]),
    WriteSingleCoil(Address, Coil),
    WriteSingleRegister(Address, Word),
    WriteMultipleCoils(Address, Quantity),
    WriteMultipleRegisters(Address, Quantity),
}

impl Response<'_> {
    #[must_use]
    pub const fn function(&self) -> FunctionCode {
        match self {
            Self::ReadBits(table, _) => table.read_function(),
            Self::ReadRegisters(table, _) => table.read_function(),
            Self::WriteSingleCoil(_, _) => FunctionCode::WRITE_SINGLE_COIL,
            Self::WriteSingleRegister(_, _) => FunctionCode::WRITE_SINGLE_REGISTER,
            Self::WriteMultipleCoils(_, _) => FunctionCode::WRITE_MULTIPLE_COILS,
            Self::WriteMultipleRegisters(_, _) => FunctionCode::WRITE_MULTIPLE_REGISTERS,
        }
    }

    /// Number of bytes of the serialized PDU.
    #[must_use]
    pub const fn pdu_len(&self) -> usize {
        match self {
            Self::ReadBits(_, coils) => 2 + crate::util::packed_coils_len(coils.len()),
            Self::ReadRegisters(_, words) => 2 + 2 * words.len(),
            // function code + two words
            _ => 5,
        }
    }
}

/// An exception raised by the slave.
///
/// These are the only exceptions the slave ever raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
}

impl Exception {
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    const fn description(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::IllegalDataValue => "Illegal data value",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl defmt::Format for Exception {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.description());
    }
}

/// An exception together with the function code that caused it.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionResponse {
    pub function: FunctionCode,
    pub exception: Exception,
}

/// The response PDU, either a regular response or an exception.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsePdu<'r>(pub Result<Response<'r>, ExceptionResponse>);

impl ResponsePdu<'_> {
    /// Number of bytes of the serialized PDU.
    #[must_use]
    pub const fn pdu_len(&self) -> usize {
        match &self.0 {
            Ok(rsp) => rsp.pdu_len(),
            Err(_) => 2,
        }
    }
}

/// Read the big-endian word at `offset`, if the buffer is long enough.
pub(crate) fn read_word(buf: &[u8], offset: usize) -> Option<Word> {
    buf.get(offset..offset.checked_add(2)?)
        .map(BigEndian::read_u16)
}
