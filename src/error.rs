// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

use crate::frame::{Address, rtu::SlaveId};

/// Status returned when a received frame is dropped for an unspecified reason.
pub const STATUS_UNDEFINED: i32 = -1;

/// Informative code: the frame was addressed to another slave.
const INFORMATIVE_NOT_FOR_US: i32 = 4;

/// Informative code: no byte arrived in time.
const INFORMATIVE_RX_TIMEOUT: i32 = 5;

/// modbus-rtu-slave Error
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid coil value
    CoilValue(u16),
    /// Invalid buffer size
    BufferSize,
    /// Invalid CRC
    Crc(u16, u16),
    /// Invalid byte count
    ByteCount(u8),
    /// No byte arrived within the inter-byte timeout
    Timeout,
    /// The frame is addressed to another slave
    NotForUs(SlaveId),
    /// The announced frame exceeds the maximum ADU length
    FrameTooLong(usize),
    /// Invalid slave ID
    SlaveId(u8),
    /// The address range is not covered by the table
    DataAddress(Address),
}

impl Error {
    /// Signed status code of a failed receive.
    ///
    /// Accepted frames are reported with their (positive) length,
    /// so every error maps to `0` or a negative number.
    #[must_use]
    pub const fn status_code(&self) -> i32 {
        match self {
            Self::Timeout => STATUS_UNDEFINED - INFORMATIVE_RX_TIMEOUT,
            Self::NotForUs(_) => STATUS_UNDEFINED - INFORMATIVE_NOT_FOR_US,
            _ => STATUS_UNDEFINED,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            CoilValue(v) => write!(f, "Invalid coil value: 0x{v:0>4X}"),
            BufferSize => write!(f, "Invalid buffer size"),
            Crc(expected, actual) => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            ByteCount(cnt) => write!(f, "Invalid byte count: {cnt}"),
            Timeout => write!(f, "Timeout while waiting for the next byte"),
            NotForUs(slave) => write!(f, "Frame addressed to slave {slave}"),
            FrameTooLong(len) => write!(f, "Frame too long: {len} byte(s)"),
            SlaveId(id) => write!(f, "Invalid slave ID: {id}"),
            DataAddress(addr) => write!(f, "Invalid data address: {addr}"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Error::Timeout.status_code(), -6);
        assert_eq!(Error::NotForUs(7).status_code(), -5);
        assert_eq!(Error::Crc(0x1234, 0x4321).status_code(), -1);
        assert_eq!(Error::FrameTooLong(300).status_code(), -1);
        assert_eq!(Error::DataAddress(12).status_code(), -1);
    }

    #[test]
    fn display_crc_error() {
        use std::string::ToString;
        assert_eq!(
            Error::Crc(0xABCD, 0x0102).to_string(),
            "Invalid CRC: expected = 0xABCD, actual = 0x0102"
        );
    }
}
