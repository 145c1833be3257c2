// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;

pub mod server;
pub use crate::frame::rtu::*;

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf)
// The receive and response buffers leave room for a complete PDU of
// 253 bytes plus address and CRC, rounded up like most implementations.
pub const MAX_ADU_LEN: usize = 260;

/// Number of bytes in front of the PDU (the slave address).
pub const HEADER_LEN: usize = 1;

/// Number of bytes of the trailing CRC.
pub const CHECKSUM_LEN: usize = 2;

/// Calculate the CRC (Cyclic Redundancy Check) sum.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let crc = data.iter().fold(0xFFFF_u16, |crc, byte| {
        (0..8).fold(crc ^ u16::from(*byte), |crc, _| {
            if crc & 0x0001 == 0 {
                crc >> 1
            } else {
                (crc >> 1) ^ 0xA001
            }
        })
    });
    // The low byte goes first on the wire.
    crc.rotate_right(8)
}

/// Verify the trailing CRC of a complete ADU.
///
/// Returns the length of the ADU (including the CRC) if it matches.
pub fn check_integrity(adu: &[u8]) -> Result<usize> {
    if adu.len() < CHECKSUM_LEN {
        return Err(Error::BufferSize);
    }
    let (msg, crc_buf) = adu.split_at(adu.len() - CHECKSUM_LEN);
    let expected_crc = BigEndian::read_u16(crc_buf);
    let actual_crc = crc16(msg);
    if expected_crc != actual_crc {
        return Err(Error::Crc(expected_crc, actual_crc));
    }
    Ok(adu.len())
}

/// Number of bytes to read after the function code
/// (address, quantity, byte count, ...).
#[must_use]
pub const fn meta_len_after_function(fn_code: u8) -> usize {
    match FunctionCode(fn_code) {
        FunctionCode(0x00)
        | FunctionCode::READ_COILS
        | FunctionCode::READ_DISCRETE_INPUTS
        | FunctionCode::READ_HOLDING_REGISTERS
        | FunctionCode::READ_INPUT_REGISTERS
        | FunctionCode::WRITE_SINGLE_COIL
        | FunctionCode::WRITE_SINGLE_REGISTER => 4,
        FunctionCode::WRITE_MULTIPLE_COILS | FunctionCode::WRITE_MULTIPLE_REGISTERS => 5,
        FunctionCode::MASK_WRITE_REGISTER => 6,
        FunctionCode::READ_WRITE_MULTIPLE_REGISTERS => 9,
        // read exception status, report slave ID, ...
        _ => 0,
    }
}

/// Number of bytes to read after the meta data, including the CRC.
///
/// The byte count of the write functions is taken from the buffered bytes.
pub fn data_len_after_meta(adu_buf: &[u8]) -> Result<usize> {
    let byte_count_at = |idx: usize| {
        adu_buf
            .get(HEADER_LEN + idx)
            .map(|&cnt| usize::from(cnt))
            .ok_or(Error::BufferSize)
    };
    let &fn_code = adu_buf.get(HEADER_LEN).ok_or(Error::BufferSize)?;
    let len = match FunctionCode(fn_code) {
        FunctionCode::WRITE_MULTIPLE_COILS | FunctionCode::WRITE_MULTIPLE_REGISTERS => {
            byte_count_at(5)?
        }
        FunctionCode::READ_WRITE_MULTIPLE_REGISTERS => byte_count_at(9)?,
        _ => 0,
    };
    Ok(len + CHECKSUM_LEN)
}

/// Length of the (non exception) response to a request, including CRC.
///
/// Returns `None` if the length can't be derived from the request.
pub fn response_len_from_request(adu_buf: &[u8]) -> Result<Option<usize>> {
    let &fn_code = adu_buf.get(HEADER_LEN).ok_or(Error::BufferSize)?;
    let quantity = || {
        read_word(adu_buf, HEADER_LEN + 3)
            .map(usize::from)
            .ok_or(Error::BufferSize)
    };
    let len = match FunctionCode(fn_code) {
        FunctionCode::READ_COILS | FunctionCode::READ_DISCRETE_INPUTS => {
            2 + packed_coils_len(quantity()?)
        }
        FunctionCode::READ_HOLDING_REGISTERS
        | FunctionCode::READ_INPUT_REGISTERS
        | FunctionCode::READ_WRITE_MULTIPLE_REGISTERS => 2 + 2 * quantity()?,
        FunctionCode::READ_EXCEPTION_STATUS => 3,
        // The response is device specific
        FunctionCode::REPORT_SLAVE_ID => return Ok(None),
        FunctionCode::MASK_WRITE_REGISTER => 7,
        _ => 5,
    };
    Ok(Some(HEADER_LEN + len + CHECKSUM_LEN))
}
