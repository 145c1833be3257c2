// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU server (slave) specific functions.
use super::*;

/// Decode a received RTU request.
///
/// `adu` is a complete frame whose CRC has already been verified.
pub fn decode_request(adu: &[u8]) -> Result<RequestAdu<'_>> {
    if adu.len() < HEADER_LEN + 1 + CHECKSUM_LEN {
        return Err(Error::BufferSize);
    }
    let (&slave, rest) = adu.split_first().ok_or(Error::BufferSize)?;
    let pdu = &rest[..rest.len() - CHECKSUM_LEN];
    Ok(RequestAdu {
        hdr: Header { slave },
        pdu: Request::try_from(pdu)?,
    })
}

/// Encode an RTU response including the CRC.
///
/// Returns the length of the ADU written to `buf`.
pub fn encode_response(adu: ResponseAdu<'_>, buf: &mut [u8]) -> Result<usize> {
    let ResponseAdu { hdr, pdu } = adu;
    let msg_len = HEADER_LEN + pdu.pdu_len();
    let buf = buf
        .get_mut(..msg_len + CHECKSUM_LEN)
        .ok_or(Error::BufferSize)?;
    buf[0] = hdr.slave;
    pdu.encode(&mut buf[HEADER_LEN..msg_len])?;
    let crc = crc16(&buf[..msg_len]);
    BigEndian::write_u16(&mut buf[msg_len..], crc);
    Ok(buf.len())
}
