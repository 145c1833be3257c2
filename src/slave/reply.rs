// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execution of received requests against the register map.

use crate::{
    codec::rtu::{MAX_ADU_LEN, SlaveId, response_len_from_request, server},
    config::Config,
    error::Error,
    frame::{
        rtu::{Header, RequestAdu, ResponseAdu},
        *,
    },
    mapping::RegisterMap,
    transport::Serial,
};

type Result<T> = core::result::Result<T, Error>;

/// Execute a validated request frame and build the response.
///
/// `adu` is the complete frame including its CRC.
/// Returns `None` if the frame is not addressed to `slave`
/// (or too short to carry a function code).
pub fn process<'m, const N: usize>(
    map: &'m mut RegisterMap<N>,
    slave: SlaveId,
    adu: &[u8],
) -> Option<ResponseAdu<'m>> {
    let &[hdr_slave, fn_code, ..] = adu else {
        return None;
    };
    let hdr = Header { slave: hdr_slave };
    if !hdr.addresses(slave) {
        return None;
    }
    let function = FunctionCode(fn_code);
    let result = match server::decode_request(adu) {
        Ok(RequestAdu { pdu: req, .. }) => execute(map, req, adu),
        Err(_err) => {
            #[cfg(feature = "log")]
            log::debug!("Rejecting malformed {function} request: {_err}");
            Err(Exception::IllegalDataValue)
        }
    };
    let pdu = ResponsePdu(result.map_err(|exception| {
        #[cfg(feature = "log")]
        log::debug!("Responding to function {function} with exception: {exception}");
        ExceptionResponse {
            function,
            exception,
        }
    }));
    Some(ResponseAdu { hdr, pdu })
}

/// Process a validated request frame and transmit the response.
///
/// Returns the number of bytes written to the serial line.
pub fn reply<S: Serial, const N: usize>(
    serial: &mut S,
    map: &mut RegisterMap<N>,
    config: &Config,
    adu: &[u8],
) -> Result<usize> {
    let Some(rsp) = process(map, config.slave, adu) else {
        return Ok(0);
    };
    if rsp.hdr.is_broadcast() && !config.reply_to_broadcast {
        return Ok(0);
    }
    send(serial, rsp)
}

/// Append the CRC to the encoded response and write it to the serial line.
pub fn send<S: Serial>(serial: &mut S, adu: ResponseAdu<'_>) -> Result<usize> {
    let mut buf = [0; MAX_ADU_LEN];
    let len = server::encode_response(adu, &mut buf)?;
    #[cfg(feature = "log")]
    log::trace!("Sending {len} byte(s) response");
    serial.write(&buf[..len]);
    Ok(len)
}

fn execute<'m, const N: usize>(
    map: &'m mut RegisterMap<N>,
    req: Request<'_>,
    adu: &[u8],
) -> core::result::Result<Response<'m>, Exception> {
    use Exception::*;

    match req {
        Request::ReadBits(table, address, quantity) => {
            if !(1..=MAX_READ_BITS).contains(&quantity) {
                return Err(IllegalDataValue);
            }
            let bits = match table {
                BitTable::Coils => &map.coils,
                BitTable::DiscreteInputs => &map.discrete_inputs,
            };
            let bits = bits
                .get(address, quantity.into())
                .ok_or(IllegalDataAddress)?;
            Ok(Response::ReadBits(table, bits))
        }
        Request::ReadRegisters(table, address, quantity) => {
            if !(1..=MAX_READ_REGISTERS).contains(&quantity) {
                return Err(IllegalDataValue);
            }
            let registers = match table {
                RegisterTable::HoldingRegisters => &map.holding_registers,
                RegisterTable::InputRegisters => &map.input_registers,
            };
            let words = registers
                .get(address, quantity.into())
                .ok_or(IllegalDataAddress)?;
            Ok(Response::ReadRegisters(table, words))
        }
        Request::WriteSingleCoil(address, coil) => {
            let target = map.coils.get_mut(address, 1).ok_or(IllegalDataAddress)?;
            check_echo_len(adu)?;
            target[0] = coil;
            Ok(Response::WriteSingleCoil(address, coil))
        }
        Request::WriteSingleRegister(address, word) => {
            let target = map
                .holding_registers
                .get_mut(address, 1)
                .ok_or(IllegalDataAddress)?;
            check_echo_len(adu)?;
            target[0] = word;
            Ok(Response::WriteSingleRegister(address, word))
        }
        Request::WriteMultipleCoils(address, coils) => {
            let quantity = checked_quantity(coils.quantity(), MAX_WRITE_BITS)?;
            if !coils.is_complete() {
                return Err(IllegalDataValue);
            }
            let targets = map
                .coils
                .get_mut(address, coils.quantity())
                .ok_or(IllegalDataAddress)?;
            coils.unpack_into(targets);
            Ok(Response::WriteMultipleCoils(address, quantity))
        }
        Request::WriteMultipleRegisters(address, words) => {
            let quantity = checked_quantity(words.quantity(), MAX_WRITE_REGISTERS)?;
            if !words.is_complete() {
                return Err(IllegalDataValue);
            }
            let targets = map
                .holding_registers
                .get_mut(address, words.quantity())
                .ok_or(IllegalDataAddress)?;
            words.unpack_into(targets);
            Ok(Response::WriteMultipleRegisters(address, quantity))
        }
        Request::Unsupported(_) => Err(IllegalFunction),
    }
}

/// A write quantity must be within `1..=max`.
fn checked_quantity(quantity: usize, max: Quantity) -> core::result::Result<Quantity, Exception> {
    Quantity::try_from(quantity)
        .ok()
        .filter(|quantity| (1..=max).contains(quantity))
        .ok_or(Exception::IllegalDataValue)
}

/// The echo of a single write must have exactly the length of the request.
fn check_echo_len(adu: &[u8]) -> core::result::Result<(), Exception> {
    match response_len_from_request(adu) {
        Ok(Some(len)) if len == adu.len() => Ok(()),
        _ => Err(Exception::IllegalDataValue),
    }
}
