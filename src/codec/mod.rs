// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use byteorder::{BigEndian, ByteOrder};

use crate::{error::*, frame::*, util::*};

pub mod rtu;

type Result<T> = core::result::Result<T, Error>;

impl From<ExceptionResponse> for [u8; 2] {
    fn from(rsp: ExceptionResponse) -> Self {
        [rsp.function.exception_value(), rsp.exception.code()]
    }
}

impl<'r> TryFrom<&'r [u8]> for Request<'r> {
    type Error = Error;

    fn try_from(pdu: &'r [u8]) -> Result<Self> {
        let (&fn_code, args) = pdu.split_first().ok_or(Error::BufferSize)?;
        let function = FunctionCode(fn_code);
        let word = |offset| read_word(args, offset).ok_or(Error::BufferSize);

        let req = match function {
            FunctionCode::READ_COILS => Request::ReadBits(BitTable::Coils, word(0)?, word(2)?),
            FunctionCode::READ_DISCRETE_INPUTS => {
                Request::ReadBits(BitTable::DiscreteInputs, word(0)?, word(2)?)
            }
            FunctionCode::READ_HOLDING_REGISTERS => {
                Request::ReadRegisters(RegisterTable::HoldingRegisters, word(0)?, word(2)?)
            }
            FunctionCode::READ_INPUT_REGISTERS => {
                Request::ReadRegisters(RegisterTable::InputRegisters, word(0)?, word(2)?)
            }
            FunctionCode::WRITE_SINGLE_COIL => {
                Request::WriteSingleCoil(word(0)?, word_to_coil(word(2)?)?)
            }
            FunctionCode::WRITE_SINGLE_REGISTER => Request::WriteSingleRegister(word(0)?, word(2)?),
            FunctionCode::WRITE_MULTIPLE_COILS | FunctionCode::WRITE_MULTIPLE_REGISTERS => {
                let address = word(0)?;
                let quantity = usize::from(word(2)?);
                let &byte_count = args.get(4).ok_or(Error::BufferSize)?;
                let payload = args
                    .get(5..5 + usize::from(byte_count))
                    .ok_or(Error::ByteCount(byte_count))?;
                if function == FunctionCode::WRITE_MULTIPLE_COILS {
                    Request::WriteMultipleCoils(address, PackedCoils::new(quantity, payload))
                } else {
                    Request::WriteMultipleRegisters(address, PackedWords::new(quantity, payload))
                }
            }
            _ => Request::Unsupported(function),
        };
        Ok(req)
    }
}

impl ResponsePdu<'_> {
    /// Serialize the PDU into `buf`, returning the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.pdu_len();
        let buf = buf.get_mut(..len).ok_or(Error::BufferSize)?;
        let rsp = match self.0 {
            Ok(rsp) => rsp,
            Err(ex) => {
                buf.copy_from_slice(&<[u8; 2]>::from(ex));
                return Ok(len);
            }
        };
        let (function, body) = buf.split_at_mut(1);
        function[0] = rsp.function().value();
        match rsp {
            Response::ReadBits(_, coils) => {
                let (byte_count, bits) = body.split_at_mut(1);
                byte_count[0] = u8::try_from(bits.len()).map_err(|_| Error::BufferSize)?;
                pack_coils(coils, bits)?;
            }
            Response::ReadRegisters(_, words) => {
                let (byte_count, values) = body.split_at_mut(1);
                byte_count[0] = u8::try_from(values.len()).map_err(|_| Error::BufferSize)?;
                BigEndian::write_u16_into(words, values);
            }
            Response::WriteSingleCoil(address, coil) => {
                BigEndian::write_u16_into(&[address, coil_to_word(coil)], body);
            }
            Response::WriteSingleRegister(address, value)
            | Response::WriteMultipleCoils(address, value)
            | Response::WriteMultipleRegisters(address, value) => {
                BigEndian::write_u16_into(&[address, value], body);
            }
        }
        Ok(len)
    }
}
