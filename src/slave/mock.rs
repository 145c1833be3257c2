// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the host collaborators.

use std::{collections::VecDeque, vec::Vec};

use byteorder::{BigEndian, ByteOrder};

use crate::{
    codec::rtu::{CHECKSUM_LEN, crc16},
    frame::Coil,
    transport::{Delay, DiscreteOutputs, Serial},
};

/// Serial line fed from a byte queue.
#[derive(Debug, Default)]
pub struct MockSerial {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub baud_rate: Option<u32>,
    /// Number of empty polls before each byte becomes available.
    pub hiccups: usize,
    misses: usize,
}

impl MockSerial {
    pub fn with_rx(bytes: &[u8]) -> Self {
        Self {
            rx: bytes.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl Serial for MockSerial {
    fn begin(&mut self, baud_rate: u32) {
        self.baud_rate = Some(baud_rate);
    }

    fn available(&mut self) -> usize {
        if self.misses < self.hiccups {
            self.misses += 1;
            return 0;
        }
        self.rx.len()
    }

    fn read(&mut self) -> u8 {
        self.misses = 0;
        self.rx.pop_front().expect("read without available byte")
    }

    fn write(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }
}

/// Records requested delays instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub calls: usize,
    pub total_ms: u32,
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += ms;
    }
}

#[derive(Debug, Default)]
pub struct MockOutputs {
    pub states: Vec<(usize, Coil)>,
}

impl DiscreteOutputs for MockOutputs {
    fn set_output(&mut self, index: usize, state: Coil) {
        self.states.push((index, state));
    }
}

/// Append the CRC to a message.
pub fn frame(msg: &[u8]) -> Vec<u8> {
    let mut adu = msg.to_vec();
    let mut crc = [0; CHECKSUM_LEN];
    BigEndian::write_u16(&mut crc, crc16(msg));
    adu.extend_from_slice(&crc);
    adu
}
