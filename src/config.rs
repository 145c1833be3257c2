// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup configuration of the slave.

use crate::{
    error::Error,
    frame::{
        Address,
        rtu::{SlaveId, is_valid_slave_id},
    },
};

/// Default number of entries of each register table.
pub const DEFAULT_TABLE_LEN: usize = 500;

/// Default baud rate of the serial line.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// A bounded wait, expressed as a number of polls separated by a fixed delay.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteTimeout {
    /// Number of polls before giving up.
    pub polls: u8,
    /// Delay between two polls in milliseconds.
    pub quantum_ms: u32,
}

impl ByteTimeout {
    #[must_use]
    pub const fn new(polls: u8, quantum_ms: u32) -> Self {
        Self { polls, quantum_ms }
    }

    /// Upper bound of the blocking time in milliseconds.
    #[must_use]
    pub const fn max_wait_ms(&self) -> u32 {
        (self.polls.saturating_sub(1) as u32).saturating_mul(self.quantum_ms)
    }
}

/// Location of one register table in the Modbus address space.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Modbus address of the first entry.
    pub start: Address,
    /// Number of entries.
    pub count: usize,
}

impl TableConfig {
    #[must_use]
    pub const fn new(start: Address, count: usize) -> Self {
        Self { start, count }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(0, DEFAULT_TABLE_LEN)
    }
}

/// Layout of the four register tables.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MappingConfig {
    pub coils: TableConfig,
    pub discrete_inputs: TableConfig,
    pub holding_registers: TableConfig,
    pub input_registers: TableConfig,
}

/// Slave configuration, fixed at startup.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Our own address on the bus.
    pub slave: SlaveId,
    pub baud_rate: u32,
    /// Maximum gap between two bytes of a frame.
    pub byte_timeout: ByteTimeout,
    /// Bound for draining frames addressed to other slaves.
    pub flush: ByteTimeout,
    /// Answer requests sent to the broadcast address.
    pub reply_to_broadcast: bool,
}

impl Config {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slave: 1,
            baud_rate: DEFAULT_BAUD_RATE,
            byte_timeout: ByteTimeout::new(10, 1),
            flush: ByteTimeout::new(10, 3),
            reply_to_broadcast: true,
        }
    }

    /// Use `slave` as our own address.
    ///
    /// Only `1..=246` are accepted.
    pub const fn with_slave(mut self, slave: SlaveId) -> Result<Self, Error> {
        if !is_valid_slave_id(slave) {
            return Err(Error::SlaveId(slave));
        }
        self.slave = slave;
        Ok(self)
    }

    #[must_use]
    pub const fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    #[must_use]
    pub const fn with_byte_timeout(mut self, byte_timeout: ByteTimeout) -> Self {
        self.byte_timeout = byte_timeout;
        self
    }

    #[must_use]
    pub const fn with_reply_to_broadcast(mut self, reply: bool) -> Self {
        self.reply_to_broadcast = reply;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.slave, 1);
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.byte_timeout, ByteTimeout::new(10, 1));
        assert!(cfg.reply_to_broadcast);
    }

    #[test]
    fn slave_id_range() {
        assert_eq!(Config::new().with_slave(0).err(), Some(Error::SlaveId(0)));
        assert_eq!(
            Config::new().with_slave(247).err(),
            Some(Error::SlaveId(247))
        );
        assert_eq!(Config::new().with_slave(246).unwrap().slave, 246);
    }

    #[test]
    fn byte_timeout_bound() {
        assert_eq!(ByteTimeout::new(10, 1).max_wait_ms(), 9);
        assert_eq!(ByteTimeout::new(10, 3).max_wait_ms(), 27);
        assert_eq!(ByteTimeout::new(0, 3).max_wait_ms(), 0);
    }
}
