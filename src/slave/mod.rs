// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU slave session

mod receiver;
mod reply;

#[cfg(test)]
pub(crate) mod mock;

pub use self::{receiver::*, reply::*};

use crate::{
    codec::rtu::{MAX_ADU_LEN, SlaveId},
    config::{Config, DEFAULT_TABLE_LEN, MappingConfig},
    error::Error,
    mapping::RegisterMap,
    transport::{Delay, DiscreteOutputs, Serial},
};

type Result<T> = core::result::Result<T, Error>;

/// A Modbus RTU slave attached to a serial line.
///
/// The slave is driven by calling [`Slave::poll`] from the main loop.
#[derive(Debug)]
pub struct Slave<S, D, const N: usize = DEFAULT_TABLE_LEN> {
    serial: S,
    delay: D,
    config: Config,
    map: RegisterMap<N>,
}

impl<S, D, const N: usize> Slave<S, D, N>
where
    S: Serial,
    D: Delay,
{
    #[must_use]
    pub fn new(serial: S, delay: D, config: Config, mapping: &MappingConfig) -> Self {
        Self {
            serial,
            delay,
            config,
            map: RegisterMap::new(mapping),
        }
    }

    /// Configure the serial line, call once before polling.
    pub fn init(&mut self) {
        #[cfg(feature = "log")]
        log::info!(
            "Starting slave {} at {} baud",
            self.config.slave,
            self.config.baud_rate
        );
        self.serial.begin(self.config.baud_rate);
    }

    /// Change our own address.
    pub fn set_slave(&mut self, slave: SlaveId) -> Result<()> {
        self.config = self.config.with_slave(slave)?;
        Ok(())
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn register_map(&self) -> &RegisterMap<N> {
        &self.map
    }

    pub const fn register_map_mut(&mut self) -> &mut RegisterMap<N> {
        &mut self.map
    }

    /// Handle at most one request.
    ///
    /// Returns `Ok(None)` if no byte is pending and the length of
    /// the received frame otherwise. Frames that are not accepted
    /// are reported as error, see [`Error::status_code`].
    pub fn poll(&mut self) -> Result<Option<usize>> {
        if self.serial.available() == 0 {
            return Ok(None);
        }
        let mut buf = [0; MAX_ADU_LEN];
        let len = receive(&mut self.serial, &mut self.delay, &self.config, &mut buf)?;
        let _sent = reply(&mut self.serial, &mut self.map, &self.config, &buf[..len])?;
        #[cfg(feature = "log")]
        log::trace!("Handled request of {len} byte(s), replied with {_sent} byte(s)");
        Ok(Some(len))
    }

    /// Apply the first `K` coils to the discrete outputs.
    pub fn update_outputs<O, const K: usize>(&self, outputs: &mut O)
    where
        O: DiscreteOutputs,
    {
        for (index, state) in self.map.outputs::<K>().into_iter().enumerate() {
            outputs.set_output(index, state);
        }
    }

    /// Give back the serial line and the delay.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }
}
