// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![no_std]

#[cfg(test)]
extern crate std;

mod codec;
mod config;
mod error;
mod frame;
mod mapping;
mod slave;
mod transport;
mod util;

pub use codec::rtu;
pub use config::*;
pub use error::*;
pub use frame::*;
pub use mapping::*;
pub use slave::*;
pub use transport::*;
pub use util::*;
