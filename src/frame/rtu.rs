// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

/// Slave ID
pub type SlaveId = u8;

/// Requests sent to this address are addressed to every slave.
pub const BROADCAST_ADDRESS: SlaveId = 0;

/// Highest slave ID a device may be configured with.
pub const MAX_SLAVE_ID: SlaveId = 246;

/// Returns `true` if `slave` is a valid address of an individual device.
#[must_use]
pub const fn is_valid_slave_id(slave: SlaveId) -> bool {
    slave > BROADCAST_ADDRESS && slave <= MAX_SLAVE_ID
}

/// RTU header
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub slave: SlaveId,
}

impl Header {
    /// Returns `true` if the frame was sent to all slaves.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        self.slave == BROADCAST_ADDRESS
    }

    /// Returns `true` if a slave with ID `slave` must process the frame.
    #[must_use]
    pub const fn addresses(&self, slave: SlaveId) -> bool {
        self.slave == slave || self.is_broadcast()
    }
}

/// RTU Request ADU
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestAdu<'r> {
    pub hdr: Header,
    pub pdu: Request<'r>,
}

/// RTU Response ADU
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseAdu<'r> {
    pub hdr: Header,
    pub pdu: ResponsePdu<'r>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slave_ids() {
        assert!(!is_valid_slave_id(0));
        assert!(is_valid_slave_id(1));
        assert!(is_valid_slave_id(246));
        assert!(!is_valid_slave_id(247));
        assert!(!is_valid_slave_id(255));
    }

    #[test]
    fn header_addressing() {
        assert!(Header { slave: 5 }.addresses(5));
        assert!(Header { slave: 0 }.addresses(5));
        assert!(!Header { slave: 6 }.addresses(5));
        assert!(Header { slave: 0 }.is_broadcast());
    }
}
