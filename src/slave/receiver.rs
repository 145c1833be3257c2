// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte-wise reception of RTU request frames.
//!
//! RTU frames carry no length field up front, so the number of bytes
//! still to read is derived step by step from the bytes received so far.

use crate::{
    codec::rtu::{
        HEADER_LEN, MAX_ADU_LEN, check_integrity, data_len_after_meta, meta_len_after_function,
    },
    config::{ByteTimeout, Config},
    error::Error,
    frame::rtu::Header,
    transport::{Delay, Serial},
};

type Result<T> = core::result::Result<T, Error>;

/// What the byte count currently being read belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Slave address and function code
    Function,
    /// Address, quantity, byte count, ...
    Meta,
    /// Payload and CRC
    Data,
}

/// Receive a request frame into `buf`.
///
/// Blocks while waiting for each byte, at most for the configured
/// byte timeout. Frames addressed to other slaves are drained from
/// the serial line. Returns the length of the frame including the CRC.
pub fn receive<S, D>(
    serial: &mut S,
    delay: &mut D,
    config: &Config,
    buf: &mut [u8; MAX_ADU_LEN],
) -> Result<usize>
where
    S: Serial,
    D: Delay,
{
    let mut step = Step::Function;
    let mut length_to_read = HEADER_LEN + 1;
    let mut msg_length = 0;

    while length_to_read != 0 {
        wait_for_byte(serial, delay, config.byte_timeout)?;
        let slot = buf.get_mut(msg_length).ok_or(Error::BufferSize)?;
        *slot = serial.read();
        msg_length += 1;
        length_to_read -= 1;
        if length_to_read != 0 {
            continue;
        }
        match step {
            Step::Function => {
                let hdr = Header { slave: buf[0] };
                if !hdr.addresses(config.slave) {
                    let _dropped = flush(serial, delay, config.flush);
                    #[cfg(feature = "log")]
                    log::debug!(
                        "Ignoring frame for slave {}, dropped {_dropped} byte(s)",
                        hdr.slave
                    );
                    return Err(Error::NotForUs(hdr.slave));
                }
                length_to_read = meta_len_after_function(buf[HEADER_LEN]);
                if length_to_read != 0 {
                    step = Step::Meta;
                } else {
                    // No meta data, the rest follows from the function code.
                    length_to_read = remaining_after_meta(&buf[..msg_length])?;
                    step = Step::Data;
                }
            }
            Step::Meta => {
                length_to_read = remaining_after_meta(&buf[..msg_length])?;
                step = Step::Data;
            }
            Step::Data => {}
        }
    }

    let len = check_integrity(&buf[..msg_length]).inspect_err(|_err| {
        #[cfg(feature = "log")]
        log::debug!("Dropping corrupted frame: {_err}");
    })?;
    #[cfg(feature = "log")]
    log::trace!("Received frame of {len} byte(s)");
    Ok(len)
}

/// Bytes to read after the meta data, rejecting frames that won't fit.
fn remaining_after_meta(received: &[u8]) -> Result<usize> {
    let remaining = data_len_after_meta(received)?;
    let total = received.len() + remaining;
    if total > MAX_ADU_LEN {
        #[cfg(feature = "log")]
        log::warn!("Announced frame of {total} byte(s) exceeds {MAX_ADU_LEN} byte(s)");
        return Err(Error::FrameTooLong(total));
    }
    Ok(remaining)
}

/// Wait until at least one byte is available.
///
/// The serial line is polled `timeout.polls` times with a delay
/// of `timeout.quantum_ms` in between.
pub fn wait_for_byte<S, D>(serial: &mut S, delay: &mut D, timeout: ByteTimeout) -> Result<()>
where
    S: Serial,
    D: Delay,
{
    let mut polls = 0;
    while serial.available() == 0 {
        polls += 1;
        if polls >= timeout.polls {
            #[cfg(feature = "log")]
            log::warn!("No byte received within {} ms", timeout.max_wait_ms());
            return Err(Error::Timeout);
        }
        delay.delay_ms(timeout.quantum_ms);
    }
    Ok(())
}

/// Discard the remainder of a frame that is still arriving.
///
/// Each round reads everything available (at most one frame) and then
/// waits for further bytes. Gives up after `bound.polls` rounds, so
/// a saturated line can't block the slave. Returns the number of
/// dropped bytes.
pub fn flush<S, D>(serial: &mut S, delay: &mut D, bound: ByteTimeout) -> usize
where
    S: Serial,
    D: Delay,
{
    let mut dropped = 0;
    let mut rounds = 0;
    let mut pending = serial.available();
    while pending > 0 && rounds < bound.polls {
        rounds += 1;
        for _ in 0..pending.min(MAX_ADU_LEN) {
            serial.read();
        }
        dropped += pending.min(MAX_ADU_LEN);
        delay.delay_ms(bound.quantum_ms);
        pending = serial.available();
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slave::mock::{MockDelay, MockSerial, frame};

    fn config() -> Config {
        Config::new().with_slave(5).unwrap()
    }

    fn receive_from(serial: &mut MockSerial) -> (Result<usize>, [u8; MAX_ADU_LEN], MockDelay) {
        let mut delay = MockDelay::default();
        let mut buf = [0; MAX_ADU_LEN];
        let res = receive(serial, &mut delay, &config(), &mut buf);
        (res, buf, delay)
    }

    #[test]
    fn receive_read_request() {
        let adu = frame(&[0x05, 0x03, 0x00, 0x00, 0x00, 0x02]);
        let mut serial = MockSerial::with_rx(&adu);
        let (res, buf, delay) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), 8);
        assert_eq!(&buf[..8], &adu[..]);
        assert_eq!(delay.calls, 0);
        assert!(serial.rx.is_empty());
    }

    #[test]
    fn stop_at_frame_end() {
        let mut bytes = frame(&[0x05, 0x06, 0x00, 0x01, 0x00, 0x02]);
        bytes.extend_from_slice(&[0x05, 0x03]);
        let mut serial = MockSerial::with_rx(&bytes);
        let (res, _, _) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), 8);
        assert_eq!(serial.rx.len(), 2);
    }

    #[test]
    fn receive_function_without_meta_data() {
        let adu = frame(&[0x05, 0x11]);
        let mut serial = MockSerial::with_rx(&adu);
        let (res, buf, _) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), 4);
        assert_eq!(&buf[..4], &adu[..]);
    }

    #[test]
    fn receive_write_multiple_registers() {
        let adu = frame(&[0x05, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0xAB, 0xCD, 0xEF, 0x12]);
        let mut serial = MockSerial::with_rx(&adu);
        let (res, _, _) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), adu.len());
    }

    #[test]
    fn receive_read_write_multiple_registers() {
        let adu = frame(&[
            0x05, 0x17, 0x00, 0x05, 0x00, 0x01, 0x00, 0x03, 0x00, 0x01, 0x02, 0xAB, 0xCD,
        ]);
        let mut serial = MockSerial::with_rx(&adu);
        let (res, _, _) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), adu.len());
    }

    #[test]
    fn receive_broadcast() {
        let adu = frame(&[0x00, 0x06, 0x00, 0x01, 0x00, 0x02]);
        let mut serial = MockSerial::with_rx(&adu);
        let (res, _, _) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), 8);
    }

    #[test]
    fn tolerate_short_gaps() {
        let adu = frame(&[0x05, 0x03, 0x00, 0x00, 0x00, 0x02]);
        let mut serial = MockSerial::with_rx(&adu);
        serial.hiccups = 9;
        let (res, _, delay) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), 8);
        assert_eq!(delay.calls, 8 * 9);
        assert_eq!(delay.total_ms, 8 * 9);
    }

    #[test]
    fn timeout_on_long_gap() {
        let adu = frame(&[0x05, 0x03, 0x00, 0x00, 0x00, 0x02]);
        let mut serial = MockSerial::with_rx(&adu);
        serial.hiccups = 10;
        let (res, _, delay) = receive_from(&mut serial);
        assert_eq!(res.err().unwrap(), Error::Timeout);
        assert_eq!(delay.calls, 9);
    }

    #[test]
    fn timeout_after_partial_frame() {
        let mut serial = MockSerial::with_rx(&[0x05, 0x03, 0x00]);
        let (res, _, delay) = receive_from(&mut serial);
        assert_eq!(res.err().unwrap(), Error::Timeout);
        assert_eq!(delay.total_ms, ByteTimeout::new(10, 1).max_wait_ms());
        assert!(serial.tx.is_empty());
    }

    #[test]
    fn flush_frames_for_other_slaves() {
        let adu = frame(&[0x07, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0xAB, 0xCD, 0xEF, 0x12]);
        let mut serial = MockSerial::with_rx(&adu);
        let (res, _, delay) = receive_from(&mut serial);
        assert_eq!(res.err().unwrap(), Error::NotForUs(7));
        assert!(serial.rx.is_empty());
        assert_eq!(delay.calls, 1);
        assert_eq!(delay.total_ms, 3);
    }

    #[test]
    fn reject_oversized_frame() {
        // 0xFF bytes announced for writing multiple coils
        let mut serial = MockSerial::with_rx(&[0x05, 0x0F, 0x00, 0x00, 0x07, 0xB0, 0xFF, 0x00]);
        let (res, _, _) = receive_from(&mut serial);
        assert_eq!(res.err().unwrap(), Error::FrameTooLong(7 + 0xFF + 2));
        // nothing beyond the meta data has been consumed
        assert_eq!(serial.rx.len(), 1);

        // largest accepted frame
        let mut msg = [0u8; 258];
        msg[..7].copy_from_slice(&[0x05, 0x10, 0x00, 0x00, 0x00, 0x7D, 0xFA]);
        let adu = frame(&msg[..7 + 0xFA]);
        assert_eq!(adu.len(), 259);
        let mut serial = MockSerial::with_rx(&adu);
        let (res, _, _) = receive_from(&mut serial);
        assert_eq!(res.unwrap(), 259);
    }

    #[test]
    fn reject_corrupted_frame() {
        let mut adu = frame(&[0x05, 0x03, 0x00, 0x00, 0x00, 0x02]);
        adu[3] ^= 0x01;
        let mut serial = MockSerial::with_rx(&adu);
        let (res, _, _) = receive_from(&mut serial);
        assert!(matches!(res, Err(Error::Crc(_, _))));
        assert_eq!(res.err().unwrap().status_code(), -1);
    }

    #[test]
    fn flush_is_bounded() {
        let mut serial = MockSerial::with_rx(&[0xAA; 3 * MAX_ADU_LEN]);
        let mut delay = MockDelay::default();
        let dropped = flush(&mut serial, &mut delay, ByteTimeout::new(2, 3));
        assert_eq!(dropped, 2 * MAX_ADU_LEN);
        assert_eq!(serial.rx.len(), MAX_ADU_LEN);
        assert_eq!(delay.total_ms, 6);
    }
}
