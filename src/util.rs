// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coil value helpers

use crate::{
    error::Error,
    frame::{Coil, Word},
};

const COIL_ON: Word = 0xFF00;
const COIL_OFF: Word = 0x0000;

/// Wire value of a single coil.
#[must_use]
pub const fn coil_to_word(coil: Coil) -> Word {
    if coil { COIL_ON } else { COIL_OFF }
}

/// Coil state of a write request, only `0xFF00` and `0x0000` are valid.
pub const fn word_to_coil(word: Word) -> Result<Coil, Error> {
    match word {
        COIL_ON => Ok(true),
        COIL_OFF => Ok(false),
        _ => Err(Error::CoilValue(word)),
    }
}

/// Number of bytes needed to pack `count` coils.
#[must_use]
pub const fn packed_coils_len(count: usize) -> usize {
    count.div_ceil(8)
}

/// Pack coils LSB first into `bytes`.
///
/// Unused high bits of the last byte are cleared.
/// Returns the number of bytes written.
pub fn pack_coils(coils: &[Coil], bytes: &mut [u8]) -> Result<usize, Error> {
    let len = packed_coils_len(coils.len());
    let target = bytes.get_mut(..len).ok_or(Error::BufferSize)?;
    target.fill(0);
    for (idx, _) in coils.iter().enumerate().filter(|(_, coil)| **coil) {
        target[idx / 8] |= 1 << (idx % 8);
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coil_wire_values() {
        assert_eq!(coil_to_word(true), 0xFF00);
        assert_eq!(coil_to_word(false), 0x0000);
        assert_eq!(word_to_coil(0xFF00), Ok(true));
        assert_eq!(word_to_coil(0x0000), Ok(false));
        assert_eq!(word_to_coil(0x1234), Err(Error::CoilValue(0x1234)));
        assert_eq!(word_to_coil(0x00FF), Err(Error::CoilValue(0x00FF)));
    }

    #[test]
    fn packed_len() {
        assert_eq!(packed_coils_len(0), 0);
        assert_eq!(packed_coils_len(1), 1);
        assert_eq!(packed_coils_len(8), 1);
        assert_eq!(packed_coils_len(9), 2);
        assert_eq!(packed_coils_len(2000), 250);
    }

    #[test]
    fn pack_lsb_first() {
        let mut buf = [0; 2];
        assert_eq!(pack_coils(&[], &mut buf), Ok(0));
        assert_eq!(pack_coils(&[true, false, true, true], &mut buf), Ok(1));
        assert_eq!(buf[0], 0b_1101);

        let mut coils = [false; 10];
        coils[9] = true;
        assert_eq!(pack_coils(&coils, &mut buf), Ok(2));
        assert_eq!(buf, [0x00, 0b_10]);
    }

    #[test]
    fn pack_clears_stale_bits() {
        let mut buf = [0xFF, 0xFF, 0xAA];
        assert_eq!(pack_coils(&[false, true, false], &mut buf), Ok(1));
        assert_eq!(buf, [0b_010, 0xFF, 0xAA]);
    }

    #[test]
    fn pack_into_small_buffer() {
        assert_eq!(pack_coils(&[true; 9], &mut [0]), Err(Error::BufferSize));
    }
}
