/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
Internal utilities to encode the primitive wire types every message is built from.
 */

use crate::error::{CodecError, CodecResult};

use log::*;

pub const MAXIMUM_VARIABLE_LENGTH_INTEGER: usize = (1 << 28) - 1;

pub(crate) const MAXIMUM_U16_VALUE: usize = u16::MAX as usize;

pub fn compute_variable_length_integer_encode_size(value: usize) -> CodecResult<usize> {
    if value < 1usize << 7 {
        Ok(1)
    } else if value < 1usize << 14 {
        Ok(2)
    } else if value < 1usize << 21 {
        Ok(3)
    } else if value < 1usize << 28 {
        Ok(4)
    } else {
        error!("Packet Encode - value ({}) exceeds the variable length integer maximum", value);
        Err(CodecError::new_out_of_range("compute_variable_length_integer_encode_size - value exceeds the protocol maximum (2 ^ 28 - 1)"))
    }
}

pub(crate) fn encode_vli(value: u32, dest: &mut Vec<u8>) -> CodecResult<()> {
    if value as usize > MAXIMUM_VARIABLE_LENGTH_INTEGER {
        error!("Packet Encode - value ({}) exceeds the variable length integer maximum", value);
        return Err(CodecError::new_out_of_range("encode_vli - value exceeds the protocol maximum (2 ^ 28 - 1)"));
    }

    let mut done = false;
    let mut val = value;
    while !done {
        let mut byte: u8 = (val & 0x7F) as u8;
        val /= 128;

        if val != 0 {
            byte |= 128;
        }

        dest.push(byte);

        done = val == 0;
    }

    Ok(())
}

pub(crate) fn encode_u8(value: u8, dest: &mut Vec<u8>) {
    dest.push(value);
}

/// Splits a 16-bit value into its (most significant, least significant) bytes
pub fn split_u16(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, (value & 0xFF) as u8)
}

/// Appends a big-endian 16 bit integer.  Values that do not fit in 16 bits are a caller error.
pub(crate) fn encode_u16(value: usize, dest: &mut Vec<u8>) -> CodecResult<()> {
    if value > MAXIMUM_U16_VALUE {
        error!("Packet Encode - value ({}) does not fit in 16 bits", value);
        return Err(CodecError::new_out_of_range(format!("encode_u16 - value ({}) does not fit in 16 bits", value)));
    }

    let (msb, lsb) = split_u16(value as u16);
    dest.push(msb);
    dest.push(lsb);

    Ok(())
}

pub(crate) fn encode_length_prefixed_string(value: &str, dest: &mut Vec<u8>) -> CodecResult<()> {
    let bytes = value.as_bytes();
    encode_u16(bytes.len(), dest)?;
    dest.extend_from_slice(bytes);

    Ok(())
}

pub(crate) fn encode_raw_bytes(value: &[u8], dest: &mut Vec<u8>) {
    dest.extend_from_slice(value);
}
