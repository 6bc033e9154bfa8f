/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::error::{CodecError, CodecResult};

use log::*;

#[derive(Eq, PartialEq, Debug)]
pub(crate) enum DecodeVliResult<'a> {
    InsufficientData,
    Value(u32, &'a[u8]), /* (decoded value, remaining bytes) */
}

pub(crate) fn decode_vli(buffer: &[u8]) -> CodecResult<DecodeVliResult<'_>> {
    let mut value: u32 = 0;
    let mut needs_data: bool;
    let mut shift: u32 = 0;
    let data_len = buffer.len();

    for i in 0..4 {
        if i >= data_len {
            return Ok(DecodeVliResult::InsufficientData);
        }

        let byte = buffer[i];
        value |= ((byte & 0x7F) as u32) << shift;
        shift += 7;

        needs_data = (byte & 0x80) != 0;
        if !needs_data {
            return Ok(DecodeVliResult::Value(value, &buffer[(i + 1)..]));
        }
    }

    error!("Packet Decode - invalid variable length integer");
    Err(CodecError::new_malformed_varint())
}

/// Decodes a remaining length field, returning the value and the number of bytes it occupied
pub fn decode_remaining_length(buffer: &[u8]) -> CodecResult<(u32, usize)> {
    match decode_vli(buffer)? {
        DecodeVliResult::InsufficientData => {
            error!("Packet Decode - truncated variable length integer");
            Err(CodecError::new_truncated_buffer(buffer.len() + 1, buffer.len()))
        }
        DecodeVliResult::Value(value, remaining_slice) => {
            Ok((value, buffer.len() - remaining_slice.len()))
        }
    }
}

/// Reassembles a 16-bit value from its most and least significant bytes
pub fn join_u16(msb: u8, lsb: u8) -> u16 {
    ((msb as u16) << 8) | (lsb as u16)
}

pub(crate) fn decode_u8<'a>(bytes: &'a[u8], value: &mut u8) -> CodecResult<&'a[u8]> {
    if bytes.is_empty() {
        error!("Packet Decode - Insufficient packet bytes for u8 field");
        return Err(CodecError::new_truncated_buffer(1, 0));
    }

    *value = bytes[0];

    Ok(&bytes[1..])
}

pub(crate) fn decode_u16<'a>(bytes: &'a[u8], value: &mut u16) -> CodecResult<&'a[u8]> {
    if bytes.len() < 2 {
        error!("Packet Decode - Insufficient packet bytes for u16 field");
        return Err(CodecError::new_truncated_buffer(2, bytes.len()));
    }

    *value = join_u16(bytes[0], bytes[1]);

    Ok(&bytes[2..])
}

pub(crate) fn decode_u8_as_enum<'a, T>(bytes: &'a[u8], value: &mut T, converter: fn(u8) -> CodecResult<T>) -> CodecResult<&'a[u8]> {
    if bytes.is_empty() {
        error!("Packet Decode - Insufficient packet bytes for enum field");
        return Err(CodecError::new_truncated_buffer(1, 0));
    }

    *value = converter(bytes[0])?;

    Ok(&bytes[1..])
}

pub(crate) fn decode_length_prefixed_string<'a>(bytes: &'a[u8], value: &mut String) -> CodecResult<&'a[u8]> {
    if bytes.len() < 2 {
        error!("Packet Decode - Utf-8 string value does not have a full length prefix");
        return Err(CodecError::new_truncated_buffer(2, bytes.len()));
    }

    let value_length : usize = join_u16(bytes[0], bytes[1]) as usize;
    let mutable_bytes = &bytes[2..];
    if value_length > mutable_bytes.len() {
        error!("Packet Decode - Utf-8 string value has length larger than remaining packet bytes");
        return Err(CodecError::new_truncated_buffer(value_length, mutable_bytes.len()));
    }

    let decode_utf8_result = std::str::from_utf8(&mutable_bytes[..value_length]).map_err(|err| {
        error!("Packet Decode - invalid utf-8");
        CodecError::from(err)
    })?;

    *value = decode_utf8_result.to_string();
    Ok(&mutable_bytes[(value_length)..])
}

pub(crate) fn decode_optional_length_prefixed_string<'a>(bytes: &'a[u8], value: &mut Option<String>) -> CodecResult<&'a[u8]> {
    let mut decoded = String::new();
    let remaining_bytes = decode_length_prefixed_string(bytes, &mut decoded)?;
    *value = Some(decoded);

    Ok(remaining_bytes)
}
