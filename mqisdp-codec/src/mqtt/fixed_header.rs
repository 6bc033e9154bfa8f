/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::decode::utils::*;
use crate::encode::utils::*;
use crate::error::{CodecError, CodecResult};
use crate::logging::*;
use crate::mqtt::*;
use crate::mqtt::utils::*;

use std::fmt;

pub(crate) fn compute_control_byte(header: &FixedHeader) -> u8 {
    let mut control_byte = header.message_type as u8;

    if header.dup {
        control_byte |= FIXED_HEADER_DUP_FLAG;
    }

    control_byte |= (header.qos as u8) << FIXED_HEADER_QOS_SHIFT;

    if header.retain {
        control_byte |= FIXED_HEADER_RETAIN_FLAG;
    }

    control_byte
}

/// Decodes a fixed header from the front of `bytes`.  Returns `Ok(None)` if the bytes end before the
/// remaining length field does.
pub(crate) fn try_decode_fixed_header(bytes: &[u8]) -> CodecResult<Option<(FixedHeader, usize)>> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let control_byte = bytes[0];
    let message_type = MessageType::try_from(control_byte & FIXED_HEADER_MESSAGE_TYPE_MASK)?;
    let qos = QualityOfService::try_from((control_byte >> FIXED_HEADER_QOS_SHIFT) & QOS_MASK)?;

    match decode_vli(&bytes[1..])? {
        DecodeVliResult::InsufficientData => {
            Ok(None)
        }
        DecodeVliResult::Value(remaining_length, remaining_slice) => {
            let header = FixedHeader {
                message_type,
                dup: (control_byte & FIXED_HEADER_DUP_FLAG) != 0,
                qos,
                retain: (control_byte & FIXED_HEADER_RETAIN_FLAG) != 0,
                remaining_length,
            };

            Ok(Some((header, bytes.len() - remaining_slice.len())))
        }
    }
}

impl FixedHeader {

    /// Appends the control byte and remaining length field to `dest`
    pub fn encode(&self, dest: &mut Vec<u8>) -> CodecResult<()> {
        encode_u8(compute_control_byte(self), dest);
        encode_vli(self.remaining_length, dest)
    }

    /// Returns the wire representation of this fixed header
    pub fn to_bytes(&self) -> CodecResult<Vec<u8>> {
        let mut dest = Vec::with_capacity(5);
        self.encode(&mut dest)?;
        Ok(dest)
    }

    /// Decodes a fixed header from the front of `bytes`, returning the header and the number of
    /// bytes it occupied (the control byte plus the remaining length field).
    pub fn decode(bytes: &[u8]) -> CodecResult<(FixedHeader, usize)> {
        match try_decode_fixed_header(bytes)? {
            Some(result) => { Ok(result) }
            None => {
                error!("Packet Decode - fixed header is truncated");
                if bytes.is_empty() {
                    Err(CodecError::new_truncated_buffer(1, 0))
                } else {
                    Err(CodecError::new_truncated_buffer(bytes.len() + 1, bytes.len()))
                }
            }
        }
    }

    /// Total size of the packet this header introduces: header bytes plus remaining length
    pub fn packet_length(&self) -> CodecResult<usize> {
        let header_length = 1 + compute_variable_length_integer_encode_size(self.remaining_length as usize)?;
        Ok(header_length + self.remaining_length as usize)
    }
}

impl fmt::Display for FixedHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FixedHeader {{")?;
        log_enum!(self.message_type, f, "message_type", MessageType);
        log_primitive_value!(self.dup, f, "dup");
        log_string!(quality_of_service_to_str(self.qos), f, "qos");
        log_primitive_value!(self.retain, f, "retain");
        log_primitive_value!(self.remaining_length, f, "remaining_length");
        write!(f, " }}")
    }
}
