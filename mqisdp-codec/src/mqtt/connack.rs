/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::decode::utils::*;
use crate::encode::utils::*;
use crate::error::{CodecError, CodecResult};
use crate::mqtt::*;
use crate::mqtt::utils::*;

const CONNACK_HEADER_LENGTH: usize = 2;

pub(crate) fn encode_connack_header(header: &ConnackHeader, dest: &mut Vec<u8>) -> CodecResult<()> {
    // reserved
    encode_u8(0, dest);
    encode_u8(connect_return_code_to_u8(header.return_code), dest);

    Ok(())
}

pub(crate) fn decode_connack_header(bytes: &[u8]) -> CodecResult<(VariableHeader, usize)> {
    if bytes.len() < CONNACK_HEADER_LENGTH {
        error!("Packet Decode - Connack header requires {} bytes but only {} are available", CONNACK_HEADER_LENGTH, bytes.len());
        return Err(CodecError::new_truncated_buffer(CONNACK_HEADER_LENGTH, bytes.len()));
    }

    let mut return_code = 0;
    decode_u8(&bytes[1..], &mut return_code)?;

    let header = ConnackHeader {
        return_code: convert_u8_to_connect_return_code(return_code),
    };

    Ok((VariableHeader::Connack(header), CONNACK_HEADER_LENGTH))
}
