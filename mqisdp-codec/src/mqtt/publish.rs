/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::decode::utils::*;
use crate::encode::utils::*;
use crate::error::CodecResult;
use crate::mqtt::*;

pub(crate) fn encode_publish_header(header: &PublishHeader, dest: &mut Vec<u8>) -> CodecResult<()> {
    encode_length_prefixed_string(&header.topic_name, dest)?;

    if let Some(packet_id) = header.packet_id {
        encode_u16(packet_id as usize, dest)?;
    }

    Ok(())
}

/// The packet id is only present on the wire when the fixed header's qos is greater than zero.
pub(crate) fn decode_publish_header(bytes: &[u8], qos: QualityOfService) -> CodecResult<(VariableHeader, usize)> {
    let mut header = PublishHeader::default();

    let mut mutable_body = decode_length_prefixed_string(bytes, &mut header.topic_name)?;

    if qos != QualityOfService::AtMostOnce {
        let mut packet_id: u16 = 0;
        mutable_body = decode_u16(mutable_body, &mut packet_id)?;
        header.packet_id = Some(packet_id);
    }

    Ok((VariableHeader::Publish(header), bytes.len() - mutable_body.len()))
}

pub(crate) fn encode_publish_payload(payload: &[u8], dest: &mut Vec<u8>) {
    encode_raw_bytes(payload, dest);
}

pub(crate) fn decode_publish_payload(bytes: &[u8]) -> Payload {
    Payload::Publish(bytes.to_vec())
}
