/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::encode::utils::*;
use crate::error::CodecResult;
use crate::mqtt::*;
use crate::mqtt::utils::*;

pub(crate) fn encode_suback_payload(granted_qos: &[QualityOfService], dest: &mut Vec<u8>) {
    for qos in granted_qos {
        encode_u8(*qos as u8, dest);
    }
}

pub(crate) fn decode_suback_payload(bytes: &[u8]) -> CodecResult<Payload> {
    let granted_qos = bytes.iter()
        .map(|byte| convert_u8_to_quality_of_service(*byte))
        .collect::<CodecResult<Vec<QualityOfService>>>()?;

    Ok(Payload::Suback(granted_qos))
}
