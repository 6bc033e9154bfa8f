/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::error::{CodecError, CodecResult};
use crate::mqtt::*;

/// Variable headers of pingreq, pingresp, and disconnect messages occupy zero bytes.
pub(crate) fn decode_empty_header(message_type: MessageType) -> CodecResult<(VariableHeader, usize)> {
    match message_type {
        MessageType::Pingreq => { Ok((VariableHeader::Pingreq, 0)) }
        MessageType::Pingresp => { Ok((VariableHeader::Pingresp, 0)) }
        MessageType::Disconnect => { Ok((VariableHeader::Disconnect, 0)) }
        _ => {
            let message = format!("decode_empty_header - {} messages have a non-empty variable header", message_type);
            error!("{}", message);
            Err(CodecError::new_decoding_failure(message))
        }
    }
}

/// Bytes left after a header with no structured payload are carried through untouched.
pub(crate) fn decode_raw_payload(bytes: &[u8]) -> Payload {
    if bytes.is_empty() {
        Payload::Empty
    } else {
        Payload::Raw(bytes.to_vec())
    }
}
