/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

pub(crate) mod utils;

use crate::encode::utils::*;
use crate::error::{CodecError, CodecResult};
use crate::logging::*;
use crate::mqtt::*;
use crate::mqtt::ack::*;
use crate::mqtt::connack::*;
use crate::mqtt::connect::*;
use crate::mqtt::publish::*;
use crate::mqtt::suback::*;
use crate::mqtt::subscribe::*;
use crate::mqtt::unsubscribe::*;

use log::*;

/// Appends the wire form of a variable header to `dest`.
pub(crate) fn encode_variable_header(variable_header: &VariableHeader, dest: &mut Vec<u8>) -> CodecResult<()> {
    match variable_header {
        VariableHeader::Connect(header) => { encode_connect_header(header, dest) }
        VariableHeader::Connack(header) => { encode_connack_header(header, dest) }
        VariableHeader::Publish(header) => { encode_publish_header(header, dest) }
        VariableHeader::Puback(header) |
        VariableHeader::Pubrec(header) |
        VariableHeader::Pubrel(header) |
        VariableHeader::Pubcomp(header) |
        VariableHeader::Subscribe(header) |
        VariableHeader::Suback(header) |
        VariableHeader::Unsubscribe(header) |
        VariableHeader::Unsuback(header) => { encode_packet_id_header(header, dest) }
        VariableHeader::Pingreq | VariableHeader::Pingresp | VariableHeader::Disconnect => { Ok(()) }
    }
}

/// Appends the wire form of a payload to `dest`.  The sibling variable header decides which
/// optional Connect fields are written.
pub(crate) fn encode_payload(payload: &Payload, variable_header: &VariableHeader, dest: &mut Vec<u8>) -> CodecResult<()> {
    match (payload, variable_header) {
        (Payload::Connect(connect_payload), VariableHeader::Connect(header)) => { encode_connect_payload(header, connect_payload, dest) }
        (Payload::Publish(bytes), _) => {
            encode_publish_payload(bytes, dest);
            Ok(())
        }
        (Payload::Subscribe(subscriptions), _) => { encode_subscribe_payload(subscriptions, dest) }
        (Payload::Unsubscribe(topic_filters), _) => { encode_unsubscribe_payload(topic_filters, dest) }
        (Payload::Suback(granted_qos), _) => {
            encode_suback_payload(granted_qos, dest);
            Ok(())
        }
        (Payload::Empty, _) => { Ok(()) }
        (Payload::Raw(bytes), _) => {
            encode_raw_bytes(bytes, dest);
            Ok(())
        }
        (Payload::Connect(_), _) => {
            let message = format!("encode_payload - Connect payload cannot follow a {} variable header", variable_header.message_type());
            error!("{}", message);
            Err(CodecError::new_message_validation(variable_header.message_type(), message))
        }
    }
}

/// Serializes the variable header and payload of a message, in that order.
pub(crate) fn encode_body(variable_header: &VariableHeader, payload: &Payload) -> CodecResult<Vec<u8>> {
    let mut body = Vec::new();
    encode_variable_header(variable_header, &mut body)?;
    encode_payload(payload, variable_header, &mut body)?;

    Ok(body)
}

pub(crate) fn compute_remaining_length(body_length: usize) -> CodecResult<u32> {
    if body_length > MAXIMUM_VARIABLE_LENGTH_INTEGER {
        error!("Packet Encode - message body ({} bytes) exceeds the maximum remaining length", body_length);
        return Err(CodecError::new_out_of_range(format!("compute_remaining_length - message body ({} bytes) exceeds the protocol maximum (2 ^ 28 - 1)", body_length)));
    }

    Ok(body_length as u32)
}

/// Serializes a complete message.  The remaining length written to the wire is always recomputed
/// from the freshly encoded body.
pub(crate) fn encode_message(message: &Message) -> CodecResult<Vec<u8>> {
    log_message("Encoding message: ", message);

    let body = encode_body(message.variable_header(), message.payload())?;

    let mut fixed_header = *message.fixed_header();
    fixed_header.remaining_length = compute_remaining_length(body.len())?;

    let mut dest = Vec::with_capacity(5 + body.len());
    fixed_header.encode(&mut dest)?;
    encode_raw_bytes(&body, &mut dest);

    Ok(dest)
}
