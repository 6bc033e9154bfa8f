/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::decode::utils::*;
use crate::encode::utils::*;
use crate::error::{CodecError, CodecResult};
use crate::mqtt::*;

pub(crate) fn encode_packet_id_header(header: &PacketIdHeader, dest: &mut Vec<u8>) -> CodecResult<()> {
    encode_u16(header.packet_id as usize, dest)
}

/// Decodes the variable header of every message type whose only variable header field is a
/// packet identifier.
pub(crate) fn decode_packet_id_header(message_type: MessageType, bytes: &[u8]) -> CodecResult<(VariableHeader, usize)> {
    let mut header = PacketIdHeader::default();
    let mutable_body = decode_u16(bytes, &mut header.packet_id)?;
    let consumed = bytes.len() - mutable_body.len();

    let variable_header = match message_type {
        MessageType::Puback => { VariableHeader::Puback(header) }
        MessageType::Pubrec => { VariableHeader::Pubrec(header) }
        MessageType::Pubrel => { VariableHeader::Pubrel(header) }
        MessageType::Pubcomp => { VariableHeader::Pubcomp(header) }
        MessageType::Subscribe => { VariableHeader::Subscribe(header) }
        MessageType::Suback => { VariableHeader::Suback(header) }
        MessageType::Unsubscribe => { VariableHeader::Unsubscribe(header) }
        MessageType::Unsuback => { VariableHeader::Unsuback(header) }
        _ => {
            let message = format!("decode_packet_id_header - {} messages do not have a packet id variable header", message_type);
            error!("{}", message);
            return Err(CodecError::new_decoding_failure(message));
        }
    };

    Ok((variable_header, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::testing::*;
    use assert_matches::assert_matches;

    fn create_ack(variant: fn(PacketIdHeader) -> VariableHeader, packet_id: u16) -> Message {
        let variable_header = variant(PacketIdHeader { packet_id });
        let flags = match variable_header.message_type() {
            MessageType::Pubrel => { FixedHeaderFlags { qos: QualityOfService::AtLeastOnce, ..Default::default() } }
            _ => { FixedHeaderFlags::default() }
        };

        Message::new(flags, variable_header, Payload::Empty).unwrap()
    }

    #[test]
    fn puback_round_trip_encode_decode() {
        assert!(do_round_trip_encode_decode_test(&create_ack(VariableHeader::Puback, 123)));
    }

    #[test]
    fn pubrec_round_trip_encode_decode() {
        assert!(do_round_trip_encode_decode_test(&create_ack(VariableHeader::Pubrec, 16384)));
    }

    #[test]
    fn pubrel_round_trip_encode_decode() {
        assert!(do_round_trip_encode_decode_test(&create_ack(VariableHeader::Pubrel, 65535)));
    }

    #[test]
    fn pubcomp_round_trip_encode_decode() {
        assert!(do_round_trip_encode_decode_test(&create_ack(VariableHeader::Pubcomp, 1)));
    }

    #[test]
    fn unsuback_round_trip_encode_decode() {
        assert!(do_round_trip_encode_decode_test(&create_ack(VariableHeader::Unsuback, 4097)));
    }

    #[test]
    fn puback_encoding() {
        let message = create_ack(VariableHeader::Puback, 258);
        assert_eq!(vec![0x04u8, 0x02u8, 0x01u8, 0x02u8], message.encode().unwrap());
    }

    #[test]
    fn packet_id_header_decode_consumes_two_bytes() {
        let (header, consumed) = decode_packet_id_header(MessageType::Pubcomp, &[0x00u8, 0x07u8, 0xFFu8]).unwrap();
        assert_eq!(VariableHeader::Pubcomp(PacketIdHeader { packet_id: 7 }), header);
        assert_eq!(2, consumed);
    }

    #[test]
    fn packet_id_header_decode_failure_truncated() {
        assert_matches!(decode_packet_id_header(MessageType::Puback, &[0x00u8]), Err(CodecError::TruncatedBuffer(_)));
    }

    #[test]
    fn packet_id_header_decode_failure_wrong_type() {
        assert_matches!(decode_packet_id_header(MessageType::Connect, &[0x00u8, 0x01u8]), Err(CodecError::DecodingFailure(_)));
    }

    #[test]
    fn puback_leftover_bytes_are_carried_as_raw_payload() {
        let (message, consumed) = crate::decode::decode_message(&[0x04u8, 0x03u8, 0x00u8, 0x01u8, 0xAAu8]).unwrap();
        assert_eq!(5, consumed);
        assert_eq!(&VariableHeader::Puback(PacketIdHeader { packet_id: 1 }), message.variable_header());
        assert_eq!(&Payload::Raw(vec![0xAAu8]), message.payload());
        assert!(do_round_trip_encode_decode_test(&message));
    }
}
