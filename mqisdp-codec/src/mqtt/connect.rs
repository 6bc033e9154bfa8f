/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::decode::utils::*;
use crate::encode::utils::*;
use crate::error::{CodecError, CodecResult};
use crate::mqtt::*;
use crate::mqtt::utils::*;

fn compute_connect_flags(header: &ConnectHeader) -> u8 {
    let mut flags: u8 = 0;
    if header.clean_session {
        flags |= CONNECT_FLAGS_CLEAN_SESSION_MASK;
    }

    if header.will {
        flags |= CONNECT_FLAGS_WILL_MASK;
    }

    flags |= (header.will_qos as u8) << CONNECT_FLAGS_WILL_QOS_SHIFT;

    if header.will_retain {
        flags |= CONNECT_FLAGS_WILL_RETAIN_MASK;
    }

    if header.password {
        flags |= CONNECT_FLAGS_PASSWORD_MASK;
    }

    if header.username {
        flags |= CONNECT_FLAGS_USERNAME_MASK;
    }

    flags
}

pub(crate) fn encode_connect_header(header: &ConnectHeader, dest: &mut Vec<u8>) -> CodecResult<()> {
    encode_length_prefixed_string(&header.protocol_name, dest)?;
    encode_u8(header.protocol_version, dest);
    encode_u8(compute_connect_flags(header), dest);
    encode_u16(header.keep_alive_seconds as usize, dest)
}

pub(crate) fn decode_connect_header(bytes: &[u8]) -> CodecResult<(VariableHeader, usize)> {
    let mut header = ConnectHeader::default();

    let mut mutable_body = decode_length_prefixed_string(bytes, &mut header.protocol_name)?;
    mutable_body = decode_u8(mutable_body, &mut header.protocol_version)?;

    if header.protocol_name != PROTOCOL_NAME || header.protocol_version != PROTOCOL_VERSION {
        error!("Packet Decode - Connect header carries protocol \"{}\" version {}", header.protocol_name, header.protocol_version);
        return Err(CodecError::new_protocol_mismatch(&header.protocol_name, header.protocol_version));
    }

    let mut flags: u8 = 0;
    mutable_body = decode_u8(mutable_body, &mut flags)?;

    header.clean_session = (flags & CONNECT_FLAGS_CLEAN_SESSION_MASK) != 0;
    header.will = (flags & CONNECT_FLAGS_WILL_MASK) != 0;
    header.will_qos = convert_u8_to_quality_of_service((flags >> CONNECT_FLAGS_WILL_QOS_SHIFT) & QOS_MASK)?;
    header.will_retain = (flags & CONNECT_FLAGS_WILL_RETAIN_MASK) != 0;
    header.password = (flags & CONNECT_FLAGS_PASSWORD_MASK) != 0;
    header.username = (flags & CONNECT_FLAGS_USERNAME_MASK) != 0;

    mutable_body = decode_u16(mutable_body, &mut header.keep_alive_seconds)?;

    Ok((VariableHeader::Connect(header), bytes.len() - mutable_body.len()))
}

pub(crate) fn encode_connect_payload(header: &ConnectHeader, payload: &ConnectPayload, dest: &mut Vec<u8>) -> CodecResult<()> {
    encode_length_prefixed_string(&payload.client_id, dest)?;

    if header.will {
        encode_length_prefixed_string(payload.will_topic.as_deref().unwrap_or_default(), dest)?;
        encode_length_prefixed_string(payload.will_message.as_deref().unwrap_or_default(), dest)?;
    }

    if header.username {
        encode_length_prefixed_string(payload.username.as_deref().unwrap_or_default(), dest)?;
    }

    if header.password {
        encode_length_prefixed_string(payload.password.as_deref().unwrap_or_default(), dest)?;
    }

    Ok(())
}

pub(crate) fn decode_connect_payload(header: &ConnectHeader, bytes: &[u8]) -> CodecResult<Payload> {
    let mut payload = ConnectPayload::default();

    let mut mutable_body = decode_length_prefixed_string(bytes, &mut payload.client_id)?;

    if header.will {
        mutable_body = decode_optional_length_prefixed_string(mutable_body, &mut payload.will_topic)?;
        mutable_body = decode_optional_length_prefixed_string(mutable_body, &mut payload.will_message)?;
    }

    if header.username {
        mutable_body = decode_optional_length_prefixed_string(mutable_body, &mut payload.username)?;
    }

    if header.password {
        mutable_body = decode_optional_length_prefixed_string(mutable_body, &mut payload.password)?;
    }

    if !mutable_body.is_empty() {
        let message = format!("Packet Decode - Connect payload has {} unexpected trailing bytes", mutable_body.len());
        error!("{}", message);
        return Err(CodecError::new_decoding_failure(message));
    }

    Ok(Payload::Connect(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::testing::*;
    use assert_matches::assert_matches;

    fn create_connect_with_all_fields() -> Message {
        let header = ConnectHeader {
            clean_session: true,
            will: true,
            will_qos: QualityOfService::ExactlyOnce,
            will_retain: true,
            password: true,
            username: true,
            keep_alive_seconds: 1200,
            ..Default::default()
        };

        let payload = ConnectPayload {
            client_id: uuid::Uuid::new_v4().to_string(),
            will_topic: Some("hello/world".to_string()),
            will_message: Some("I'm gone".to_string()),
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        };

        Message::new(FixedHeaderFlags::default(), VariableHeader::Connect(header), Payload::Connect(payload)).unwrap()
    }

    #[test]
    fn connect_round_trip_encode_decode_default() {
        let payload = ConnectPayload {
            client_id: "TEMPCLIENTID1".to_string(),
            ..Default::default()
        };

        let message = Message::new(FixedHeaderFlags::default(), VariableHeader::Connect(ConnectHeader::default()), Payload::Connect(payload)).unwrap();
        assert!(do_round_trip_encode_decode_test(&message));
    }

    #[test]
    fn connect_round_trip_encode_decode_all_fields() {
        assert!(do_round_trip_encode_decode_test(&create_connect_with_all_fields()));
    }

    #[test]
    fn connect_round_trip_encode_decode_username_only() {
        let header = ConnectHeader {
            username: true,
            keep_alive_seconds: 65535,
            ..Default::default()
        };

        let payload = ConnectPayload {
            client_id: "client".to_string(),
            username: Some("user".to_string()),
            ..Default::default()
        };

        let message = Message::new(FixedHeaderFlags::default(), VariableHeader::Connect(header), Payload::Connect(payload)).unwrap();
        assert!(do_round_trip_encode_decode_test(&message));
    }

    #[test]
    fn connect_header_encoding_is_twelve_bytes() {
        let header = ConnectHeader {
            clean_session: true,
            keep_alive_seconds: 10,
            ..Default::default()
        };

        let mut dest = Vec::new();
        encode_connect_header(&header, &mut dest).unwrap();
        assert_eq!(vec![0u8, 6, b'M', b'Q', b'I', b's', b'd', b'p', 3, 0x02, 0, 10], dest);

        let (decoded, consumed) = decode_connect_header(&dest).unwrap();
        assert_eq!(12, consumed);
        assert_eq!(VariableHeader::Connect(header), decoded);
    }

    #[test]
    fn connect_header_flag_bits() {
        let header = ConnectHeader {
            clean_session: true,
            will: true,
            will_qos: QualityOfService::AtLeastOnce,
            will_retain: true,
            password: true,
            username: true,
            ..Default::default()
        };

        assert_eq!(0xEEu8, compute_connect_flags(&header));
    }

    #[test]
    fn connect_decode_failure_protocol_name() {
        let bytes = [0u8, 4, b'M', b'Q', b'T', b'T', 4, 0x02, 0, 10];
        assert_matches!(decode_connect_header(&bytes), Err(CodecError::ProtocolMismatch(context)) => {
            assert_eq!("MQTT", context.protocol_name);
            assert_eq!(4, context.protocol_version);
        });
    }

    #[test]
    fn connect_decode_failure_protocol_version() {
        let corrupt_version = | bytes: &[u8] | -> Vec<u8> {
            let mut clone = bytes.to_vec();

            // 1 control byte, 1 length byte, 2 + 6 protocol name bytes
            clone[10] = 4;
            clone
        };

        do_mutated_decode_failure_test(&create_connect_with_all_fields(), corrupt_version);
    }

    #[test]
    fn connect_decode_failure_will_qos() {
        let corrupt_will_qos = | bytes: &[u8] | -> Vec<u8> {
            let mut clone = bytes.to_vec();
            clone[11] |= 3 << CONNECT_FLAGS_WILL_QOS_SHIFT;
            clone
        };

        do_mutated_decode_failure_test(&create_connect_with_all_fields(), corrupt_will_qos);

        let bytes = [0u8, 6, b'M', b'Q', b'I', b's', b'd', b'p', 3, 0x1C, 0, 10];
        assert_matches!(decode_connect_header(&bytes), Err(CodecError::InvalidQos(_)));
    }

    #[test]
    fn connect_decode_failure_truncated_header() {
        let bytes = [0u8, 6, b'M', b'Q', b'I', b's', b'd', b'p', 3, 0x02, 0];
        assert_matches!(decode_connect_header(&bytes), Err(CodecError::TruncatedBuffer(_)));
    }

    #[test]
    fn connect_decode_failure_trailing_payload_bytes() {
        let header = ConnectHeader::default();
        let bytes = [0u8, 2, b'i', b'd', 0, 1, b'x'];
        assert_matches!(decode_connect_payload(&header, &bytes), Err(CodecError::DecodingFailure(_)));
    }

    #[test]
    fn connect_decode_failure_missing_flagged_field() {
        let header = ConnectHeader {
            password: true,
            ..Default::default()
        };

        let bytes = [0u8, 2, b'i', b'd'];
        assert_matches!(decode_connect_payload(&header, &bytes), Err(CodecError::TruncatedBuffer(_)));
    }

    #[test]
    fn connect_payload_fields_follow_flags() {
        let header = ConnectHeader {
            will: true,
            password: true,
            ..Default::default()
        };

        let bytes = [0u8, 1, b'c', 0, 1, b't', 0, 1, b'm', 0, 2, b'p', b'w'];
        let decoded = decode_connect_payload(&header, &bytes).unwrap();
        assert_eq!(Payload::Connect(ConnectPayload {
            client_id: "c".to_string(),
            will_topic: Some("t".to_string()),
            will_message: Some("m".to_string()),
            username: None,
            password: Some("pw".to_string()),
        }), decoded);
    }
}
