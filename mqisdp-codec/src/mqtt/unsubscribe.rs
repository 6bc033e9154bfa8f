/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::decode::utils::*;
use crate::encode::utils::*;
use crate::error::CodecResult;
use crate::mqtt::*;

pub(crate) fn encode_unsubscribe_payload(topic_filters: &[String], dest: &mut Vec<u8>) -> CodecResult<()> {
    for topic_filter in topic_filters {
        encode_length_prefixed_string(topic_filter, dest)?;
    }

    Ok(())
}

pub(crate) fn decode_unsubscribe_payload(bytes: &[u8]) -> CodecResult<Payload> {
    let mut topic_filters = Vec::new();

    let mut mutable_body = bytes;
    while !mutable_body.is_empty() {
        let mut topic_filter = String::new();
        mutable_body = decode_length_prefixed_string(mutable_body, &mut topic_filter)?;
        topic_filters.push(topic_filter);
    }

    Ok(Payload::Unsubscribe(topic_filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::testing::*;
    use crate::error::CodecError;
    use assert_matches::assert_matches;

    fn create_unsubscribe(packet_id: u16, topic_filters: &[&str]) -> Message {
        let flags = FixedHeaderFlags {
            qos: QualityOfService::AtLeastOnce,
            ..Default::default()
        };

        let topic_filters = topic_filters.iter().map(|filter| filter.to_string()).collect();

        Message::new(flags, VariableHeader::Unsubscribe(PacketIdHeader { packet_id }), Payload::Unsubscribe(topic_filters)).unwrap()
    }

    #[test]
    fn unsubscribe_round_trip_encode_decode_single() {
        assert!(do_round_trip_encode_decode_test(&create_unsubscribe(12, &["hello/world"])));
    }

    #[test]
    fn unsubscribe_round_trip_encode_decode_multiple() {
        assert!(do_round_trip_encode_decode_test(&create_unsubscribe(65000, &["a/b", "+/+/c", "#", ""])));
    }

    #[test]
    fn unsubscribe_decode_failure_truncated_filter() {
        let truncate_last_filter = | bytes: &[u8] | -> Vec<u8> {
            let mut clone = bytes.to_vec();
            clone.pop();
            clone[1] -= 1;
            clone
        };

        do_mutated_decode_failure_test(&create_unsubscribe(3, &["a/b", "c/d"]), truncate_last_filter);

        assert_matches!(decode_unsubscribe_payload(&[0u8, 5, b'a']), Err(CodecError::TruncatedBuffer(_)));
    }

    #[test]
    fn unsubscribe_decode_empty_payload() {
        assert_eq!(Payload::Unsubscribe(Vec::new()), decode_unsubscribe_payload(&[]).unwrap());
    }
}
