/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::decode::utils::*;
use crate::encode::utils::*;
use crate::error::CodecResult;
use crate::mqtt::*;
use crate::mqtt::utils::*;

pub(crate) fn encode_subscribe_payload(subscriptions: &[Subscription], dest: &mut Vec<u8>) -> CodecResult<()> {
    for subscription in subscriptions {
        encode_length_prefixed_string(&subscription.topic_filter, dest)?;
        encode_u8(subscription.qos as u8, dest);
    }

    Ok(())
}

pub(crate) fn decode_subscribe_payload(bytes: &[u8]) -> CodecResult<Payload> {
    let mut subscriptions = Vec::new();

    let mut mutable_body = bytes;
    while !mutable_body.is_empty() {
        let mut subscription = Subscription::default();
        mutable_body = decode_length_prefixed_string(mutable_body, &mut subscription.topic_filter)?;
        mutable_body = decode_u8_as_enum(mutable_body, &mut subscription.qos, convert_u8_to_quality_of_service)?;

        subscriptions.push(subscription);
    }

    Ok(Payload::Subscribe(subscriptions))
}
