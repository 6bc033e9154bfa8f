/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
Construction of well-formed outbound messages from high-level parameters.
 */

use crate::config::*;
use crate::error::{CodecError, CodecResult};
use crate::mqtt::*;

use log::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// Default prefix for generated client identifiers
pub const DEFAULT_CLIENT_ID_PREFIX: &str = "TEMPCLIENTID";

/// Lock-free, monotonically increasing identifier source.  Concurrent callers never observe the
/// same value.
#[derive(Debug, Default)]
pub struct IdentifierCounter {
    value: AtomicU32,
}

impl IdentifierCounter {

    /// Creates a counter whose first minted value is 1
    pub fn new() -> Self {
        IdentifierCounter::with_seed(0)
    }

    /// Creates a counter whose first minted value is `seed + 1`
    pub fn with_seed(seed: u32) -> Self {
        IdentifierCounter {
            value: AtomicU32::new(seed),
        }
    }

    /// Increments the counter and returns the new value
    pub fn next(&self) -> u32 {
        self.value.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

/// Builds outbound messages whose three parts are consistent with one another.
///
/// A factory owns the identifier counter used to mint client ids and packet ids, and may be
/// shared between threads.
#[derive(Debug)]
pub struct MessageFactory {
    counter: IdentifierCounter,

    client_id_prefix: String,
}

impl Default for MessageFactory {
    fn default() -> Self {
        MessageFactory::new()
    }
}

impl MessageFactory {

    /// Creates a factory with a fresh counter and the default client id prefix
    pub fn new() -> Self {
        MessageFactory::with_counter(IdentifierCounter::new())
    }

    /// Creates a factory that mints identifiers from an existing counter
    pub fn with_counter(counter: IdentifierCounter) -> Self {
        MessageFactory {
            counter,
            client_id_prefix: DEFAULT_CLIENT_ID_PREFIX.to_string(),
        }
    }

    /// Replaces the prefix used for generated client identifiers
    pub fn with_client_id_prefix(mut self, prefix: &str) -> Self {
        self.client_id_prefix = prefix.to_string();
        self
    }

    /// Mints a new client identifier of the form `{prefix}{n}`
    pub fn next_client_id(&self) -> String {
        format!("{}{}", self.client_id_prefix, self.counter.next())
    }

    /// Mints a new non-zero packet identifier.  Identifiers wrap after 65535.
    pub fn next_packet_id(&self) -> u16 {
        loop {
            let packet_id = (self.counter.next() & 0xFFFF) as u16;
            if packet_id != 0 {
                return packet_id;
            }
        }
    }

    /// Builds a Connect message with a generated client id.  Empty strings in the options are
    /// treated as absent fields.
    pub fn new_connect(&self, options: &ConnectOptions) -> CodecResult<Message> {
        let keep_alive_seconds = u16::try_from(options.keep_alive_seconds).map_err(|_| {
            let message = format!("new_connect - keep alive ({}) does not fit in 16 bits", options.keep_alive_seconds);
            error!("{}", message);
            CodecError::new_out_of_range(message)
        })?;

        let will = options.will();
        let username = non_empty(&options.username);
        let password = non_empty(&options.password);

        let header = ConnectHeader {
            clean_session: options.clean_session,
            will,
            will_qos: if will { options.will_qos } else { QualityOfService::AtMostOnce },
            will_retain: will && options.will_retain,
            password: password.is_some(),
            username: username.is_some(),
            keep_alive_seconds,
            ..Default::default()
        };

        let payload = ConnectPayload {
            client_id: self.next_client_id(),
            will_topic: will.then(|| options.will_topic.clone()),
            will_message: will.then(|| options.will_message.clone()),
            username,
            password,
        };

        Message::new(FixedHeaderFlags::default(), VariableHeader::Connect(header), Payload::Connect(payload))
    }

    /// Builds a Connack message
    pub fn new_connack(&self, return_code: ConnectReturnCode) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Connack(ConnackHeader { return_code }), Payload::Empty)
    }

    /// Builds a Publish message.  A packet id is minted when qos is greater than zero.
    pub fn new_publish(&self, topic_name: &str, payload: &[u8], qos: QualityOfService, retain: bool) -> CodecResult<Message> {
        let packet_id = match qos {
            QualityOfService::AtMostOnce => { None }
            _ => { Some(self.next_packet_id()) }
        };

        let flags = FixedHeaderFlags {
            dup: false,
            qos,
            retain,
        };

        let header = PublishHeader {
            topic_name: topic_name.to_string(),
            packet_id,
        };

        Message::new(flags, VariableHeader::Publish(header), Payload::Publish(payload.to_vec()))
    }

    /// Builds a Puback message acknowledging a qos 1 publish
    pub fn new_puback(&self, packet_id: u16) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Puback(PacketIdHeader { packet_id }), Payload::Empty)
    }

    /// Builds a Pubrec message, the first response to a qos 2 publish
    pub fn new_pubrec(&self, packet_id: u16) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Pubrec(PacketIdHeader { packet_id }), Payload::Empty)
    }

    /// Builds a Pubrel message.  Pubrel is always sent with qos 1.
    pub fn new_pubrel(&self, packet_id: u16) -> CodecResult<Message> {
        Message::new(at_least_once_flags(), VariableHeader::Pubrel(PacketIdHeader { packet_id }), Payload::Empty)
    }

    /// Builds a Pubcomp message, completing a qos 2 exchange
    pub fn new_pubcomp(&self, packet_id: u16) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Pubcomp(PacketIdHeader { packet_id }), Payload::Empty)
    }

    /// Builds a Subscribe message with a freshly minted packet id
    pub fn new_subscribe(&self, subscriptions: Vec<Subscription>) -> CodecResult<Message> {
        let header = PacketIdHeader { packet_id: self.next_packet_id() };
        Message::new(at_least_once_flags(), VariableHeader::Subscribe(header), Payload::Subscribe(subscriptions))
    }

    /// Builds a Suback message granting one qos per requested subscription
    pub fn new_suback(&self, packet_id: u16, granted_qos: Vec<QualityOfService>) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Suback(PacketIdHeader { packet_id }), Payload::Suback(granted_qos))
    }

    /// Builds an Unsubscribe message with a freshly minted packet id
    pub fn new_unsubscribe(&self, topic_filters: Vec<String>) -> CodecResult<Message> {
        let header = PacketIdHeader { packet_id: self.next_packet_id() };
        Message::new(at_least_once_flags(), VariableHeader::Unsubscribe(header), Payload::Unsubscribe(topic_filters))
    }

    /// Builds an Unsuback message
    pub fn new_unsuback(&self, packet_id: u16) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Unsuback(PacketIdHeader { packet_id }), Payload::Empty)
    }

    /// Builds a Pingreq message
    pub fn new_pingreq(&self) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Pingreq, Payload::Empty)
    }

    /// Builds a Pingresp message
    pub fn new_pingresp(&self) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Pingresp, Payload::Empty)
    }

    /// Builds a Disconnect message
    pub fn new_disconnect(&self) -> CodecResult<Message> {
        Message::new(FixedHeaderFlags::default(), VariableHeader::Disconnect, Payload::Empty)
    }
}

fn at_least_once_flags() -> FixedHeaderFlags {
    FixedHeaderFlags {
        qos: QualityOfService::AtLeastOnce,
        ..Default::default()
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_message;
    use assert_matches::assert_matches;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counter_starts_after_seed() {
        let counter = IdentifierCounter::new();
        assert_eq!(1, counter.next());
        assert_eq!(2, counter.next());

        let counter = IdentifierCounter::with_seed(41);
        assert_eq!(42, counter.next());
    }

    #[test]
    fn counter_is_unique_across_threads() {
        let counter = Arc::new(IdentifierCounter::new());

        let handles: Vec<_> = (0..8).map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                (0..1000).map(|_| counter.next()).collect::<Vec<u32>>()
            })
        }).collect();

        let mut minted = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(minted.insert(value));
            }
        }

        assert_eq!(8000, minted.len());
    }

    #[test]
    fn client_ids_use_prefix_and_counter() {
        let factory = MessageFactory::with_counter(IdentifierCounter::with_seed(9));
        assert_eq!("TEMPCLIENTID10", factory.next_client_id());
        assert_eq!("TEMPCLIENTID11", factory.next_client_id());

        let prefix = uuid::Uuid::new_v4().to_string();
        let factory = MessageFactory::new().with_client_id_prefix(&prefix);
        assert_eq!(format!("{}1", prefix), factory.next_client_id());
    }

    #[test]
    fn packet_ids_skip_zero_on_wrap() {
        let factory = MessageFactory::with_counter(IdentifierCounter::with_seed(65534));
        assert_eq!(65535, factory.next_packet_id());
        assert_eq!(1, factory.next_packet_id());
    }

    #[test]
    fn connect_without_optional_fields() {
        let factory = MessageFactory::new();
        let options = ConnectOptionsBuilder::new()
            .with_clean_session(false)
            .with_keep_alive_seconds(10)
            .with_will("", "", QualityOfService::AtMostOnce, false)
            .with_username("")
            .with_password("")
            .build();

        let message = factory.new_connect(&options).unwrap();
        let bytes = message.encode().unwrap();

        // 12 header bytes plus the length-prefixed client id "TEMPCLIENTID1"
        assert_eq!(2 + 12 + 2 + 13, bytes.len());

        let (decoded, _) = decode_message(&bytes).unwrap();
        assert_eq!(message, decoded);

        assert_matches!(decoded.variable_header(), VariableHeader::Connect(header) => {
            assert_eq!(10, header.keep_alive_seconds);
            assert!(!header.clean_session);
            assert!(!header.will);
            assert!(!header.username);
            assert!(!header.password);
        });

        assert_matches!(decoded.payload(), Payload::Connect(payload) => {
            assert_eq!("TEMPCLIENTID1", payload.client_id);
            assert_eq!(None, payload.will_topic);
            assert_eq!(None, payload.will_message);
            assert_eq!(None, payload.username);
            assert_eq!(None, payload.password);
        });
    }

    #[test]
    fn connect_with_all_optional_fields() {
        let factory = MessageFactory::new();
        let options = ConnectOptionsBuilder::new()
            .with_will("last/will", "goodbye", QualityOfService::ExactlyOnce, true)
            .with_username("user")
            .with_password("secret")
            .build();

        let message = factory.new_connect(&options).unwrap();
        let (decoded, _) = decode_message(&message.encode().unwrap()).unwrap();
        assert_eq!(message, decoded);

        assert_matches!(decoded.variable_header(), VariableHeader::Connect(header) => {
            assert!(header.clean_session);
            assert!(header.will);
            assert!(header.will_retain);
            assert_eq!(QualityOfService::ExactlyOnce, header.will_qos);
            assert_eq!(PROTOCOL_NAME, header.protocol_name);
            assert_eq!(PROTOCOL_VERSION, header.protocol_version);
        });

        assert_matches!(decoded.payload(), Payload::Connect(payload) => {
            assert_eq!(Some("last/will".to_string()), payload.will_topic);
            assert_eq!(Some("goodbye".to_string()), payload.will_message);
            assert_eq!(Some("user".to_string()), payload.username);
            assert_eq!(Some("secret".to_string()), payload.password);
        });
    }

    #[test]
    fn connect_keep_alive_out_of_range() {
        let factory = MessageFactory::new();
        let options = ConnectOptionsBuilder::new()
            .with_keep_alive_seconds(65536)
            .build();

        assert_matches!(factory.new_connect(&options), Err(CodecError::OutOfRange(_)));

        let options = ConnectOptionsBuilder::new_from_existing(options)
            .with_keep_alive_seconds(65535)
            .build();
        assert!(factory.new_connect(&options).is_ok());
    }

    #[test]
    fn publish_packet_id_follows_qos() {
        let factory = MessageFactory::new();

        let message = factory.new_publish("a/b", b"hi", QualityOfService::AtMostOnce, false).unwrap();
        assert_eq!(None, message.variable_header().packet_id());

        let message = factory.new_publish("a/b", b"hi", QualityOfService::ExactlyOnce, true).unwrap();
        assert_eq!(Some(1), message.variable_header().packet_id());
        assert!(message.fixed_header().retain);
    }

    #[test]
    fn request_messages_carry_qos_one() {
        let factory = MessageFactory::new();

        let subscribe = factory.new_subscribe(vec!(Subscription::new("a/#", QualityOfService::AtLeastOnce))).unwrap();
        assert_eq!(QualityOfService::AtLeastOnce, subscribe.fixed_header().qos);
        assert_eq!(Some(1), subscribe.variable_header().packet_id());

        let unsubscribe = factory.new_unsubscribe(vec!("a/#".to_string())).unwrap();
        assert_eq!(QualityOfService::AtLeastOnce, unsubscribe.fixed_header().qos);
        assert_eq!(Some(2), unsubscribe.variable_header().packet_id());

        let pubrel = factory.new_pubrel(7).unwrap();
        assert_eq!(QualityOfService::AtLeastOnce, pubrel.fixed_header().qos);
    }

    #[test]
    fn acknowledgments_round_trip() {
        let factory = MessageFactory::new();
        let messages = vec!(
            factory.new_connack(ConnectReturnCode::IdentifierRejected).unwrap(),
            factory.new_puback(1).unwrap(),
            factory.new_pubrec(2).unwrap(),
            factory.new_pubcomp(3).unwrap(),
            factory.new_suback(4, vec!(QualityOfService::AtLeastOnce)).unwrap(),
            factory.new_unsuback(5).unwrap(),
            factory.new_pingreq().unwrap(),
            factory.new_pingresp().unwrap(),
            factory.new_disconnect().unwrap(),
        );

        for message in messages {
            let (decoded, consumed) = decode_message(&message.encode().unwrap()).unwrap();
            assert_eq!(message, decoded);
            assert_eq!(message.encode().unwrap().len(), consumed);
        }
    }
}
