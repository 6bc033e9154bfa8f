/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
Module containing a set of structured data types that model the MQTT 3.1 (MQIsdp) protocol.
 */

use crate::encode::*;
use crate::error::{CodecError, CodecResult};

use log::*;
use std::fmt;

pub(crate) mod ack;
pub(crate) mod connack;
pub(crate) mod connect;
pub(crate) mod fixed_header;
pub(crate) mod ping;
pub(crate) mod publish;
pub(crate) mod suback;
pub(crate) mod subscribe;
pub(crate) mod unsubscribe;
pub mod utils;

/// Protocol name every Connect variable header must carry.
pub const PROTOCOL_NAME: &str = "MQIsdp";

/// Protocol version every Connect variable header must carry.
pub const PROTOCOL_VERSION: u8 = 3;

/// The fourteen message types of the protocol.
///
/// Enum values match the wire encoding of the control byte's type nibble.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MessageType {

    /// Client request to connect to a server
    Connect = 1,

    /// Connect acknowledgment
    Connack = 2,

    /// Publish message
    Publish = 3,

    /// Publish acknowledgment (qos 1)
    Puback = 4,

    /// Publish received (qos 2, part 1)
    Pubrec = 5,

    /// Publish release (qos 2, part 2)
    Pubrel = 6,

    /// Publish complete (qos 2, part 3)
    Pubcomp = 7,

    /// Client subscribe request
    Subscribe = 8,

    /// Subscribe acknowledgment
    Suback = 9,

    /// Client unsubscribe request
    Unsubscribe = 10,

    /// Unsubscribe acknowledgment
    Unsuback = 11,

    /// Ping request
    Pingreq = 12,

    /// Ping response
    Pingresp = 13,

    /// Client is disconnecting
    Disconnect = 14,
}

impl TryFrom<u8> for MessageType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        utils::convert_u8_to_message_type(value)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", utils::message_type_to_str(*self))
    }
}

/// Message delivery quality of service.
///
/// Enum values match the two-bit wire encoding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QualityOfService {

    /// The message is delivered according to the capabilities of the underlying network. No response is sent by the
    /// receiver and no retry is performed by the sender. The message arrives at the receiver either once or not at all.
    #[default]
    AtMostOnce = 0,

    /// A level of service that ensures that the message arrives at the receiver at least once.
    AtLeastOnce = 1,

    /// A level of service that ensures that the message arrives at the receiver exactly once.
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QualityOfService {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        utils::convert_u8_to_quality_of_service(value)
    }
}

/// Return code carried by a Connack variable header.
///
/// Codes 0 through 5 have named variants.  Any other byte is carried through as
/// [`ConnectReturnCode::Other`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConnectReturnCode {

    /// Connection accepted (0)
    #[default]
    Accepted,

    /// The server does not support the protocol version requested by the client (1)
    UnacceptableProtocolVersion,

    /// The client identifier is well-formed but not allowed by the server (2)
    IdentifierRejected,

    /// The network connection has been made but the service is unavailable (3)
    ServerUnavailable,

    /// The data in the user name or password is malformed (4)
    BadUsernameOrPassword,

    /// The client is not authorized to connect (5)
    NotAuthorized,

    /// A return code without an assigned meaning.  Always greater than 5.
    Other(u8),
}

impl ConnectReturnCode {
    /// Returns whether or not the return code represents a successful connect
    pub fn is_success(&self) -> bool {
        matches!(self, ConnectReturnCode::Accepted)
    }
}

impl From<u8> for ConnectReturnCode {
    fn from(value: u8) -> Self {
        utils::convert_u8_to_connect_return_code(value)
    }
}

impl From<ConnectReturnCode> for u8 {
    fn from(value: ConnectReturnCode) -> Self {
        utils::connect_return_code_to_u8(value)
    }
}

/// The leading control byte plus remaining length that precedes every message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedHeader {

    /// Type of the message that follows
    pub message_type: MessageType,

    /// Set when the message is a re-delivery of an earlier attempt
    pub dup: bool,

    /// Delivery quality of service
    pub qos: QualityOfService,

    /// Whether or not the server should retain the message
    pub retain: bool,

    /// Number of bytes in the variable header and payload.  Never larger than 2^28 - 1.
    pub remaining_length: u32,
}

/// The caller-controlled flag bits of a fixed header.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FixedHeaderFlags {

    /// Set when the message is a re-delivery of an earlier attempt
    pub dup: bool,

    /// Delivery quality of service
    pub qos: QualityOfService,

    /// Whether or not the server should retain the message
    pub retain: bool,
}

/// Variable header of a Connect message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectHeader {

    /// Protocol name; must be [`PROTOCOL_NAME`] to decode successfully
    pub protocol_name: String,

    /// Protocol version; must be [`PROTOCOL_VERSION`] to decode successfully
    pub protocol_version: u8,

    /// Whether the server should discard any existing session state for this client
    pub clean_session: bool,

    /// Whether the payload carries a will topic and will message
    pub will: bool,

    /// Quality of service for the will message
    pub will_qos: QualityOfService,

    /// Whether the will message should be retained
    pub will_retain: bool,

    /// Whether the payload carries a password
    pub password: bool,

    /// Whether the payload carries a user name
    pub username: bool,

    /// Maximum interval, in seconds, between client transmissions
    pub keep_alive_seconds: u16,
}

impl Default for ConnectHeader {
    fn default() -> Self {
        ConnectHeader {
            protocol_name: PROTOCOL_NAME.to_string(),
            protocol_version: PROTOCOL_VERSION,
            clean_session: false,
            will: false,
            will_qos: QualityOfService::AtMostOnce,
            will_retain: false,
            password: false,
            username: false,
            keep_alive_seconds: 0,
        }
    }
}

/// Variable header of a Connack message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConnackHeader {

    /// Result of the connection attempt
    pub return_code: ConnectReturnCode,
}

/// Variable header of a Publish message.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PublishHeader {

    /// Topic the payload is published to
    pub topic_name: String,

    /// Packet identifier.  Present if and only if the message's qos is greater than zero.
    pub packet_id: Option<u16>,
}

/// Variable header shared by all messages whose only variable header field is a packet identifier.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PacketIdHeader {

    /// Packet identifier correlating a request with its acknowledgment
    pub packet_id: u16,
}

/// The message-type-specific structured fields following the fixed header.
///
/// The variant is the single source of truth for a message's type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VariableHeader {
    Connect(ConnectHeader),
    Connack(ConnackHeader),
    Publish(PublishHeader),
    Puback(PacketIdHeader),
    Pubrec(PacketIdHeader),
    Pubrel(PacketIdHeader),
    Pubcomp(PacketIdHeader),
    Subscribe(PacketIdHeader),
    Suback(PacketIdHeader),
    Unsubscribe(PacketIdHeader),
    Unsuback(PacketIdHeader),
    Pingreq,
    Pingresp,
    Disconnect,
}

impl VariableHeader {

    /// Returns the message type this variable header belongs to
    pub fn message_type(&self) -> MessageType {
        match self {
            VariableHeader::Connect(_) => { MessageType::Connect }
            VariableHeader::Connack(_) => { MessageType::Connack }
            VariableHeader::Publish(_) => { MessageType::Publish }
            VariableHeader::Puback(_) => { MessageType::Puback }
            VariableHeader::Pubrec(_) => { MessageType::Pubrec }
            VariableHeader::Pubrel(_) => { MessageType::Pubrel }
            VariableHeader::Pubcomp(_) => { MessageType::Pubcomp }
            VariableHeader::Subscribe(_) => { MessageType::Subscribe }
            VariableHeader::Suback(_) => { MessageType::Suback }
            VariableHeader::Unsubscribe(_) => { MessageType::Unsubscribe }
            VariableHeader::Unsuback(_) => { MessageType::Unsuback }
            VariableHeader::Pingreq => { MessageType::Pingreq }
            VariableHeader::Pingresp => { MessageType::Pingresp }
            VariableHeader::Disconnect => { MessageType::Disconnect }
        }
    }

    /// Returns the packet identifier carried by this variable header, if any
    pub fn packet_id(&self) -> Option<u16> {
        match self {
            VariableHeader::Publish(header) => { header.packet_id }
            VariableHeader::Puback(header) |
            VariableHeader::Pubrec(header) |
            VariableHeader::Pubrel(header) |
            VariableHeader::Pubcomp(header) |
            VariableHeader::Subscribe(header) |
            VariableHeader::Suback(header) |
            VariableHeader::Unsubscribe(header) |
            VariableHeader::Unsuback(header) => { Some(header.packet_id) }
            _ => { None }
        }
    }
}

/// Payload of a Connect message.  Optional fields are present exactly when the corresponding
/// Connect header flag is set.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectPayload {

    /// Client identifier; always present
    pub client_id: String,

    /// Topic of the will message; present iff the will flag is set
    pub will_topic: Option<String>,

    /// Body of the will message; present iff the will flag is set
    pub will_message: Option<String>,

    /// User name; present iff the username flag is set
    pub username: Option<String>,

    /// Password; present iff the password flag is set
    pub password: Option<String>,
}

/// A single (topic filter, requested qos) entry of a Subscribe payload
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Subscription {

    /// Topic filter to subscribe to
    pub topic_filter: String,

    /// Maximum quality of service the subscriber wants to receive messages at
    pub qos: QualityOfService,
}

impl Subscription {

    /// Creates a new subscription entry
    pub fn new(topic_filter: &str, qos: QualityOfService) -> Self {
        Subscription {
            topic_filter: topic_filter.to_string(),
            qos,
        }
    }
}

/// The message-type-specific application data following the variable header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload {

    /// Client id plus the optional will/credential fields
    Connect(ConnectPayload),

    /// Opaque application bytes, bounded by the remaining length
    Publish(Vec<u8>),

    /// Requested subscriptions, in order
    Subscribe(Vec<Subscription>),

    /// Topic filters to unsubscribe from, in order
    Unsubscribe(Vec<String>),

    /// Granted qos per requested subscription, in request order
    Suback(Vec<QualityOfService>),

    /// No payload
    Empty,

    /// Uninterpreted bytes following a variable header that has no structured payload
    Raw(Vec<u8>),
}

/// A complete protocol message: fixed header, variable header, and payload.
///
/// Messages can only be built through [`Message::new`] (or decoded from bytes), which guarantees
/// that the three parts agree with one another.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    fixed_header: FixedHeader,
    variable_header: VariableHeader,
    payload: Payload,
}

impl Message {

    /// Builds a new message after checking that the variable header, payload, and fixed header flags
    /// are mutually consistent.  The fixed header's remaining length is computed from the encoded
    /// size of the variable header and payload.
    ///
    /// An empty [`Payload::Raw`] is stored as [`Payload::Empty`].
    pub fn new(flags: FixedHeaderFlags, variable_header: VariableHeader, payload: Payload) -> CodecResult<Message> {
        let payload = match payload {
            Payload::Raw(bytes) if bytes.is_empty() => { Payload::Empty }
            payload => { payload }
        };

        validate_message_parts(&flags, &variable_header, &payload)?;

        let mut fixed_header = FixedHeader {
            message_type: variable_header.message_type(),
            dup: flags.dup,
            qos: flags.qos,
            retain: flags.retain,
            remaining_length: 0,
        };

        let body = encode_body(&variable_header, &payload)?;
        fixed_header.remaining_length = compute_remaining_length(body.len())?;

        Ok(Message {
            fixed_header,
            variable_header,
            payload,
        })
    }

    /// Assembles a message from parts that have already been checked by the decoder.
    pub(crate) fn from_decoded_parts(fixed_header: FixedHeader, variable_header: VariableHeader, payload: Payload) -> Message {
        Message {
            fixed_header,
            variable_header,
            payload,
        }
    }

    /// Returns the message's type
    pub fn message_type(&self) -> MessageType { self.variable_header.message_type() }

    /// Returns the message's fixed header
    pub fn fixed_header(&self) -> &FixedHeader { &self.fixed_header }

    /// Returns the message's variable header
    pub fn variable_header(&self) -> &VariableHeader { &self.variable_header }

    /// Returns the message's payload
    pub fn payload(&self) -> &Payload { &self.payload }

    /// Serializes the message to its wire representation
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        encode_message(self)
    }
}

fn payload_matches_message_type(message_type: MessageType, payload: &Payload) -> bool {
    match message_type {
        MessageType::Connect => { matches!(payload, Payload::Connect(_)) }
        MessageType::Publish => { matches!(payload, Payload::Publish(_)) }
        MessageType::Subscribe => { matches!(payload, Payload::Subscribe(_)) }
        MessageType::Unsubscribe => { matches!(payload, Payload::Unsubscribe(_)) }
        MessageType::Suback => { matches!(payload, Payload::Suback(_)) }
        _ => { matches!(payload, Payload::Empty | Payload::Raw(_)) }
    }
}

fn validate_connect_parts(header: &ConnectHeader, payload: &ConnectPayload) -> CodecResult<()> {
    if header.protocol_name != PROTOCOL_NAME || header.protocol_version != PROTOCOL_VERSION {
        let message = format!("validate_connect_parts - protocol \"{}\" version {} is not \"{}\" version {}", header.protocol_name, header.protocol_version, PROTOCOL_NAME, PROTOCOL_VERSION);
        error!("{}", message);
        return Err(CodecError::new_message_validation(MessageType::Connect, message));
    }

    if header.will != (payload.will_topic.is_some() && payload.will_message.is_some()) {
        let message = "validate_connect_parts - will flag does not match the presence of will topic and will message";
        error!("{}", message);
        return Err(CodecError::new_message_validation(MessageType::Connect, message));
    }

    if !header.will && (payload.will_topic.is_some() || payload.will_message.is_some()) {
        let message = "validate_connect_parts - will fields present without will flag";
        error!("{}", message);
        return Err(CodecError::new_message_validation(MessageType::Connect, message));
    }

    if header.username != payload.username.is_some() {
        let message = "validate_connect_parts - username flag does not match the presence of a username";
        error!("{}", message);
        return Err(CodecError::new_message_validation(MessageType::Connect, message));
    }

    if header.password != payload.password.is_some() {
        let message = "validate_connect_parts - password flag does not match the presence of a password";
        error!("{}", message);
        return Err(CodecError::new_message_validation(MessageType::Connect, message));
    }

    Ok(())
}

fn validate_message_parts(flags: &FixedHeaderFlags, variable_header: &VariableHeader, payload: &Payload) -> CodecResult<()> {
    let message_type = variable_header.message_type();

    if !payload_matches_message_type(message_type, payload) {
        let message = format!("validate_message_parts - payload variant does not belong to a {} message", message_type);
        error!("{}", message);
        return Err(CodecError::new_message_validation(message_type, message));
    }

    match (variable_header, payload) {
        (VariableHeader::Publish(header), _) => {
            let needs_packet_id = flags.qos != QualityOfService::AtMostOnce;
            if needs_packet_id != header.packet_id.is_some() {
                let message = "validate_message_parts - publish packet id must be present if and only if qos is greater than zero";
                error!("{}", message);
                return Err(CodecError::new_message_validation(message_type, message));
            }
        }
        (VariableHeader::Connect(header), Payload::Connect(connect_payload)) => {
            validate_connect_parts(header, connect_payload)?;
        }
        (VariableHeader::Connack(ConnackHeader { return_code: ConnectReturnCode::Other(value) }), _) => {
            if *value <= 5 {
                let message = format!("validate_message_parts - connect return code {} has a named variant", value);
                error!("{}", message);
                return Err(CodecError::new_message_validation(message_type, message));
            }
        }
        _ => {}
    }

    Ok(())
}
