/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::mqtt::*;
use crate::mqtt::utils::*;

use log::*;
use std::fmt;

macro_rules! log_primitive_value {
    ($integral_value: expr, $formatter: expr, $log_field: expr) => {
        write!($formatter, " {}:{}", $log_field, $integral_value)?;
    };
}

pub(crate) use log_primitive_value;

macro_rules! log_optional_primitive_value {
    ($optional_integral_value: expr, $formatter: expr, $log_field: expr, $value: ident) => {
        if let Some($value) = &$optional_integral_value {
            write!($formatter, " {}:{}", $log_field, $value)?;
        }
    };
}

macro_rules! log_enum {
    ($enum_value: expr, $formatter: expr, $log_field: expr, $converter: ty) => {
        write!($formatter, " {}:{}", $log_field, <$converter>::to_string(&$enum_value))?;
    };
}

pub(crate) use log_enum;

macro_rules! log_string {
    ($value: expr, $formatter: expr, $log_field: expr) => {
        write!($formatter, " {}:\"{}\"", $log_field, $value)?;
    };
}

pub(crate) use log_string;

macro_rules! log_optional_string {
    ($optional_string: expr, $formatter: expr, $log_field: expr, $value:ident) => {
        if let Some($value) = &$optional_string {
            write!($formatter, " {}:\"{}\"", $log_field, $value)?;
        }
    };
}

macro_rules! log_optional_string_sensitive {
    ($optional_string: expr, $formatter: expr, $log_field: expr) => {
        if $optional_string.is_some() {
            write!($formatter, " {}:<...redacted>", $log_field)?;
        }
    };
}

macro_rules! log_binary_data {
    ($data: expr, $formatter: expr, $log_field: expr) => {
        write!($formatter, " {}:<{} Bytes>", $log_field, $data.len())?;
    };
}

impl fmt::Display for ConnectHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConnectHeader {{")?;
        log_string!(self.protocol_name, f, "protocol_name");
        log_primitive_value!(self.protocol_version, f, "protocol_version");
        log_primitive_value!(self.clean_session, f, "clean_session");
        log_primitive_value!(self.will, f, "will");
        log_string!(quality_of_service_to_str(self.will_qos), f, "will_qos");
        log_primitive_value!(self.will_retain, f, "will_retain");
        log_primitive_value!(self.username, f, "username");
        log_primitive_value!(self.password, f, "password");
        log_primitive_value!(self.keep_alive_seconds, f, "keep_alive_seconds");
        write!(f, " }}")
    }
}

impl fmt::Display for ConnectPayload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConnectPayload {{")?;
        log_string!(self.client_id, f, "client_id");
        log_optional_string!(self.will_topic, f, "will_topic", value);
        log_optional_string!(self.will_message, f, "will_message", value);
        log_optional_string!(self.username, f, "username", value);
        log_optional_string_sensitive!(self.password, f, "password");
        write!(f, " }}")
    }
}

impl fmt::Display for VariableHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VariableHeader::Connect(header) => { write!(f, "{}", header) }
            VariableHeader::Connack(header) => {
                write!(f, "ConnackHeader {{")?;
                log_string!(connect_return_code_to_str(header.return_code), f, "return_code");
                log_primitive_value!(connect_return_code_to_u8(header.return_code), f, "return_code_value");
                write!(f, " }}")
            }
            VariableHeader::Publish(header) => {
                write!(f, "PublishHeader {{")?;
                log_string!(header.topic_name, f, "topic_name");
                log_optional_primitive_value!(header.packet_id, f, "packet_id", value);
                write!(f, " }}")
            }
            VariableHeader::Pingreq | VariableHeader::Pingresp | VariableHeader::Disconnect => {
                write!(f, "EmptyHeader {{ }}")
            }
            _ => {
                write!(f, "PacketIdHeader {{")?;
                log_optional_primitive_value!(self.packet_id(), f, "packet_id", value);
                write!(f, " }}")
            }
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Payload::Connect(payload) => { write!(f, "{}", payload) }
            Payload::Publish(bytes) => {
                write!(f, "PublishPayload {{")?;
                log_binary_data!(bytes, f, "payload");
                write!(f, " }}")
            }
            Payload::Subscribe(subscriptions) => {
                write!(f, "SubscribePayload {{ subscriptions: [")?;
                for (i, subscription) in subscriptions.iter().enumerate() {
                    write!(f, " {}: (\"{}\", {})", i, subscription.topic_filter, quality_of_service_to_str(subscription.qos))?;
                }
                write!(f, " ] }}")
            }
            Payload::Unsubscribe(topic_filters) => {
                write!(f, "UnsubscribePayload {{ topic_filters: [")?;
                for (i, topic_filter) in topic_filters.iter().enumerate() {
                    write!(f, " {}: \"{}\"", i, topic_filter)?;
                }
                write!(f, " ] }}")
            }
            Payload::Suback(granted) => {
                write!(f, "SubackPayload {{ granted_qos: [")?;
                for (i, qos) in granted.iter().enumerate() {
                    write!(f, " {}: {}", i, quality_of_service_to_str(*qos))?;
                }
                write!(f, " ] }}")
            }
            Payload::Empty => {
                write!(f, "EmptyPayload {{ }}")
            }
            Payload::Raw(bytes) => {
                write!(f, "RawPayload {{")?;
                log_binary_data!(bytes, f, "payload");
                write!(f, " }}")
            }
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}Message {{ {} {} {} }}", self.message_type(), self.fixed_header(), self.variable_header(), self.payload())
    }
}

fn get_message_type_for_logging(message: &Message) -> &'static str {
    match message.message_type() {
        MessageType::Connect => { "ConnectMessage{...}" }
        MessageType::Connack => { "ConnackMessage{...}" }
        MessageType::Publish => { "PublishMessage{...}" }
        MessageType::Puback => { "PubackMessage{...}" }
        MessageType::Pubrec => { "PubrecMessage{...}" }
        MessageType::Pubrel => { "PubrelMessage{...}" }
        MessageType::Pubcomp => { "PubcompMessage{...}" }
        MessageType::Subscribe => { "SubscribeMessage{...}" }
        MessageType::Suback => { "SubackMessage{...}" }
        MessageType::Unsubscribe => { "UnsubscribeMessage{...}" }
        MessageType::Unsuback => { "UnsubackMessage{...}" }
        MessageType::Pingreq => { "PingreqMessage{...}" }
        MessageType::Pingresp => { "PingrespMessage{...}" }
        MessageType::Disconnect => { "DisconnectMessage{...}" }
    }
}

pub(crate) fn log_message(prefix: &str, message: &Message) {
    let level = log::max_level();
    match level {
        LevelFilter::Info => {
            info!("{}{}", prefix, get_message_type_for_logging(message));
        }
        LevelFilter::Debug | LevelFilter::Trace => {
            debug!("{}{}", prefix, message);
        }
        _ => {}
    }
}
