/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
Module containing miscellaneous constants and conversion functions related to the protocol's
wire representation.
 */

use crate::error::{CodecError, CodecResult};
use crate::mqtt::*;

pub(crate) const MESSAGE_TYPE_CONNECT: u8 = 1;
pub(crate) const MESSAGE_TYPE_CONNACK: u8 = 2;
pub(crate) const MESSAGE_TYPE_PUBLISH: u8 = 3;
pub(crate) const MESSAGE_TYPE_PUBACK: u8 = 4;
pub(crate) const MESSAGE_TYPE_PUBREC: u8 = 5;
pub(crate) const MESSAGE_TYPE_PUBREL: u8 = 6;
pub(crate) const MESSAGE_TYPE_PUBCOMP: u8 = 7;
pub(crate) const MESSAGE_TYPE_SUBSCRIBE: u8 = 8;
pub(crate) const MESSAGE_TYPE_SUBACK: u8 = 9;
pub(crate) const MESSAGE_TYPE_UNSUBSCRIBE: u8 = 10;
pub(crate) const MESSAGE_TYPE_UNSUBACK: u8 = 11;
pub(crate) const MESSAGE_TYPE_PINGREQ: u8 = 12;
pub(crate) const MESSAGE_TYPE_PINGRESP: u8 = 13;
pub(crate) const MESSAGE_TYPE_DISCONNECT: u8 = 14;

pub(crate) const FIXED_HEADER_MESSAGE_TYPE_MASK : u8 = 0x0F;
pub(crate) const FIXED_HEADER_DUP_FLAG : u8 = 1 << 4;
pub(crate) const FIXED_HEADER_QOS_SHIFT : u8 = 5;
pub(crate) const FIXED_HEADER_RETAIN_FLAG : u8 = 1 << 7;
pub(crate) const QOS_MASK : u8 = 3;

pub(crate) const CONNECT_FLAGS_CLEAN_SESSION_MASK : u8 = 1 << 1;
pub(crate) const CONNECT_FLAGS_WILL_MASK : u8 = 1 << 2;
pub(crate) const CONNECT_FLAGS_WILL_QOS_SHIFT : u8 = 3;
pub(crate) const CONNECT_FLAGS_WILL_RETAIN_MASK : u8 = 1 << 5;
pub(crate) const CONNECT_FLAGS_PASSWORD_MASK : u8 = 1 << 6;
pub(crate) const CONNECT_FLAGS_USERNAME_MASK : u8 = 1 << 7;

/// Converts a control byte type nibble into a message type
pub fn convert_u8_to_message_type(value: u8) -> CodecResult<MessageType> {
    match value {
        MESSAGE_TYPE_CONNECT => { Ok(MessageType::Connect) }
        MESSAGE_TYPE_CONNACK => { Ok(MessageType::Connack) }
        MESSAGE_TYPE_PUBLISH => { Ok(MessageType::Publish) }
        MESSAGE_TYPE_PUBACK => { Ok(MessageType::Puback) }
        MESSAGE_TYPE_PUBREC => { Ok(MessageType::Pubrec) }
        MESSAGE_TYPE_PUBREL => { Ok(MessageType::Pubrel) }
        MESSAGE_TYPE_PUBCOMP => { Ok(MessageType::Pubcomp) }
        MESSAGE_TYPE_SUBSCRIBE => { Ok(MessageType::Subscribe) }
        MESSAGE_TYPE_SUBACK => { Ok(MessageType::Suback) }
        MESSAGE_TYPE_UNSUBSCRIBE => { Ok(MessageType::Unsubscribe) }
        MESSAGE_TYPE_UNSUBACK => { Ok(MessageType::Unsuback) }
        MESSAGE_TYPE_PINGREQ => { Ok(MessageType::Pingreq) }
        MESSAGE_TYPE_PINGRESP => { Ok(MessageType::Pingresp) }
        MESSAGE_TYPE_DISCONNECT => { Ok(MessageType::Disconnect) }
        _ => {
            error!("Packet Decode - Unknown message type ({})", value);
            Err(CodecError::new_unknown_message_type(value))
        }
    }
}

/// Converts an integer into a quality of service value
pub fn convert_u8_to_quality_of_service(value: u8) -> CodecResult<QualityOfService> {
    match value {
        0 => { Ok(QualityOfService::AtMostOnce) }
        1 => { Ok(QualityOfService::AtLeastOnce) }
        2 => { Ok(QualityOfService::ExactlyOnce) }
        _ => {
            error!("Packet Decode - Invalid quality of service value ({})", value);
            Err(CodecError::new_invalid_qos(value))
        }
    }
}

/// Converts a Connack return code byte into a connect return code.  Unassigned values are
/// kept as [`ConnectReturnCode::Other`].
pub fn convert_u8_to_connect_return_code(value: u8) -> ConnectReturnCode {
    match value {
        0 => { ConnectReturnCode::Accepted }
        1 => { ConnectReturnCode::UnacceptableProtocolVersion }
        2 => { ConnectReturnCode::IdentifierRejected }
        3 => { ConnectReturnCode::ServerUnavailable }
        4 => { ConnectReturnCode::BadUsernameOrPassword }
        5 => { ConnectReturnCode::NotAuthorized }
        _ => { ConnectReturnCode::Other(value) }
    }
}

pub(crate) fn connect_return_code_to_u8(return_code: ConnectReturnCode) -> u8 {
    match return_code {
        ConnectReturnCode::Accepted => { 0 }
        ConnectReturnCode::UnacceptableProtocolVersion => { 1 }
        ConnectReturnCode::IdentifierRejected => { 2 }
        ConnectReturnCode::ServerUnavailable => { 3 }
        ConnectReturnCode::BadUsernameOrPassword => { 4 }
        ConnectReturnCode::NotAuthorized => { 5 }
        ConnectReturnCode::Other(value) => { value }
    }
}

pub(crate) fn message_type_to_str(message_type: MessageType) -> &'static str {
    match message_type {
        MessageType::Connect => { "Connect" }
        MessageType::Connack => { "Connack" }
        MessageType::Publish => { "Publish" }
        MessageType::Puback => { "Puback" }
        MessageType::Pubrec => { "Pubrec" }
        MessageType::Pubrel => { "Pubrel" }
        MessageType::Pubcomp => { "Pubcomp" }
        MessageType::Subscribe => { "Subscribe" }
        MessageType::Suback => { "Suback" }
        MessageType::Unsubscribe => { "Unsubscribe" }
        MessageType::Unsuback => { "Unsuback" }
        MessageType::Pingreq => { "Pingreq" }
        MessageType::Pingresp => { "Pingresp" }
        MessageType::Disconnect => { "Disconnect" }
    }
}

pub(crate) fn quality_of_service_to_str(qos: QualityOfService) -> &'static str {
    match qos {
        QualityOfService::AtMostOnce => { "0 (AtMostOnce)" }
        QualityOfService::AtLeastOnce => { "1 (AtLeastOnce)" }
        QualityOfService::ExactlyOnce => { "2 (ExactlyOnce)" }
    }
}

pub(crate) fn connect_return_code_to_str(return_code: ConnectReturnCode) -> &'static str {
    match return_code {
        ConnectReturnCode::Accepted => { "Accepted" }
        ConnectReturnCode::UnacceptableProtocolVersion => { "UnacceptableProtocolVersion" }
        ConnectReturnCode::IdentifierRejected => { "IdentifierRejected" }
        ConnectReturnCode::ServerUnavailable => { "ServerUnavailable" }
        ConnectReturnCode::BadUsernameOrPassword => { "BadUsernameOrPassword" }
        ConnectReturnCode::NotAuthorized => { "NotAuthorized" }
        ConnectReturnCode::Other(_) => { "Other" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn message_type_conversions() {
        for value in 1..=14u8 {
            let message_type = convert_u8_to_message_type(value).unwrap();
            assert_eq!(value, message_type as u8);
        }

        assert_matches!(convert_u8_to_message_type(0), Err(CodecError::UnknownMessageType(context)) => {
            assert_eq!(0, context.message_type);
        });
        assert_matches!(convert_u8_to_message_type(15), Err(CodecError::UnknownMessageType(_)));
    }

    #[test]
    fn quality_of_service_conversions() {
        assert_eq!(QualityOfService::AtMostOnce, convert_u8_to_quality_of_service(0).unwrap());
        assert_eq!(QualityOfService::AtLeastOnce, convert_u8_to_quality_of_service(1).unwrap());
        assert_eq!(QualityOfService::ExactlyOnce, convert_u8_to_quality_of_service(2).unwrap());
        assert_matches!(convert_u8_to_quality_of_service(3), Err(CodecError::InvalidQos(context)) => {
            assert_eq!(3, context.value);
        });
    }

    #[test]
    fn connect_return_code_conversions() {
        for value in 0..=255u8 {
            assert_eq!(value, connect_return_code_to_u8(convert_u8_to_connect_return_code(value)));
        }

        assert_eq!(ConnectReturnCode::NotAuthorized, ConnectReturnCode::from(5u8));
        assert_eq!(ConnectReturnCode::Other(6), ConnectReturnCode::from(6u8));
        assert_eq!(200u8, u8::from(ConnectReturnCode::Other(200)));
    }
}
