/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
Configuration for the streaming decoder and for connect messages built by the message factory.
 */

use crate::encode::utils::MAXIMUM_VARIABLE_LENGTH_INTEGER;
use crate::mqtt::*;

/// Which side of a connection the decoder sits on.  Restricts the set of message types that
/// will be accepted.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum DecodeRole {

    /// Accept every message type.
    #[default]
    Any,

    /// Accept only the message types a server sends to a client.
    Client,

    /// Accept only the message types a client sends to a server.
    Broker,
}

impl DecodeRole {

    /// Returns whether or not a decoder in this role accepts messages of the given type
    pub fn accepts(&self, message_type: MessageType) -> bool {
        match self {
            DecodeRole::Any => { true }
            DecodeRole::Client => {
                !matches!(message_type, MessageType::Connect | MessageType::Subscribe | MessageType::Unsubscribe | MessageType::Pingreq | MessageType::Disconnect)
            }
            DecodeRole::Broker => {
                !matches!(message_type, MessageType::Connack | MessageType::Suback | MessageType::Unsuback | MessageType::Pingresp)
            }
        }
    }
}

/// Configuration options for a streaming [`Decoder`](crate::decode::Decoder).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecoderOptions {

    pub(crate) maximum_packet_size: u32,

    pub(crate) role: DecodeRole,
}

impl DecoderOptions {

    /// Returns the largest packet, in total bytes, the decoder will accept
    pub fn maximum_packet_size(&self) -> u32 { self.maximum_packet_size }

    /// Returns the role that determines which message types are accepted
    pub fn role(&self) -> DecodeRole { self.role }
}

impl Default for DecoderOptions {

    /// Accepts every message type, up to the largest packet the protocol can describe.
    fn default() -> Self {
        DecoderOptions {
            maximum_packet_size: (MAXIMUM_VARIABLE_LENGTH_INTEGER + 5) as u32,
            role: DecodeRole::Any,
        }
    }
}

/// A builder for streaming decoder options.
#[derive(Debug, Default)]
pub struct DecoderOptionsBuilder {
    options: DecoderOptions
}

impl DecoderOptionsBuilder {

    /// Creates a new builder object for DecoderOptions
    pub fn new() -> Self {
        DecoderOptionsBuilder {
            ..Default::default()
        }
    }

    /// Sets the largest packet, in total bytes including the fixed header, that the decoder will
    /// accept.  A value of zero means no limit beyond the protocol's own.
    pub fn with_maximum_packet_size(&mut self, maximum_packet_size: u32) -> &mut Self {
        self.options.maximum_packet_size = maximum_packet_size;
        self
    }

    /// Restricts the decoder to the message types received by one side of a connection
    pub fn with_role(&mut self, role: DecodeRole) -> &mut Self {
        self.options.role = role;
        self
    }

    /// Builds a new set of DecoderOptions
    pub fn build(&self) -> DecoderOptions {
        self.options
    }
}

pub(crate) const DEFAULT_KEEP_ALIVE_SECONDS : u32 = 60;

/// Configuration options that determine the field values of Connect messages built by
/// [`MessageFactory::new_connect`](crate::factory::MessageFactory::new_connect).
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {

    pub(crate) clean_session: bool,

    pub(crate) keep_alive_seconds: u32,

    pub(crate) will: bool,

    pub(crate) will_qos: QualityOfService,

    pub(crate) will_retain: bool,

    pub(crate) will_topic: String,

    pub(crate) will_message: String,

    pub(crate) username: String,

    pub(crate) password: String,
}

impl ConnectOptions {

    /// Returns the configured keep alive interval, in seconds
    pub fn keep_alive_seconds(&self) -> u32 { self.keep_alive_seconds }

    /// Returns whether or not a will message will be registered
    pub fn will(&self) -> bool { self.will && !self.will_topic.is_empty() }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions {
            clean_session: true,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE_SECONDS,
            will: false,
            will_qos: QualityOfService::AtMostOnce,
            will_retain: false,
            will_topic: String::new(),
            will_message: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// A builder for connect message options.
#[derive(Debug, Default)]
pub struct ConnectOptionsBuilder {
    options: ConnectOptions
}

impl ConnectOptionsBuilder {

    /// Creates a new builder object for ConnectOptions
    pub fn new() -> Self {
        ConnectOptionsBuilder {
            ..Default::default()
        }
    }

    /// Creates a new builder object using an existing ConnectOptions value as a starting point
    pub fn new_from_existing(options: ConnectOptions) -> Self {
        ConnectOptionsBuilder {
            options
        }
    }

    /// Sets whether the server should discard any previous session state for the client
    pub fn with_clean_session(&mut self, clean_session: bool) -> &mut Self {
        self.options.clean_session = clean_session;
        self
    }

    /// Sets the maximum interval, in seconds, between client transmissions.  Values larger than
    /// 65535 cannot be encoded and cause message construction to fail.
    pub fn with_keep_alive_seconds(&mut self, keep_alive_seconds: u32) -> &mut Self {
        self.options.keep_alive_seconds = keep_alive_seconds;
        self
    }

    /// Registers a will message to be published by the server if the client disconnects
    /// ungracefully.  An empty topic disables the will.
    pub fn with_will(&mut self, topic: &str, message: &str, qos: QualityOfService, retain: bool) -> &mut Self {
        self.options.will = true;
        self.options.will_topic = topic.to_string();
        self.options.will_message = message.to_string();
        self.options.will_qos = qos;
        self.options.will_retain = retain;
        self
    }

    /// Sets the user name the server may use for authentication
    pub fn with_username(&mut self, username: &str) -> &mut Self {
        self.options.username = username.to_string();
        self
    }

    /// Sets the password the server may use for authentication
    pub fn with_password(&mut self, password: &str) -> &mut Self {
        self.options.password = password.to_string();
        self
    }

    /// Builds a new set of ConnectOptions
    pub fn build(&self) -> ConnectOptions {
        self.options.clone()
    }
}
