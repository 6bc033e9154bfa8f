/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
A module containing the core crate error enumeration, context structures, and conversion
definitions.
 */

use crate::mqtt::MessageType;

use std::error::Error;
use std::fmt;

/// Additional details about a MalformedVarint error variant
#[derive(Debug)]
pub struct MalformedVarintContext {
}

/// Additional details about an UnknownMessageType error variant
#[derive(Debug)]
pub struct UnknownMessageTypeContext {

    /// value of the message type nibble that was not recognized
    pub message_type: u8,
}

/// Additional details about an InvalidQos error variant
#[derive(Debug)]
pub struct InvalidQosContext {

    /// the two-bit (or full byte) value that does not map to a quality of service
    pub value: u8,
}

/// Additional details about a TruncatedBuffer error variant
#[derive(Debug)]
pub struct TruncatedBufferContext {

    /// number of bytes the decode step required
    pub needed: usize,

    /// number of bytes that were actually available
    pub available: usize,
}

/// Additional details about a ProtocolMismatch error variant
#[derive(Debug)]
pub struct ProtocolMismatchContext {

    /// protocol name found in the Connect variable header
    pub protocol_name: String,

    /// protocol version found in the Connect variable header
    pub protocol_version: u8,
}

/// Additional details about an OutOfRange error variant
#[derive(Debug)]
pub struct OutOfRangeContext {
    source: Box<dyn Error + Send + Sync + 'static>
}

/// Additional details about an UnsupportedDecode error variant
#[derive(Debug)]
pub struct UnsupportedDecodeContext {

    /// type of message that the decoder was configured not to accept
    pub message_type: MessageType,
}

/// Additional details about a DecodingFailure error variant
#[derive(Debug)]
pub struct DecodingFailureContext {
    source: Box<dyn Error + Send + Sync + 'static>
}

/// Additional details about a MessageValidation error variant
#[derive(Debug)]
pub struct MessageValidationContext {

    /// type of message that failed validation
    pub message_type: MessageType,

    source: Box<dyn Error + Send + Sync + 'static>
}

/// Basic error type for the entire mqisdp-codec crate.
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecError {

    /// A remaining length field still had its continuation bit set on the fourth byte.
    MalformedVarint(MalformedVarintContext),

    /// The type nibble of a control byte is not one of the fourteen assigned message types.
    UnknownMessageType(UnknownMessageTypeContext),

    /// A quality of service field held the reserved value 3 (or a subscription/grant byte held
    /// a value larger than 2).
    InvalidQos(InvalidQosContext),

    /// A decode step needed more bytes than the packet (or the input) contained.
    TruncatedBuffer(TruncatedBufferContext),

    /// A Connect packet named a protocol or version other than MQIsdp v3.
    ProtocolMismatch(ProtocolMismatchContext),

    /// An in-memory value is too large for its wire representation.  Always a caller error,
    /// never the result of decoding untrusted input.
    OutOfRange(OutOfRangeContext),

    /// The decoder was configured to reject this message type.
    UnsupportedDecode(UnsupportedDecodeContext),

    /// Error encountered while attempting to decode a packet that does not fall into a more
    /// specific category.  Examples include invalid utf-8, unexpected trailing bytes, and
    /// packets larger than the configured maximum.
    DecodingFailure(DecodingFailureContext),

    /// A message was constructed from a variable header and payload that do not agree with
    /// one another or with the fixed header flags.
    MessageValidation(MessageValidationContext),
}

impl CodecError {

    pub(crate) fn new_malformed_varint() -> Self {
        CodecError::MalformedVarint(
            MalformedVarintContext {
            }
        )
    }

    pub(crate) fn new_unknown_message_type(message_type: u8) -> Self {
        CodecError::UnknownMessageType(
            UnknownMessageTypeContext {
                message_type
            }
        )
    }

    pub(crate) fn new_invalid_qos(value: u8) -> Self {
        CodecError::InvalidQos(
            InvalidQosContext {
                value
            }
        )
    }

    pub(crate) fn new_truncated_buffer(needed: usize, available: usize) -> Self {
        CodecError::TruncatedBuffer(
            TruncatedBufferContext {
                needed,
                available
            }
        )
    }

    pub(crate) fn new_protocol_mismatch(protocol_name: &str, protocol_version: u8) -> Self {
        CodecError::ProtocolMismatch(
            ProtocolMismatchContext {
                protocol_name: protocol_name.to_string(),
                protocol_version
            }
        )
    }

    pub(crate) fn new_out_of_range(source: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        CodecError::OutOfRange(
            OutOfRangeContext {
                source : source.into()
            }
        )
    }

    pub(crate) fn new_unsupported_decode(message_type: MessageType) -> Self {
        CodecError::UnsupportedDecode(
            UnsupportedDecodeContext {
                message_type
            }
        )
    }

    pub(crate) fn new_decoding_failure(source: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        CodecError::DecodingFailure(
            DecodingFailureContext {
                source : source.into()
            }
        )
    }

    pub(crate) fn new_message_validation(message_type: MessageType, source: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        CodecError::MessageValidation(
            MessageValidationContext {
                message_type,
                source : source.into()
            }
        )
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::OutOfRange(context) => {
                Some(context.source.as_ref())
            }
            CodecError::DecodingFailure(context) => {
                Some(context.source.as_ref())
            }
            CodecError::MessageValidation(context) => {
                Some(context.source.as_ref())
            }
            _ => { None }
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::MalformedVarint(_) => {
                write!(f, "remaining length field exceeds the four byte maximum")
            }
            CodecError::UnknownMessageType(context) => {
                write!(f, "unknown message type ({}) in control byte", context.message_type)
            }
            CodecError::InvalidQos(context) => {
                write!(f, "invalid quality of service value ({})", context.value)
            }
            CodecError::TruncatedBuffer(context) => {
                write!(f, "buffer too short: needed {} bytes but only {} were available", context.needed, context.available)
            }
            CodecError::ProtocolMismatch(context) => {
                write!(f, "unexpected protocol \"{}\" version {} in connect header", context.protocol_name, context.protocol_version)
            }
            CodecError::OutOfRange(_) => {
                write!(f, "value too large for its wire representation; source contains further details")
            }
            CodecError::UnsupportedDecode(context) => {
                write!(f, "decoding of {} messages is not supported by this decoder", context.message_type)
            }
            CodecError::DecodingFailure(_) => {
                write!(f, "failure encountered while decoding an incoming packet; source contains further details")
            }
            CodecError::MessageValidation(context) => {
                write!(f, "{} message is internally inconsistent; source contains further details", context.message_type)
            }
        }
    }
}

impl From<core::str::Utf8Error> for CodecError {
    fn from(err: core::str::Utf8Error) -> Self {
        CodecError::new_decoding_failure(err)
    }
}

/// Crate-wide result type for functions that can fail
pub type CodecResult<T> = Result<T, CodecError>;
