/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
Wire-format encoder and decoder for MQTT 3.1 (protocol name `MQIsdp`, version 3).

Messages are built with [`MessageFactory`] or [`Message::new`], serialized with [`encode`], and
parsed with [`decode`].  Transports reading from a socket can use [`packet_length`] to decide how
many bytes to buffer, or hand every chunk to a streaming [`Decoder`].

```
use mqisdp_codec::*;

let factory = MessageFactory::new();
let message = factory.new_publish("sensors/temperature", b"21.5", QualityOfService::AtLeastOnce, false)?;

let bytes = encode(&message)?;
assert_eq!(message, decode(&bytes)?);
# Ok::<(), CodecError>(())
```
 */

pub mod config;
pub mod decode;
mod encode;
pub mod error;
pub mod factory;
mod logging;
pub mod mqtt;

/* Re-export the commonly used types at the root level */
pub use config::{ConnectOptions, ConnectOptionsBuilder, DecodeRole, DecoderOptions, DecoderOptionsBuilder};
pub use decode::{Decoder, VariableHeaderContext, decode_payload, decode_variable_header, packet_length};
pub use decode::utils::{decode_remaining_length, join_u16};
pub use encode::utils::{compute_variable_length_integer_encode_size, split_u16, MAXIMUM_VARIABLE_LENGTH_INTEGER};
pub use error::{CodecError, CodecResult};
pub use factory::{IdentifierCounter, MessageFactory};
pub use mqtt::*;

/// Serializes a message to its exact wire representation.
///
/// Fails only when a field is too large for its wire width.
pub fn encode(message: &Message) -> CodecResult<Vec<u8>> {
    encode::encode_message(message)
}

/// Decodes the message at the front of `bytes`.  Bytes past the end of that message belong to
/// the next packet and are ignored.
pub fn decode(bytes: &[u8]) -> CodecResult<Message> {
    let (message, _) = decode::decode_message(bytes)?;
    Ok(message)
}

/// Decodes the message at the front of `bytes` and also returns the number of bytes it occupied.
pub fn decode_with_length(bytes: &[u8]) -> CodecResult<(Message, usize)> {
    decode::decode_message(bytes)
}
