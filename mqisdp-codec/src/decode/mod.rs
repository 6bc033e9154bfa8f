/*
 * Copyright Bret Ambrose. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

/*!
Decoding of complete messages, either from a single buffer or incrementally from a stream of
arbitrarily fragmented byte chunks.
 */

pub(crate) mod utils;

use crate::config::*;
use crate::encode::utils::*;
use crate::error::{CodecError, CodecResult};
use crate::logging::*;
use crate::mqtt::*;
use crate::mqtt::ack::*;
use crate::mqtt::connack::*;
use crate::mqtt::connect::*;
use crate::mqtt::fixed_header::*;
use crate::mqtt::ping::*;
use crate::mqtt::publish::*;
use crate::mqtt::suback::*;
use crate::mqtt::subscribe::*;
use crate::mqtt::unsubscribe::*;
use crate::mqtt::utils::*;

use log::*;

const DECODE_BUFFER_DEFAULT_SIZE : usize = 16 * 1024;

/// Data from outside a variable header's own bytes that is needed to decode it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct VariableHeaderContext {

    /// Quality of service from the sibling fixed header.  Determines whether or not a Publish
    /// variable header carries a packet id.
    pub qos: QualityOfService,
}

/// Decodes the variable header of a message of the given type from the front of `bytes`.
///
/// Returns the variable header and the number of bytes it occupied.
pub fn decode_variable_header(message_type: MessageType, bytes: &[u8], context: &VariableHeaderContext) -> CodecResult<(VariableHeader, usize)> {
    match message_type {
        MessageType::Connect => { decode_connect_header(bytes) }
        MessageType::Connack => { decode_connack_header(bytes) }
        MessageType::Publish => { decode_publish_header(bytes, context.qos) }
        MessageType::Puback |
        MessageType::Pubrec |
        MessageType::Pubrel |
        MessageType::Pubcomp |
        MessageType::Subscribe |
        MessageType::Suback |
        MessageType::Unsubscribe |
        MessageType::Unsuback => { decode_packet_id_header(message_type, bytes) }
        MessageType::Pingreq |
        MessageType::Pingresp |
        MessageType::Disconnect => { decode_empty_header(message_type) }
    }
}

/// Decodes a payload from all of `bytes`.  The already-decoded sibling variable header selects
/// the payload layout and, for Connect messages, which optional fields are present.
pub fn decode_payload(variable_header: &VariableHeader, bytes: &[u8]) -> CodecResult<Payload> {
    match variable_header {
        VariableHeader::Connect(header) => { decode_connect_payload(header, bytes) }
        VariableHeader::Publish(_) => { Ok(decode_publish_payload(bytes)) }
        VariableHeader::Subscribe(_) => { decode_subscribe_payload(bytes) }
        VariableHeader::Unsubscribe(_) => { decode_unsubscribe_payload(bytes) }
        VariableHeader::Suback(_) => { decode_suback_payload(bytes) }
        _ => { Ok(decode_raw_payload(bytes)) }
    }
}

fn decode_message_body(fixed_header: FixedHeader, body: &[u8]) -> CodecResult<Message> {
    debug!("Decoding a message of type {}", message_type_to_str(fixed_header.message_type));

    let context = VariableHeaderContext {
        qos: fixed_header.qos,
    };

    let (variable_header, consumed) = decode_variable_header(fixed_header.message_type, body, &context)?;
    let payload = decode_payload(&variable_header, &body[consumed..])?;

    Ok(Message::from_decoded_parts(fixed_header, variable_header, payload))
}

/// Decodes one complete message from the front of `bytes`, returning the message and the total
/// number of bytes it occupied.  Bytes past the end of the message are not examined.
pub(crate) fn decode_message(bytes: &[u8]) -> CodecResult<(Message, usize)> {
    let (fixed_header, header_length) = FixedHeader::decode(bytes)?;

    let packet_length = header_length + fixed_header.remaining_length as usize;
    if bytes.len() < packet_length {
        error!("Packet Decode - {} message declares {} body bytes but only {} are available", fixed_header.message_type, fixed_header.remaining_length, bytes.len() - header_length);
        return Err(CodecError::new_truncated_buffer(packet_length, bytes.len()));
    }

    let message = decode_message_body(fixed_header, &bytes[header_length..packet_length])?;
    log_message("Successfully decoded message: ", &message);

    Ok((message, packet_length))
}

/// Returns the total size of the packet at the front of `bytes` once enough bytes are available
/// to decode its fixed header, `Ok(None)` before that.  Transports use this to decide how many
/// bytes to buffer before decoding.
pub fn packet_length(bytes: &[u8]) -> CodecResult<Option<usize>> {
    match try_decode_fixed_header(bytes)? {
        Some((fixed_header, header_length)) => {
            Ok(Some(header_length + fixed_header.remaining_length as usize))
        }
        None => { Ok(None) }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum DecoderState {
    ReadControlByte,
    ReadRemainingLength,
    ReadPacketBody,
    TerminalError
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum DecoderDirective {
    OutOfData,
    Continue,
}

/// Incremental message decoder for a single connection's inbound byte stream.
///
/// Bytes may be supplied in fragments of any size; complete messages are handed back as soon as
/// their final byte arrives.  Any decode failure is terminal until [`Decoder::reset`] is called.
pub struct Decoder {
    options: DecoderOptions,

    state: DecoderState,

    scratch: Vec<u8>,

    fixed_header: Option<FixedHeader>,
}

impl Decoder {

    /// Creates a new decoder with the given configuration
    pub fn new(options: DecoderOptions) -> Decoder {
        Decoder {
            options,
            state: DecoderState::ReadControlByte,
            scratch : Vec::<u8>::with_capacity(DECODE_BUFFER_DEFAULT_SIZE),
            fixed_header : None,
        }
    }

    /// Returns the decoder to its initial state, discarding any partially-read packet and
    /// clearing a terminal error.
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadControlByte;
        self.scratch.clear();
        self.fixed_header = None;
    }

    fn process_read_control_byte<'a>(&mut self, bytes: &'a [u8]) -> CodecResult<(DecoderDirective, &'a[u8])> {
        if bytes.is_empty() {
            return Ok((DecoderDirective::OutOfData, bytes));
        }

        let control_byte = bytes[0];
        let message_type = MessageType::try_from(control_byte & FIXED_HEADER_MESSAGE_TYPE_MASK)?;
        QualityOfService::try_from((control_byte >> FIXED_HEADER_QOS_SHIFT) & QOS_MASK)?;

        if !self.options.role.accepts(message_type) {
            error!("Packet Decode - {} messages are not accepted by a {:?} decoder", message_type, self.options.role);
            return Err(CodecError::new_unsupported_decode(message_type));
        }

        self.scratch.push(control_byte);
        self.state = DecoderState::ReadRemainingLength;

        Ok((DecoderDirective::Continue, &bytes[1..]))
    }

    fn process_read_remaining_length<'a>(&mut self, bytes: &'a[u8]) -> CodecResult<(DecoderDirective, &'a[u8])> {
        if bytes.is_empty() {
            return Ok((DecoderDirective::OutOfData, bytes));
        }

        self.scratch.push(bytes[0]);
        let remaining_bytes = &bytes[1..];

        if let Some((fixed_header, header_length)) = try_decode_fixed_header(&self.scratch)? {
            let mut maximum_size = self.options.maximum_packet_size as usize;
            if maximum_size == 0 {
                maximum_size = MAXIMUM_VARIABLE_LENGTH_INTEGER + 5;
            }

            let total_packet_size = header_length + fixed_header.remaining_length as usize;
            if total_packet_size > maximum_size {
                let message = format!("Packet Decode - {} message size ({}) exceeds the configured maximum ({})", fixed_header.message_type, total_packet_size, maximum_size);
                error!("{}", message);
                return Err(CodecError::new_decoding_failure(message));
            }

            self.fixed_header = Some(fixed_header);
            self.state = DecoderState::ReadPacketBody;
            self.scratch.clear();
        }

        Ok((DecoderDirective::Continue, remaining_bytes))
    }

    fn process_read_packet_body<'a>(&mut self, bytes: &'a[u8], decoded_messages: &mut Vec<Message>) -> CodecResult<(DecoderDirective, &'a[u8])> {
        let fixed_header = match self.fixed_header {
            Some(fixed_header) => { fixed_header }
            None => {
                let message = "Packet Decode - decoder reached the packet body without a fixed header";
                error!("{}", message);
                return Err(CodecError::new_decoding_failure(message));
            }
        };

        let read_so_far = self.scratch.len();
        let bytes_needed = fixed_header.remaining_length as usize - read_so_far;
        if bytes_needed > bytes.len() {
            self.scratch.extend_from_slice(bytes);
            return Ok((DecoderDirective::OutOfData, &[]));
        }

        let message =
            if !self.scratch.is_empty() {
                self.scratch.extend_from_slice(&bytes[..bytes_needed]);
                decode_message_body(fixed_header, &self.scratch)?
            } else {
                decode_message_body(fixed_header, &bytes[..bytes_needed])?
            };

        log_message("Successfully decoded incoming message: ", &message);
        decoded_messages.push(message);

        self.reset();

        Ok((DecoderDirective::Continue, &bytes[bytes_needed..]))
    }

    fn process_bytes(&mut self, bytes: &[u8], decoded_messages: &mut Vec<Message>) -> CodecResult<()> {
        let mut current_slice = bytes;

        let mut directive = DecoderDirective::Continue;
        while directive == DecoderDirective::Continue {
            (directive, current_slice) = match self.state {
                DecoderState::ReadControlByte => { self.process_read_control_byte(current_slice)? }
                DecoderState::ReadRemainingLength => { self.process_read_remaining_length(current_slice)? }
                DecoderState::ReadPacketBody => { self.process_read_packet_body(current_slice, decoded_messages)? }
                DecoderState::TerminalError => {
                    let message = "Packet Decode - decoder is in a terminal error state";
                    error!("{}", message);
                    return Err(CodecError::new_decoding_failure(message));
                }
            };
        }

        Ok(())
    }

    /// Consumes a chunk of inbound bytes, appending every message it completes to
    /// `decoded_messages` in order.  Messages completed before a failure within the same chunk
    /// are still appended.
    pub fn decode_bytes(&mut self, bytes: &[u8], decoded_messages: &mut Vec<Message>) -> CodecResult<()> {
        if let Err(error) = self.process_bytes(bytes, decoded_messages) {
            self.state = DecoderState::TerminalError;
            return Err(error);
        }

        Ok(())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new(DecoderOptions::default())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) fn encode_message_for_test(message: &Message) -> Vec<u8> {
        let encode_result = message.encode();
        assert!(encode_result.is_ok());

        encode_result.unwrap()
    }

    pub(crate) fn do_single_encode_decode_test(message : &Message, decode_size : usize, encode_repetitions : u32) -> bool {
        let mut full_encoded_stream = Vec::with_capacity( 128 * 1024);

        for _ in 0..encode_repetitions {
            full_encoded_stream.extend_from_slice(&encode_message_for_test(message));
        }

        let mut decoder = Decoder::default();
        let mut decoded_messages : Vec<Message> = Vec::new();

        let mut decode_stream_slice = full_encoded_stream.as_slice();
        while !decode_stream_slice.is_empty() {
            let fragment_size : usize = usize::min(decode_size, decode_stream_slice.len());
            let decode_slice = &decode_stream_slice[..fragment_size];
            decode_stream_slice = &decode_stream_slice[fragment_size..];

            let decode_result = decoder.decode_bytes(decode_slice, &mut decoded_messages);
            assert!(decode_result.is_ok());
        }

        let mut matching_messages : u32 = 0;

        for received_message in decoded_messages {
            matching_messages += 1;
            assert_eq!(*message, received_message);
        }

        assert_eq!(encode_repetitions, matching_messages);

        true
    }

    pub(crate) fn do_round_trip_encode_decode_test(message : &Message) -> bool {
        let encoded_bytes = encode_message_for_test(message);

        let (decoded, consumed) = decode_message(&encoded_bytes).unwrap();
        assert_eq!(*message, decoded);
        assert_eq!(encoded_bytes.len(), consumed);
        assert_eq!(Some(encoded_bytes.len()), packet_length(&encoded_bytes).unwrap());

        let decode_fragment_sizes : Vec<usize> = vec!(1, 2, 3, 5, 7, 11, 17, 31, 47, 71, 131, 1023);

        for decode_size in decode_fragment_sizes.iter() {
            assert!(do_single_encode_decode_test(message, *decode_size, 5));
        }

        true
    }

    /*
     * verifies that the message encodes/decodes correctly, but applying the supplied mutator
     * to the encoding leads to a decode failure, both for single-buffer decoding and for
     * the streaming decoder.
     */
    pub(crate) fn do_mutated_decode_failure_test<F>(message: &Message, mutator: F ) where F : Fn(&[u8]) -> Vec<u8> {
        let good_encoded_bytes = encode_message_for_test(message);

        let mut decoder = Decoder::default();

        let mut decoded_messages = Vec::new();
        let decode_result = decoder.decode_bytes(good_encoded_bytes.as_slice(), &mut decoded_messages);
        assert!(decode_result.is_ok());
        assert_eq!(1, decoded_messages.len());
        assert_eq!(*message, decoded_messages[0]);

        let bad_encoded_bytes = mutator(good_encoded_bytes.as_slice());

        assert_ne!(good_encoded_bytes.as_slice(), bad_encoded_bytes.as_slice());

        // verify that the message now fails to decode
        assert!(decode_message(bad_encoded_bytes.as_slice()).is_err());

        decoder.reset();
        assert!(decoder.decode_bytes(bad_encoded_bytes.as_slice(), &mut Vec::new()).is_err());
    }

    pub(crate) fn do_inbound_size_decode_failure_test(message: &Message) {
        let encoded_bytes = encode_message_for_test(message);

        let mut decoder = Decoder::default();
        let mut decoded_messages = Vec::new();
        decoder.decode_bytes(encoded_bytes.as_slice(), &mut decoded_messages).unwrap();
        assert_eq!(1, decoded_messages.len());
        assert_eq!(*message, decoded_messages[0]);

        let options = DecoderOptionsBuilder::new()
            .with_maximum_packet_size((encoded_bytes.len() - 1) as u32)
            .build();

        let mut decoder = Decoder::new(options);
        let decode_result = decoder.decode_bytes(encoded_bytes.as_slice(), &mut Vec::new());
        assert!(matches!(decode_result, Err(CodecError::DecodingFailure(_))));
    }
}
