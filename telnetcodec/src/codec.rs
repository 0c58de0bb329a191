//
// Copyright 2017-2026 VSPC Contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use std::collections::VecDeque;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::consts::{DO, DONT, IAC, SB, SE, WILL, WONT};
use crate::error::CodecError;
use crate::event::{NegotiationVerb, TelnetCommand, TelnetEvent};

/// Upper bound on a buffered sub-negotiation payload. No VMware extension
/// message needs anywhere near this much (the largest is a VM name), so a
/// peer that opens `IAC SB` and never sends `IAC SE` is misbehaving rather
/// than sending a legitimately large payload.
pub const MAX_SUBNEGOTIATION_LEN: usize = 8192;

/// Where the decoder is within an in-flight multi-byte construct. Mirrors
/// the byte-by-byte state machine in spec.md §3/§4.1.
#[derive(Debug, Default)]
enum DecoderState {
    /// Consuming application data, watching for `IAC`.
    #[default]
    Normal,
    /// Just consumed an `IAC`; the next byte decides what follows.
    IacSeen,
    /// Just consumed `IAC <verb>`; the next byte is the option.
    OptionCommandSeen(NegotiationVerb),
    /// Inside `IAC SB ... `, accumulating the sub-negotiation payload.
    Subnegotiation(BytesMut),
    /// Inside a sub-negotiation, just consumed an `IAC`; the next byte is
    /// either an escaped `0xFF`, a terminating `SE`, or a protocol error.
    SubnegotiationIac(BytesMut),
}

/// Decodes a raw telnet byte stream into [`TelnetEvent`]s and encodes
/// [`TelnetCommand`]s back into wire bytes.
///
/// Only the option set this server negotiates (`BINARY`, `SUPPRESS_GO_AHEAD`,
/// `VMWARE_EXT`) and the generic framing rules apply; there is no Q-method
/// negotiation state machine here because the server's own policy (in the
/// owning crate) decides how to reply to every `Negotiate` event it sees.
#[derive(Debug, Default)]
pub struct TelnetCodec {
    state: DecoderState,
    /// Contiguous data bytes accumulated since the last non-`Data` event,
    /// not yet queued.
    data_run: BytesMut,
    /// Fully formed events waiting to be handed out one at a time, since a
    /// single `decode` call may resolve more than one event from its input.
    queue: VecDeque<TelnetEvent>,
}

impl TelnetCodec {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush_data_run(&mut self) {
        if !self.data_run.is_empty() {
            let chunk = self.data_run.split().freeze();
            self.queue.push_back(TelnetEvent::Data(chunk));
        }
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetEvent;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(event));
            }

            if !src.has_remaining() {
                self.flush_data_run();
                return Ok(self.queue.pop_front());
            }

            let byte = src.get_u8();
            let state = std::mem::take(&mut self.state);

            self.state = match state {
                DecoderState::Normal => {
                    if byte == IAC {
                        DecoderState::IacSeen
                    } else {
                        self.data_run.put_u8(byte);
                        DecoderState::Normal
                    }
                }
                DecoderState::IacSeen => match byte {
                    IAC => {
                        self.data_run.put_u8(IAC);
                        DecoderState::Normal
                    }
                    DO | DONT | WILL | WONT => {
                        self.flush_data_run();
                        let verb = NegotiationVerb::from_byte(byte)
                            .expect("byte matched DO|DONT|WILL|WONT above");
                        DecoderState::OptionCommandSeen(verb)
                    }
                    SB => {
                        self.flush_data_run();
                        DecoderState::Subnegotiation(BytesMut::new())
                    }
                    other => {
                        self.flush_data_run();
                        tracing::warn!(command = other, "dropping unrecognized telnet command");
                        self.queue.push_back(TelnetEvent::Command(other));
                        DecoderState::Normal
                    }
                },
                DecoderState::OptionCommandSeen(verb) => {
                    self.queue.push_back(TelnetEvent::Negotiate(verb, byte));
                    DecoderState::Normal
                }
                DecoderState::Subnegotiation(mut buf) => {
                    if byte == IAC {
                        DecoderState::SubnegotiationIac(buf)
                    } else {
                        if buf.len() >= MAX_SUBNEGOTIATION_LEN {
                            return Err(CodecError::SubnegotiationTooLong(MAX_SUBNEGOTIATION_LEN));
                        }
                        buf.put_u8(byte);
                        DecoderState::Subnegotiation(buf)
                    }
                }
                DecoderState::SubnegotiationIac(mut buf) => match byte {
                    IAC => {
                        if buf.len() >= MAX_SUBNEGOTIATION_LEN {
                            return Err(CodecError::SubnegotiationTooLong(MAX_SUBNEGOTIATION_LEN));
                        }
                        buf.put_u8(IAC);
                        DecoderState::Subnegotiation(buf)
                    }
                    SE => {
                        let payload = buf.freeze();
                        self.queue.push_back(TelnetEvent::Subnegotiation(payload));
                        DecoderState::Normal
                    }
                    other => {
                        return Err(CodecError::MalformedSubnegotiation(other));
                    }
                },
            };
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode(src)
    }
}

impl Encoder<TelnetCommand> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: TelnetCommand, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            TelnetCommand::Negotiate(verb, option) => {
                dst.reserve(3);
                dst.put_u8(IAC);
                dst.put_u8(verb.to_byte());
                dst.put_u8(option);
            }
            TelnetCommand::Subnegotiation(payload) => {
                dst.reserve(payload.len() + 5);
                dst.put_u8(IAC);
                dst.put_u8(SB);
                encode_escaped(&payload, dst);
                dst.put_u8(IAC);
                dst.put_u8(SE);
            }
        }
        Ok(())
    }
}

/// Writes `payload` into `dst`, doubling every `0xFF` byte so it survives
/// the enclosing `IAC SB ... IAC SE` wrapper.
fn encode_escaped(payload: &Bytes, dst: &mut BytesMut) {
    for &byte in payload.iter() {
        if byte == IAC {
            dst.put_u8(IAC);
        }
        dst.put_u8(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut TelnetCodec, input: &[u8]) -> Vec<TelnetEvent> {
        let mut buf = BytesMut::from(input);
        let mut events = Vec::new();
        while let Some(event) = codec.decode(&mut buf).expect("decode") {
            events.push(event);
        }
        events
    }

    #[test]
    fn plain_data_passes_through_untouched() {
        let mut codec = TelnetCodec::new();
        let events = decode_all(&mut codec, b"hello world");
        assert_eq!(events, vec![TelnetEvent::Data(Bytes::from_static(b"hello world"))]);
    }

    #[test]
    fn iac_iac_collapses_to_a_single_0xff_within_data() {
        let mut codec = TelnetCodec::new();
        let events = decode_all(&mut codec, &[b'a', IAC, IAC, b'b']);
        assert_eq!(events, vec![TelnetEvent::Data(Bytes::from_static(b"a\xffb"))]);
    }

    #[test]
    fn negotiation_is_recognized_and_splits_surrounding_data() {
        let mut codec = TelnetCodec::new();
        let events = decode_all(&mut codec, &[b'x', IAC, DO, 0, b'y']);
        assert_eq!(
            events,
            vec![
                TelnetEvent::Data(Bytes::from_static(b"x")),
                TelnetEvent::Negotiate(NegotiationVerb::Do, 0),
                TelnetEvent::Data(Bytes::from_static(b"y")),
            ]
        );
    }

    #[test]
    fn subnegotiation_payload_is_extracted_with_escapes_collapsed() {
        let mut codec = TelnetCodec::new();
        let input = vec![IAC, SB, 232, 1, IAC, IAC, 0xAB, IAC, SE];
        let events = decode_all(&mut codec, &input);
        assert_eq!(
            events,
            vec![TelnetEvent::Subnegotiation(Bytes::from_static(&[232, 1, 0xFF, 0xAB]))]
        );
    }

    #[test]
    fn byte_after_escaped_iac_inside_subnegotiation_must_be_iac_or_se() {
        let mut codec = TelnetCodec::new();
        let mut buf = BytesMut::from(&[IAC, SB, 232, 0, IAC, DO][..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::MalformedSubnegotiation(DO)));
    }

    #[test]
    fn runaway_subnegotiation_errors_instead_of_growing_without_bound() {
        let mut codec = TelnetCodec::new();
        let mut buf = BytesMut::new();
        buf.put_u8(IAC);
        buf.put_u8(SB);
        buf.extend(std::iter::repeat(b'x').take(MAX_SUBNEGOTIATION_LEN));
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::SubnegotiationTooLong(MAX_SUBNEGOTIATION_LEN)));
    }

    #[test]
    fn decode_is_incremental_across_partial_buffers() {
        let mut codec = TelnetCodec::new();
        let mut buf = BytesMut::from(&[b'a', IAC][..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(&[DO, 0]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(TelnetEvent::Data(Bytes::from_static(b"a")))
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(TelnetEvent::Negotiate(NegotiationVerb::Do, 0))
        );
    }

    #[test]
    fn encode_negotiate_round_trips_through_decode() {
        let mut codec = TelnetCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(TelnetCommand::Negotiate(NegotiationVerb::Will, 232), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &[IAC, WILL, 232]);
        let events = decode_all(&mut TelnetCodec::new(), &buf);
        assert_eq!(events, vec![TelnetEvent::Negotiate(NegotiationVerb::Will, 232)]);
    }

    #[test]
    fn encode_subnegotiation_escapes_embedded_0xff() {
        let mut codec = TelnetCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(
                TelnetCommand::Subnegotiation(Bytes::from_static(&[232, 1, 0xFF])),
                &mut buf,
            )
            .unwrap();
        assert_eq!(&buf[..], &[IAC, SB, 232, 1, IAC, IAC, IAC, SE]);
    }
}
