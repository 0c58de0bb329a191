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

use bytes::Bytes;

/// The direction of an option negotiation command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NegotiationVerb {
    /// Peer requests that we enable an option.
    Do,
    /// Peer requests that we disable an option.
    Dont,
    /// Peer announces it will enable an option.
    Will,
    /// Peer announces it will disable an option.
    Wont,
}

impl NegotiationVerb {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            crate::consts::DO => Some(Self::Do),
            crate::consts::DONT => Some(Self::Dont),
            crate::consts::WILL => Some(Self::Will),
            crate::consts::WONT => Some(Self::Wont),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Do => crate::consts::DO,
            Self::Dont => crate::consts::DONT,
            Self::Will => crate::consts::WILL,
            Self::Wont => crate::consts::WONT,
        }
    }
}

/// A fully decoded unit of telnet-stream meaning, as produced by
/// [`crate::codec::TelnetCodec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetEvent {
    /// A run of application data with every `IAC IAC` escape already
    /// collapsed to a single `0xFF`.
    Data(Bytes),
    /// `IAC <verb> <option>`.
    Negotiate(NegotiationVerb, u8),
    /// A bare single-byte telnet command (`IAC <byte>`) that is not one of
    /// the option-negotiation verbs and not the start of a sub-negotiation —
    /// e.g. NOP, Are-You-There, Go-Ahead. Carried through unparsed; this
    /// server does not act on any of them.
    Command(u8),
    /// The payload between `IAC SB` and `IAC SE`, with `IAC IAC` escapes
    /// collapsed. The leading option byte (e.g. `VMWARE_EXT`) is included.
    Subnegotiation(Bytes),
}

/// An outbound unit handed to [`crate::codec::TelnetCodec`] for encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetCommand {
    /// `IAC <verb> <option>`.
    Negotiate(NegotiationVerb, u8),
    /// Wraps `payload` in `IAC SB ... IAC SE`, escaping any `0xFF` byte it
    /// contains.
    Subnegotiation(Bytes),
}
