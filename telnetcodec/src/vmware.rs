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

//! Parsing and encoding for the payload of a `VMWARE_EXT` sub-negotiation.
//!
//! A [`TelnetEvent::Subnegotiation`](crate::event::TelnetEvent::Subnegotiation)
//! is just an opaque byte string; this module is where it becomes a typed
//! [`VmwareMessage`] once the leading byte has been confirmed to be
//! `VMWARE_EXT`. Reacting to a message — what to bind in the session
//! registry, what to write back, when to close the connection — is policy
//! that belongs to the server crate, not here.

use bytes::{BufMut, Bytes, BytesMut};

use crate::consts::{option, vmware};
use crate::error::CodecError;

/// A decoded VMware telnet extension sub-negotiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmwareMessage {
    /// `KNOWN-SUBOPTIONS-1`: peer asks what sub-commands we support.
    KnownSuboptions1,
    /// `KNOWN-SUBOPTIONS-2 <bytes>`: peer advertises its own supported set.
    KnownSuboptions2(Bytes),
    /// `DO-PROXY <direction> <uri>`.
    DoProxy { direction: u8, uri: String },
    /// `WILL-PROXY`.
    WillProxy,
    /// `WONT-PROXY`.
    WontProxy,
    /// `VMOTION-BEGIN <cookie>`: peer requests a migration secret.
    VmotionBegin(Bytes),
    /// `VMOTION-GOAHEAD <cookie><secret>`.
    VmotionGoahead(Bytes),
    /// `VMOTION-PEER <data>`: the incoming side of a migration handshake.
    VmotionPeer(Bytes),
    /// `VMOTION-PEER-OK <data>`.
    VmotionPeerOk(Bytes),
    /// `VMOTION-NOTNOW`.
    VmotionNotnow,
    /// `VMOTION-COMPLETE <data>`.
    VmotionComplete(Bytes),
    /// `VMOTION-ABORT <data>`.
    VmotionAbort(Bytes),
    /// `VM-VC-UUID <uuid>`: peer announces the VM's identity, raw as sent.
    VmVcUuid(String),
    /// `GET-VM-VC-UUID`.
    GetVmVcUuid,
    /// `VM-NAME <name>`.
    VmName(String),
    /// `GET-VM-NAME`.
    GetVmName,
    /// A sub-command byte this server does not recognize, carried through
    /// with its raw payload so the caller can log it before closing.
    Unknown(u8, Bytes),
}

impl VmwareMessage {
    /// Parses a sub-negotiation payload (the bytes between `IAC SB` and
    /// `IAC SE`, escapes already collapsed) as a VMware extension message.
    ///
    /// Returns [`CodecError::NotVendorExtension`] if `payload` does not open
    /// with the `VMWARE_EXT` option byte, and
    /// [`CodecError::TruncatedSubnegotiation`] if it ends before a
    /// sub-command byte.
    pub fn parse(payload: &[u8]) -> Result<Self, CodecError> {
        let (&opt, rest) = payload.split_first().ok_or(CodecError::NotVendorExtension)?;
        if opt != option::VMWARE_EXT {
            return Err(CodecError::NotVendorExtension);
        }
        let (&subcmd, rest) = rest.split_first().ok_or(CodecError::TruncatedSubnegotiation)?;

        Ok(match subcmd {
            vmware::KNOWN_SUBOPTIONS_1 => Self::KnownSuboptions1,
            vmware::KNOWN_SUBOPTIONS_2 => Self::KnownSuboptions2(Bytes::copy_from_slice(rest)),
            vmware::DO_PROXY => {
                let (&direction, uri_bytes) =
                    rest.split_first().ok_or(CodecError::TruncatedSubnegotiation)?;
                Self::DoProxy {
                    direction,
                    uri: String::from_utf8_lossy(uri_bytes).into_owned(),
                }
            }
            vmware::WILL_PROXY => Self::WillProxy,
            vmware::WONT_PROXY => Self::WontProxy,
            vmware::VMOTION_BEGIN => Self::VmotionBegin(Bytes::copy_from_slice(rest)),
            vmware::VMOTION_GOAHEAD => Self::VmotionGoahead(Bytes::copy_from_slice(rest)),
            vmware::VMOTION_PEER => Self::VmotionPeer(Bytes::copy_from_slice(rest)),
            vmware::VMOTION_PEER_OK => Self::VmotionPeerOk(Bytes::copy_from_slice(rest)),
            vmware::VMOTION_NOTNOW => Self::VmotionNotnow,
            vmware::VMOTION_COMPLETE => Self::VmotionComplete(Bytes::copy_from_slice(rest)),
            vmware::VMOTION_ABORT => Self::VmotionAbort(Bytes::copy_from_slice(rest)),
            vmware::VM_VC_UUID => Self::VmVcUuid(String::from_utf8_lossy(rest).into_owned()),
            vmware::GET_VM_VC_UUID => Self::GetVmVcUuid,
            vmware::VM_NAME => Self::VmName(String::from_utf8_lossy(rest).into_owned()),
            vmware::GET_VM_NAME => Self::GetVmName,
            other => Self::Unknown(other, Bytes::copy_from_slice(rest)),
        })
    }

    /// Encodes this message back into a `VMWARE_EXT` sub-negotiation payload
    /// (without the enclosing `IAC SB`/`IAC SE`; pair with
    /// [`crate::event::TelnetCommand::Subnegotiation`] for that).
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(option::VMWARE_EXT);
        match self {
            Self::KnownSuboptions1 => buf.put_u8(vmware::KNOWN_SUBOPTIONS_1),
            Self::KnownSuboptions2(bytes) => {
                buf.put_u8(vmware::KNOWN_SUBOPTIONS_2);
                buf.extend_from_slice(bytes);
            }
            Self::DoProxy { direction, uri } => {
                buf.put_u8(vmware::DO_PROXY);
                buf.put_u8(*direction);
                buf.extend_from_slice(uri.as_bytes());
            }
            Self::WillProxy => buf.put_u8(vmware::WILL_PROXY),
            Self::WontProxy => buf.put_u8(vmware::WONT_PROXY),
            Self::VmotionBegin(data) => {
                buf.put_u8(vmware::VMOTION_BEGIN);
                buf.extend_from_slice(data);
            }
            Self::VmotionGoahead(data) => {
                buf.put_u8(vmware::VMOTION_GOAHEAD);
                buf.extend_from_slice(data);
            }
            Self::VmotionPeer(data) => {
                buf.put_u8(vmware::VMOTION_PEER);
                buf.extend_from_slice(data);
            }
            Self::VmotionPeerOk(data) => {
                buf.put_u8(vmware::VMOTION_PEER_OK);
                buf.extend_from_slice(data);
            }
            Self::VmotionNotnow => buf.put_u8(vmware::VMOTION_NOTNOW),
            Self::VmotionComplete(data) => {
                buf.put_u8(vmware::VMOTION_COMPLETE);
                buf.extend_from_slice(data);
            }
            Self::VmotionAbort(data) => {
                buf.put_u8(vmware::VMOTION_ABORT);
                buf.extend_from_slice(data);
            }
            Self::VmVcUuid(uuid) => {
                buf.put_u8(vmware::VM_VC_UUID);
                buf.extend_from_slice(uuid.as_bytes());
            }
            Self::GetVmVcUuid => buf.put_u8(vmware::GET_VM_VC_UUID),
            Self::VmName(name) => {
                buf.put_u8(vmware::VM_NAME);
                buf.extend_from_slice(name.as_bytes());
            }
            Self::GetVmName => buf.put_u8(vmware::GET_VM_NAME),
            Self::Unknown(subcmd, data) => {
                buf.put_u8(*subcmd);
                buf.extend_from_slice(data);
            }
        }
        buf.freeze()
    }

    /// The exact KNOWN-SUBOPTIONS-2 reply this server advertises.
    pub fn supported_suboptions() -> Self {
        Self::KnownSuboptions2(Bytes::from_static(&vmware::SUPPORTED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_payload_without_vmware_ext_prefix() {
        let err = VmwareMessage::parse(&[0, 1]).unwrap_err();
        assert!(matches!(err, CodecError::NotVendorExtension));
    }

    #[test]
    fn rejects_truncated_payload() {
        let err = VmwareMessage::parse(&[option::VMWARE_EXT]).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedSubnegotiation));
    }

    #[test]
    fn parses_known_suboptions_1() {
        let msg = VmwareMessage::parse(&[option::VMWARE_EXT, vmware::KNOWN_SUBOPTIONS_1]).unwrap();
        assert_eq!(msg, VmwareMessage::KnownSuboptions1);
    }

    #[test]
    fn supported_suboptions_matches_the_canonical_byte_sequence() {
        let encoded = VmwareMessage::supported_suboptions().encode();
        assert_eq!(
            &encoded[..],
            &[
                option::VMWARE_EXT,
                vmware::KNOWN_SUBOPTIONS_2,
                0x00, 0x01, 0x28, 0x29, 0x2B, 0x2C, 0x2D, 0x2E, 0x30, 0x50, 0x51, 0x52, 0x53, 0x46,
                0x47, 0x49,
            ]
        );
    }

    #[test]
    fn parses_vm_vc_uuid_raw_without_normalizing() {
        let payload = {
            let mut v = vec![option::VMWARE_EXT, vmware::VM_VC_UUID];
            v.extend_from_slice(b"42 0d115c-b5d4-0fcd 0b0a");
            v
        };
        let msg = VmwareMessage::parse(&payload).unwrap();
        assert_eq!(
            msg,
            VmwareMessage::VmVcUuid("42 0d115c-b5d4-0fcd 0b0a".to_string())
        );
    }

    #[test]
    fn do_proxy_splits_direction_byte_from_uri() {
        let payload = {
            let mut v = vec![option::VMWARE_EXT, vmware::DO_PROXY, b'S'];
            v.extend_from_slice(b"vspc://host/");
            v
        };
        let msg = VmwareMessage::parse(&payload).unwrap();
        assert_eq!(
            msg,
            VmwareMessage::DoProxy {
                direction: b'S',
                uri: "vspc://host/".to_string(),
            }
        );
    }

    #[test]
    fn unknown_subcommand_round_trips() {
        let payload = [option::VMWARE_EXT, 0x7F, 1, 2, 3];
        let msg = VmwareMessage::parse(&payload).unwrap();
        assert_eq!(msg, VmwareMessage::Unknown(0x7F, Bytes::from_static(&[1, 2, 3])));
        assert_eq!(&msg.encode()[..], &payload[..]);
    }

    #[test]
    fn vmotion_begin_round_trips_through_encode_and_parse() {
        let msg = VmwareMessage::VmotionBegin(Bytes::from_static(b"cookie12"));
        let encoded = msg.encode();
        let reparsed = VmwareMessage::parse(&encoded).unwrap();
        assert_eq!(reparsed, msg);
    }
}
