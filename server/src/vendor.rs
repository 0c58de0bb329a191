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

//! Policy for the VMware telnet extension sub-protocol: what to bind in the
//! session registry, what to reply, and when a connection must close.
//!
//! The wire format lives in [`vspc_telnetcodec::VmwareMessage`]; this module
//! only decides how to react to one, given the registry and the configured
//! proxy `uri`.

use bytes::Bytes;
use rand::RngCore;
use vspc_telnetcodec::{TelnetCommand, VmwareMessage};

use crate::identity::{normalize_vm_id, validate_vm_id};
use crate::registry::{ConnectionId, SessionRegistry};

/// The ASCII direction byte meaning "this concentrator is the source side"
/// of a proxied migration, per the original server's `DO-PROXY` check.
const PROXY_DIRECTION_SOURCE: u8 = b'S';

/// The outcome of handling one [`VmwareMessage`]: zero or more replies to
/// send back, whether the connection must now close, and whether a VM
/// binding was newly established.
#[derive(Debug, Default)]
pub struct Outcome {
    pub replies: Vec<TelnetCommand>,
    pub close: bool,
    pub bound_vm_id: Option<String>,
}

impl Outcome {
    fn reply(command: TelnetCommand) -> Self {
        Self {
            replies: vec![command],
            ..Self::default()
        }
    }

    fn replies(commands: Vec<TelnetCommand>) -> Self {
        Self {
            replies: commands,
            ..Self::default()
        }
    }

    fn close() -> Self {
        Self {
            close: true,
            ..Self::default()
        }
    }

    fn none() -> Self {
        Self::default()
    }
}

fn sub(message: VmwareMessage) -> TelnetCommand {
    TelnetCommand::Subnegotiation(message.encode())
}

/// Reacts to one VMware extension sub-negotiation for `connection`, given
/// the session registry and the configured proxy URI.
pub fn handle(
    registry: &SessionRegistry,
    connection: ConnectionId,
    configured_uri: &str,
    message: VmwareMessage,
) -> Outcome {
    match message {
        VmwareMessage::KnownSuboptions1 => Outcome::replies(vec![
            sub(VmwareMessage::supported_suboptions()),
            sub(VmwareMessage::GetVmVcUuid),
        ]),

        VmwareMessage::KnownSuboptions2(_) => unexpected_inbound(connection, "KNOWN-SUBOPTIONS-2"),

        VmwareMessage::DoProxy { direction, uri } => {
            if direction == PROXY_DIRECTION_SOURCE && uri == configured_uri {
                Outcome::reply(sub(VmwareMessage::WillProxy))
            } else {
                tracing::warn!(%connection, direction, uri, "rejecting DO-PROXY, closing connection");
                Outcome {
                    replies: vec![sub(VmwareMessage::WontProxy)],
                    close: true,
                    bound_vm_id: None,
                }
            }
        }

        VmwareMessage::WillProxy => unexpected_inbound(connection, "WILL-PROXY"),
        VmwareMessage::WontProxy => unexpected_inbound(connection, "WONT-PROXY"),

        VmwareMessage::VmotionBegin(cookie) => {
            let mut secret = [0u8; 4];
            rand::rng().fill_bytes(&mut secret);
            let mut data = cookie.to_vec();
            data.extend_from_slice(&secret);
            Outcome::reply(sub(VmwareMessage::VmotionGoahead(Bytes::from(data))))
        }

        VmwareMessage::VmotionGoahead(_) => unexpected_inbound(connection, "VMOTION-GOAHEAD"),

        VmwareMessage::VmotionPeer(data) => Outcome::reply(sub(VmwareMessage::VmotionPeerOk(data))),

        VmwareMessage::VmotionPeerOk(_) => unexpected_inbound(connection, "VMOTION-PEER-OK"),
        VmwareMessage::VmotionNotnow => unexpected_inbound(connection, "VMOTION-NOTNOW"),

        VmwareMessage::VmotionComplete(_) | VmwareMessage::VmotionAbort(_) => Outcome::none(),

        VmwareMessage::VmVcUuid(raw) => {
            let normalized = normalize_vm_id(&raw);
            match validate_vm_id(&normalized) {
                Ok(()) => {
                    registry.bind(connection, normalized.clone());
                    tracing::info!(%connection, vm_id = %normalized, "bound VM identity");
                    Outcome {
                        bound_vm_id: Some(normalized),
                        ..Outcome::default()
                    }
                }
                Err(err) => {
                    tracing::warn!(%connection, raw, %err, "invalid VM-VC-UUID, closing connection");
                    Outcome::close()
                }
            }
        }

        VmwareMessage::GetVmVcUuid => unexpected_inbound(connection, "GET-VM-VC-UUID"),
        VmwareMessage::VmName(_) => unexpected_inbound(connection, "VM-NAME"),
        VmwareMessage::GetVmName => unexpected_inbound(connection, "GET-VM-NAME"),

        VmwareMessage::Unknown(subcmd, _) => {
            tracing::warn!(%connection, subcmd, "unknown VMware extension sub-command, closing connection");
            Outcome::close()
        }
    }
}

/// Sub-commands the original server only ever sends, never dispatches on
/// receipt: the client is in the wrong role if it sends one, so the
/// connection closes exactly as it does for an unrecognized sub-command.
fn unexpected_inbound(connection: ConnectionId, name: &str) -> Outcome {
    tracing::warn!(%connection, sub_command = name, "sub-command not valid inbound, closing connection");
    Outcome::close()
}

/// Base telnet option negotiation (outside the vendor extension):
/// `BINARY`/`SUPPRESS_GO_AHEAD`/`VMWARE_EXT` are the only options this
/// server ever agrees to.
pub mod base {
    use vspc_telnetcodec::consts::option;
    use vspc_telnetcodec::{NegotiationVerb, TelnetCommand};

    fn we_support(opt: u8) -> bool {
        matches!(opt, option::BINARY | option::SUPPRESS_GO_AHEAD)
    }

    fn peer_may_hold(opt: u8) -> bool {
        matches!(opt, option::BINARY | option::SUPPRESS_GO_AHEAD | option::VMWARE_EXT)
    }

    /// Reply to a peer's `DO <opt>` (it wants us to enable `opt`).
    pub fn reply_to_do(opt: u8) -> TelnetCommand {
        if we_support(opt) {
            TelnetCommand::Negotiate(NegotiationVerb::Will, opt)
        } else {
            TelnetCommand::Negotiate(NegotiationVerb::Wont, opt)
        }
    }

    /// Reply to a peer's `WILL <opt>` (it offers to enable `opt` itself).
    pub fn reply_to_will(opt: u8) -> TelnetCommand {
        if peer_may_hold(opt) {
            TelnetCommand::Negotiate(NegotiationVerb::Do, opt)
        } else {
            TelnetCommand::Negotiate(NegotiationVerb::Dont, opt)
        }
    }
}
