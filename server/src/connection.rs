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

//! The connection driver: one task per accepted socket, running a single
//! `tokio::select!` loop over decoded telnet events until the peer
//! disconnects or a protocol violation closes the connection.

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument, warn};
use vspc_telnetcodec::{NegotiationVerb, TelnetCodec, TelnetCommand, TelnetEvent, VmwareMessage};

use crate::config::Config;
use crate::logsink;
use crate::metrics::ServerMetrics;
use crate::registry::{ConnectionId, SessionRegistry};
use crate::vendor;

/// A socket this driver can run over, whether plain TCP or TLS-terminated.
pub trait ConnectionIo: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> ConnectionIo for T {}

/// Drives one connection end to end: purely reactive, replying only once
/// the peer has sent something, until the stream ends or a protocol
/// violation forces a close.
#[instrument(skip(io, registry, metrics, config), fields(%id, %peer))]
pub async fn run(
    id: ConnectionId,
    peer: SocketAddr,
    io: Pin<Box<dyn ConnectionIo>>,
    registry: Arc<SessionRegistry>,
    metrics: Arc<ServerMetrics>,
    config: Arc<Config>,
) {
    metrics.connection_opened();
    let mut framed = Framed::new(io, TelnetCodec::new());

    loop {
        let event = match framed.next().await {
            Some(Ok(event)) => event,
            Some(Err(err)) => {
                warn!(%err, "codec error, closing connection");
                metrics.record_protocol_error();
                break;
            }
            None => {
                debug!("peer closed the connection");
                break;
            }
        };

        match event {
            TelnetEvent::Data(bytes) => {
                metrics.record_bytes_received(bytes.len() as u64);
                match registry.lookup(&id) {
                    Some(vm_id) => {
                        if let Err(err) = logsink::append(&config.serial_log_dir, &vm_id, &bytes).await {
                            warn!(%err, vm_id, "failed to append console bytes");
                        }
                    }
                    None => {
                        warn!("data received before VM identity was bound, closing connection");
                        metrics.record_unbound_closure();
                        break;
                    }
                }
            }

            TelnetEvent::Negotiate(NegotiationVerb::Do, opt) => {
                if send(&mut framed, vendor::base::reply_to_do(opt)).await.is_err() {
                    break;
                }
            }
            TelnetEvent::Negotiate(NegotiationVerb::Will, opt) => {
                if send(&mut framed, vendor::base::reply_to_will(opt)).await.is_err() {
                    break;
                }
            }
            TelnetEvent::Negotiate(NegotiationVerb::Dont | NegotiationVerb::Wont, _) => {}

            TelnetEvent::Subnegotiation(payload) => {
                let message = match VmwareMessage::parse(&payload) {
                    Ok(message) => message,
                    Err(err) => {
                        warn!(%err, "non-VMware sub-negotiation, ignoring");
                        continue;
                    }
                };
                debug!(?message, "VMware extension sub-negotiation");
                if matches!(message, VmwareMessage::VmotionBegin(_)) {
                    metrics.record_vmotion_handshake();
                }

                let outcome = vendor::handle(&registry, id, &config.uri, message);
                for reply in outcome.replies {
                    if send(&mut framed, reply).await.is_err() {
                        break;
                    }
                }
                if outcome.close {
                    break;
                }
            }

            TelnetEvent::Command(_) => {}
        }
    }

    registry.unbind(&id);
    metrics.connection_closed();
    info!("connection closed");
}

async fn send(
    framed: &mut Framed<Pin<Box<dyn ConnectionIo>>, TelnetCodec>,
    command: TelnetCommand,
) -> Result<(), vspc_telnetcodec::CodecError> {
    if let Err(err) = framed.send(command).await {
        warn!(%err, "failed to write to connection");
        return Err(err);
    }
    Ok(())
}
