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

//! Binds the telnet listening socket and spawns one connection task per
//! accepted peer, optionally terminating TLS first.

use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig as TlsServerConfig;
use tokio_rustls::TlsAcceptor;
use tracing::{info, warn};

use crate::config::Config;
use crate::connection::{self, ConnectionIo};
use crate::error::{Result, VspcError};
use crate::metrics::ServerMetrics;
use crate::registry::SessionRegistry;

/// Owns the bound telnet socket and the shared state every connection task
/// needs: the session registry, the metrics, and the resolved config.
pub struct Listener {
    tcp: TcpListener,
    tls: Option<TlsAcceptor>,
    config: Arc<Config>,
    registry: Arc<SessionRegistry>,
    metrics: Arc<ServerMetrics>,
}

impl Listener {
    pub async fn bind(
        config: Arc<Config>,
        registry: Arc<SessionRegistry>,
        metrics: Arc<ServerMetrics>,
    ) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|err| VspcError::Other(format!("invalid host/port: {err}")))?;
        let tcp = TcpListener::bind(addr).await?;
        info!(%addr, "telnet listener bound");

        let tls = if config.tls_configured() {
            Some(TlsAcceptor::from(Arc::new(build_tls_config(&config)?)))
        } else {
            None
        };

        Ok(Self {
            tcp,
            tls,
            config,
            registry,
            metrics,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.tcp.local_addr()
    }

    /// Accepts connections forever, spawning one driver task per peer. This
    /// only returns on an `accept` I/O error serious enough that the
    /// listening socket itself is no longer usable.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (socket, peer) = self.tcp.accept().await?;
            let id = self.registry.next_connection_id();
            let registry = Arc::clone(&self.registry);
            let metrics = Arc::clone(&self.metrics);
            let config = Arc::clone(&self.config);

            if let Err(err) = socket.set_nodelay(true) {
                warn!(%peer, %err, "failed to set TCP_NODELAY");
            }

            match &self.tls {
                Some(acceptor) => {
                    let acceptor = acceptor.clone();
                    tokio::spawn(async move {
                        match acceptor.accept(socket).await {
                            Ok(tls_stream) => {
                                let io: Pin<Box<dyn ConnectionIo>> = Box::pin(tls_stream);
                                connection::run(id, peer, io, registry, metrics, config).await;
                            }
                            Err(err) => warn!(%peer, %err, "TLS handshake failed"),
                        }
                    });
                }
                None => {
                    let io: Pin<Box<dyn ConnectionIo>> = Box::pin(socket);
                    tokio::spawn(connection::run(id, peer, io, registry, metrics, config));
                }
            }
        }
    }
}

fn build_tls_config(config: &Config) -> Result<TlsServerConfig> {
    let cert_path = config
        .cert
        .as_ref()
        .ok_or_else(|| VspcError::Other("cert configured without a path".to_string()))?;
    let key_path = config
        .key
        .as_ref()
        .ok_or_else(|| VspcError::Other("key configured without a path".to_string()))?;

    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut BufReader::new(File::open(cert_path)?))
        .collect::<std::io::Result<_>>()?;
    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut BufReader::new(File::open(key_path)?))?
        .ok_or_else(|| VspcError::Other(format!("no private key found in {key_path:?}")))?;

    TlsServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|err| VspcError::Other(format!("invalid TLS certificate/key: {err}")))
}
