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

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vspc_server::config::Config;
use vspc_server::http::{self, HttpState};
use vspc_server::listener::Listener;
use vspc_server::{ServerMetrics, SessionRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // rustls 0.23 requires a crypto provider installed before any
    // ServerConfig is built; a no-op if one is already installed.
    let _ = tokio_rustls::rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = Arc::new(Config::load()?);
    let registry = Arc::new(SessionRegistry::new());
    let metrics = Arc::new(ServerMetrics::new());

    let telnet_listener = Listener::bind(Arc::clone(&config), Arc::clone(&registry), Arc::clone(&metrics)).await?;
    tracing::info!(addr = %telnet_listener.local_addr()?, "telnet listener ready");

    let http_state = HttpState::new(
        config.serial_log_dir.clone(),
        config.username.clone(),
        config.password.clone(),
        Arc::clone(&metrics),
    );
    let http_router = http::router(http_state);
    let http_addr = format!("{}:{}", config.host, config.web_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!(addr = %http_addr, "HTTP retrieval listener ready");

    tokio::select! {
        result = telnet_listener.serve() => {
            if let Err(err) = result {
                tracing::error!(%err, "telnet listener stopped");
            }
        }
        result = axum::serve(http_listener, http_router) => {
            if let Err(err) = result {
                tracing::error!(%err, "HTTP listener stopped");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
