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

//! Configuration loading: CLI flags and environment variables via `clap`,
//! merged with an optional YAML file, following the same layering the
//! corpus uses elsewhere (`clap` + `serde_yaml`).

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::error::{Result, VspcError};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 13370;
const DEFAULT_WEB_PORT: u16 = 13371;

#[derive(Parser, Debug)]
#[command(name = "vspc", about = "Virtual Serial Port Concentrator")]
struct Cli {
    /// Optional YAML file providing defaults for any flag not given on the
    /// command line or in the environment.
    #[arg(long, env = "VSPC_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "VSPC_HOST")]
    host: Option<String>,

    #[arg(long, env = "VSPC_PORT")]
    port: Option<u16>,

    #[arg(long, env = "VSPC_WEB_PORT")]
    web_port: Option<u16>,

    /// TLS certificate chain, PEM-encoded. Requires `key`.
    #[arg(long, env = "VSPC_CERT")]
    cert: Option<PathBuf>,

    /// TLS private key, PEM-encoded. Requires `cert`.
    #[arg(long, env = "VSPC_KEY")]
    key: Option<PathBuf>,

    /// The proxy URI this concentrator answers to in a `DO-PROXY` request.
    #[arg(long, env = "VSPC_URI")]
    uri: Option<String>,

    /// Directory holding one append-only log file per VM identifier.
    #[arg(long, env = "VSPC_SERIAL_LOG_DIR")]
    serial_log_dir: Option<PathBuf>,

    /// HTTP Basic auth username for the retrieval endpoint. Leaving this
    /// unset disables auth entirely, matching the reference server.
    #[arg(long, env = "VSPC_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "VSPC_PASSWORD")]
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    web_port: Option<u16>,
    cert: Option<PathBuf>,
    key: Option<PathBuf>,
    uri: Option<String>,
    serial_log_dir: Option<PathBuf>,
    username: Option<String>,
    password: Option<String>,
}

/// The fully resolved, validated configuration the rest of the server
/// builds against.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub web_port: u16,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub uri: String,
    pub serial_log_dir: PathBuf,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Parses CLI arguments (with environment-variable fallback), layers an
    /// optional `--config` YAML file underneath, applies defaults, and
    /// validates `serial_log_dir`, creating it if absent.
    pub fn load() -> Result<Self> {
        let cli = Cli::parse();
        Self::from_cli(cli)
    }

    fn from_cli(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_yaml::from_str::<FileConfig>(&text)
                    .map_err(|err| VspcError::Other(format!("invalid config file {path:?}: {err}")))?
            }
            None => FileConfig::default(),
        };

        let serial_log_dir = cli
            .serial_log_dir
            .or(file.serial_log_dir)
            .ok_or_else(|| VspcError::Other("serial_log_dir must be configured".to_string()))?;
        std::fs::create_dir_all(&serial_log_dir)?;

        let cert = cli.cert.or(file.cert);
        let key = cli.key.or(file.key);
        if cert.is_some() != key.is_some() {
            return Err(VspcError::Other(
                "cert and key must be configured together".to_string(),
            ));
        }

        Ok(Self {
            host: cli.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            web_port: cli.web_port.or(file.web_port).unwrap_or(DEFAULT_WEB_PORT),
            cert,
            key,
            uri: cli.uri.or(file.uri).unwrap_or_default(),
            serial_log_dir,
            username: cli.username.or(file.username),
            password: cli.password.or(file.password),
        })
    }

    pub fn tls_configured(&self) -> bool {
        self.cert.is_some() && self.key.is_some()
    }

    pub fn auth_configured(&self) -> bool {
        self.username.is_some()
    }
}
