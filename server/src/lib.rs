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

//! The VMware telnet extension concentrator: accepts telnet connections
//! that identify themselves as a VM console, appends their byte stream to
//! an append-only per-VM log file, and serves those files back out over
//! HTTP behind Basic auth.

pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod identity;
pub mod listener;
pub mod logsink;
pub mod metrics;
pub mod registry;
pub mod vendor;

pub use config::Config;
pub use error::{Result, VspcError};
pub use listener::Listener;
pub use metrics::{MetricsSnapshot, ServerMetrics};
pub use registry::{ConnectionId, SessionRegistry};
