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

use std::io;

use thiserror::Error;

use crate::identity::IdentityError;

/// The error type shared across the listener, connection driver, log sink,
/// and HTTP retrieval surface.
#[derive(Debug, Error)]
pub enum VspcError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] vspc_telnetcodec::CodecError),

    #[error("VM identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VspcError>;
