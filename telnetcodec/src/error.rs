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

/// Errors raised while decoding or encoding telnet frames and VMware
/// extension sub-negotiations.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// `IAC SE` without a preceding `IAC SB`, or any other byte appearing
    /// immediately after an escaped `IAC` inside a sub-negotiation.
    #[error("malformed sub-negotiation: unexpected byte {0:#04x} after IAC")]
    MalformedSubnegotiation(u8),

    /// A sub-negotiation payload did not begin with the `VMWARE_EXT` option
    /// byte where one was required.
    #[error("sub-negotiation is not a VMware extension payload")]
    NotVendorExtension,

    /// A `VMWARE_EXT` sub-negotiation ended before its sub-command byte.
    #[error("truncated VMware extension sub-negotiation")]
    TruncatedSubnegotiation,

    /// A sub-negotiation payload grew past [`crate::codec::MAX_SUBNEGOTIATION_LEN`]
    /// without a closing `IAC SE`.
    #[error("sub-negotiation exceeded {0} bytes without a closing IAC SE")]
    SubnegotiationTooLong(usize),
}
