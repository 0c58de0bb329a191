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

//! Telnet framing and the VMware telnet extension sub-protocol.
//!
//! This crate owns wire format only: turning a byte stream into
//! [`TelnetEvent`]s and turning [`TelnetCommand`]s back into bytes, plus
//! parsing/encoding the `VMWARE_EXT` sub-negotiation payload into a typed
//! [`VmwareMessage`]. It has no notion of VM identity, sessions, or files —
//! that policy lives one layer up.

pub mod codec;
pub mod consts;
pub mod error;
pub mod event;
pub mod vmware;

pub use codec::TelnetCodec;
pub use error::CodecError;
pub use event::{NegotiationVerb, TelnetCommand, TelnetEvent};
pub use vmware::VmwareMessage;
