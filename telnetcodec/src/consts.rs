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

//! Wire-level byte constants for telnet framing and the VMware telnet
//! extension sub-protocol.

/// Interpret As Command.
pub const IAC: u8 = 255;
/// Refuse an option.
pub const DONT: u8 = 254;
/// Request an option.
pub const DO: u8 = 253;
/// Decline an option we hold.
pub const WONT: u8 = 252;
/// Offer an option we hold.
pub const WILL: u8 = 251;
/// Begin sub-negotiation.
pub const SB: u8 = 250;
/// End sub-negotiation.
pub const SE: u8 = 240;

/// Base telnet options this server negotiates (outside the vendor extension).
pub mod option {
    /// 8-bit clean data path.
    pub const BINARY: u8 = 0;
    /// Suppress Go Ahead.
    pub const SUPPRESS_GO_AHEAD: u8 = 3;
    /// The VMware telnet extension option code.
    pub const VMWARE_EXT: u8 = 232;
}

/// VMware telnet extension sub-command codes, carried as the second byte of
/// a `VMWARE_EXT` sub-negotiation payload.
pub mod vmware {
    pub const KNOWN_SUBOPTIONS_1: u8 = 0;
    pub const KNOWN_SUBOPTIONS_2: u8 = 1;
    pub const VMOTION_BEGIN: u8 = 40;
    pub const VMOTION_GOAHEAD: u8 = 41;
    pub const VMOTION_NOTNOW: u8 = 43;
    pub const VMOTION_PEER: u8 = 44;
    pub const VMOTION_PEER_OK: u8 = 45;
    pub const VMOTION_COMPLETE: u8 = 46;
    pub const VMOTION_ABORT: u8 = 48;
    pub const VM_VC_UUID: u8 = 80;
    pub const GET_VM_VC_UUID: u8 = 81;
    pub const VM_NAME: u8 = 82;
    pub const GET_VM_NAME: u8 = 83;
    pub const DO_PROXY: u8 = 70;
    pub const WILL_PROXY: u8 = 71;
    pub const WONT_PROXY: u8 = 73;

    /// The exact byte sequence advertised in a KNOWN-SUBOPTIONS-2 reply: the
    /// union of every sub-command this server understands, in the order the
    /// reference implementation transmits them.
    pub const SUPPORTED: [u8; 16] = [
        KNOWN_SUBOPTIONS_1,
        KNOWN_SUBOPTIONS_2,
        VMOTION_BEGIN,
        VMOTION_GOAHEAD,
        VMOTION_NOTNOW,
        VMOTION_PEER,
        VMOTION_PEER_OK,
        VMOTION_COMPLETE,
        VMOTION_ABORT,
        VM_VC_UUID,
        GET_VM_VC_UUID,
        VM_NAME,
        GET_VM_NAME,
        DO_PROXY,
        WILL_PROXY,
        WONT_PROXY,
    ];
}
