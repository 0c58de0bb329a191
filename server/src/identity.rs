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

//! Normalization and validation of the VM identifier carried in a
//! `VM-VC-UUID` sub-negotiation.
//!
//! The wire form may contain arbitrary spacing and either hyphenated or
//! compact hex grouping; both the log sink's file name and the HTTP
//! retrieval path must agree on a single canonical form, or a console's
//! bytes would land in a file its own retrieval path can never find.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{0:?} is not a valid UUID once whitespace and hyphens are stripped")]
    InvalidUuid(String),
}

/// Strips every ASCII space and hyphen from `raw`, the same normalization
/// the log sink uses to name a file and the HTTP surface uses to look one
/// up.
///
/// Idempotent: normalizing an already-normalized string returns it
/// unchanged, since there is nothing left to strip.
pub fn normalize_vm_id(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Confirms that a normalized VM identifier round-trips through
/// [`Uuid::parse_str`] (which accepts the hyphen-less "simple" form),
/// rejecting anything that merely looks like hex.
pub fn validate_vm_id(normalized: &str) -> Result<(), IdentityError> {
    Uuid::parse_str(normalized)
        .map(|_| ())
        .map_err(|_| IdentityError::InvalidUuid(normalized.to_string()))
}
