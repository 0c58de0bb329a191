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

//! The session registry: the single source of truth for which connection
//! is currently bound to which VM identifier.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Identifies one accepted connection for as long as it is open. Monotonic
/// and never reused, so a stale id can never be confused with a newer
/// connection that happens to reuse the same socket slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Maps live connections to the VM identifier bound on them, backed by a
/// concurrent hash map so the HTTP retrieval surface, the accept loop, and
/// every connection task can all touch it without a shared lock.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    bindings: DashMap<ConnectionId, String>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next `ConnectionId`, monotonically.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Binds `id` to `vm_id`, returning whichever identifier it was
    /// previously bound to, if any. A connection may rebind if the peer
    /// sends `VM-VC-UUID` more than once; the most recent binding wins.
    pub fn bind(&self, id: ConnectionId, vm_id: String) -> Option<String> {
        self.bindings.insert(id, vm_id)
    }

    pub fn lookup(&self, id: &ConnectionId) -> Option<String> {
        self.bindings.get(id).map(|entry| entry.value().clone())
    }

    pub fn unbind(&self, id: &ConnectionId) -> Option<String> {
        self.bindings.remove(id).map(|(_, vm_id)| vm_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_assigned_monotonically() {
        let registry = SessionRegistry::new();
        let a = registry.next_connection_id();
        let b = registry.next_connection_id();
        assert!(a < b);
    }

    #[test]
    fn bind_then_lookup_round_trips() {
        let registry = SessionRegistry::new();
        let id = registry.next_connection_id();
        assert_eq!(registry.lookup(&id), None);
        registry.bind(id, "420d115cb5d40fcd0b0aabcdef123456".to_string());
        assert_eq!(
            registry.lookup(&id),
            Some("420d115cb5d40fcd0b0aabcdef123456".to_string())
        );
    }

    #[test]
    fn unbind_removes_the_entry() {
        let registry = SessionRegistry::new();
        let id = registry.next_connection_id();
        registry.bind(id, "abc".to_string());
        assert_eq!(registry.unbind(&id), Some("abc".to_string()));
        assert_eq!(registry.lookup(&id), None);
    }
}
