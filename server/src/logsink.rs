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

//! Appends a bound connection's console bytes to its per-VM log file.
//!
//! There is no persistent file handle kept around per connection: every
//! call opens the target file fresh in append mode and closes it again,
//! so an external log rotation that renames the old file is picked up by
//! the very next write without any coordination.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Appends `data` to `<dir>/<vm_id>`, creating the file if it does not
/// already exist. `vm_id` must already be a normalized, validated
/// identifier — this function does not sanitize it.
pub async fn append(dir: &Path, vm_id: &str, data: &[u8]) -> Result<()> {
    let path = log_path(dir, vm_id);
    let mut file = OpenOptions::new().append(true).create(true).open(&path).await?;
    file.write_all(data).await?;
    Ok(())
}

pub fn log_path(dir: &Path, vm_id: &str) -> PathBuf {
    dir.join(vm_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_creates_then_extends_the_file() {
        let dir = tempdir("append-extends");
        append(&dir, "somevmid", b"first ").await.unwrap();
        append(&dir, "somevmid", b"second").await.unwrap();
        let contents = tokio::fs::read(log_path(&dir, "somevmid")).await.unwrap();
        assert_eq!(contents, b"first second");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn distinct_vm_ids_get_distinct_files() {
        let dir = tempdir("distinct-vm-ids");
        append(&dir, "aaa", b"a-bytes").await.unwrap();
        append(&dir, "bbb", b"b-bytes").await.unwrap();
        assert_eq!(tokio::fs::read(log_path(&dir, "aaa")).await.unwrap(), b"a-bytes");
        assert_eq!(tokio::fs::read(log_path(&dir, "bbb")).await.unwrap(), b"b-bytes");
        let _ = std::fs::remove_dir_all(&dir);
    }

    fn tempdir(label: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("vspc-logsink-test-{}-{}", std::process::id(), label));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
