//! Content-addressed storage boundary.
//!
//! The backend is an external collaborator; stages only need "persist this
//! JSON object, give me its content hash".

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;

/// Fixed filename the raw oracle response is staged under
pub const METADATA_FILENAME: &str = "metadata.json";

/// Content-addressed storage client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a JSON object under `path` and return its content hash
    async fn put_json(&self, path: &Path, value: &Value) -> Result<String>;
}

/// Fresh replica-local staging path for the metadata file.
///
/// The path is random per run and never enters an agreed payload; only the
/// returned content hash does. The directory is not cleaned up here.
pub fn metadata_filepath() -> PathBuf {
    std::env::temp_dir()
        .join(format!("parley-{}", Uuid::new_v4().simple()))
        .join(METADATA_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_filepath_is_fresh_per_run() {
        let first = metadata_filepath();
        let second = metadata_filepath();
        assert_ne!(first, second);
        assert!(first.ends_with(METADATA_FILENAME));
        assert!(second.ends_with(METADATA_FILENAME));
    }
}
