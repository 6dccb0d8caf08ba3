//! Filesystem document sink

use async_trait::async_trait;
use conftrack_core::{DocumentSink, SinkError, UploadedDocument};
use std::path::PathBuf;
use uuid::Uuid;

/// Stores uploaded documents under a local directory.
///
/// Stored names carry a fresh id prefix, so repeated uploads of the
/// same filename never collide. The returned reference is a `file://`
/// URI to the stored path.
#[derive(Debug, Clone)]
pub struct LocalDocumentSink {
    root: PathBuf,
}

impl LocalDocumentSink {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSink for LocalDocumentSink {
    async fn put(&self, document: &UploadedDocument) -> Result<String, SinkError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| SinkError(format!("creating {}: {err}", self.root.display())))?;

        let path = self
            .root
            .join(format!("{}-{}", Uuid::new_v4(), safe_name(&document.filename)));
        tokio::fs::write(&path, &document.bytes)
            .await
            .map_err(|err| SinkError(format!("writing {}: {err}", path.display())))?;

        tracing::debug!(
            path = %path.display(),
            bytes = document.bytes.len(),
            "document stored"
        );
        Ok(format!("file://{}", path.display()))
    }
}

/// Strip anything path-like out of a client-supplied filename.
fn safe_name(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}
