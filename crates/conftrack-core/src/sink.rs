//! Document sink collaborator contract
//!
//! Uploaded identity documents (passport scans) are opaque bytes here;
//! storage mechanics live behind this trait. `put` returns a reference
//! string that gets persisted on the owning record.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// An uploaded file, as received from the transport layer.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Sink failure. Fatal for writes that require the document.
#[derive(Debug, thiserror::Error)]
#[error("document sink failure: {0}")]
pub struct SinkError(pub String);

/// Document storage contract.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Persist a document, returning its storage reference.
    async fn put(&self, document: &UploadedDocument) -> Result<String, SinkError>;
}

/// In-memory sink for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryDocumentSink {
    files: Mutex<HashMap<String, UploadedDocument>>,
}

impl MemoryDocumentSink {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// Retrieve a stored document by its reference.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<UploadedDocument> {
        self.files.lock().get(reference).cloned()
    }
}

#[async_trait]
impl DocumentSink for MemoryDocumentSink {
    async fn put(&self, document: &UploadedDocument) -> Result<String, SinkError> {
        let reference = format!("mem://{}/{}", Uuid::new_v4(), document.filename);
        self.files
            .lock()
            .insert(reference.clone(), document.clone());
        tracing::debug!(reference = %reference, bytes = document.bytes.len(), "document stored");
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let sink = MemoryDocumentSink::new();
        let doc = UploadedDocument::new("passport.pdf", "application/pdf", &b"%PDF-1.4"[..]);

        let reference = sink.put(&doc).await.unwrap();
        assert!(reference.starts_with("mem://"));
        assert!(reference.ends_with("/passport.pdf"));
        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink.get(&reference).unwrap().bytes,
            Bytes::from_static(b"%PDF-1.4")
        );
    }
}
