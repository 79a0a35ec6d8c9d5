use std::collections::HashMap;
use std::sync::RwLock;

use shopfront_core::{AttachmentError, AttachmentId};
use shopfront_products::{AttachmentRef, Blob};

use super::AttachmentStorage;
use crate::config::StorageConfig;

/// In-memory blob storage for tests/dev.
///
/// Enforces the limits from [`StorageConfig`] on every upload.
#[derive(Debug, Default)]
pub struct InMemoryAttachmentStorage {
    config: StorageConfig,
    blobs: RwLock<HashMap<AttachmentId, Vec<u8>>>,
}

impl InMemoryAttachmentStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            blobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Number of blobs currently held.
    pub fn blob_count(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    fn admit(&self, blob: &Blob) -> Result<(), AttachmentError> {
        if blob.data().is_empty() {
            return Err(AttachmentError::Empty);
        }
        if blob.byte_size() > self.config.max_attachment_bytes {
            return Err(AttachmentError::TooLarge {
                size: blob.byte_size(),
                limit: self.config.max_attachment_bytes,
            });
        }
        if !self.config.allows_content_type(blob.content_type()) {
            return Err(AttachmentError::ContentTypeNotAllowed(
                blob.content_type().to_string(),
            ));
        }
        Ok(())
    }
}

impl AttachmentStorage for InMemoryAttachmentStorage {
    fn upload(&self, blob: Blob) -> Result<AttachmentRef, AttachmentError> {
        self.admit(&blob)?;

        let id = AttachmentId::new();
        let reference = AttachmentRef::for_blob(id, &blob);

        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| AttachmentError::Storage("lock poisoned".to_string()))?;
        blobs.insert(id, blob.into_data());

        tracing::debug!(
            attachment_id = %id,
            byte_size = reference.byte_size(),
            content_type = %reference.content_type(),
            "blob stored"
        );
        Ok(reference)
    }

    fn download(&self, reference: &AttachmentRef) -> Result<Vec<u8>, AttachmentError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| AttachmentError::Storage("lock poisoned".to_string()))?;
        blobs
            .get(&reference.id())
            .cloned()
            .ok_or(AttachmentError::NotFound)
    }

    fn url(&self, reference: &AttachmentRef) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url,
            reference.id(),
            reference.filename()
        )
    }

    fn purge(&self, reference: &AttachmentRef) -> Result<bool, AttachmentError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| AttachmentError::Storage("lock poisoned".to_string()))?;
        Ok(blobs.remove(&reference.id()).is_some())
    }

    fn exists(&self, reference: &AttachmentRef) -> bool {
        self.blobs
            .read()
            .map(|blobs| blobs.contains_key(&reference.id()))
            .unwrap_or(false)
    }
}
