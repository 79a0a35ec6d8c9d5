//! Attachment storage boundary.
//!
//! The storage accepts blobs, decides whether to keep them and hands back a
//! stable [`AttachmentRef`]. Size and type limits live here, not on the
//! product.

use std::sync::Arc;

use shopfront_core::AttachmentError;
use shopfront_products::{AttachmentRef, Blob};

pub mod in_memory;

pub use in_memory::InMemoryAttachmentStorage;

pub trait AttachmentStorage: Send + Sync {
    /// Store `blob`, or reject it.
    fn upload(&self, blob: Blob) -> Result<AttachmentRef, AttachmentError>;

    fn download(&self, reference: &AttachmentRef) -> Result<Vec<u8>, AttachmentError>;

    /// Public location of the stored blob.
    fn url(&self, reference: &AttachmentRef) -> String;

    /// Delete the stored blob. Returns `false` when it was already gone.
    fn purge(&self, reference: &AttachmentRef) -> Result<bool, AttachmentError>;

    fn exists(&self, reference: &AttachmentRef) -> bool;
}

impl<S> AttachmentStorage for Arc<S>
where
    S: AttachmentStorage + ?Sized,
{
    fn upload(&self, blob: Blob) -> Result<AttachmentRef, AttachmentError> {
        (**self).upload(blob)
    }

    fn download(&self, reference: &AttachmentRef) -> Result<Vec<u8>, AttachmentError> {
        (**self).download(reference)
    }

    fn url(&self, reference: &AttachmentRef) -> String {
        (**self).url(reference)
    }

    fn purge(&self, reference: &AttachmentRef) -> Result<bool, AttachmentError> {
        (**self).purge(reference)
    }

    fn exists(&self, reference: &AttachmentRef) -> bool {
        (**self).exists(reference)
    }
}
