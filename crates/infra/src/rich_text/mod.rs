//! Rich-text body storage boundary.

use std::sync::Arc;

use shopfront_products::{RichText, RichTextRef};

use crate::store::StoreError;

pub mod in_memory;

pub use in_memory::InMemoryRichTextStore;

/// Keeps rich-text bodies; callers only hold the returned references.
pub trait RichTextStore: Send + Sync {
    fn create(&self, body: &str) -> Result<RichTextRef, StoreError>;

    /// Rewrite an existing body in place; the reference stays valid.
    fn update(&self, reference: RichTextRef, body: &str) -> Result<(), StoreError>;

    fn fetch(&self, reference: RichTextRef) -> Result<Option<RichText>, StoreError>;

    /// Returns `false` when there was nothing to delete.
    fn delete(&self, reference: RichTextRef) -> Result<bool, StoreError>;
}

impl<S> RichTextStore for Arc<S>
where
    S: RichTextStore + ?Sized,
{
    fn create(&self, body: &str) -> Result<RichTextRef, StoreError> {
        (**self).create(body)
    }

    fn update(&self, reference: RichTextRef, body: &str) -> Result<(), StoreError> {
        (**self).update(reference, body)
    }

    fn fetch(&self, reference: RichTextRef) -> Result<Option<RichText>, StoreError> {
        (**self).fetch(reference)
    }

    fn delete(&self, reference: RichTextRef) -> Result<bool, StoreError> {
        (**self).delete(reference)
    }
}
