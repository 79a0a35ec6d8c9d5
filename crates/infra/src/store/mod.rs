//! Product persistence.
//!
//! [`ProductStore`] is the boundary to whatever keeps product rows. It owns
//! identifier assignment and optimistic concurrency; it never validates
//! records (callers do that before writing).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use shopfront_core::{ExpectedVersion, ProductId, RichTextId};
use shopfront_products::Product;

pub mod in_memory;

pub use in_memory::InMemoryProductStore;

/// Store operation error.
///
/// These are infrastructure failures, as opposed to validation failures on
/// the record itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("rich text {0} not found")]
    RichTextNotFound(RichTextId),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Create/read/update/delete for product rows keyed by [`ProductId`].
pub trait ProductStore: Send + Sync {
    /// Insert an unsaved record, assigning its identifier and timestamps.
    fn insert(&self, product: &mut Product, at: DateTime<Utc>) -> Result<ProductId, StoreError>;

    /// Overwrite the stored row for an already persisted record.
    ///
    /// Fails with [`StoreError::Conflict`] when the row was saved by someone
    /// else since `product` was read.
    fn update(&self, product: &mut Product, at: DateTime<Utc>) -> Result<(), StoreError>;

    fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All stored rows, oldest first.
    fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Remove a row and hand it back, or `None` when there was nothing to
    /// remove.
    ///
    /// Fails with [`StoreError::Conflict`], leaving the row in place, when its
    /// version does not match `expected`.
    fn delete(
        &self,
        id: ProductId,
        expected: ExpectedVersion,
    ) -> Result<Option<Product>, StoreError>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn insert(&self, product: &mut Product, at: DateTime<Utc>) -> Result<ProductId, StoreError> {
        (**self).insert(product, at)
    }

    fn update(&self, product: &mut Product, at: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).update(product, at)
    }

    fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find(id)
    }

    fn list(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list()
    }

    fn delete(
        &self,
        id: ProductId,
        expected: ExpectedVersion,
    ) -> Result<Option<Product>, StoreError> {
        (**self).delete(id, expected)
    }
}
