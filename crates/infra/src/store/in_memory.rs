use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use shopfront_core::{Entity, ExpectedVersion, ProductId};
use shopfront_products::Product;

use super::{ProductStore, StoreError};

/// In-memory product table.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    rows: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProductStore for InMemoryProductStore {
    fn insert(&self, product: &mut Product, at: DateTime<Utc>) -> Result<ProductId, StoreError> {
        if let Some(id) = product.product_id() {
            return Err(StoreError::Conflict(format!("product {id} is already stored")));
        }

        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;

        let id = ProductId::new();
        product.mark_persisted(id, at);
        rows.insert(id, product.clone());

        Ok(id)
    }

    fn update(&self, product: &mut Product, at: DateTime<Utc>) -> Result<(), StoreError> {
        let id = product
            .product_id()
            .ok_or_else(|| StoreError::Conflict("cannot update an unsaved product".to_string()))?;

        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;

        let stored = rows.get(&id).ok_or(StoreError::NotFound(id))?;
        let expected = ExpectedVersion::Exact(product.lock_version());
        if !expected.matches(stored.lock_version()) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found {}",
                stored.lock_version()
            )));
        }

        product.touch(at);
        rows.insert(id, product.clone());

        Ok(())
    }

    fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;

        // UUIDv7 ids sort by creation time.
        let mut products: Vec<Product> = rows.values().cloned().collect();
        products.sort_by_key(|p| p.product_id());
        Ok(products)
    }

    fn delete(
        &self,
        id: ProductId,
        expected: ExpectedVersion,
    ) -> Result<Option<Product>, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;

        let Some(stored) = rows.get(&id) else {
            return Ok(None);
        };
        if !expected.matches(stored.lock_version()) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found {}",
                stored.lock_version()
            )));
        }

        Ok(rows.remove(&id))
    }
}
