use std::collections::HashMap;
use std::sync::RwLock;

use shopfront_core::RichTextId;
use shopfront_products::{RichText, RichTextRef};

use super::RichTextStore;
use crate::store::StoreError;

/// In-memory rich-text bodies for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRichTextStore {
    bodies: RwLock<HashMap<RichTextId, RichText>>,
}

impl InMemoryRichTextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bodies.read().map(|bodies| bodies.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RichTextStore for InMemoryRichTextStore {
    fn create(&self, body: &str) -> Result<RichTextRef, StoreError> {
        let mut bodies = self.bodies.write().map_err(|_| StoreError::LockPoisoned)?;

        let text = RichText::new(RichTextId::new(), body);
        let reference = text.reference();
        bodies.insert(text.id(), text);

        Ok(reference)
    }

    fn update(&self, reference: RichTextRef, body: &str) -> Result<(), StoreError> {
        let mut bodies = self.bodies.write().map_err(|_| StoreError::LockPoisoned)?;

        let text = bodies
            .get_mut(&reference.id())
            .ok_or(StoreError::RichTextNotFound(reference.id()))?;
        text.set_body(body);

        Ok(())
    }

    fn fetch(&self, reference: RichTextRef) -> Result<Option<RichText>, StoreError> {
        let bodies = self.bodies.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(bodies.get(&reference.id()).cloned())
    }

    fn delete(&self, reference: RichTextRef) -> Result<bool, StoreError> {
        let mut bodies = self.bodies.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(bodies.remove(&reference.id()).is_some())
    }
}
