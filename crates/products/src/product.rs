use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopfront_core::{Entity, ProductId, Validate, ValidationResult, require_present};

use crate::attachment::AttachmentRef;
use crate::rich_text::RichTextRef;

/// Lifecycle of a product record.
///
/// `New` → `Persisted` on first successful save; `Persisted` → `Deleted`
/// on delete. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductState {
    New,
    Persisted,
    Deleted,
}

/// Product record.
///
/// Owns at most one featured image and at most one rich-text description,
/// both held as references to content stored elsewhere.
///
/// Deserialization refuses rows whose identity and lifecycle state
/// disagree (see [`InconsistentRow`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRow")]
pub struct Product {
    id: Option<ProductId>,
    name: String,
    featured_image: Option<AttachmentRef>,
    description: Option<RichTextRef>,
    state: ProductState,
    lock_version: u64,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build an unsaved record. The name is only checked at save time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            featured_image: None,
            description: None,
            state: ProductState::New,
            lock_version: 0,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn featured_image(&self) -> Option<&AttachmentRef> {
        self.featured_image.as_ref()
    }

    pub fn description(&self) -> Option<RichTextRef> {
        self.description
    }

    pub fn state(&self) -> ProductState {
        self.state
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_new_record(&self) -> bool {
        self.state == ProductState::New
    }

    pub fn is_persisted(&self) -> bool {
        self.state == ProductState::Persisted
    }

    pub fn is_deleted(&self) -> bool {
        self.state == ProductState::Deleted
    }

    pub fn has_featured_image(&self) -> bool {
        self.featured_image.is_some()
    }

    /// Attach `image`, replacing any previous one.
    ///
    /// Returns the replaced reference; the caller owns purging its blob.
    pub fn attach_featured_image(&mut self, image: AttachmentRef) -> Option<AttachmentRef> {
        self.featured_image.replace(image)
    }

    pub fn detach_featured_image(&mut self) -> Option<AttachmentRef> {
        self.featured_image.take()
    }

    /// Point the description at `text`, replacing any previous reference.
    pub fn set_description(&mut self, text: RichTextRef) -> Option<RichTextRef> {
        self.description.replace(text)
    }

    pub fn take_description(&mut self) -> Option<RichTextRef> {
        self.description.take()
    }

    /// Record the first successful insert.
    pub fn mark_persisted(&mut self, id: ProductId, at: DateTime<Utc>) {
        self.id = Some(id);
        self.state = ProductState::Persisted;
        self.lock_version = 1;
        self.created_at = Some(at);
        self.updated_at = Some(at);
    }

    /// Record a successful update of an already persisted row.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.lock_version += 1;
        self.updated_at = Some(at);
    }

    pub fn mark_deleted(&mut self) {
        self.state = ProductState::Deleted;
    }
}

/// A serialized row whose fields contradict its lifecycle state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InconsistentRow {
    #[error("new product must not carry an id, version or timestamps")]
    NewWithIdentity,

    #[error("persisted product needs an id, a version of at least 1 and timestamps")]
    PersistedWithoutIdentity,
}

/// Unchecked wire form of [`Product`].
#[derive(Deserialize)]
struct ProductRow {
    id: Option<ProductId>,
    name: String,
    featured_image: Option<AttachmentRef>,
    description: Option<RichTextRef>,
    state: ProductState,
    lock_version: u64,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = InconsistentRow;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stamped = row.created_at.is_some() && row.updated_at.is_some();
        match row.state {
            ProductState::New => {
                if row.id.is_some() || row.lock_version != 0 || row.created_at.is_some() {
                    return Err(InconsistentRow::NewWithIdentity);
                }
            }
            ProductState::Persisted => {
                if row.id.is_none() || row.lock_version == 0 || !stamped {
                    return Err(InconsistentRow::PersistedWithoutIdentity);
                }
            }
            // An unsaved record can be deleted, so either shape is valid.
            ProductState::Deleted => {}
        }

        Ok(Self {
            id: row.id,
            name: row.name,
            featured_image: row.featured_image,
            description: row.description,
            state: row.state,
            lock_version: row.lock_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Validate for Product {
    fn validate(&self) -> ValidationResult {
        require_present("name", &self.name)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Option<&Self::Id> {
        self.id.as_ref()
    }

    fn lock_version(&self) -> u64 {
        self.lock_version
    }
}
