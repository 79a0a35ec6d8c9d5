//! Infrastructure layer: the collaborators a product record depends on and
//! the pipeline that drives them.

pub mod attachments;
pub mod catalog;
pub mod config;
pub mod rich_text;
pub mod store;

pub use attachments::{AttachmentStorage, InMemoryAttachmentStorage};
pub use catalog::{CatalogError, ProductCatalog};
pub use config::{ConfigError, StorageConfig};
pub use rich_text::{InMemoryRichTextStore, RichTextStore};
pub use store::{InMemoryProductStore, ProductStore, StoreError};

/// Catalog wired to the in-memory collaborators.
pub type InMemoryCatalog =
    ProductCatalog<InMemoryProductStore, InMemoryAttachmentStorage, InMemoryRichTextStore>;

/// Build an in-memory catalog whose attachment limits come from `config`.
pub fn in_memory_catalog(config: StorageConfig) -> InMemoryCatalog {
    ProductCatalog::new(
        InMemoryProductStore::new(),
        InMemoryAttachmentStorage::new(config),
        InMemoryRichTextStore::new(),
    )
}
