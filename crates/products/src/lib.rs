//! Product records.
//!
//! This crate holds the product record and the references it keeps to its
//! owned content (featured image, rich-text description). It is deterministic
//! domain logic only: no storage, no clock, no IO.

pub mod attachment;
pub mod product;
pub mod rich_text;

pub use attachment::{AttachmentRef, Blob};
pub use product::{InconsistentRow, Product, ProductState};
pub use rich_text::{RichText, RichTextRef};
pub use shopfront_core::{ProductId, Validate, ValidationError};
