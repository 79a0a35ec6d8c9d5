//! `shopfront-core` — building blocks shared by the product record and its
//! collaborators.
//!
//! This crate contains **pure domain** primitives (no storage, no clock).

pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::{Entity, ExpectedVersion};
pub use error::{AttachmentError, ValidationError, ValidationResult};
pub use id::{AttachmentId, ProductId, RichTextId};
pub use validation::{Validate, is_blank, require_present};
