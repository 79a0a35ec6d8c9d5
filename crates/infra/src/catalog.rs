//! Product persistence pipeline.
//!
//! `ProductCatalog` composes the three collaborators a product depends on:
//!
//! ```text
//! save:    validate → insert / update (version check)
//! attach:  upload → replace reference → save if persisted → purge replaced blob
//! describe: create body → save if persisted → delete body on failure
//! delete:  delete row (version check) → purge image → delete description body
//! ```
//!
//! It contains no IO itself; everything goes through the injected stores.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shopfront_core::{
    AttachmentError, Entity, ExpectedVersion, ProductId, Validate, ValidationError,
};
use shopfront_products::{AttachmentRef, Blob, Product, RichText, RichTextRef};

use crate::attachments::AttachmentStorage;
use crate::rich_text::RichTextStore;
use crate::store::{ProductStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The record is invalid; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The attachment storage rejected or lost a blob.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record was deleted; deleted records are read-only.
    #[error("product has been deleted")]
    Deleted,
}

/// Save/delete/attach operations for product records.
///
/// Generic over its collaborators so tests run against the in-memory
/// implementations and callers can plug in real backends.
#[derive(Debug)]
pub struct ProductCatalog<P, A, R> {
    products: P,
    attachments: A,
    rich_texts: R,
}

impl<P, A, R> ProductCatalog<P, A, R> {
    pub fn new(products: P, attachments: A, rich_texts: R) -> Self {
        Self {
            products,
            attachments,
            rich_texts,
        }
    }

    pub fn products(&self) -> &P {
        &self.products
    }

    pub fn attachments(&self) -> &A {
        &self.attachments
    }

    pub fn rich_texts(&self) -> &R {
        &self.rich_texts
    }

    pub fn into_parts(self) -> (P, A, R) {
        (self.products, self.attachments, self.rich_texts)
    }
}

impl<P, A, R> ProductCatalog<P, A, R>
where
    P: ProductStore,
    A: AttachmentStorage,
    R: RichTextStore,
{
    /// Validate and persist `product`, returning its identifier.
    ///
    /// An invalid record is reported without touching the store, so a new
    /// record stays without an identifier.
    pub fn save(&self, product: &mut Product) -> Result<ProductId, CatalogError> {
        self.save_at(product, Utc::now())
    }

    /// [`Self::save`] with an explicit timestamp.
    #[instrument(skip_all, fields(name = product.name()))]
    pub fn save_at(
        &self,
        product: &mut Product,
        at: DateTime<Utc>,
    ) -> Result<ProductId, CatalogError> {
        if product.is_deleted() {
            return Err(CatalogError::Deleted);
        }

        if let Err(err) = product.validate() {
            warn!(field = err.field(), "product failed validation");
            return Err(err.into());
        }

        match product.product_id() {
            Some(id) => {
                self.products.update(product, at)?;
                debug!(product_id = %id, "product updated");
                Ok(id)
            }
            None => {
                let id = self.products.insert(product, at)?;
                info!(product_id = %id, "product created");
                Ok(id)
            }
        }
    }

    /// Upload `blob` and make it the product's featured image.
    ///
    /// A rejected upload leaves the product untouched. Any previous image is
    /// replaced and its blob purged. On a persisted product the change is
    /// saved right away; if that save fails the previous image is restored.
    pub fn attach_featured_image(
        &self,
        product: &mut Product,
        blob: Blob,
    ) -> Result<AttachmentRef, CatalogError> {
        if product.is_deleted() {
            return Err(CatalogError::Deleted);
        }

        let uploaded = self.attachments.upload(blob)?;
        let previous = product.attach_featured_image(uploaded.clone());

        if product.is_persisted() {
            if let Err(err) = self.save(product) {
                restore_featured_image(product, previous);
                self.purge_quietly(&uploaded);
                return Err(err);
            }
        }

        if let Some(previous) = previous {
            self.purge_quietly(&previous);
        }

        debug!(attachment_id = %uploaded.id(), "featured image attached");
        Ok(uploaded)
    }

    /// Detach and purge the featured image, if any.
    pub fn remove_featured_image(
        &self,
        product: &mut Product,
    ) -> Result<Option<AttachmentRef>, CatalogError> {
        if product.is_deleted() {
            return Err(CatalogError::Deleted);
        }

        let Some(previous) = product.detach_featured_image() else {
            return Ok(None);
        };

        if product.is_persisted() {
            if let Err(err) = self.save(product) {
                product.attach_featured_image(previous);
                return Err(err);
            }
        }

        self.purge_quietly(&previous);
        Ok(Some(previous))
    }

    /// Create the description body, or rewrite the existing one in place.
    ///
    /// On a persisted product a newly created reference is saved right away;
    /// if that save fails the new body is deleted again.
    pub fn set_description(
        &self,
        product: &mut Product,
        body: &str,
    ) -> Result<RichTextRef, CatalogError> {
        if product.is_deleted() {
            return Err(CatalogError::Deleted);
        }

        match product.description() {
            Some(reference) => {
                self.rich_texts.update(reference, body)?;
                Ok(reference)
            }
            None => {
                let reference = self.rich_texts.create(body)?;
                product.set_description(reference);

                if product.is_persisted() {
                    if let Err(err) = self.save(product) {
                        product.take_description();
                        self.delete_text_quietly(reference);
                        return Err(err);
                    }
                }

                Ok(reference)
            }
        }
    }

    pub fn description(&self, product: &Product) -> Result<Option<RichText>, CatalogError> {
        match product.description() {
            Some(reference) => Ok(self.rich_texts.fetch(reference)?),
            None => Ok(None),
        }
    }

    pub fn featured_image_url(&self, product: &Product) -> Option<String> {
        product
            .featured_image()
            .map(|image| self.attachments.url(image))
    }

    pub fn featured_image_data(&self, product: &Product) -> Result<Option<Vec<u8>>, CatalogError> {
        match product.featured_image() {
            Some(image) => Ok(Some(self.attachments.download(image)?)),
            None => Ok(None),
        }
    }

    pub fn find(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.find(id)?)
    }

    pub fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list()?)
    }

    /// Delete `product` together with its owned image and description.
    ///
    /// The row goes first, guarded by the product's version: a stale copy
    /// fails with [`StoreError::Conflict`] and nothing is removed. The owned
    /// content is then released from the removed row, which may reference
    /// content the caller's copy never saw. A record that was never saved is
    /// only marked deleted (plus its content removed).
    #[instrument(skip_all, fields(product_id = ?product.product_id()))]
    pub fn delete(&self, product: &mut Product) -> Result<(), CatalogError> {
        if product.is_deleted() {
            return Err(CatalogError::Deleted);
        }

        let removed = match product.product_id() {
            Some(id) => {
                let expected = ExpectedVersion::Exact(product.lock_version());
                let row = self
                    .products
                    .delete(id, expected)?
                    .ok_or(StoreError::NotFound(id))?;
                Some(row)
            }
            None => None,
        };

        let image = product.detach_featured_image();
        let text = product.take_description();

        if let Some(mut row) = removed {
            let row_image = row.detach_featured_image();
            let row_text = row.take_description();
            if row_image != image {
                self.release_content(row_image, None);
            }
            if row_text != text {
                self.release_content(None, row_text);
            }
        }
        self.release_content(image, text);

        product.mark_deleted();
        info!("product deleted");
        Ok(())
    }

    fn release_content(&self, image: Option<AttachmentRef>, text: Option<RichTextRef>) {
        if let Some(image) = image {
            self.purge_quietly(&image);
        }
        if let Some(text) = text {
            self.delete_text_quietly(text);
        }
    }

    fn delete_text_quietly(&self, text: RichTextRef) {
        if let Err(err) = self.rich_texts.delete(text) {
            warn!(rich_text_id = %text, error = %err, "failed to delete description");
        }
    }

    /// Purge failures after the owning change succeeded are logged, not
    /// returned: the record is already consistent.
    fn purge_quietly(&self, image: &AttachmentRef) {
        if let Err(err) = self.attachments.purge(image) {
            warn!(attachment_id = %image.id(), error = %err, "failed to purge attachment");
        }
    }
}

fn restore_featured_image(product: &mut Product, previous: Option<AttachmentRef>) {
    match previous {
        Some(previous) => {
            product.attach_featured_image(previous);
        }
        None => {
            product.detach_featured_image();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::InMemoryAttachmentStorage;
    use crate::rich_text::InMemoryRichTextStore;
    use crate::store::InMemoryProductStore;

    type TestCatalog =
        ProductCatalog<InMemoryProductStore, InMemoryAttachmentStorage, InMemoryRichTextStore>;

    fn catalog() -> TestCatalog {
        ProductCatalog::new(
            InMemoryProductStore::new(),
            InMemoryAttachmentStorage::default(),
            InMemoryRichTextStore::new(),
        )
    }

    fn png(name: &str) -> Blob {
        Blob::new(name, mime::IMAGE_PNG, vec![1u8, 2, 3, 4])
    }

    #[test]
    fn save_named_product_returns_new_id() {
        let catalog = catalog();
        let mut product = Product::new("Widget");

        let id = catalog.save(&mut product).unwrap();

        assert_eq!(product.product_id(), Some(id));
        assert!(product.is_persisted());
        assert_eq!(catalog.find(id).unwrap(), Some(product));
    }

    #[test]
    fn save_blank_product_is_rejected_without_id() {
        let catalog = catalog();
        let mut product = Product::new("");

        let err = catalog.save(&mut product).unwrap_err();

        assert_eq!(err, CatalogError::Validation(ValidationError::Presence("name")));
        assert_eq!(product.product_id(), None);
        assert!(product.is_new_record());
        assert!(catalog.products().is_empty());
    }

    #[test]
    fn blank_rename_of_persisted_product_keeps_stored_row() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();

        product.set_name("  ");
        let err = catalog.save(&mut product).unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(catalog.find(id).unwrap().unwrap().name(), "Widget");
    }

    #[test]
    fn resave_updates_the_same_row() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();

        product.set_name("Widget Pro");
        assert_eq!(catalog.save(&mut product).unwrap(), id);

        assert_eq!(catalog.list().unwrap().len(), 1);
        assert_eq!(catalog.find(id).unwrap().unwrap().name(), "Widget Pro");
    }

    #[test]
    fn replacing_image_purges_previous_blob() {
        let catalog = catalog();
        let mut product = Product::new("Widget");

        let first = catalog.attach_featured_image(&mut product, png("a.png")).unwrap();
        let second = catalog.attach_featured_image(&mut product, png("b.png")).unwrap();

        assert_eq!(product.featured_image(), Some(&second));
        assert!(!catalog.attachments().exists(&first));
        assert!(catalog.attachments().exists(&second));
        assert_eq!(catalog.attachments().blob_count(), 1);
    }

    #[test]
    fn rejected_upload_leaves_product_unchanged() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let kept = catalog.attach_featured_image(&mut product, png("a.png")).unwrap();
        let before = product.clone();

        let err = catalog
            .attach_featured_image(&mut product, Blob::new("a.txt", mime::TEXT_PLAIN, b"x".to_vec()))
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::Attachment(AttachmentError::ContentTypeNotAllowed(_))
        ));
        assert_eq!(product, before);
        assert!(catalog.attachments().exists(&kept));
    }

    #[test]
    fn attaching_to_persisted_product_saves_immediately() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();

        let image = catalog.attach_featured_image(&mut product, png("a.png")).unwrap();

        let stored = catalog.find(id).unwrap().unwrap();
        assert_eq!(stored.featured_image(), Some(&image));
    }

    #[test]
    fn failed_save_during_attach_restores_previous_image() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let original = catalog.attach_featured_image(&mut product, png("a.png")).unwrap();
        catalog.save(&mut product).unwrap();

        product.set_name("");
        let err = catalog
            .attach_featured_image(&mut product, png("b.png"))
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(product.featured_image(), Some(&original));
        assert!(catalog.attachments().exists(&original));
        assert_eq!(catalog.attachments().blob_count(), 1);
    }

    #[test]
    fn remove_featured_image_purges_blob() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();
        let image = catalog.attach_featured_image(&mut product, png("a.png")).unwrap();

        assert_eq!(catalog.remove_featured_image(&mut product).unwrap(), Some(image.clone()));

        assert!(!catalog.attachments().exists(&image));
        assert!(!catalog.find(id).unwrap().unwrap().has_featured_image());
        assert_eq!(catalog.remove_featured_image(&mut product).unwrap(), None);
    }

    #[test]
    fn description_is_rewritten_in_place() {
        let catalog = catalog();
        let mut product = Product::new("Widget");

        let first = catalog.set_description(&mut product, "<p>v1</p>").unwrap();
        let second = catalog.set_description(&mut product, "<p>v2</p>").unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.rich_texts().len(), 1);
        let text = catalog.description(&product).unwrap().unwrap();
        assert_eq!(text.body(), "<p>v2</p>");
    }

    #[test]
    fn describing_persisted_product_saves_immediately() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();

        let reference = catalog.set_description(&mut product, "<p>Sturdy</p>").unwrap();

        let mut stored = catalog.find(id).unwrap().unwrap();
        assert_eq!(stored.description(), Some(reference));
        assert_eq!(stored.lock_version(), product.lock_version());

        catalog.delete(&mut stored).unwrap();
        assert!(catalog.rich_texts().is_empty());
    }

    #[test]
    fn failed_save_during_describe_deletes_new_body() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();

        product.set_name("");
        let err = catalog.set_description(&mut product, "<p>Lost</p>").unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(product.description(), None);
        assert!(catalog.rich_texts().is_empty());
        assert_eq!(catalog.find(id).unwrap().unwrap().description(), None);
    }

    #[test]
    fn empty_description_is_accepted() {
        let catalog = catalog();
        let mut product = Product::new("Widget");

        catalog.set_description(&mut product, "").unwrap();

        assert!(catalog.description(&product).unwrap().unwrap().is_blank());
    }

    #[test]
    fn delete_cascades_to_owned_content() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let image = catalog.attach_featured_image(&mut product, png("a.png")).unwrap();
        catalog.set_description(&mut product, "<p>Sturdy</p>").unwrap();
        let id = catalog.save(&mut product).unwrap();

        catalog.delete(&mut product).unwrap();

        assert!(product.is_deleted());
        assert_eq!(catalog.find(id).unwrap(), None);
        assert!(!catalog.attachments().exists(&image));
        assert!(catalog.rich_texts().is_empty());
    }

    #[test]
    fn deleting_unsaved_product_cleans_up_uploads() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        catalog.attach_featured_image(&mut product, png("a.png")).unwrap();
        catalog.set_description(&mut product, "draft").unwrap();

        catalog.delete(&mut product).unwrap();

        assert!(product.is_deleted());
        assert_eq!(catalog.attachments().blob_count(), 0);
        assert!(catalog.rich_texts().is_empty());
    }

    #[test]
    fn deleted_product_is_read_only() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        catalog.save(&mut product).unwrap();
        catalog.delete(&mut product).unwrap();

        assert_eq!(catalog.save(&mut product).unwrap_err(), CatalogError::Deleted);
        assert_eq!(catalog.delete(&mut product).unwrap_err(), CatalogError::Deleted);
        assert_eq!(
            catalog.attach_featured_image(&mut product, png("a.png")).unwrap_err(),
            CatalogError::Deleted
        );
        assert_eq!(
            catalog.set_description(&mut product, "x").unwrap_err(),
            CatalogError::Deleted
        );
        assert_eq!(catalog.attachments().blob_count(), 0);
    }

    #[test]
    fn delete_releases_content_saved_by_another_copy() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();

        let mut other = catalog.find(id).unwrap().unwrap();
        let image = catalog.attach_featured_image(&mut other, png("a.png")).unwrap();

        // Same version as the row, but without the image reference.
        let mut current = catalog.find(id).unwrap().unwrap();
        current.detach_featured_image();
        catalog.delete(&mut current).unwrap();

        assert!(!catalog.attachments().exists(&image));
        assert_eq!(catalog.attachments().blob_count(), 0);
    }

    #[test]
    fn deleting_row_removed_elsewhere_is_not_found() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        let id = catalog.save(&mut product).unwrap();
        catalog.products().delete(id, ExpectedVersion::Any).unwrap();

        let err = catalog.delete(&mut product).unwrap_err();

        assert_eq!(err, CatalogError::Store(StoreError::NotFound(id)));
        assert!(product.is_persisted());
    }

    #[test]
    fn featured_image_url_and_data() {
        let catalog = catalog();
        let mut product = Product::new("Widget");
        assert_eq!(catalog.featured_image_url(&product), None);
        assert_eq!(catalog.featured_image_data(&product).unwrap(), None);

        let image = catalog.attach_featured_image(&mut product, png("a.png")).unwrap();

        assert_eq!(
            catalog.featured_image_url(&product),
            Some(format!("/attachments/{}/a.png", image.id()))
        );
        assert_eq!(
            catalog.featured_image_data(&product).unwrap(),
            Some(vec![1u8, 2, 3, 4])
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Property: any number of attaches leaves exactly one stored blob,
            /// and it is the last one attached.
            #[test]
            fn repeated_attach_keeps_one_blob(count in 1usize..12, persisted in any::<bool>()) {
                let catalog = catalog();
                let mut product = Product::new("Widget");
                if persisted {
                    catalog.save(&mut product).unwrap();
                }

                let mut last = None;
                for n in 0..count {
                    let blob = png(&format!("{n}.png"));
                    last = Some(catalog.attach_featured_image(&mut product, blob).unwrap());
                }

                prop_assert_eq!(catalog.attachments().blob_count(), 1);
                prop_assert_eq!(product.featured_image(), last.as_ref());
                if let Some(id) = product.product_id() {
                    let stored = catalog.find(id).unwrap().unwrap();
                    prop_assert_eq!(stored.featured_image(), last.as_ref());
                }
            }

            /// Property: deleting after any mix of attaches and descriptions
            /// leaves no content behind.
            #[test]
            fn delete_leaves_no_content(attaches in 0usize..4, describes in 0usize..4) {
                let catalog = catalog();
                let mut product = Product::new("Widget");
                catalog.save(&mut product).unwrap();

                for n in 0..attaches {
                    catalog.attach_featured_image(&mut product, png(&format!("{n}.png"))).unwrap();
                }
                for n in 0..describes {
                    catalog.set_description(&mut product, &format!("<p>{n}</p>")).unwrap();
                }
                catalog.delete(&mut product).unwrap();

                prop_assert!(catalog.products().is_empty());
                prop_assert_eq!(catalog.attachments().blob_count(), 0);
                prop_assert!(catalog.rich_texts().is_empty());
            }
        }
    }
}
