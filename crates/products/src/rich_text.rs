//! Rich-text descriptions.

use serde::{Deserialize, Serialize};

use shopfront_core::{RichTextId, is_blank};

/// Reference to a rich-text body owned by exactly one product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichTextRef(RichTextId);

impl RichTextRef {
    pub fn new(id: RichTextId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> RichTextId {
        self.0
    }
}

impl core::fmt::Display for RichTextRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A stored rich-text body.
///
/// `body` is the raw formatted markup exactly as submitted; it is never
/// parsed or rendered here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    id: RichTextId,
    body: String,
}

impl RichText {
    pub fn new(id: RichTextId, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
        }
    }

    pub fn id(&self) -> RichTextId {
        self.id
    }

    pub fn reference(&self) -> RichTextRef {
        RichTextRef(self.id)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Empty or whitespace-only body.
    pub fn is_blank(&self) -> bool {
        is_blank(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_points_at_the_body() {
        let text = RichText::new(RichTextId::new(), "<p>Sturdy</p>");
        assert_eq!(text.reference().id(), text.id());
    }

    #[test]
    fn whitespace_body_is_blank() {
        let mut text = RichText::new(RichTextId::new(), " \n ");
        assert!(text.is_blank());

        text.set_body("<b>bold</b>");
        assert!(!text.is_blank());
        assert_eq!(text.body(), "<b>bold</b>");
    }
}
