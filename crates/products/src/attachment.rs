//! Featured-image attachments.
//!
//! The record never holds image bytes. Bytes travel as a [`Blob`] to the
//! attachment storage, which answers with an [`AttachmentRef`]; only the
//! reference is kept on the product.

use mime::Mime;
use serde::{Deserialize, Serialize};

use shopfront_core::{AttachmentError, AttachmentId};

/// Upload input: a named payload with its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    filename: String,
    content_type: Mime,
    data: Vec<u8>,
}

impl Blob {
    pub fn new(filename: impl Into<String>, content_type: Mime, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Build a blob from a content type as declared by a client, e.g. a
    /// multipart `Content-Type` header.
    pub fn from_declared(
        filename: impl Into<String>,
        content_type: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<Self, AttachmentError> {
        let content_type = content_type
            .trim()
            .parse::<Mime>()
            .map_err(|_| AttachmentError::InvalidContentType(content_type.to_string()))?;
        Ok(Self::new(filename, content_type, data))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn byte_size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Reference to a blob held by the attachment storage.
///
/// Carries the blob metadata recorded at upload time so callers can render
/// links without another storage round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    id: AttachmentId,
    filename: String,
    #[serde(with = "mime_text")]
    content_type: Mime,
    byte_size: u64,
}

impl AttachmentRef {
    pub fn new(
        id: AttachmentId,
        filename: impl Into<String>,
        content_type: Mime,
        byte_size: u64,
    ) -> Self {
        Self {
            id,
            filename: filename.into(),
            content_type,
            byte_size,
        }
    }

    /// Reference for `blob` stored under `id`.
    pub fn for_blob(id: AttachmentId, blob: &Blob) -> Self {
        Self::new(
            id,
            blob.filename(),
            blob.content_type().clone(),
            blob.byte_size(),
        )
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn is_image(&self) -> bool {
        self.content_type.type_() == mime::IMAGE
    }
}

/// `Mime` as its textual form in serialized rows.
mod mime_text {
    use mime::Mime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Mime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Mime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
