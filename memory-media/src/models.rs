use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A binary file handle owned by a tile (or built for an upload).
///
/// The bytes are shared, never mutated: cropping or removing an image
/// replaces the whole handle.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<Vec<u8>>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Only `image/*` files are accepted by tiles (drag-and-drop filter)
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Which upload endpoint a file goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image, // tiles and the page snapshot
    Raw,   // the JSON summary document
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Raw => "raw",
        }
    }
}

/// Destination metadata for a single upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    pub resource_kind: ResourceKind,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    pub context: Option<String>,
    pub filename: Option<String>,
}

impl UploadOptions {
    pub fn image(folder: impl Into<String>) -> Self {
        Self {
            resource_kind: ResourceKind::Image,
            folder: Some(folder.into()),
            tags: Vec::new(),
            context: None,
            filename: None,
        }
    }

    pub fn raw(folder: impl Into<String>) -> Self {
        Self {
            resource_kind: ResourceKind::Raw,
            ..Self::image(folder)
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Structured result of a successful upload.
///
/// Raw uploads carry no dimensions or format, so those are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    pub secure_url: String,
    pub public_id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub format: Option<String>,
}
