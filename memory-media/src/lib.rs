//! # Memory Media
//!
//! Media handling for the matching memories builder.
//!
//! This crate provides:
//! - A multipart upload client for the hosted media service (image and raw uploads)
//! - The default crop step (square crop, 800×800 JPEG)
//! - Composite snapshot generation from the cropped tile images
//! - Data-URL helpers for previews
//!
//! ## Separation of Concerns
//!
//! This crate knows nothing about tiles, gift details or the submission flow.
//! The application crate decides what gets uploaded, in which order, and what
//! happens when an upload fails.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use memory_media::{CloudinaryClient, CloudinaryConfig, MediaUploader, UploadOptions};
//!
//! let client = CloudinaryClient::new(CloudinaryConfig::new("demo", "preset"))?;
//! let descriptor = client
//!     .upload(&file, &UploadOptions::image("our-matching-memories/images"))
//!     .await?;
//! ```

pub mod crop;
pub mod models;
pub mod preview;
pub mod snapshot;
pub mod upload;

pub use crop::{crop_zoomed, CropError, CROP_OUTPUT_SIZE};
pub use models::{ContentDescriptor, MediaFile, ResourceKind, UploadOptions};
pub use preview::file_to_data_url;
pub use snapshot::{compose_snapshot, SnapshotError};
pub use upload::{
    public_id_to_filename, upload_json, CloudinaryClient, CloudinaryConfig, MediaUploader,
    UploadError, UploadResult,
};
