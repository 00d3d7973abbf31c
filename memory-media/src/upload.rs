//! Upload client for the hosted media service
//!
//! This module wraps the unsigned multipart upload endpoint of the media host.
//! Images and raw files (the JSON summary) use separate endpoints. There is no
//! automatic retry: a failed upload is reported once and the caller decides
//! what to abort.

use crate::models::{ContentDescriptor, MediaFile, ResourceKind, UploadOptions};
use serde::Serialize;
use std::time::Duration;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur during an upload
#[derive(Debug)]
pub enum UploadError {
    /// Cloud name or upload preset missing
    Config(String),
    MissingFile,
    /// Non-success response, body kept as diagnostic text
    Http { status: u16, body: String },
    Network(String),
    TimedOut,
    InvalidResponse(String),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::Config(msg) => write!(f, "Upload configuration missing: {}", msg),
            UploadError::MissingFile => write!(f, "No file provided for upload"),
            UploadError::Http { status, body } => {
                write!(f, "Upload rejected with status {}: {}", status, body)
            }
            UploadError::Network(msg) => write!(f, "Network error: {}", msg),
            UploadError::TimedOut => write!(f, "Upload timed out"),
            UploadError::InvalidResponse(msg) => write!(f, "Invalid upload response: {}", msg),
            UploadError::Serialize(e) => write!(f, "JSON serialize failed: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::Serialize(err)
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploadError::TimedOut
        } else if err.is_decode() {
            UploadError::InvalidResponse(err.to_string())
        } else {
            UploadError::Network(err.to_string())
        }
    }
}

impl UploadError {
    pub fn http_status(&self) -> Option<u16> {
        match self {
            UploadError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, UploadError::TimedOut)
    }
}

/// Anything that can turn a file plus destination metadata into a content descriptor.
///
/// The application is generic over this so the submission flow can be driven
/// without a network.
#[allow(async_fn_in_trait)]
pub trait MediaUploader {
    async fn upload(
        &self,
        file: &MediaFile,
        options: &UploadOptions,
    ) -> UploadResult<ContentDescriptor>;
}

/// Connection settings for the media host
#[derive(Debug, Clone, PartialEq)]
pub struct CloudinaryConfig {
    pub api_base: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub timeout: Duration,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Multipart upload client for the media host
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> UploadResult<Self> {
        if config.cloud_name.trim().is_empty() {
            return Err(UploadError::Config("cloud name".to_string()));
        }
        if config.upload_preset.trim().is_empty() {
            return Err(UploadError::Config("upload preset".to_string()));
        }

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("MatchingMemories/0.1.0");

        let client = builder
            .build()
            .map_err(|e| UploadError::Network(format!("Client build failed: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    /// Endpoint for the given resource kind
    pub fn endpoint(&self, kind: ResourceKind) -> String {
        format!(
            "{}/{}/{}/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            kind.as_str()
        )
    }

    /// Text fields sent next to the file part, in wire order
    pub fn form_fields(&self, options: &UploadOptions) -> Vec<(&'static str, String)> {
        let mut fields = vec![("upload_preset", self.config.upload_preset.clone())];
        if let Some(folder) = options.folder.as_ref().filter(|f| !f.is_empty()) {
            fields.push(("folder", folder.clone()));
        }
        if !options.tags.is_empty() {
            fields.push(("tags", options.tags.join(",")));
        }
        if let Some(context) = options.context.as_ref().filter(|c| !c.is_empty()) {
            fields.push(("context", context.clone()));
        }
        fields
    }

    fn build_form(
        &self,
        file: &MediaFile,
        options: &UploadOptions,
    ) -> UploadResult<reqwest::multipart::Form> {
        let filename = options
            .filename
            .clone()
            .unwrap_or_else(|| file.name.clone());

        let part = reqwest::multipart::Part::bytes(file.bytes.as_ref().clone())
            .file_name(filename)
            .mime_str(&file.mime)
            .map_err(|e| UploadError::Network(format!("Invalid mime type: {}", e)))?;

        let mut form = reqwest::multipart::Form::new().part("file", part);
        for (name, value) in self.form_fields(options) {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

impl MediaUploader for CloudinaryClient {
    async fn upload(
        &self,
        file: &MediaFile,
        options: &UploadOptions,
    ) -> UploadResult<ContentDescriptor> {
        if file.is_empty() {
            return Err(UploadError::MissingFile);
        }

        let url = self.endpoint(options.resource_kind);
        let form = self.build_form(file, options)?;

        log::debug!(
            "Uploading {} ({} bytes) to {}",
            options.filename.as_deref().unwrap_or(&file.name),
            file.len(),
            url
        );

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Media upload failed ({}): {}", status, body);
            return Err(UploadError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        parse_descriptor(&text)
    }
}

/// Parses a success body into a descriptor
pub fn parse_descriptor(body: &str) -> UploadResult<ContentDescriptor> {
    serde_json::from_str::<ContentDescriptor>(body)
        .map_err(|e| UploadError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Uploads a JSON payload as a pretty-printed raw file
pub async fn upload_json<U, T>(
    uploader: &U,
    payload: &T,
    options: UploadOptions,
) -> UploadResult<ContentDescriptor>
where
    U: MediaUploader + ?Sized,
    T: Serialize,
{
    let body = serde_json::to_vec_pretty(payload)?;
    let filename = options
        .filename
        .clone()
        .unwrap_or_else(|| "memories.json".to_string());
    let file = MediaFile::new(filename.clone(), "application/json", body);
    let options = UploadOptions {
        resource_kind: ResourceKind::Raw,
        filename: Some(filename),
        ..options
    };
    uploader.upload(&file, &options).await
}

/// Reduces a public id to its last path segment, optionally without extension.
///
/// `our-matching-memories/json/abc123.json` becomes `abc123`.
pub fn public_id_to_filename(public_id: &str, strip_extension: bool) -> String {
    let last = public_id.rsplit('/').next().unwrap_or("");
    if !strip_extension {
        return last.to_string();
    }
    match last.rfind('.') {
        Some(idx) if idx + 1 < last.len() => last[..idx].to_string(),
        _ => last.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CloudinaryClient {
        CloudinaryClient::new(CloudinaryConfig::new("demo-cloud", "memory_game_upload")).unwrap()
    }

    #[test]
    fn test_public_id_to_filename() {
        assert_eq!(public_id_to_filename("a/b/c/xyz123.json", true), "xyz123");
        assert_eq!(public_id_to_filename("a/b/c/xyz123.json", false), "xyz123.json");
        assert_eq!(public_id_to_filename("xyz123", true), "xyz123");
        assert_eq!(public_id_to_filename("folder/archive.tar.gz", true), "archive.tar");
        assert_eq!(public_id_to_filename("folder/trailing.", true), "trailing.");
        assert_eq!(public_id_to_filename("", true), "");
    }

    #[test]
    fn test_endpoint_by_resource_kind() {
        let client = client();
        assert_eq!(
            client.endpoint(ResourceKind::Image),
            "https://api.cloudinary.com/v1_1/demo-cloud/image/upload"
        );
        assert_eq!(
            client.endpoint(ResourceKind::Raw),
            "https://api.cloudinary.com/v1_1/demo-cloud/raw/upload"
        );
    }

    #[test]
    fn test_form_fields_skip_empty_values() {
        let client = client();
        let bare = client.form_fields(&UploadOptions {
            resource_kind: ResourceKind::Image,
            folder: None,
            tags: Vec::new(),
            context: None,
            filename: None,
        });
        assert_eq!(bare, vec![("upload_preset", "memory_game_upload".to_string())]);

        let full = client.form_fields(
            &UploadOptions::image("our-matching-memories/images")
                .with_tags(["our-matching-memories", "eb-mm-1-abcdef"])
                .with_context("memory_number=1|title=Beach"),
        );
        assert_eq!(full.len(), 4);
        assert_eq!(full[2], ("tags", "our-matching-memories,eb-mm-1-abcdef".to_string()));
        assert_eq!(full[3].0, "context");
    }

    #[test]
    fn test_missing_config_rejected() {
        let err = CloudinaryClient::new(CloudinaryConfig::new("", "preset")).unwrap_err();
        assert!(matches!(err, UploadError::Config(_)));

        let err = CloudinaryClient::new(CloudinaryConfig::new("cloud", "  ")).unwrap_err();
        assert!(matches!(err, UploadError::Config(_)));
    }

    #[test]
    fn test_parse_descriptor_rejects_garbage() {
        let err = parse_descriptor("<html>oops</html>").unwrap_err();
        assert!(matches!(err, UploadError::InvalidResponse(_)));
        assert_eq!(err.http_status(), None);
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected_before_network() {
        let client = client();
        let file = MediaFile::new("empty.jpg", "image/jpeg", Vec::new());
        let err = client
            .upload(&file, &UploadOptions::image("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingFile));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let mut config = CloudinaryConfig::new("demo-cloud", "preset");
        config.api_base = "http://127.0.0.1:9".to_string();
        let client = CloudinaryClient::new(config).unwrap();
        let file = MediaFile::new("a.jpg", "image/jpeg", vec![0xff, 0xd8]);

        let err = client
            .upload(&file, &UploadOptions::image("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Network(_) | UploadError::TimedOut));
    }
}
