use crate::config::ConfigError;
use crate::services::orchestrator::SubmissionError;
use memory_media::{CropError, UploadError};
use std::fmt;

/// Central error type for the memories builder
#[derive(Debug)]
pub enum AppError {
    /// Configuration could not be loaded
    Config(ConfigError),
    /// Upload client or request failed
    Upload(UploadError),
    /// Crop step failed
    Crop(CropError),
    /// Submission ended without a hand-off
    Submission(SubmissionError),
    /// A picked file could not be read
    FileRead(String),
    /// Dropped or picked file is not an image
    NotAnImage(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Upload(e) => write!(f, "Upload error: {}", e),
            AppError::Crop(e) => write!(f, "Crop error: {}", e),
            AppError::Submission(e) => write!(f, "Submission error: {}", e),
            AppError::FileRead(msg) => write!(f, "Could not read file: {}", msg),
            AppError::NotAnImage(name) => write!(f, "Not an image: {}", name),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::Upload(e)
    }
}

impl From<CropError> for AppError {
    fn from(e: CropError) -> Self {
        AppError::Crop(e)
    }
}

impl From<SubmissionError> for AppError {
    fn from(e: SubmissionError) -> Self {
        AppError::Submission(e)
    }
}

/// User-facing messages for the UI
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(_) => "Upload configuration missing. Please contact support.".to_string(),
            AppError::Upload(e) if e.is_timeout() => {
                "The upload timed out. Please try again.".to_string()
            }
            AppError::Upload(_) => "The upload failed. Please try again.".to_string(),
            AppError::Crop(_) => "This image could not be cropped.".to_string(),
            AppError::Submission(e) => e.event().render().text,
            AppError::FileRead(_) => "The selected file could not be read.".to_string(),
            AppError::NotAnImage(name) => format!("{} is not an image.", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::orchestrator::UploadTarget;

    #[test]
    fn test_timeout_has_own_message() {
        let err = AppError::from(UploadError::TimedOut);
        assert_eq!(err.user_message(), "The upload timed out. Please try again.");
    }

    #[test]
    fn test_submission_message_matches_status_line() {
        let err = AppError::from(SubmissionError::Upload {
            target: UploadTarget::Tile(4),
            source: UploadError::Network("reset".to_string()),
        });
        assert_eq!(err.user_message(), "Upload failed for Memory 4.");
    }

    #[test]
    fn test_display_includes_cause() {
        let err = AppError::NotAnImage("notes.txt".to_string());
        assert_eq!(err.to_string(), "Not an image: notes.txt");
        assert_eq!(err.user_message(), "notes.txt is not an image.");
    }
}
