//! Status projection for the builder.
//!
//! Everything here is a pure function of its input: one status line per
//! event, replaced (never appended) by the next one.

use crate::services::field_registry::{FieldId, FieldRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

impl Tone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Info => "",
            Tone::Success => "success",
            Tone::Error => "error",
        }
    }
}

/// One human-readable line plus an optional ratio for a progress bar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
    pub ratio: Option<f32>,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            ratio: None,
        }
    }

    pub fn empty() -> Self {
        Self::new("", Tone::Info)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Events emitted by the submission flow
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Ready { total: usize },
    TileUploaded { completed: usize, total: usize },
    UploadingSummary,
    HandingOff,
    ValidationFailed { problems: usize },
    AlreadyInProgress,
    ConfigMissing,
    Failed { message: String },
}

impl ProgressEvent {
    pub fn render(&self) -> StatusLine {
        match self {
            ProgressEvent::Ready { total } => StatusLine::new(
                format!(
                    "Add {} memories with images, titles, months, and descriptions.",
                    total
                ),
                Tone::Success,
            ),
            ProgressEvent::TileUploaded { completed, total } => StatusLine {
                text: format!("Uploading memories… ({}/{})", completed, total),
                tone: Tone::Success,
                ratio: Some(ratio(*completed, *total)),
            },
            ProgressEvent::UploadingSummary => {
                StatusLine::new("Uploading JSON summary…", Tone::Success)
            }
            ProgressEvent::HandingOff => StatusLine::new(
                "All memories uploaded! Finishing your submission…",
                Tone::Success,
            ),
            ProgressEvent::ValidationFailed { problems } => {
                let text = if *problems == 1 {
                    "Please fix the highlighted field before continuing.".to_string()
                } else {
                    format!(
                        "Please fix the {} highlighted fields before continuing.",
                        problems
                    )
                };
                StatusLine::new(text, Tone::Error)
            }
            ProgressEvent::AlreadyInProgress => {
                StatusLine::new("An upload is already in progress.", Tone::Error)
            }
            ProgressEvent::ConfigMissing => StatusLine::new(
                "Upload configuration missing. Please contact support.",
                Tone::Error,
            ),
            ProgressEvent::Failed { message } => StatusLine::new(message.clone(), Tone::Error),
        }
    }
}

fn ratio(completed: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        (completed.min(total) as f32) / (total as f32)
    }
}

/// `len/max`, counted in characters
pub fn char_counter(value: &str, max: usize) -> String {
    format!("{}/{}", value.chars().count(), max)
}

/// Complete tiles, total tiles and the bar ratio
pub fn completion(registry: &FieldRegistry) -> (usize, usize, f32) {
    let complete = registry.complete_count();
    let total = registry.tiles().len();
    (complete, total, ratio(complete, total))
}

/// Inline error text for a field and whether it is drawn as invalid
pub fn field_error(registry: &FieldRegistry, field: FieldId) -> Option<String> {
    registry.error(field).map(|p| p.message())
}
