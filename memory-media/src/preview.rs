use crate::models::MediaFile;
use base64::Engine;

/// Renders a file as `data:<mime>;base64,...` for an `<img>` preview
pub fn file_to_data_url(file: &MediaFile) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(file.bytes.as_slice());
    format!("data:{};base64,{}", file.mime, b64)
}
