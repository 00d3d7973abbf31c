use crate::error::AppError;
use crate::models::tile::{DESCRIPTION_MAX, TITLE_MAX};
use crate::models::{MemoryTile, Period};
use crate::services::field_registry::{FieldId, FieldRegistry};
use crate::services::progress::{char_counter, field_error};
use crate::services::validation::RuleSet;
use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use memory_media::{file_to_data_url, MediaFile};

/// MIME type from the file extension
fn guess_mime(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// The type the browser reported, or the extension guess when it reported none
fn media_type(content_type: Option<String>, name: &str) -> String {
    content_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| guess_mime(name).to_string())
}

async fn read_image(file: FileData) -> Result<MediaFile, AppError> {
    let name = file.name();
    let mime = media_type(file.content_type(), &name);
    if !MediaFile::new(name.as_str(), mime.as_str(), Vec::new()).is_image() {
        return Err(AppError::NotAnImage(name));
    }
    let bytes = file
        .read_bytes()
        .await
        .map_err(|e| AppError::FileRead(e.to_string()))?;
    Ok(MediaFile::new(name, mime, bytes.to_vec()))
}

/// First image among picked or dropped files, the rest are ignored
async fn first_image(files: Vec<FileData>) -> Option<MediaFile> {
    for file in files {
        match read_image(file).await {
            Ok(image) => return Some(image),
            Err(e) => log::debug!("Skipping file: {}", e),
        }
    }
    None
}

/// One memory slot: image, title, month and description
#[component]
pub fn MemoryTileCard(
    slot: u8,
    registry: Signal<FieldRegistry>,
    rules: RuleSet,
    on_pick: EventHandler<(u8, MediaFile)>,
) -> Element {
    let mut registry = registry;
    let mut dragging = use_signal(|| false);

    let (tile, disabled, error) = {
        let reg = registry.read();
        let Some(tile) = reg.tile(slot).cloned() else {
            return rsx! {};
        };
        (
            tile,
            reg.is_disabled(),
            field_error(&reg, FieldId::Tile(slot)),
        )
    };

    let field = FieldId::Tile(slot);
    let dom_id = field.dom_id();
    let preview = tile.image.as_ref().map(file_to_data_url);
    let period_label = Period::parse(&tile.period).map(|p| p.display_name());
    let title_count = char_counter(&tile.title, TITLE_MAX);
    let description_count = char_counter(&tile.description, DESCRIPTION_MAX);

    let mut class = String::from("card memory-tile");
    if tile.is_complete() {
        class.push_str(" complete");
    }
    if error.is_some() {
        class.push_str(" invalid");
    }
    if dragging() {
        class.push_str(" dragging");
    }

    let mut edit = move |update: Box<dyn FnOnce(&mut MemoryTile)>| {
        let mut reg = registry.write();
        if reg.edit_tile(slot, update) {
            reg.refresh(field, &rules);
        }
    };

    rsx! {
        div {
            id: "{dom_id}",
            class: "{class}",
            ondragover: move |e| {
                e.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| dragging.set(false),
            ondrop: move |e: DragEvent| async move {
                e.prevent_default();
                dragging.set(false);
                if disabled {
                    return;
                }
                match first_image(e.files()).await {
                    Some(file) => on_pick.call((slot, file)),
                    None => log::debug!("Drop on memory {} had no image", slot),
                }
            },

            div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 8px;",
                h3 { style: "margin: 0; font-size: 16px; color: #333;", "Memory {slot}" }
                if tile.is_complete() {
                    span { style: "color: #3a3; font-size: 14px;", "✓" }
                }
            }

            div { class: "tile-image",
                if let Some(src) = preview {
                    img { src: "{src}", alt: "Memory {slot}", style: "width: 100%; aspect-ratio: 1; object-fit: cover; border-radius: 8px;" }
                    div { style: "display: flex; gap: 8px; margin-top: 6px;",
                        button {
                            r#type: "button",
                            class: "btn-secondary",
                            style: "padding: 6px 12px; font-size: 12px;",
                            disabled,
                            onclick: move |_| {
                                if let Some(image) = registry.read().tile(slot).and_then(|t| t.image.clone()) {
                                    on_pick.call((slot, image));
                                }
                            },
                            "Crop"
                        }
                        button {
                            r#type: "button",
                            class: "btn-secondary",
                            style: "padding: 6px 12px; font-size: 12px;",
                            disabled,
                            onclick: move |_| edit(Box::new(|t| t.image = None)),
                            "🗑️"
                        }
                    }
                } else {
                    label { class: "drop-zone",
                        "📷 Choose or drop an image"
                        input {
                            r#type: "file",
                            accept: "image/*",
                            style: "display: none;",
                            disabled,
                            onchange: move |e: FormEvent| async move {
                                if let Some(file) = first_image(e.files()).await {
                                    on_pick.call((slot, file));
                                }
                            },
                        }
                    }
                }
            }

            div { style: "margin-top: 12px;",
                input {
                    r#type: "text",
                    class: "input",
                    name: "memory-{slot}-title",
                    placeholder: "Title",
                    maxlength: "{TITLE_MAX}",
                    value: "{tile.title}",
                    disabled,
                    oninput: move |e| {
                        let value = e.value();
                        edit(Box::new(move |t| t.title = value));
                    },
                }
                div { class: "char-counter", "{title_count}" }
            }

            div { style: "margin-top: 8px;",
                input {
                    r#type: "month",
                    class: "input",
                    name: "memory-{slot}-date",
                    value: "{tile.period}",
                    disabled,
                    oninput: move |e| {
                        let value = e.value();
                        edit(Box::new(move |t| t.period = value));
                    },
                }
                if let Some(label) = period_label {
                    div { class: "char-counter", "{label}" }
                }
            }

            div { style: "margin-top: 8px;",
                textarea {
                    class: "input",
                    name: "memory-{slot}-description",
                    placeholder: "What happened?",
                    maxlength: "{DESCRIPTION_MAX}",
                    rows: "3",
                    value: "{tile.description}",
                    disabled,
                    oninput: move |e| {
                        let value = e.value();
                        edit(Box::new(move |t| t.description = value));
                    },
                    onblur: move |_| registry.write().revalidate(field, &rules),
                }
                div { class: "char-counter", "{description_count}" }
            }

            if let Some(message) = error {
                div { class: "field-error", "{message}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime_from_extension() {
        assert_eq!(guess_mime("Holiday.JPG"), "image/jpeg");
        assert_eq!(guess_mime("a.b.webp"), "image/webp");
        assert_eq!(guess_mime("scan.TIFF"), "image/tiff");
        assert_eq!(guess_mime("notes.txt"), "application/octet-stream");
        assert_eq!(guess_mime("README"), "application/octet-stream");
    }

    #[test]
    fn test_reported_type_wins_over_extension() {
        // No extension, but the browser knows it is an image
        assert_eq!(media_type(Some("image/avif".to_string()), "IMG_0042"), "image/avif");
        // A misleading extension does not turn a text file into an image
        assert_eq!(media_type(Some("text/plain".to_string()), "notes.jpg"), "text/plain");
    }

    #[test]
    fn test_extension_used_when_type_missing() {
        assert_eq!(media_type(None, "beach.png"), "image/png");
        assert_eq!(media_type(Some(String::new()), "beach.bmp"), "image/bmp");
        assert_eq!(media_type(None, "README"), "application/octet-stream");
    }

    #[test]
    fn test_only_image_types_pass_the_filter() {
        let accepted = |content_type: Option<&str>, name: &str| {
            MediaFile::new(name, media_type(content_type.map(str::to_string), name), Vec::new())
                .is_image()
        };
        assert!(accepted(Some("image/heic"), "photo"));
        assert!(accepted(None, "photo.gif"));
        assert!(!accepted(Some("application/pdf"), "photo.pdf"));
        assert!(!accepted(None, "photo"));
    }
}
