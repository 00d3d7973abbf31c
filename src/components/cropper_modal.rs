use dioxus::prelude::*;
use memory_media::{file_to_data_url, MediaFile};

/// Zoom and pan chosen in the cropper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSettings {
    /// 1.0 shows the largest square, 3.0 a third of it
    pub zoom: f32,
    /// -1.0 (left/top edge) ..= 1.0 (right/bottom edge)
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl CropSettings {
    /// CSS approximating the final crop on the preview
    fn preview_style(&self) -> String {
        let x = 50.0 + self.offset_x * 50.0;
        let y = 50.0 + self.offset_y * 50.0;
        format!(
            "width: 100%; height: 100%; object-fit: cover; object-position: {x:.0}% {y:.0}%; transform: scale({:.2}); transform-origin: {x:.0}% {y:.0}%;",
            self.zoom
        )
    }
}

#[component]
pub fn CropperModal(
    slot: u8,
    file: MediaFile,
    on_apply: EventHandler<CropSettings>,
    on_cancel: EventHandler<()>,
) -> Element {
    let mut settings = use_signal(CropSettings::default);
    let preview = use_memo(use_reactive((&file,), |(file,)| file_to_data_url(&file)));

    let current = settings();
    let preview_style = current.preview_style();

    rsx! {
        div { class: "modal-backdrop",
            div { class: "card modal", style: "max-width: 420px; margin: 40px auto;",
                h2 { style: "font-size: 18px; margin: 0 0 12px 0; color: #333;",
                    "Crop memory {slot}"
                }

                div { style: "width: 300px; height: 300px; margin: 0 auto 16px auto; overflow: hidden; border-radius: 8px; background: #ddd;",
                    img { src: "{preview}", alt: "{file.name}", style: "{preview_style}" }
                }

                label { class: "crop-control",
                    "Zoom"
                    input {
                        r#type: "range",
                        min: "1",
                        max: "3",
                        step: "0.05",
                        value: "{current.zoom}",
                        oninput: move |e| {
                            if let Ok(zoom) = e.value().parse::<f32>() {
                                settings.write().zoom = zoom;
                            }
                        },
                    }
                }
                label { class: "crop-control",
                    "Horizontal"
                    input {
                        r#type: "range",
                        min: "-1",
                        max: "1",
                        step: "0.05",
                        value: "{current.offset_x}",
                        oninput: move |e| {
                            if let Ok(x) = e.value().parse::<f32>() {
                                settings.write().offset_x = x;
                            }
                        },
                    }
                }
                label { class: "crop-control",
                    "Vertical"
                    input {
                        r#type: "range",
                        min: "-1",
                        max: "1",
                        step: "0.05",
                        value: "{current.offset_y}",
                        oninput: move |e| {
                            if let Ok(y) = e.value().parse::<f32>() {
                                settings.write().offset_y = y;
                            }
                        },
                    }
                }

                div { style: "display: flex; gap: 12px; justify-content: flex-end; margin-top: 16px;",
                    button {
                        r#type: "button",
                        class: "btn-secondary",
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                    button {
                        r#type: "button",
                        class: "btn-primary",
                        onclick: move |_| on_apply.call(settings()),
                        "Apply crop"
                    }
                }
            }
        }
    }
}
