use crate::services::progress::StatusLine;
use dioxus::prelude::*;

/// The single status line under the form, with a bar while uploading
#[component]
pub fn StatusBanner(status: StatusLine) -> Element {
    if status.is_empty() {
        return rsx! {};
    }

    let class = format!("status-line {}", status.tone.css_class());
    let bar = status
        .ratio
        .map(|ratio| format!("width: {:.0}%;", ratio * 100.0));

    rsx! {
        div { id: "upload-status", class: "{class}", role: "status",
            "{status.text}"
            if let Some(width) = bar {
                div { class: "progress-track",
                    div { class: "progress-fill", style: "{width}" }
                }
            }
        }
    }
}
