use crate::models::HandOffFields;
use dioxus::prelude::*;

fn received_line(tile_count: usize) -> String {
    match tile_count {
        1 => "We received your memory and will build your matching game from it.".to_string(),
        n => format!("We received all {} memories and will build your matching game from them.", n),
    }
}

/// Confirmation shown once the hand-off submit went through
#[component]
pub fn SubmittedScreen(
    fields: HandOffFields,
    tile_count: usize,
    on_restart: EventHandler<()>,
) -> Element {
    let received = received_line(tile_count);

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto;",
            div { class: "card", style: "text-align: center;",
                div { style: "font-size: 48px; margin-bottom: 12px;", "🎁" }
                h1 { style: "color: #0066cc; font-size: 24px; font-weight: 700; margin: 0 0 8px 0;",
                    "Your memories are on their way!"
                }
                p { style: "color: #666; font-size: 14px; margin-bottom: 20px;",
                    "{received}"
                }

                div { style: "text-align: left; background: #f5f5f5; border-radius: 8px; padding: 12px; font-size: 13px; color: #333;",
                    div { "Session: {fields.session_id}" }
                    div { "Summary: {fields.json_public_id}" }
                    if !fields.snapshot_public_id.is_empty() {
                        div { "Snapshot: {fields.snapshot_public_id}" }
                    }
                }

                button {
                    class: "btn-secondary",
                    style: "margin-top: 20px; padding: 10px 20px;",
                    onclick: move |_| on_restart.call(()),
                    "Build another game"
                }
            }
        }
    }
}
