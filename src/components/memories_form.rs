use crate::components::{
    CropSettings, CropperModal, GiftDetailsCard, MemoryTileCard, StatusBanner,
};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{HandOffFields, SessionIdentity};
use crate::services::field_registry::{FieldId, FieldRegistry};
use crate::services::orchestrator::{Orchestrator, SubmitDecision, SubmitHost};
use crate::services::progress::{completion, ProgressEvent, StatusLine, Tone};
use dioxus::prelude::*;
use memory_media::{crop_zoomed, CloudinaryClient, MediaFile};
use std::rc::Rc;

pub const FORM_ID: &str = "memories-form";

/// The page side of a submission, backed by the form's signals
#[derive(Clone, Copy)]
struct DioxusHost {
    fields: Signal<FieldRegistry>,
    status: Signal<StatusLine>,
    /// Bumped for every re-issue request, consumed by an effect after render
    resubmits: Signal<u32>,
}

impl SubmitHost for DioxusHost {
    fn fields(&self) -> FieldRegistry {
        self.fields.read().clone()
    }

    fn update_fields<F>(&mut self, update: F)
    where
        F: FnOnce(&mut FieldRegistry),
    {
        let mut fields = self.fields.write();
        update(&mut fields);
    }

    fn show_status(&mut self, status: StatusLine) {
        self.status.set(status);
    }

    fn focus_field(&mut self, field: FieldId) {
        let _ = document::eval(&format!(
            "document.getElementById('{}')?.scrollIntoView({{ behavior: 'smooth', block: 'center' }});",
            field.dom_id()
        ));
    }

    fn request_submit(&mut self) {
        *self.resubmits.write() += 1;
    }
}

/// Script for the second pass. Signal writes reach the DOM only on the next
/// render, so the hand-off values and the re-enabled controls are applied
/// here before the native submit fires. Disabled controls are left out of
/// the posted form data.
fn resubmit_script(form_id: &str, fields: &HandOffFields) -> String {
    let values: serde_json::Map<String, serde_json::Value> = fields
        .entries()
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
        .collect();
    format!(
        r#"const form = document.getElementById({id});
if (form) {{
  for (const [name, value] of Object.entries({values})) {{
    let input = form.elements.namedItem(name);
    if (!input) {{
      input = document.createElement("input");
      input.type = "hidden";
      input.name = name;
      input.id = name;
      form.appendChild(input);
    }}
    input.value = value;
  }}
  form.querySelectorAll(":disabled").forEach((el) => {{ el.disabled = false; }});
  form.requestSubmit();
}}"#,
        id = serde_json::Value::from(form_id),
        values = serde_json::Value::Object(values),
    )
}

type FormOrchestrator = Orchestrator<CloudinaryClient, DioxusHost>;

#[component]
pub fn MemoriesForm(config: AppConfig, on_handoff: EventHandler<HandOffFields>) -> Element {
    let rules = config.rules;
    let session = use_hook(|| SessionIdentity::ensure(""));
    let mut registry = use_signal(|| FieldRegistry::new(rules.tile_count).with_session(&session));
    let mut status = use_signal(|| {
        ProgressEvent::Ready {
            total: rules.tile_count,
        }
        .render()
    });
    let mut pending_crop = use_signal(|| None::<(u8, MediaFile)>);
    let resubmits = use_signal(|| 0u32);

    let orchestrator: Option<FormOrchestrator> = use_hook(|| {
        let host = DioxusHost {
            fields: registry,
            status,
            resubmits,
        };
        match CloudinaryClient::new(config.cloudinary()) {
            Ok(client) => Some(Orchestrator::new(
                Rc::new(client),
                host,
                config.clone(),
                Some(session.clone()),
            )),
            Err(e) => {
                log::error!("Upload client unavailable: {}", e);
                None
            }
        }
    });

    // A page restored from history must not believe an upload is running
    let resume = orchestrator.clone();
    use_future(move || {
        let resume = resume.clone();
        async move {
            let mut listener = document::eval(
                "window.addEventListener('pageshow', (e) => { if (e.persisted) { dioxus.send(true); } });",
            );
            while listener.recv::<bool>().await.is_ok() {
                if let Some(orchestrator) = &resume {
                    orchestrator.on_page_resume();
                }
            }
        }
    });

    use_effect(move || {
        if resubmits() == 0 {
            return;
        }
        let script = resubmit_script(FORM_ID, registry.peek().hand_off());
        log::debug!("Re-issuing submit on #{}", FORM_ID);
        let _ = document::eval(&script);
    });

    let handoff_action = config.handoff_action.clone();
    let submit = orchestrator.clone();
    let onsubmit = move |evt: FormEvent| {
        let Some(orchestrator) = submit.clone() else {
            evt.prevent_default();
            log::error!("Submit without upload configuration");
            status.set(ProgressEvent::ConfigMissing.render());
            return;
        };

        match orchestrator.handle_submit() {
            SubmitDecision::Intercept(ticket) => {
                evt.prevent_default();
                spawn(async move {
                    if let Err(e) = orchestrator.run(ticket).await {
                        log::debug!("Submission attempt ended: {}", e);
                    }
                });
            }
            SubmitDecision::Busy => {
                evt.prevent_default();
                log::debug!("Submit while in {:?}", orchestrator.phase());
            }
            SubmitDecision::PassThrough => {
                let fields = registry.read().hand_off().clone();
                log::info!("Handing off summary {}", fields.json_public_id);
                // Without a host action there is nothing to navigate to
                if handoff_action.is_empty() {
                    evt.prevent_default();
                }
                on_handoff.call(fields);
            }
        }
    };

    let apply_crop = move |settings: CropSettings| {
        let Some((slot, original)) = pending_crop.take() else {
            return;
        };
        let image = match crop_zoomed(&original, settings.zoom, settings.offset_x, settings.offset_y) {
            Ok(cropped) => cropped,
            Err(e) => {
                let err = AppError::from(e);
                log::warn!("Crop failed for memory {}: {}", slot, err);
                status.set(StatusLine::new(
                    format!("{} Using the original image.", err.user_message()),
                    Tone::Error,
                ));
                original
            }
        };
        let mut reg = registry.write();
        if reg.edit_tile(slot, |t| t.image = Some(image)) {
            reg.refresh(FieldId::Tile(slot), &rules);
        }
    };

    let (complete, total, ratio) = completion(&registry.read());
    let (ready, disabled, hand_off) = {
        let reg = registry.read();
        (reg.ready_to_submit(&rules), reg.is_disabled(), reg.hand_off().clone())
    };
    let bar = format!("width: {:.0}%;", ratio * 100.0);
    let action = (!config.handoff_action.is_empty()).then(|| config.handoff_action.clone());

    rsx! {
        form {
            id: FORM_ID,
            method: "post",
            action,
            novalidate: true,
            onsubmit,

            div { class: "card", style: "margin-bottom: 16px;",
                div { style: "display: flex; justify-content: space-between; font-size: 14px; color: #333;",
                    span { "Memories complete" }
                    span { "{complete}/{total}" }
                }
                div { class: "progress-track",
                    div { class: "progress-fill", style: "{bar}" }
                }
            }

            div { class: "memory-grid",
                for slot in 1..=(total as u8) {
                    MemoryTileCard {
                        key: "{slot}",
                        slot,
                        registry,
                        rules,
                        on_pick: move |(slot, file)| pending_crop.set(Some((slot, file))),
                    }
                }
            }

            GiftDetailsCard { registry, rules }

            for (name, value) in hand_off.entries() {
                input {
                    key: "{name}",
                    r#type: "hidden",
                    id: name,
                    name,
                    value,
                }
            }

            StatusBanner { status: status() }

            button {
                r#type: "submit",
                class: if ready { "btn-primary ready" } else { "btn-primary" },
                style: "width: 100%; padding: 14px; margin-top: 12px; font-size: 16px;",
                disabled: disabled || !ready,
                if disabled {
                    "Uploading…"
                } else {
                    "Upload memories"
                }
            }
        }

        if let Some((slot, file)) = pending_crop() {
            CropperModal {
                slot,
                file,
                on_apply: apply_crop,
                on_cancel: move |_| pending_crop.set(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> HandOffFields {
        HandOffFields {
            session_id: "eb-mm-abc-123456".to_string(),
            json_public_id: "our-matching-memories/json/memories.json".to_string(),
            json_url: "https://res.example.com/raw/memories.json".to_string(),
            snapshot_public_id: String::new(),
            snapshot_url: String::new(),
        }
    }

    #[test]
    fn test_resubmit_writes_values_before_submitting() {
        let script = resubmit_script(FORM_ID, &fields());

        let values = script.find("our-matching-memories/json/memories.json").unwrap();
        let enable = script.find("el.disabled = false").unwrap();
        let submit = script.find("form.requestSubmit()").unwrap();
        assert!(values < enable);
        assert!(enable < submit);

        for (name, _) in fields().entries() {
            assert!(script.contains(&format!("\"{}\"", name)), "{} missing", name);
        }
        assert!(script.contains(r#"document.getElementById("memories-form")"#));
    }

    #[test]
    fn test_resubmit_values_are_escaped() {
        let mut fields = fields();
        fields.json_url = "https://x.test/a\"b</script>".to_string();
        let script = resubmit_script(FORM_ID, &fields);
        assert!(script.contains(r#"a\"b</script>"#));
        assert!(!script.contains(r#"a"b"#));
    }
}
