use crate::models::gift::{MESSAGE_MAX, NAME_MAX};
use crate::models::GiftDetails;
use crate::services::field_registry::{FieldId, FieldRegistry};
use crate::services::progress::{char_counter, field_error};
use crate::services::validation::RuleSet;
use dioxus::prelude::*;

const LABEL_STYLE: &str =
    "display: block; margin-bottom: 6px; font-weight: 600; color: #333; font-size: 14px;";

/// Names, emails, delivery toggle and custom message
#[component]
pub fn GiftDetailsCard(registry: Signal<FieldRegistry>, rules: RuleSet) -> Element {
    let mut registry = registry;
    let (gift, disabled) = {
        let reg = registry.read();
        (reg.gift().clone(), reg.is_disabled())
    };
    let show_recipient = rules.delivery_option && gift.send_direct;
    let message_count = char_counter(&gift.custom_message, MESSAGE_MAX);

    let mut edit = move |field: FieldId, update: Box<dyn FnOnce(&mut GiftDetails)>| {
        let mut reg = registry.write();
        if reg.edit_gift(update) {
            reg.refresh(field, &rules);
        }
    };
    let mut blur = move |field: FieldId| registry.write().revalidate(field, &rules);

    rsx! {
        div { class: "card gift-details",
            h2 { style: "color: #0066cc; font-size: 20px; font-weight: 700; margin: 0 0 16px 0;",
                "Gift details"
            }

            div { style: "display: flex; gap: 12px;",
                div { style: "flex: 1;",
                    label { r#for: "from-name", style: LABEL_STYLE, "From" }
                    input {
                        id: "from-name",
                        name: "from-name",
                        r#type: "text",
                        class: input_class(registry, FieldId::FromName),
                        maxlength: "{NAME_MAX}",
                        value: "{gift.from_name}",
                        disabled,
                        oninput: move |e| {
                            let value = e.value();
                            edit(FieldId::FromName, Box::new(move |g| g.from_name = value));
                        },
                        onblur: move |_| blur(FieldId::FromName),
                    }
                    FieldError { registry, field: FieldId::FromName }
                }
                div { style: "flex: 1;",
                    label { r#for: "to-name", style: LABEL_STYLE, "To" }
                    input {
                        id: "to-name",
                        name: "to-name",
                        r#type: "text",
                        class: input_class(registry, FieldId::ToName),
                        maxlength: "{NAME_MAX}",
                        value: "{gift.to_name}",
                        disabled,
                        oninput: move |e| {
                            let value = e.value();
                            edit(FieldId::ToName, Box::new(move |g| g.to_name = value));
                        },
                        onblur: move |_| blur(FieldId::ToName),
                    }
                    FieldError { registry, field: FieldId::ToName }
                }
            }

            div { style: "margin-top: 16px;",
                label { r#for: "player-email", style: LABEL_STYLE, "Your email" }
                input {
                    id: "player-email",
                    name: "player-email",
                    r#type: "email",
                    class: input_class(registry, FieldId::FromEmail),
                    value: "{gift.from_email}",
                    disabled,
                    oninput: move |e| {
                        let value = e.value();
                        edit(FieldId::FromEmail, Box::new(move |g| g.from_email = value));
                    },
                    onblur: move |_| blur(FieldId::FromEmail),
                }
                FieldError { registry, field: FieldId::FromEmail }
            }

            if rules.delivery_option {
                label { style: "display: flex; align-items: center; gap: 8px; margin-top: 16px; font-size: 14px; color: #333;",
                    input {
                        id: "send-direct",
                        name: "send-direct",
                        r#type: "checkbox",
                        checked: gift.send_direct,
                        disabled,
                        onchange: move |e| {
                            registry.write().set_send_direct(e.checked());
                        },
                    }
                    "Send the game directly to the recipient"
                }
            }

            if show_recipient {
                div { style: "margin-top: 12px;",
                    label { r#for: "to-email", style: LABEL_STYLE, "Recipient email" }
                    input {
                        id: "to-email",
                        name: "to-email",
                        r#type: "email",
                        class: input_class(registry, FieldId::ToEmail),
                        value: "{gift.to_email}",
                        disabled,
                        oninput: move |e| {
                            let value = e.value();
                            edit(FieldId::ToEmail, Box::new(move |g| g.to_email = value));
                        },
                        onblur: move |_| blur(FieldId::ToEmail),
                    }
                    FieldError { registry, field: FieldId::ToEmail }
                }
            }

            div { style: "margin-top: 16px;",
                label { r#for: "custom-message", style: LABEL_STYLE, "Custom message (optional)" }
                textarea {
                    id: "custom-message",
                    name: "custom-message",
                    class: input_class(registry, FieldId::CustomMessage),
                    maxlength: "{MESSAGE_MAX}",
                    rows: "4",
                    value: "{gift.custom_message}",
                    disabled,
                    oninput: move |e| {
                        let value = e.value();
                        edit(FieldId::CustomMessage, Box::new(move |g| g.custom_message = value));
                    },
                }
                div { class: "char-counter", "{message_count}" }
                FieldError { registry, field: FieldId::CustomMessage }
            }
        }
    }
}

fn input_class(registry: Signal<FieldRegistry>, field: FieldId) -> &'static str {
    if registry.read().error(field).is_some() {
        "input invalid"
    } else {
        "input"
    }
}

#[component]
fn FieldError(registry: Signal<FieldRegistry>, field: FieldId) -> Element {
    match field_error(&registry.read(), field) {
        Some(message) => rsx! {
            div { class: "field-error", "{message}" }
        },
        None => rsx! {},
    }
}
