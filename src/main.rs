use dioxus::prelude::*;

mod components;
mod config;
mod error;
mod models;
mod services;

use components::{MemoriesForm, SubmittedScreen};
use config::AppConfig;
use error::AppError;
use models::HandOffFields;

const MAIN_CSS: &str = include_str!("../assets/main.css");

fn main() {
    init_logging();
    dioxus::launch(App);
}

#[cfg(target_os = "android")]
fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("matching-memories"),
    );
}

#[cfg(not(target_os = "android"))]
fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // A second init (hot reload) is harmless
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Screen navigation for the app
#[derive(Clone, PartialEq, Debug)]
pub enum Screen {
    Builder,
    Submitted(HandOffFields),
}

#[component]
fn App() -> Element {
    let mut current_screen = use_signal(|| Screen::Builder);
    let config = use_hook(|| {
        AppConfig::load().map_err(|e| {
            log::error!("Failed to load configuration: {}", e);
            AppError::from(e).user_message()
        })
    });

    rsx! {
        style { {MAIN_CSS} }

        div { style: "min-height: 100vh; background: #f5f5f5; font-family: sans-serif;",
            div { style: "padding: 16px; max-width: 960px; margin: 0 auto;",
                h1 { style: "color: #0066cc; font-size: 24px; font-weight: 700; margin: 0 0 8px 0;",
                    "Our Matching Memories"
                }

                match (current_screen(), config) {
                    (_, Err(message)) => rsx! {
                        div { class: "status-line error", "⚠️ {message}" }
                    },
                    (Screen::Builder, Ok(config)) => rsx! {
                        MemoriesForm {
                            config,
                            on_handoff: move |fields| current_screen.set(Screen::Submitted(fields)),
                        }
                    },
                    (Screen::Submitted(fields), Ok(config)) => rsx! {
                        SubmittedScreen {
                            fields,
                            tile_count: config.rules.tile_count,
                            on_restart: move |_| current_screen.set(Screen::Builder),
                        }
                    },
                }
            }
        }
    }
}
