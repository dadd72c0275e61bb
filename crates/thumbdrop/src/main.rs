use dioxus::logger::tracing::{info, warn};
use dioxus::prelude::*;
use thumbdrop_core::{DataUri, UploadConfig};
use thumbdrop_io::ImageUpload;

/// Widget configuration shipped with the demo.
const CONFIG_JSON: &str = include_str!("../assets/upload.json");

/// A 1x1 transparent PNG, used to change the value from the host side.
const SAMPLE_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn main() {
    dioxus::launch(app);
}

/// Load the bundled config, falling back to defaults if it is invalid.
fn load_config() -> UploadConfig {
    UploadConfig::from_json(CONFIG_JSON).unwrap_or_else(|e| {
        warn!(error = %e, "bundled upload config rejected, using defaults");
        UploadConfig::default()
    })
}

/// Summarise a data-URI for display, e.g. `image/png, 70 bytes`.
fn describe_value(value: &str) -> String {
    match DataUri::parse(value) {
        Ok(uri) => match uri.decode_payload() {
            Ok(bytes) => format!("{}, {} bytes", uri.media_type(), bytes.len()),
            Err(e) => format!("{}, {e}", uri.media_type()),
        },
        Err(e) => e.to_string(),
    }
}

/// Root component.
///
/// Owns the avatar value and passes it to the upload widget. The
/// "Load sample" and "Clear" buttons change the value from outside the
/// widget, which the widget adopts without reporting a change back.
fn app() -> Element {
    let config = use_hook(load_config);
    let mut avatar = use_signal(|| Option::<String>::None);
    let mut disabled = use_signal(|| false);
    let mut change_count = use_signal(|| 0u32);

    let on_change = move |value: String| {
        change_count += 1;
        info!(empty = value.is_empty(), "avatar changed by widget");
        avatar.set(Some(value).filter(|v| !v.is_empty()));
    };

    let summary = avatar().map_or_else(|| "no image".to_owned(), |v| describe_value(&v));

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/theme.css") }

        div { class: "flex flex-col gap-4 p-6",
            h1 { "thumbdrop" }

            div { class: "panel",
                ImageUpload {
                    label: "Avatar",
                    value: avatar(),
                    disabled: disabled(),
                    config: config.clone(),
                    on_change: on_change,
                }
            }

            div { class: "panel flex flex-col gap-2",
                p { class: "text-sm", "Current value: {summary}" }
                p { class: "text-sm text-muted", "Changes reported: {change_count}" }

                div { class: "flex gap-2",
                    button {
                        onclick: move |_| avatar.set(Some(SAMPLE_PNG.to_owned())),
                        "Load sample"
                    }
                    button {
                        onclick: move |_| avatar.set(None),
                        "Clear"
                    }
                    button {
                        onclick: move |_| disabled.toggle(),
                        if disabled() { "Enable" } else { "Disable" }
                    }
                }
            }
        }
    }
}
