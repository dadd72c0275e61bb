//! Single-image upload control with drag-and-drop, file picker,
//! thumbnail preview, and a removal button.

use dioxus::html::{FileData, HasFileData};
use dioxus::logger::tracing::{debug, warn};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdImages, LdTrash2};
use thumbdrop_core::{FileMeta, UploadConfig, UploadState};

use crate::file;

/// Props for the [`ImageUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImageUploadProps {
    /// Called with the new `data:` URI when an image is added, or with
    /// an empty string when it is removed.
    on_change: EventHandler<String>,
    /// Caption shown beside the control.
    #[props(into)]
    label: String,
    /// The host's current value, `None` when it has none. A change
    /// here resets the widget.
    #[props(!optional)]
    value: Option<String>,
    /// Blocks drops and the file picker.
    #[props(default)]
    disabled: bool,
    /// Accepted types, thumbnail size, and removal reporting. Read once
    /// when the widget mounts.
    #[props(default)]
    config: UploadConfig,
}

/// An upload trigger that holds at most one image.
///
/// Dropping or picking a JPEG or PNG reads it into a `data:` URI,
/// shows it as a square thumbnail, and fires `on_change` with the URI.
/// The delete button clears it and fires `on_change` with `""`. While
/// an image is shown, clicking the trigger does not open the picker.
///
/// When the host passes a different `value`, the widget adopts it
/// without firing `on_change`, discarding any read still in flight.
#[component]
pub fn ImageUpload(props: ImageUploadProps) -> Element {
    let initial = props.value.clone();
    let config = props.config.clone();
    let mut state = use_signal(move || {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "upload config rejected, using defaults");
                UploadConfig::default()
            }
        };
        UploadState::new(initial.as_deref(), config)
    });
    let mut dragging = use_signal(|| false);

    use_effect(use_reactive((&props.value,), move |(value,)| {
        state.write().reconcile(value.as_deref());
    }));

    let disabled = props.disabled;
    let on_change = props.on_change;

    // Filter, read, and report the first file of a selection.
    //
    // Shared by the file-picker (`handle_files`) and drag-and-drop
    // (`handle_drop`) paths.
    let process_files = move |files: Vec<FileData>| async move {
        let metas: Vec<FileMeta> = files.iter().map(file::describe).collect();
        let ticket = match state.write().begin_drop(&metas, disabled) {
            Ok(Some(ticket)) => ticket,
            Ok(None) | Err(_) => return,
        };
        let Some(first) = files.first() else {
            return;
        };
        let result = file::read_bytes(first).await;
        let change = state.write().complete_read(ticket, result);
        if let Some(uri) = change {
            debug!(len = uri.len(), "reporting new image");
            on_change.call(uri);
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let handle_remove = move |evt: MouseEvent| {
        // Keep the click from reaching the trigger label.
        evt.prevent_default();
        evt.stop_propagation();
        let change = state.write().remove();
        if let Some(cleared) = change {
            debug!("reporting removal");
            on_change.call(cleared);
        }
    };

    let current = state.read().encoded().map(str::to_owned);
    let issue = state.read().issue().map(ToString::to_string);
    let size = state.read().config().thumbnail_size;
    let accept = state.read().config().accept_attribute();
    let picker_generation = state.read().picker_generation();

    let border_class = if dragging() {
        "border-[var(--border-accent)]"
    } else {
        "border-transparent"
    };

    rsx! {
        div { class: "flex items-center",
            label {
                class: "flex items-center cursor-pointer rounded border-2 border-dashed p-1 transition-colors {border_class}",
                ondragover: move |evt| {
                    evt.prevent_default();
                    if !disabled {
                        dragging.set(true);
                    }
                },
                ondragleave: move |_| {
                    dragging.set(false);
                },
                ondrop: handle_drop,
                onclick: move |evt| {
                    if state.read().suppress_picker() {
                        evt.prevent_default();
                    }
                },

                span { class: "text-white",
                    Icon { icon: LdImages, width: 24, height: 24 }
                }

                // Keyed so a new generation remounts the input with an
                // empty selection; re-picking the same file still fires.
                for generation in [picker_generation] {
                    input {
                        key: "{generation}",
                        r#type: "file",
                        accept: "{accept}",
                        class: "hidden",
                        disabled: disabled,
                        onchange: handle_files,
                    }
                }

                if let Some(ref src) = current {
                    div { class: "relative ml-2",
                        img {
                            src: "{src}",
                            width: "{size}",
                            height: "{size}",
                            alt: "Uploaded Image",
                        }
                        button {
                            r#type: "button",
                            class: "absolute top-0 right-0 bg-slate-600 rounded-full p-1 text-white",
                            title: "Remove Image",
                            onclick: handle_remove,
                            Icon { icon: LdTrash2, width: 20, height: 20 }
                        }
                    }
                }
            }

            span { class: "text-white ml-2", "{props.label}" }

            if let Some(ref err) = issue {
                p { class: "text-[var(--text-error)] text-sm ml-2", "{err}" }
            }
        }
    }
}
