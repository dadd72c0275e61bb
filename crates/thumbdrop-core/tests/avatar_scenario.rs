//! Integration test: drive the upload state the way the widget does for
//! an "Avatar" field, from an empty first render through drop, external
//! reset, and removal.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use thumbdrop_core::{DataUri, FileMeta, ImageMime, Phase, UploadConfig, UploadState};

/// The first bytes of a JFIF file, enough to stand in for a JPEG.
const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

#[test]
fn avatar_upload_lifecycle() {
    let mut changes: Vec<String> = Vec::new();
    let mut state = UploadState::new(None, UploadConfig::default());
    assert_eq!(state.phase(), Phase::Empty);
    assert_eq!(state.encoded(), None);

    // Drop a JPEG picked by name only (browsers sometimes omit the type).
    let files = [FileMeta::new("me.jpg", None)];
    let ticket = state
        .begin_drop(&files, false)
        .expect("jpeg should be accepted")
        .expect("widget is enabled");
    assert_eq!(ticket.mime, ImageMime::Jpeg);
    if let Some(change) = state.complete_read(ticket, Ok::<_, String>(JPEG_BYTES.to_vec())) {
        changes.push(change);
    }

    assert_eq!(changes.len(), 1, "exactly one change per accepted drop");
    assert!(changes[0].starts_with("data:image/jpeg;base64,"));
    assert_eq!(state.encoded(), Some(changes[0].as_str()));

    let parsed = DataUri::parse(&changes[0]).unwrap();
    assert_eq!(parsed.decode_payload().unwrap(), JPEG_BYTES);

    // The host echoes the value back; reconciling with it reports nothing.
    let echoed = changes[0].clone();
    state.reconcile(Some(&echoed));
    assert_eq!(changes.len(), 1);
    assert_eq!(state.phase(), Phase::Present);

    // The host replaces the value externally.
    state.reconcile(Some("data:image/png;base64,AAA"));
    assert_eq!(state.encoded(), Some("data:image/png;base64,AAA"));
    assert_eq!(changes.len(), 1, "reconcile never reports a change");

    // Removal reports an empty string once; a second removal is silent.
    changes.extend(state.remove());
    changes.extend(state.remove());
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1], "");
    assert_eq!(state.phase(), Phase::Empty);
}

#[test]
fn disabled_widget_ignores_drops() {
    let mut state = UploadState::new(None, UploadConfig::default());
    let files = [FileMeta::new("me.png", Some("image/png".into()))];
    let ticket = state.begin_drop(&files, true).unwrap();
    assert!(ticket.is_none());
    assert_eq!(state.phase(), Phase::Empty);
    assert!(!state.is_reading());
}
