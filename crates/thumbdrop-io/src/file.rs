//! Reading browser file handles.
//!
//! All functions here take Dioxus [`FileData`] handles, which on the
//! web target wrap the browser's `File` objects.

use dioxus::html::FileData;
use thumbdrop_core::FileMeta;

/// Describe a file handle for selection filtering, without reading it.
#[must_use]
pub fn describe(file: &FileData) -> FileMeta {
    FileMeta::new(file.name(), file.content_type())
}

/// Read the full contents of a file handle.
///
/// # Errors
///
/// Returns the browser's read error rendered as a string.
#[allow(clippy::future_not_send)] // WASM is single-threaded; File is !Send
pub async fn read_bytes(file: &FileData) -> Result<Vec<u8>, String> {
    file.read_bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| e.to_string())
}
