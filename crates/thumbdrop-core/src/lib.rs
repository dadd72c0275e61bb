//! thumbdrop-core: Upload state and data-URI encoding (sans-IO).
//!
//! Models a single-image upload widget as a small state machine:
//! a selection is filtered down to one accepted image, its bytes are
//! encoded as a `data:` URI, and the result is reported as a change
//! for the host to forward.
//!
//! This crate has **no browser dependencies** -- file handles are
//! described by [`FileMeta`] and file contents arrive as byte slices.
//! Reading files and rendering the widget lives in `thumbdrop-io`.

pub mod data_uri;
pub mod selection;
pub mod state;
pub mod types;

pub use data_uri::DataUri;
pub use selection::{MAX_FILES, Selection};
pub use state::{Phase, ReadTicket, UploadState};
pub use types::{FileMeta, ImageMime, UploadConfig, UploadError};
