//! thumbdrop-io: Browser file reading and the Dioxus upload widget.
//!
//! Bridges browser file handles to the sans-IO state in
//! `thumbdrop-core` and renders the single-image upload control.

pub mod components;
pub mod file;

pub use components::ImageUpload;
