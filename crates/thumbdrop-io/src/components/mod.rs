//! Dioxus UI components for thumbdrop.

mod image_upload;

pub use image_upload::ImageUpload;
