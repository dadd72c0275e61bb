//! Shared types: accepted image formats, file descriptions,
//! configuration, and errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Image content types the widget can accept.
///
/// Only formats every browser can render as an `img` source are
/// listed; anything else is filtered out before it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMime {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
}

impl ImageMime {
    /// Every supported format, in the order shown to the file picker.
    pub const ALL: [Self; 2] = [Self::Jpeg, Self::Png];

    /// The MIME essence string (`type/subtype`, no parameters).
    #[must_use]
    pub const fn essence(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// File extensions conventionally used for this format.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
        }
    }

    /// Parse a MIME type string such as `image/png` or
    /// `IMAGE/JPEG; charset=binary`.
    ///
    /// Parameters after `;` are ignored and the comparison is
    /// case-insensitive. Returns `None` for anything unsupported.
    #[must_use]
    pub fn from_essence(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|m| m.essence().eq_ignore_ascii_case(essence))
    }

    /// Guess the format from a filename's extension.
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::ALL.into_iter().find(|m| {
            m.extensions()
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(ext))
        })
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.essence())
    }
}

/// What the widget knows about a selected file before reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// File name as reported by the browser (no directory component).
    pub name: String,
    /// Content type reported by the browser, if any.
    pub content_type: Option<String>,
}

impl FileMeta {
    /// Describe a file by name and optional browser content type.
    pub fn new(name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            content_type,
        }
    }

    /// Determine the image format of this file.
    ///
    /// The browser-reported content type wins when it is present and
    /// non-empty. Browsers report an empty type for unknown extensions,
    /// so only then does the filename extension decide.
    #[must_use]
    pub fn mime(&self) -> Option<ImageMime> {
        match self.content_type.as_deref().map(str::trim) {
            Some(ct) if !ct.is_empty() => ImageMime::from_essence(ct),
            _ => ImageMime::from_filename(&self.name),
        }
    }
}

/// Widget configuration.
///
/// Missing fields take their [`Default`] values when deserialized, so
/// a config file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Formats offered by the file picker and accepted on drop.
    pub accept: Vec<ImageMime>,

    /// Edge length of the square thumbnail, in CSS pixels.
    pub thumbnail_size: u32,

    /// Whether removing while already empty still reports `""` to the
    /// change handler.
    pub notify_on_empty_removal: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accept: ImageMime::ALL.to_vec(),
            thumbnail_size: 50,
            notify_on_empty_removal: false,
        }
    }
}

impl UploadConfig {
    /// Parse a JSON config and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidConfig`] if the JSON is malformed or
    /// the resulting config fails [`UploadConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, UploadError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| UploadError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidConfig`] if no format is accepted or
    /// the thumbnail size is zero.
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.accept.is_empty() {
            return Err(UploadError::InvalidConfig(
                "accept must list at least one image type".into(),
            ));
        }
        if self.thumbnail_size == 0 {
            return Err(UploadError::InvalidConfig(
                "thumbnail_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Whether `mime` is in the accept list.
    #[must_use]
    pub fn accepts(&self, mime: ImageMime) -> bool {
        self.accept.contains(&mime)
    }

    /// Value for the file input's `accept` attribute, e.g.
    /// `image/jpeg,image/png`.
    #[must_use]
    pub fn accept_attribute(&self) -> String {
        let mut attr = String::new();
        for mime in &self.accept {
            if !attr.is_empty() {
                attr.push(',');
            }
            attr.push_str(mime.essence());
        }
        attr
    }
}

/// Conditions the widget reports instead of silently ignoring.
///
/// Every variant is non-fatal: the widget keeps its previous image.
/// `Clone` and `PartialEq` let the latest condition live in UI state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// A selection event carried no files.
    #[error("no file was selected")]
    NoFiles,

    /// The selected file is not one of the accepted image types.
    #[error("unsupported file type: {name}")]
    UnsupportedType {
        /// Name of the rejected file.
        name: String,
        /// Content type the browser reported, if any.
        content_type: Option<String>,
    },

    /// More files were offered than the widget holds; only the first
    /// was used.
    #[error("only one image can be uploaded, ignored {ignored} extra file(s)")]
    TooManyFiles {
        /// Number of files beyond the first.
        ignored: usize,
    },

    /// The file was read but contained no bytes.
    #[error("file is empty: {name}")]
    EmptyFile {
        /// Name of the empty file.
        name: String,
    },

    /// Reading the file failed.
    #[error("failed to read file: {0}")]
    ReadFailed(String),

    /// A configuration value is out of range.
    #[error("invalid upload configuration: {0}")]
    InvalidConfig(String),

    /// A string is not a well-formed base64 `data:` URI.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}
