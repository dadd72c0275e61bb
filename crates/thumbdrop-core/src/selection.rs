//! Validation of drop and file-picker selections.
//!
//! A selection may carry any number of files of any type. The widget
//! holds a single image, so the selection is narrowed to its first
//! file, and that file must be one of the configured image types.

use crate::types::{FileMeta, ImageMime, UploadConfig, UploadError};

/// The most files a single selection contributes.
pub const MAX_FILES: usize = 1;

/// A selection narrowed to the one file that will be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The file to read.
    pub file: FileMeta,
    /// Its accepted image format.
    pub mime: ImageMime,
    /// How many offered files were dropped beyond [`MAX_FILES`].
    pub ignored: usize,
}

impl Selection {
    /// Narrow `files` to its first entry and check its type.
    ///
    /// Extra files do not cause a rejection: the first file is used
    /// and the surplus is reported through [`Selection::ignored`] (see
    /// [`Selection::surplus`]).
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NoFiles`] for an empty selection, or
    /// [`UploadError::UnsupportedType`] if the first file is not an
    /// accepted image type.
    pub fn from_files(files: &[FileMeta], config: &UploadConfig) -> Result<Self, UploadError> {
        let first = files.first().ok_or(UploadError::NoFiles)?;
        let mime = first
            .mime()
            .filter(|m| config.accepts(*m))
            .ok_or_else(|| UploadError::UnsupportedType {
                name: first.name.clone(),
                content_type: first.content_type.clone(),
            })?;
        Ok(Self {
            file: first.clone(),
            mime,
            ignored: files.len().saturating_sub(MAX_FILES),
        })
    }

    /// The surplus-file condition, if any files were ignored.
    #[must_use]
    pub fn surplus(&self) -> Option<UploadError> {
        if self.ignored == 0 {
            None
        } else {
            Some(UploadError::TooManyFiles {
                ignored: self.ignored,
            })
        }
    }
}
