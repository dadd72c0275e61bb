//! Base64 `data:` URI encoding and parsing.
//!
//! Only the base64 form (`data:<media-type>;base64,<payload>`) is
//! produced or accepted, which is what browsers emit for binary
//! content and what an `img` element needs.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::types::{ImageMime, UploadError};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Encode image bytes as a `data:` URI.
///
/// ```
/// use thumbdrop_core::{ImageMime, data_uri};
///
/// let uri = data_uri::encode(ImageMime::Png, &[0, 0, 0]);
/// assert_eq!(uri, "data:image/png;base64,AAAA");
/// ```
#[must_use]
pub fn encode(mime: ImageMime, bytes: &[u8]) -> String {
    let payload = STANDARD.encode(bytes);
    format!("{SCHEME}{}{BASE64_MARKER},{payload}", mime.essence())
}

/// A parsed base64 `data:` URI borrowing from its source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    media_type: &'a str,
    payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split a `data:` URI into its media type and base64 payload.
    ///
    /// The payload itself is not decoded here; see
    /// [`DataUri::decode_payload`].
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidDataUri`] if the scheme is missing,
    /// there is no `,` separator, or the URI is not base64-encoded.
    pub fn parse(uri: &'a str) -> Result<Self, UploadError> {
        let rest = uri
            .get(..SCHEME.len())
            .filter(|scheme| scheme.eq_ignore_ascii_case(SCHEME))
            .map(|_| &uri[SCHEME.len()..])
            .ok_or_else(|| UploadError::InvalidDataUri("missing data: scheme".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| UploadError::InvalidDataUri("missing ',' separator".into()))?;
        let media_type = header
            .strip_suffix(BASE64_MARKER)
            .ok_or_else(|| UploadError::InvalidDataUri("payload is not base64".into()))?;
        Ok(Self {
            media_type,
            payload,
        })
    }

    /// The media type as written, e.g. `image/png`.
    #[must_use]
    pub const fn media_type(&self) -> &'a str {
        self.media_type
    }

    /// The recognised image format, if the media type is one.
    #[must_use]
    pub fn mime(&self) -> Option<ImageMime> {
        ImageMime::from_essence(self.media_type)
    }

    /// The base64 payload, still encoded.
    #[must_use]
    pub const fn payload(&self) -> &'a str {
        self.payload
    }

    /// Decode the payload back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidDataUri`] if the payload is not
    /// valid standard base64.
    pub fn decode_payload(&self) -> Result<Vec<u8>, UploadError> {
        STANDARD
            .decode(self.payload)
            .map_err(|e| UploadError::InvalidDataUri(e.to_string()))
    }
}
