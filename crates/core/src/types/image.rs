//! Inline recipe image.
//!
//! Clients upload recipe pictures as `data:` URIs
//! (`data:image/png;base64,iVBORw0...`). The URI is validated once on the
//! way in and then stored and served verbatim.

use core::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::impl_pg_text;

const ACCEPTED_SUBTYPES: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];

/// Errors that can occur when parsing a [`RecipeImage`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image must be a data URI of the form data:image/<type>;base64,<data>")]
    NotADataUri,
    #[error("unsupported image type '{0}'")]
    UnsupportedType(String),
    #[error("image data is not valid base64")]
    InvalidBase64,
    #[error("image data is empty")]
    Empty,
    #[error("image is larger than {max} bytes")]
    TooLarge { max: usize },
}

/// A validated base64 `data:` URI holding a recipe picture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RecipeImage(String);

impl RecipeImage {
    /// Largest accepted decoded image.
    pub const MAX_BYTES: usize = 5 * 1024 * 1024;

    /// Parse a `data:image/...;base64,...` URI.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] when the URI is malformed, names an unsupported
    /// type, or carries an empty, oversized, or undecodable payload.
    pub fn parse(uri: &str) -> Result<Self, ImageError> {
        let rest = uri.strip_prefix("data:image/").ok_or(ImageError::NotADataUri)?;
        let (subtype, payload) = rest.split_once(";base64,").ok_or(ImageError::NotADataUri)?;

        let subtype = subtype.to_ascii_lowercase();
        if !ACCEPTED_SUBTYPES.contains(&subtype.as_str()) {
            return Err(ImageError::UnsupportedType(subtype));
        }

        if payload.is_empty() {
            return Err(ImageError::Empty);
        }
        let bytes = STANDARD
            .decode(payload)
            .map_err(|_| ImageError::InvalidBase64)?;
        if bytes.len() > Self::MAX_BYTES {
            return Err(ImageError::TooLarge {
                max: Self::MAX_BYTES,
            });
        }

        Ok(Self(uri.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl_pg_text!(RecipeImage);
