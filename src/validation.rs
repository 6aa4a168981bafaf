use thiserror::Error;

use crate::upload::SelectedFile;

/// Same limit the photo API enforces on its side.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMediaType {
    pub const ALL: [ImageMediaType; 4] = [
        ImageMediaType::Jpeg,
        ImageMediaType::Png,
        ImageMediaType::Gif,
        ImageMediaType::Webp,
    ];

    pub fn from_mime(mime: &str) -> Option<Self> {
        ImageMediaType::ALL
            .iter()
            .copied()
            .find(|media_type| media_type.as_mime() == mime)
    }

    pub fn as_mime(self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Gif => "image/gif",
            ImageMediaType::Webp => "image/webp",
        }
    }

    /// Value for the `accept` attribute of a file input.
    pub fn accept_attribute() -> String {
        ImageMediaType::ALL
            .iter()
            .map(|media_type| media_type.as_mime())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_upload_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No photo selected")]
    Missing,
    #[error("Unsupported Image Type")]
    UnsupportedType(Option<String>),
    #[error("File too large")]
    TooLarge { size: u64, max: u64 },
}

/// Decide whether a selected file may be sent to the photo API.
///
/// Every upload path goes through here before any network I/O happens.
pub fn validate_image(file: &SelectedFile, limits: &Limits) -> Result<ImageMediaType, ValidationError> {
    if file.bytes.is_empty() {
        return Err(ValidationError::Missing);
    }

    let media_type = file
        .content_type
        .as_deref()
        .and_then(ImageMediaType::from_mime)
        .ok_or_else(|| ValidationError::UnsupportedType(file.content_type.clone()))?;

    let size = file.bytes.len() as u64;
    if size > limits.max_upload_bytes {
        return Err(ValidationError::TooLarge {
            size,
            max: limits.max_upload_bytes,
        });
    }

    Ok(media_type)
}
