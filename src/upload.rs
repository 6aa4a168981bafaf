use bytes::Bytes;
use futures_util::stream::{self, Stream};
use thiserror::Error;

use crate::validation::Limits;

pub const PHOTO_FIELD: &str = "photo";
pub const TITLE_FIELD: &str = "title";
pub const DESCRIPTION_FIELD: &str = "description";

const UNKNOWN_FILE_NAME: &str = "upload";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Room for boundaries, part headers and the text fields on top of the photo itself.
pub const FORM_OVERHEAD_BYTES: u64 = 64 * 1024;

#[derive(Error, Debug)]
pub enum MultipartError {
    #[error("Malformed upload: {0}")]
    Multer(multer::Error),
    #[error("File too large")]
    TooLarge { limit: u64 },
}

impl From<multer::Error> for MultipartError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamSizeExceeded { limit }
            | multer::Error::FieldSizeExceeded { limit, .. } => MultipartError::TooLarge { limit },
            err => MultipartError::Multer(err),
        }
    }
}

/// Largest request body worth reading for a photo of at most `limits.max_upload_bytes`.
pub fn max_form_bytes(limits: &Limits) -> u64 {
    limits.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

/// A file picked in one of the upload forms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub photo: SelectedFile,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UploadForm {
    /// Parse a fully buffered `multipart/form-data` body.
    ///
    /// A missing `photo` part leaves an empty file behind, which validation then rejects.
    pub async fn from_multipart(content_type: &str, body: Vec<u8>) -> Result<Self, MultipartError> {
        let body_stream = stream::once(async move { Ok::<Bytes, std::io::Error>(Bytes::from(body)) });
        Self::parse(content_type, body_stream, multer::Constraints::new()).await
    }

    /// Parse a streamed `multipart/form-data` body, giving up with
    /// [`MultipartError::TooLarge`] as soon as the photo or the whole body outgrows `limits`.
    pub async fn from_stream<S, E>(
        content_type: &str,
        body: S,
        limits: &Limits,
    ) -> Result<Self, MultipartError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
    {
        let size_limit = multer::SizeLimit::new()
            .whole_stream(max_form_bytes(limits))
            .for_field(PHOTO_FIELD, limits.max_upload_bytes);
        let constraints = multer::Constraints::new().size_limit(size_limit);

        Self::parse(content_type, body, constraints).await
    }

    async fn parse<S, E>(
        content_type: &str,
        body: S,
        constraints: multer::Constraints,
    ) -> Result<Self, MultipartError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
    {
        let boundary = multer::parse_boundary(content_type)?;
        let mut multipart = multer::Multipart::with_constraints(body, boundary, constraints);

        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(PHOTO_FIELD) => {
                    let file_name = field.file_name().unwrap_or(UNKNOWN_FILE_NAME).to_string();
                    let content_type = field.content_type().map(|mime| mime.to_string());
                    let bytes = field.bytes().await?.to_vec();
                    form.photo = SelectedFile {
                        file_name,
                        content_type,
                        bytes,
                    };
                },
                Some(TITLE_FIELD) => form.title = non_blank(field.text().await?),
                Some(DESCRIPTION_FIELD) => form.description = non_blank(field.text().await?),
                _ => {},
            }
        }

        Ok(form)
    }

    /// Encode the form as a `multipart/form-data` body delimited by `boundary`.
    ///
    /// Blank titles and descriptions are left out.
    pub fn to_multipart(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();

        let text_fields = [
            (TITLE_FIELD, &self.title),
            (DESCRIPTION_FIELD, &self.description),
        ];
        for (name, value) in text_fields.iter() {
            let value = value.as_deref().map(str::trim).filter(|value| !value.is_empty());
            if let Some(value) = value {
                body.extend_from_slice(
                    format!(
                        "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        boundary, name, value
                    )
                    .as_bytes(),
                );
            }
        }

        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                boundary,
                PHOTO_FIELD,
                sanitize_file_name(&self.photo.file_name),
                self.photo
                    .content_type
                    .as_deref()
                    .unwrap_or(FALLBACK_CONTENT_TYPE),
            )
            .as_bytes(),
        );
        body.extend_from_slice(&self.photo.bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        body
    }
}

pub fn new_boundary() -> String {
    format!("shutterbox-{}", uuid::Uuid::new_v4().simple())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '\r' | '\n' | '/' => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        UNKNOWN_FILE_NAME.to_string()
    } else {
        sanitized
    }
}
