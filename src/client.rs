use std::fmt::Display;
use std::str::FromStr;

use surf::http::Mime;
use thiserror::Error;
use url::Url;

use crate::upload::{new_boundary, UploadForm};
use shutterbox_api_structs::{Photo, PhotoId};

pub const LIST_FAILED: &str = "Couldn't fetch photos";
pub const UPLOAD_FAILED: &str = "Unable to upload image";

/// Everything that can go wrong talking to the photo API.
///
/// The messages are shown to users as-is.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: &'static str },
    #[error("Photo not found")]
    NotFound,
}

impl ApiError {
    pub fn transport(err: impl Display) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait PhotoProvider: Send + Sync {
    /// All photos, in the order the API returns them.
    async fn list_photos(&self) -> Result<Vec<Photo>, ApiError>;

    async fn upload_photo(&self, form: &UploadForm) -> Result<Photo, ApiError>;

    /// The API has no single-photo endpoint, so this scans the full listing.
    async fn get_photo_by_id(&self, photo_id: PhotoId) -> Result<Photo, ApiError> {
        self.list_photos()
            .await?
            .into_iter()
            .find(|photo| photo.id == photo_id)
            .ok_or(ApiError::NotFound)
    }
}

/// [`PhotoProvider`] backed by the photo API over HTTP.
#[derive(Clone, Debug)]
pub struct HttpPhotoClient {
    photos_url: Url,
    client: surf::Client,
}

impl HttpPhotoClient {
    pub fn new(base_url: &Url) -> Result<Self, url::ParseError> {
        Ok(HttpPhotoClient {
            photos_url: photos_endpoint(base_url)?,
            client: surf::Client::new(),
        })
    }

    pub fn photos_url(&self) -> &Url {
        &self.photos_url
    }
}

fn photos_endpoint(base_url: &Url) -> Result<Url, url::ParseError> {
    let base = base_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{}/api/photos", base))
}

#[async_trait::async_trait]
impl PhotoProvider for HttpPhotoClient {
    #[tracing::instrument(skip(self), fields(url = %self.photos_url))]
    async fn list_photos(&self) -> Result<Vec<Photo>, ApiError> {
        let mut res = self
            .client
            .get(&self.photos_url)
            .await
            .map_err(ApiError::transport)?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%status, "photo listing failed");
            return Err(ApiError::Status {
                status: status.into(),
                message: LIST_FAILED,
            });
        }

        let photos: Vec<Photo> = res.body_json().await.map_err(ApiError::transport)?;
        tracing::debug!(count = photos.len(), "fetched photos");
        Ok(photos)
    }

    #[tracing::instrument(
        skip(self, form),
        fields(
            url = %self.photos_url,
            file_name = %form.photo.file_name,
            size = form.photo.bytes.len(),
        )
    )]
    async fn upload_photo(&self, form: &UploadForm) -> Result<Photo, ApiError> {
        let boundary = new_boundary();
        let mime = Mime::from_str(&format!("multipart/form-data; boundary={}", boundary))
            .map_err(ApiError::transport)?;
        let mut body = surf::Body::from_bytes(form.to_multipart(&boundary));
        body.set_mime(mime);

        let mut res = self
            .client
            .post(&self.photos_url)
            .body(body)
            .await
            .map_err(ApiError::transport)?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%status, "photo upload failed");
            return Err(ApiError::Status {
                status: status.into(),
                message: UPLOAD_FAILED,
            });
        }

        let photo: Photo = res.body_json().await.map_err(ApiError::transport)?;
        tracing::info!(photo_id = photo.id, "photo uploaded");
        Ok(photo)
    }
}
