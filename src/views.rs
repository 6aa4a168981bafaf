//! Screen states for the gallery pages.
//!
//! Each screen starts in a pending state and moves forward only on the result of a
//! data-access call. Applying a transition to a state it doesn't apply to leaves the
//! state as it was.

use shutterbox_api_structs::{Photo, PhotoId};

use crate::client::{ApiError, PhotoProvider};
use crate::upload::UploadForm;
use crate::validation::{validate_image, Limits, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Loaded(Vec<Photo>),
    Empty,
    Errored(String),
}

impl ListView {
    pub async fn load(provider: &dyn PhotoProvider) -> Self {
        ListView::Loading.resolve(provider.list_photos().await)
    }

    pub fn resolve(self, result: Result<Vec<Photo>, ApiError>) -> Self {
        match self {
            ListView::Loading => match result {
                Ok(photos) if photos.is_empty() => ListView::Empty,
                Ok(photos) => ListView::Loaded(photos),
                Err(err) => ListView::Errored(err.to_string()),
            },
            settled => settled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailView {
    Loading,
    Loaded(Photo),
    NotFound(String),
    Errored(String),
}

impl DetailView {
    pub async fn load(provider: &dyn PhotoProvider, photo_id: PhotoId) -> Self {
        DetailView::Loading.resolve(provider.get_photo_by_id(photo_id).await)
    }

    pub fn resolve(self, result: Result<Photo, ApiError>) -> Self {
        match self {
            DetailView::Loading => match result {
                Ok(photo) => DetailView::Loaded(photo),
                Err(err @ ApiError::NotFound) => DetailView::NotFound(err.to_string()),
                Err(err) => DetailView::Errored(err.to_string()),
            },
            settled => settled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Validating(UploadForm),
    Rejected(ValidationError),
    Submitting(UploadForm),
    Succeeded(Photo),
    Failed(String),
}

impl Default for UploadState {
    fn default() -> Self {
        UploadState::Idle
    }
}

impl UploadState {
    /// A file was picked or dropped. Allowed from any state that isn't mid-submission.
    pub fn select(self, form: UploadForm) -> Self {
        match self {
            UploadState::Submitting(_) => self,
            _ => UploadState::Validating(form),
        }
    }

    pub fn validate(self, limits: &Limits) -> Self {
        match self {
            UploadState::Validating(form) => match validate_image(&form.photo, limits) {
                Ok(_) => UploadState::Submitting(form),
                Err(err) => UploadState::Rejected(err),
            },
            other => other,
        }
    }

    pub fn finish(self, result: Result<Photo, ApiError>) -> Self {
        match self {
            UploadState::Submitting(_) => match result {
                Ok(photo) => UploadState::Succeeded(photo),
                Err(err) => UploadState::Failed(err.to_string()),
            },
            other => other,
        }
    }

    /// Variant name, for logs and error bodies that mustn't carry the photo bytes.
    pub fn name(&self) -> &'static str {
        match self {
            UploadState::Idle => "idle",
            UploadState::Validating(_) => "validating",
            UploadState::Rejected(_) => "rejected",
            UploadState::Submitting(_) => "submitting",
            UploadState::Succeeded(_) => "succeeded",
            UploadState::Failed(_) => "failed",
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            UploadState::Rejected(err) => Some(err.to_string()),
            UploadState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }
}

/// Run a submitted form through validation and, if it passes, the upload call.
pub async fn submit_upload(
    provider: &dyn PhotoProvider,
    form: UploadForm,
    limits: &Limits,
) -> UploadState {
    let state = UploadState::Idle.select(form).validate(limits);

    let form = match &state {
        UploadState::Submitting(form) => form,
        _ => {
            tracing::info!(error = ?state.error_message(), "upload rejected before submission");
            return state;
        },
    };

    let result = provider.upload_photo(form).await;
    state.finish(result)
}
