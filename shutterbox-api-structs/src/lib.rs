use std::convert::TryFrom;
use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};

pub type PhotoId = i64;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Photo {
    pub id: PhotoId,
    /// Display URL. The backend sends `null` when it couldn't presign the object.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub photo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `{success, data}` / `{success, error}` envelope returned by the gallery JSON API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "RawApiResponse<T>",
    try_from = "RawApiResponse<T>",
    bound(
        serialize = "T: Clone + Serialize",
        deserialize = "T: Deserialize<'de>"
    )
)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(String),
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ApiResponse::Success(data) => Ok(data),
            ApiResponse::Failure(error) => Err(error),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for ApiResponse<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => ApiResponse::Success(data),
            Err(err) => ApiResponse::Failure(err.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawApiResponse<T> {
    success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> From<ApiResponse<T>> for RawApiResponse<T> {
    fn from(response: ApiResponse<T>) -> Self {
        match response {
            ApiResponse::Success(data) => RawApiResponse {
                success: true,
                data: Some(data),
                error: None,
            },
            ApiResponse::Failure(error) => RawApiResponse {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl<T> TryFrom<RawApiResponse<T>> for ApiResponse<T> {
    type Error = &'static str;

    fn try_from(raw: RawApiResponse<T>) -> Result<Self, Self::Error> {
        match (raw.success, raw.data, raw.error) {
            (true, Some(data), _) => Ok(ApiResponse::Success(data)),
            (true, None, _) => Err("successful response without data"),
            (false, _, Some(error)) => Ok(ApiResponse::Failure(error)),
            (false, _, None) => Err("failed response without error"),
        }
    }
}
