use serde::Serialize;
use tide::http::StatusCode;
use tide::Response;

use crate::client::ApiError;
use shutterbox_api_structs::ApiResponse;

pub fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::NotFound => StatusCode::NotFound,
        ApiError::Status { .. } | ApiError::Transport(_) => StatusCode::BadGateway,
    }
}

pub fn envelope<T: Clone + Serialize>(
    status: StatusCode,
    body: ApiResponse<T>,
) -> tide::Result<Response> {
    Ok(Response::builder(status)
        .body(tide::Body::from_json(&body)?)
        .build())
}

pub fn from_result<T: Clone + Serialize>(
    ok_status: StatusCode,
    result: Result<T, ApiError>,
) -> tide::Result<Response> {
    let status = match &result {
        Ok(_) => ok_status,
        Err(err) => status_for(err),
    };
    envelope(status, result.into())
}
