use tide::http::StatusCode;
use tide::{Request, Response};

use crate::views::{submit_upload, UploadState};
use crate::web::api::utils::{envelope, from_result};
use crate::web::{multipart_status, read_upload_form};
use shutterbox_api_structs::{ApiResponse, Photo, PhotoId};

pub(super) fn mount(mut route: tide::Route<crate::State>) {
    route.at("/photos").get(list_photos).post(create_photo);
    route.at("/photo/by-id/:photo_id").get(get_photo);
}

async fn list_photos(req: Request<crate::State>) -> tide::Result<Response> {
    let result = req.state().photos.list_photos().await;
    from_result(StatusCode::Ok, result)
}

async fn get_photo(req: Request<crate::State>) -> tide::Result<Response> {
    let photo_id: PhotoId = match req.param("photo_id")?.parse() {
        Ok(photo_id) => photo_id,
        Err(_) => {
            return envelope(
                StatusCode::BadRequest,
                ApiResponse::<Photo>::Failure("Invalid photo id".to_string()),
            )
        },
    };

    let result = req.state().photos.get_photo_by_id(photo_id).await;
    from_result(StatusCode::Ok, result)
}

async fn create_photo(mut req: Request<crate::State>) -> tide::Result<Response> {
    let form = match read_upload_form(&mut req).await? {
        Ok(form) => form,
        Err(err) => {
            return envelope(
                multipart_status(&err),
                ApiResponse::<Photo>::Failure(err.to_string()),
            )
        },
    };
    tracing::debug!(file_name = %form.photo.file_name, "received photo upload");

    let state = req.state();
    match submit_upload(state.photos.as_ref(), form, &state.args.limits()).await {
        UploadState::Succeeded(photo) => envelope(StatusCode::Created, ApiResponse::Success(photo)),
        UploadState::Rejected(err) => envelope(
            StatusCode::UnprocessableEntity,
            ApiResponse::<Photo>::Failure(err.to_string()),
        ),
        UploadState::Failed(message) => {
            envelope(StatusCode::BadGateway, ApiResponse::<Photo>::Failure(message))
        },
        other => Err(tide::Error::from_str(
            StatusCode::InternalServerError,
            format!("upload ended in unexpected state: {}", other.name()),
        )),
    }
}
