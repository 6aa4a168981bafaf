use serde::{Deserialize, Serialize};
use tide::http::StatusCode;
use tide::{Request, Response};

use crate::upload::UploadForm;
use crate::validation::ImageMediaType;
use crate::views::{submit_upload, DetailView, ListView, UploadState};
use crate::web::{multipart_status, read_upload_form};
use shutterbox_api_structs::PhotoId;

mod utils;

pub(crate) use utils::AttributeEscape;
use utils::html_response;

pub(in super::super) fn mount(route: &mut tide::Server<crate::State>) {
    route.at("/").get(gallery);

    route.at("/photo/:photo_id").get(single_photo);

    route
        .at(UploadVariant::Simple.path())
        .get(|req| upload_page(req, UploadVariant::Simple))
        .post(|req| upload_submit(req, UploadVariant::Simple));
    route
        .at(UploadVariant::DragAndDrop.path())
        .get(|req| upload_page(req, UploadVariant::DragAndDrop))
        .post(|req| upload_submit(req, UploadVariant::DragAndDrop));
}

#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
struct GalleryQueryParams {
    uploaded: Option<PhotoId>,
}

async fn gallery(req: Request<crate::State>) -> tide::Result<Response> {
    let state = req.state();
    let query: GalleryQueryParams = req.query()?;

    let view = ListView::load(state.photos.as_ref()).await;

    let mut context = tera::Context::new();
    context.insert("title", "gallery");
    if let Some(uploaded_id) = query.uploaded {
        context.insert("uploaded_id", &uploaded_id);
    }

    let status = match view {
        ListView::Loaded(photos) => {
            if let Some(uploaded_id) = query.uploaded {
                if let Some(uploaded) = photos.iter().find(|photo| photo.id == uploaded_id) {
                    context.insert("uploaded", uploaded);
                }
            }
            let count_label = match photos.len() {
                1 => "1 photo".to_string(),
                n => format!("{} photos", n),
            };
            context.insert("view", "loaded");
            context.insert("count_label", &count_label);
            context.insert("photos", &photos);
            StatusCode::Ok
        },
        ListView::Empty => {
            context.insert("view", "empty");
            StatusCode::Ok
        },
        ListView::Errored(error) => {
            context.insert("view", "errored");
            context.insert("error", &error);
            StatusCode::BadGateway
        },
        ListView::Loading => {
            context.insert("view", "loading");
            StatusCode::Ok
        },
    };

    html_response(state, status, "gallery.html", &context)
}

async fn single_photo(req: Request<crate::State>) -> tide::Result<Response> {
    let state = req.state();
    let mut context = tera::Context::new();

    let view = match req.param("photo_id")?.parse::<PhotoId>() {
        Ok(photo_id) => DetailView::load(state.photos.as_ref(), photo_id).await,
        Err(_) => DetailView::NotFound("The requested photo could not be found.".to_string()),
    };

    let status = match view {
        DetailView::Loaded(photo) => {
            match photo.title {
                Some(ref title) => context.insert("title", title),
                None => context.insert("title", &format!("Photo #{}", photo.id)),
            }
            context.insert("view", "loaded");
            context.insert("photo", &photo);
            StatusCode::Ok
        },
        DetailView::NotFound(error) => {
            context.insert("title", "Photo Not Found");
            context.insert("view", "not_found");
            context.insert("error", &error);
            StatusCode::NotFound
        },
        DetailView::Errored(error) => {
            context.insert("title", "Photo Not Found");
            context.insert("view", "not_found");
            context.insert("error", &error);
            StatusCode::BadGateway
        },
        DetailView::Loading => {
            context.insert("title", "Loading photo");
            context.insert("view", "loading");
            StatusCode::Ok
        },
    };

    html_response(state, status, "photo.html", &context)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UploadVariant {
    Simple,
    DragAndDrop,
}

impl UploadVariant {
    fn path(self) -> &'static str {
        match self {
            UploadVariant::Simple => "/simple-upload",
            UploadVariant::DragAndDrop => "/drag-and-drop-upload",
        }
    }

    fn template(self) -> &'static str {
        match self {
            UploadVariant::Simple => "simple-upload.html",
            UploadVariant::DragAndDrop => "drag-and-drop-upload.html",
        }
    }

    fn title(self) -> &'static str {
        match self {
            UploadVariant::Simple => "Simple Upload",
            UploadVariant::DragAndDrop => "Drag & Drop Upload",
        }
    }
}

fn upload_context(
    state: &crate::State,
    variant: UploadVariant,
    form: Option<&UploadForm>,
    error: Option<&str>,
) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("title", variant.title());
    context.insert("action", variant.path());
    context.insert("accept", &ImageMediaType::accept_attribute());
    context.insert("max_upload_bytes", &state.args.limits().max_upload_bytes);
    if let Some(form) = form {
        context.insert("form_title", form.title.as_deref().unwrap_or_default());
        context.insert(
            "form_description",
            form.description.as_deref().unwrap_or_default(),
        );
    }
    if let Some(error) = error {
        context.insert("error", error);
    }
    context
}

async fn upload_page(req: Request<crate::State>, variant: UploadVariant) -> tide::Result<Response> {
    let state = req.state();
    let context = upload_context(state, variant, None, None);
    html_response(state, StatusCode::Ok, variant.template(), &context)
}

async fn upload_submit(
    mut req: Request<crate::State>,
    variant: UploadVariant,
) -> tide::Result<Response> {
    let form = match read_upload_form(&mut req).await? {
        Ok(form) => form,
        Err(err) => {
            let state = req.state();
            let context = upload_context(state, variant, None, Some(&err.to_string()));
            return html_response(state, multipart_status(&err), variant.template(), &context);
        },
    };

    let state = req.state();
    let (title, description) = (form.title.clone(), form.description.clone());
    let outcome = submit_upload(state.photos.as_ref(), form, &state.args.limits()).await;

    let status = match &outcome {
        UploadState::Succeeded(photo) => {
            let query = serde_qs::to_string(&GalleryQueryParams {
                uploaded: Some(photo.id),
            })?;
            return Ok(tide::Redirect::see_other(format!("/?{}", query)).into());
        },
        UploadState::Rejected(_) => StatusCode::UnprocessableEntity,
        UploadState::Failed(_) => StatusCode::BadGateway,
        other => {
            tracing::error!(state = other.name(), "upload ended in unexpected state");
            StatusCode::InternalServerError
        },
    };

    let error = outcome
        .error_message()
        .unwrap_or_else(|| "Upload did not complete".to_string());
    let echoed = UploadForm {
        title,
        description,
        ..Default::default()
    };
    let context = upload_context(state, variant, Some(&echoed), Some(&error));
    html_response(state, status, variant.template(), &context)
}
