#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use structopt::StructOpt;
use tide::http::{Method, Request, Response, Url};

use shutterbox::client::{ApiError, PhotoProvider};
use shutterbox::upload::UploadForm;
use shutterbox::{build_app, load_templates, Args, State};
use shutterbox_api_structs::Photo;

pub struct FakePhotos {
    pub listing: Result<Vec<Photo>, ApiError>,
    pub upload_result: Result<Photo, ApiError>,
    pub list_calls: AtomicUsize,
    pub uploads: Mutex<Vec<UploadForm>>,
}

impl FakePhotos {
    pub fn with_listing(listing: Result<Vec<Photo>, ApiError>) -> Self {
        FakePhotos {
            listing,
            upload_result: Err(ApiError::Status {
                status: 500,
                message: shutterbox::client::UPLOAD_FAILED,
            }),
            list_calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl PhotoProvider for FakePhotos {
    async fn list_photos(&self) -> Result<Vec<Photo>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listing.clone()
    }

    async fn upload_photo(&self, form: &UploadForm) -> Result<Photo, ApiError> {
        self.uploads.lock().unwrap().push(form.clone());
        self.upload_result.clone()
    }
}

pub fn photo(id: i64, url: &str) -> Photo {
    Photo {
        id,
        photo_url: url.to_string(),
        ..Default::default()
    }
}

pub fn app_with(photos: Arc<FakePhotos>, extra_args: &[&str]) -> tide::Server<State> {
    let template_path = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");
    let mut argv = vec!["shutterbox", "--template-path", template_path];
    argv.extend_from_slice(extra_args);
    let args = Args::from_iter_safe(argv).unwrap();
    let tera = load_templates(args.template_path()).unwrap();

    build_app(State::new(Arc::new(args), photos, tera))
}

pub fn get(path: &str) -> Request {
    Request::new(
        Method::Get,
        Url::parse("http://gallery.test").unwrap().join(path).unwrap(),
    )
}

pub fn multipart_post(path: &str, boundary: &str, body: Vec<u8>) -> Request {
    let mut req = Request::new(
        Method::Post,
        Url::parse("http://gallery.test").unwrap().join(path).unwrap(),
    );
    req.insert_header(
        "Content-Type",
        format!("multipart/form-data; boundary={}", boundary),
    );
    req.set_body(body);
    req
}

pub fn photo_form(content_type: &str, title: Option<&str>) -> UploadForm {
    UploadForm {
        photo: shutterbox::upload::SelectedFile {
            file_name: "picture".to_string(),
            content_type: Some(content_type.to_string()),
            bytes: b"not really an image".to_vec(),
        },
        title: title.map(str::to_string),
        description: None,
    }
}

pub async fn send(app: &tide::Server<State>, req: Request) -> (Response, String) {
    let mut res: Response = app.respond(req).await.unwrap();
    let body = res.body_string().await.unwrap();
    (res, body)
}
