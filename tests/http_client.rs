use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tide::{Request, Response, StatusCode};
use url::Url;

use shutterbox::client::{ApiError, HttpPhotoClient, PhotoProvider, LIST_FAILED, UPLOAD_FAILED};
use shutterbox::upload::{SelectedFile, UploadForm};
use shutterbox_api_structs::Photo;

struct Backend {
    listing_status: StatusCode,
    listing_body: String,
    upload_status: StatusCode,
    listing_hits: AtomicUsize,
    uploads: Mutex<Vec<UploadForm>>,
}

impl Backend {
    fn new(listing_status: StatusCode, listing_body: &str, upload_status: StatusCode) -> Arc<Self> {
        Arc::new(Backend {
            listing_status,
            listing_body: listing_body.to_string(),
            upload_status,
            listing_hits: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        })
    }
}

async fn list(req: Request<Arc<Backend>>) -> tide::Result<Response> {
    let backend = req.state();
    backend.listing_hits.fetch_add(1, Ordering::SeqCst);
    Ok(Response::builder(backend.listing_status)
        .content_type(tide::http::mime::JSON)
        .body(backend.listing_body.clone())
        .build())
}

async fn create(mut req: Request<Arc<Backend>>) -> tide::Result<Response> {
    let content_type = req
        .header("Content-Type")
        .map(|value| value.last().as_str().to_string())
        .unwrap_or_default();
    let body = req.body_bytes().await?;
    let form = UploadForm::from_multipart(&content_type, body).await?;

    let backend = req.state();
    backend.uploads.lock().unwrap().push(form.clone());

    if !backend.upload_status.is_success() {
        return Ok(Response::new(backend.upload_status));
    }

    let created = Photo {
        id: 42,
        photo_url: format!("http://s3.test/{}", form.photo.file_name),
        title: form.title,
        description: form.description,
    };
    Ok(Response::builder(backend.upload_status)
        .body(tide::Body::from_json(&created)?)
        .build())
}

fn spawn_backend(backend: Arc<Backend>) -> HttpPhotoClient {
    let mut app = tide::with_state(backend);
    app.at("/api/photos").get(list).post(create);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    async_std::task::spawn(async move { app.listen(listener).await });

    HttpPhotoClient::new(&Url::parse(&format!("http://{}/", addr)).unwrap()).unwrap()
}

fn jpeg_form() -> UploadForm {
    UploadForm {
        photo: SelectedFile {
            file_name: "beach.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3],
        },
        title: Some("Beach".to_string()),
        description: None,
    }
}

const LISTING: &str = r#"[
    {"id": 1, "photo_url": "http://x/1.jpg", "title": null, "description": null},
    {"id": 2, "photo_url": null, "title": "second", "description": "no url"}
]"#;

#[async_std::test]
async fn lists_photos_in_server_order() {
    let client = spawn_backend(Backend::new(StatusCode::Ok, LISTING, StatusCode::Ok));

    let photos = client.list_photos().await.unwrap();

    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].id, 1);
    assert_eq!(photos[0].photo_url, "http://x/1.jpg");
    assert_eq!(photos[1].photo_url, "");
    assert_eq!(photos[1].title.as_deref(), Some("second"));
}

#[async_std::test]
async fn empty_listing_is_success() {
    let client = spawn_backend(Backend::new(StatusCode::Ok, "[]", StatusCode::Ok));
    assert_eq!(client.list_photos().await, Ok(vec![]));
}

#[async_std::test]
async fn non_success_listing_is_generic_failure() {
    let client = spawn_backend(Backend::new(
        StatusCode::InternalServerError,
        r#"{"detail": "db down"}"#,
        StatusCode::Ok,
    ));

    assert_eq!(
        client.list_photos().await,
        Err(ApiError::Status {
            status: 500,
            message: LIST_FAILED,
        })
    );
}

#[async_std::test]
async fn undecodable_listing_is_transport_failure() {
    let client = spawn_backend(Backend::new(StatusCode::Ok, "not json", StatusCode::Ok));
    assert!(matches!(client.list_photos().await, Err(ApiError::Transport(_))));
}

#[async_std::test]
async fn get_by_id_scans_a_single_listing() {
    let backend = Backend::new(StatusCode::Ok, LISTING, StatusCode::Ok);
    let client = spawn_backend(backend.clone());

    let photo = client.get_photo_by_id(2).await.unwrap();
    assert_eq!(photo.id, 2);
    assert_eq!(photo.description.as_deref(), Some("no url"));
    assert_eq!(backend.listing_hits.load(Ordering::SeqCst), 1);

    assert_eq!(client.get_photo_by_id(3).await, Err(ApiError::NotFound));
    assert_eq!(backend.listing_hits.load(Ordering::SeqCst), 2);
}

#[async_std::test]
async fn get_by_id_forwards_listing_failure() {
    let client = spawn_backend(Backend::new(StatusCode::BadGateway, "", StatusCode::Ok));

    assert_eq!(
        client.get_photo_by_id(1).await,
        Err(ApiError::Status {
            status: 502,
            message: LIST_FAILED,
        })
    );
}

#[async_std::test]
async fn upload_posts_multipart_and_returns_created_photo() {
    let backend = Backend::new(StatusCode::Ok, "[]", StatusCode::Ok);
    let client = spawn_backend(backend.clone());

    let created = client.upload_photo(&jpeg_form()).await.unwrap();

    assert_eq!(created.id, 42);
    assert_eq!(created.photo_url, "http://s3.test/beach.jpg");
    assert_eq!(created.title.as_deref(), Some("Beach"));

    let uploads = backend.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].photo, jpeg_form().photo);
    assert_eq!(uploads[0].description, None);
}

#[async_std::test]
async fn rejected_upload_is_generic_failure() {
    let backend = Backend::new(StatusCode::Ok, "[]", StatusCode::BadRequest);
    let client = spawn_backend(backend);

    assert_eq!(
        client.upload_photo(&jpeg_form()).await,
        Err(ApiError::Status {
            status: 400,
            message: UPLOAD_FAILED,
        })
    );
}

#[async_std::test]
async fn unreachable_backend_is_transport_failure() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = HttpPhotoClient::new(&Url::parse(&format!("http://{}", addr)).unwrap()).unwrap();

    assert!(matches!(client.list_photos().await, Err(ApiError::Transport(_))));
    assert!(matches!(
        client.upload_photo(&jpeg_form()).await,
        Err(ApiError::Transport(_))
    ));
}
