use async_std::io::ReadExt;
use bytes::Bytes;
use futures_util::stream::{self, Stream};
use tide::http::{Body, StatusCode};
use tide::Request;

use crate::upload::{max_form_bytes, MultipartError, UploadForm};

pub mod api;
pub mod html;

const BODY_CHUNK_BYTES: usize = 64 * 1024;

pub(super) fn mount(app: &mut tide::Server<crate::State>) {
    html::mount(app);
    api::mount(app.at("/api"));
}

/// Parse a multipart upload submitted to one of our endpoints.
///
/// The body is streamed into the parser, which stops reading once it outgrows the
/// configured upload limit. A body whose declared length already exceeds it is refused unread.
pub(crate) async fn read_upload_form(
    req: &mut Request<crate::State>,
) -> tide::Result<Result<UploadForm, MultipartError>> {
    let limits = req.state().args.limits();
    let limit = max_form_bytes(&limits);

    if let Some(length) = req.len().map(|length| length as u64) {
        if length > limit {
            tracing::info!(length, limit, "refusing oversized upload body");
            return Ok(Err(MultipartError::TooLarge { limit }));
        }
    }

    let content_type = req
        .header("Content-Type")
        .map(|value| value.last().as_str().to_string())
        .unwrap_or_default();
    let body = body_chunks(req.take_body());

    Ok(UploadForm::from_stream(&content_type, body, &limits).await)
}

/// Status for a submission that couldn't even be parsed into a form.
pub(crate) fn multipart_status(err: &MultipartError) -> StatusCode {
    match err {
        MultipartError::TooLarge { .. } => StatusCode::UnprocessableEntity,
        MultipartError::Multer(_) => StatusCode::BadRequest,
    }
}

fn body_chunks(body: Body) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    stream::try_unfold(body, |mut body| async move {
        let mut chunk = vec![0; BODY_CHUNK_BYTES];
        let read = body.read(&mut chunk).await?;
        if read == 0 {
            return Ok(None);
        }
        chunk.truncate(read);
        Ok::<_, std::io::Error>(Some((Bytes::from(chunk), body)))
    })
}
