//! Image upload definitions.

use std::path::Path;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, upload_images, Command as _},
    domain::image,
};
use tower_http::services::ServeDir;

use crate::{
    api::{self, Json},
    define_error,
    form::{ValidationError, Violation},
    AsError, Context, Error,
};

/// Maximum number of images in a single batch the request body is sized
/// for.
const MAX_BATCH_LEN: usize = 20;

/// Creates the [`Router`] uploading images into and serving them from the
/// provided `root` directory.
///
/// Request bodies are limited according to the provided `max_size` of a
/// single image.
pub fn router(root: impl AsRef<Path>, max_size: usize) -> Router {
    // Base64 inflates the data by a third, plus the data URL prefix.
    let encoded = max_size.saturating_mul(4) / 3 + 1024;

    Router::new()
        .route(
            "/",
            post(upload).layer(DefaultBodyLimit::max(encoded)),
        )
        .route(
            "/batch",
            post(upload_batch).layer(DefaultBodyLimit::max(
                encoded.saturating_mul(MAX_BATCH_LEN),
            )),
        )
        .fallback_service(ServeDir::new(root))
}

/// Single uploaded file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Base64 contents, optionally prefixed as a data URL.
    #[serde(default)]
    file: String,

    /// Name of the file on the client side.
    file_name: Option<String>,
}

impl From<File> for upload_images::Upload {
    fn from(file: File) -> Self {
        Self {
            file_name: file.file_name,
            data: file.file,
        }
    }
}

/// Stored image.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored {
    /// Public URL of the image.
    pub url: image::Url,

    /// Name the image is stored under.
    pub file_name: String,
}

impl From<upload_images::Uploaded> for Stored {
    fn from(uploaded: upload_images::Uploaded) -> Self {
        Self {
            url: uploaded.url,
            file_name: uploaded.name.to_string(),
        }
    }
}

/// Uploads a single image.
///
/// # Errors
///
/// Possible error codes:
/// - `NO_FILE` - the `file` is empty;
/// - `VALIDATION_FAILED` - the `file` is not valid Base64;
/// - `IMAGE_TOO_LARGE` - the image exceeds the size limit.
#[tracing::instrument(
    skip_all,
    fields(api.name = "uploadImage", otel.name = api::SPAN_NAME),
)]
pub async fn upload(
    ctx: Context,
    Json(file): Json<File>,
) -> Result<Json<Stored>, Error> {
    _ = ctx.current_session().await?;

    let stored = store(&ctx, vec![file])
        .await?
        .pop()
        .ok_or_else(|| Error::internal(&"no image stored"))?;

    Ok(Json(stored))
}

/// Body of an [`upload_batch`] request.
#[derive(Debug, Deserialize)]
pub struct Batch {
    /// Files to upload, in order.
    #[serde(default)]
    files: Vec<File>,
}

/// Images stored by an [`upload_batch`] request.
#[derive(Clone, Debug, Serialize)]
pub struct StoredBatch {
    /// Stored images, in the order of upload.
    pub files: Vec<Stored>,
}

/// Uploads a batch of images all-or-nothing.
///
/// # Errors
///
/// Possible error codes:
/// - `NO_FILE` - the batch or any `file` in it is empty;
/// - `VALIDATION_FAILED` - any `file` is not valid Base64;
/// - `IMAGE_TOO_LARGE` - any image exceeds the size limit.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "uploadImages",
        otel.name = api::SPAN_NAME,
        files = batch.files.len(),
    ),
)]
pub async fn upload_batch(
    ctx: Context,
    Json(batch): Json<Batch>,
) -> Result<Json<StoredBatch>, Error> {
    _ = ctx.current_session().await?;

    let files = store(&ctx, batch.files).await?;

    Ok(Json(StoredBatch { files }))
}

/// Stores the provided [`File`]s via [`command::UploadImages`].
async fn store(ctx: &Context, files: Vec<File>) -> Result<Vec<Stored>, Error> {
    let uploads = files.into_iter().map(Into::into).collect();

    let uploaded = ctx
        .service()
        .execute(command::UploadImages { uploads })
        .await
        .map_err(AsError::into_error)?;

    Ok(uploaded.into_iter().map(Into::into).collect())
}

impl AsError for upload_images::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_FILE"]
                #[status = BAD_REQUEST]
                #[message = "No file provided"]
                NoFile,

                #[code = "IMAGE_TOO_LARGE"]
                #[status = PAYLOAD_TOO_LARGE]
                #[message = "Image exceeds the size limit"]
                TooLarge,
            }
        }

        match self {
            Self::Storage(e) => e.try_as_error(),
            Self::NoFile => Some(Error::NoFile.into()),
            Self::InvalidData { index, .. } => Some(
                ValidationError(vec![Violation {
                    field: "file",
                    message: format!("file #{index} is not valid Base64")
                        .into(),
                }])
                .into(),
            ),
            Self::TooLarge { .. } => Some(Error::TooLarge.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::command::upload_images;

    use super::{Batch, File};

    #[test]
    fn defaults_to_empty_file() {
        let file = serde_json::from_str::<File>("{}").unwrap();

        let upload = upload_images::Upload::from(file);

        assert!(upload.data.is_empty());
        assert!(upload.file_name.is_none());
    }

    #[test]
    fn keeps_batch_order() {
        let batch = serde_json::from_str::<Batch>(
            r#"{"files": [
                {"file": "data:image/png;base64,AA==", "fileName": "a.png"},
                {"file": "AA==", "fileName": "b.webp"}
            ]}"#,
        )
        .unwrap();

        let names = batch
            .files
            .into_iter()
            .map(|f| upload_images::Upload::from(f).file_name.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a.png", "b.webp"]);
    }
}
