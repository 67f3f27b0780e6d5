//! Handlers for the `/try-on/sessions` resource.
//!
//! A session holds the visitor's selected product image and model, runs
//! the webhook round-trip on demand, and serves the resulting image.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use promptory_core::error::CoreError;
use promptory_core::model_choice::ModelChoice;
use promptory_core::session::{RequestState, SessionResult, TryOnSession, UploadedImage};
use promptory_core::sniff::extension_for;
use promptory_core::types::{SessionId, Timestamp};
use promptory_webhook::generate_image;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the product image.
const IMAGE_FIELD: &str = "image";

/// File name stem offered when the result is downloaded.
const DOWNLOAD_STEM: &str = "try-on-result";

#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    pub model: String,
}

/// Summary of the uploaded product image.
#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub file_name: String,
    pub mime: String,
    pub size_bytes: usize,
    pub preview_url: String,
}

/// Everything the Try-On panel needs to render.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub status: RequestState,
    pub model: Option<ModelChoice>,
    pub image: Option<ImageSummary>,
    pub can_generate: bool,
    pub result_url: Option<String>,
    pub download_url: Option<String>,
    pub result_mime: Option<String>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SessionView {
    pub fn new(id: SessionId, session: &TryOnSession) -> Self {
        let base = format!("/api/v1/try-on/sessions/{id}");
        let image = session.image().map(|image| ImageSummary {
            file_name: image.file_name.clone(),
            mime: image.mime.clone(),
            size_bytes: image.bytes.len(),
            preview_url: format!("{base}/image"),
        });
        let result_mime = match session.result() {
            Some(SessionResult::Stored { mime, .. }) => Some(mime.clone()),
            _ => None,
        };
        let has_result = session.result().is_some();

        Self {
            id,
            status: session.state(),
            model: session.model(),
            image,
            can_generate: session.can_generate(),
            result_url: has_result.then(|| format!("{base}/result")),
            download_url: has_result.then(|| format!("{base}/result/download")),
            result_mime,
            error: session.error().map(str::to_string),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/try-on/sessions
pub async fn create(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let (id, session) = state.sessions.create().await;
    let view = SessionView::new(id, &*session.lock().await);
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/try-on/sessions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let session = state.sessions.get(id).await?;
    let view = SessionView::new(id, &*session.lock().await);
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/try-on/sessions/{id}
///
/// Tear the session down and release its result image.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<StatusCode> {
    state.sessions.remove(id, &state.results).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/try-on/sessions/{id}/image
///
/// Multipart upload with the product image in the `image` field. Only JPEG
/// and PNG are accepted.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let session = state.sessions.get(id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some(UploadedImage::new(file_name, &content_type, bytes.to_vec())?);
        break;
    }
    let image = upload.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field '{IMAGE_FIELD}'"))
    })?;

    tracing::info!(
        session_id = %id,
        file_name = %image.file_name,
        mime = %image.mime,
        size = image.bytes.len(),
        "Product image selected",
    );

    let mut guard = session.lock().await;
    guard.select_image(image);
    Ok(Json(DataResponse {
        data: SessionView::new(id, &guard),
    }))
}

/// GET /api/v1/try-on/sessions/{id}/image
///
/// Preview of the uploaded product image.
pub async fn preview_image(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Response> {
    let session = state.sessions.get(id).await?;
    let guard = session.lock().await;
    let image = guard.image().ok_or_else(|| CoreError::NotFound {
        entity: "UploadedImage",
        id: id.to_string(),
    })?;
    Ok(image_response(&image.mime, image.bytes.clone(), None))
}

/// PUT /api/v1/try-on/sessions/{id}/model
pub async fn select_model(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<SelectModelRequest>,
) -> AppResult<impl IntoResponse> {
    let model: ModelChoice = input.model.parse()?;
    let session = state.sessions.get(id).await?;

    let mut guard = session.lock().await;
    guard.select_model(model);
    Ok(Json(DataResponse {
        data: SessionView::new(id, &guard),
    }))
}

/// POST /api/v1/try-on/sessions/{id}/generate
///
/// Send the selected image and model to the webhook and record the
/// outcome on the session. Webhook and decoding failures are reported in
/// the returned view (`status: "error"`), not as HTTP errors.
///
/// The round-trip runs on its own task so the session always leaves the
/// loading state, even if the client goes away.
pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let session = state.sessions.get(id).await?;
    let request = session.lock().await.begin(&state.results)?;

    tracing::info!(session_id = %id, model = %request.model, "Starting try-on generation");

    let task = tokio::spawn(async move {
        let outcome = generate_image(state.webhook.as_ref(), &request)
            .await
            .map_err(|e| e.to_string());

        let mut guard = session.lock().await;
        if !guard.complete(outcome, &state.results) {
            tracing::info!(session_id = %id, "Session removed during generation");
            return None;
        }
        Some(SessionView::new(id, &guard))
    });

    let view = task
        .await
        .map_err(|e| AppError::InternalError(format!("Generation task failed: {e}")))?
        .ok_or_else(|| CoreError::NotFound {
            entity: "TryOnSession",
            id: id.to_string(),
        })?;

    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/try-on/sessions/{id}/result
///
/// Stored results are served inline; remote results redirect to their URL.
pub async fn view_result(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Response> {
    serve_result(&state, id, false).await
}

/// GET /api/v1/try-on/sessions/{id}/result/download
///
/// Same as [`view_result`] but stored results are sent as an attachment
/// named `try-on-result.<ext>`.
pub async fn download_result(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Response> {
    serve_result(&state, id, true).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn serve_result(state: &AppState, id: SessionId, attachment: bool) -> AppResult<Response> {
    let session = state.sessions.get(id).await?;
    let guard = session.lock().await;

    let missing = || CoreError::NotFound {
        entity: "TryOnResult",
        id: id.to_string(),
    };

    match guard.result().ok_or_else(missing)? {
        SessionResult::Remote { url } => Ok(Redirect::to(url).into_response()),
        SessionResult::Stored { handle, mime } => {
            let stored = state.results.get(*handle).ok_or_else(missing)?;
            let disposition = attachment.then(|| {
                format!(
                    "attachment; filename=\"{DOWNLOAD_STEM}.{}\"",
                    extension_for(mime)
                )
            });
            Ok(image_response(&stored.mime, stored.bytes, disposition))
        }
    }
}

fn image_response(mime: &str, bytes: Vec<u8>, disposition: Option<String>) -> Response {
    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime)
        .header(header::CACHE_CONTROL, "no-store");
    if let Some(disposition) = disposition {
        response = response.header(header::CONTENT_DISPOSITION, disposition);
    }
    response
        .body(Body::from(bytes))
        .unwrap_or_else(|e| AppError::InternalError(e.to_string()).into_response())
}
