//! Try-On upload session.
//!
//! A session holds what the visitor selected (product image and model),
//! the lifecycle of the single generation request it may have in flight,
//! and a reference to the latest result.
//!
//! Inline results live in the shared [`ResultStore`] and are addressed by
//! a [`ResultHandle`]. A session releases its handle whenever the result
//! is superseded (a new request starts) or the session is torn down, so
//! repeated generations never accumulate images.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::error::CoreError;
use crate::interpret::ResultImage;
use crate::model_choice::ModelChoice;
use crate::sniff::{sniff_bytes, MIME_JPEG, MIME_OCTET_STREAM, MIME_PNG};
use crate::types::Timestamp;

/// Product image formats accepted for upload.
pub const ACCEPTED_UPLOAD_TYPES: [&str; 2] = [MIME_JPEG, MIME_PNG];

// ---------------------------------------------------------------------------
// Uploaded image
// ---------------------------------------------------------------------------

/// A product image selected by the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Validate an upload. Only JPEG and PNG are accepted; when the client
    /// sent no useful content type the bytes are sniffed instead.
    pub fn new(
        file_name: impl Into<String>,
        declared_mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Validation("Uploaded image is empty".into()));
        }

        let declared = declared_mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        let mime = match declared.as_str() {
            "" | MIME_OCTET_STREAM => sniff_bytes(&bytes).to_string(),
            "image/jpg" => MIME_JPEG.to_string(),
            _ => declared,
        };

        if !ACCEPTED_UPLOAD_TYPES.contains(&mime.as_str()) {
            return Err(CoreError::Validation(format!(
                "Unsupported image type '{mime}', only JPG or PNG files are accepted"
            )));
        }

        Ok(Self {
            file_name: file_name.into(),
            mime,
            bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// Result store
// ---------------------------------------------------------------------------

/// Opaque reference to an image held in the [`ResultStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResultHandle(uuid::Uuid);

impl ResultHandle {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ResultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone)]
pub struct StoredImage {
    pub mime: String,
    pub bytes: Vec<u8>,
    pub created_at: Timestamp,
}

/// In-memory holder for decoded result images.
///
/// Thread-safe; designed to be wrapped in `Arc` and shared by all sessions.
#[derive(Debug, Default)]
pub struct ResultStore {
    images: RwLock<HashMap<ResultHandle, StoredImage>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, mime: String, bytes: Vec<u8>) -> ResultHandle {
        let handle = ResultHandle::new();
        let image = StoredImage {
            mime,
            bytes,
            created_at: chrono::Utc::now(),
        };
        self.images
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, image);
        handle
    }

    pub fn get(&self, handle: ResultHandle) -> Option<StoredImage> {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .cloned()
    }

    /// Drop an image. Returns `false` if the handle was already released.
    pub fn release(&self, handle: ResultHandle) -> bool {
        self.images
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every image, returning how many were held.
    pub fn clear(&self) -> usize {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        let count = images.len();
        images.clear();
        count
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Lifecycle of the session's generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Idle,
    Loading,
    Error,
    Success,
}

/// Where the current result can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResult {
    Stored { handle: ResultHandle, mime: String },
    Remote { url: String },
}

/// Snapshot of the selection taken when a request starts.
///
/// Later changes to the session's selection do not affect a request that
/// is already in flight.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub image: Arc<UploadedImage>,
    pub model: ModelChoice,
}

#[derive(Debug)]
pub struct TryOnSession {
    image: Option<Arc<UploadedImage>>,
    model: Option<ModelChoice>,
    state: RequestState,
    result: Option<SessionResult>,
    error: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Default for TryOnSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TryOnSession {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            image: None,
            model: None,
            state: RequestState::Idle,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn select_image(&mut self, image: UploadedImage) {
        self.image = Some(Arc::new(image));
        self.touch();
    }

    pub fn select_model(&mut self, model: ModelChoice) {
        self.model = Some(model);
        self.touch();
    }

    /// A request may start only with an image and a model selected and
    /// nothing already in flight.
    pub fn can_generate(&self) -> bool {
        self.image.is_some() && self.model.is_some() && self.state != RequestState::Loading
    }

    /// Start a generation request.
    ///
    /// Releases the previous result and clears any previous error. Fails
    /// with [`CoreError::Conflict`] while another request is in flight.
    pub fn begin(&mut self, store: &ResultStore) -> Result<PendingRequest, CoreError> {
        if self.state == RequestState::Loading {
            return Err(CoreError::Conflict(
                "A generation request is already in progress".into(),
            ));
        }
        let image = self
            .image
            .clone()
            .ok_or_else(|| CoreError::Validation("Select a product image first".into()))?;
        let model = self
            .model
            .ok_or_else(|| CoreError::Validation("Select a model first".into()))?;

        self.release_result(store);
        self.error = None;
        self.state = RequestState::Loading;
        self.touch();

        Ok(PendingRequest { image, model })
    }

    /// Record the outcome of the in-flight request.
    ///
    /// Returns `false` (and stores nothing) when no request was in flight,
    /// e.g. because the session was torn down while it ran.
    pub fn complete(&mut self, outcome: Result<ResultImage, String>, store: &ResultStore) -> bool {
        if self.state != RequestState::Loading {
            tracing::debug!(state = ?self.state, "Discarding result for inactive session");
            return false;
        }

        self.release_result(store);
        match outcome {
            Ok(ResultImage::Inline { mime, bytes }) => {
                let handle = store.insert(mime.clone(), bytes);
                self.result = Some(SessionResult::Stored { handle, mime });
                self.error = None;
                self.state = RequestState::Success;
            }
            Ok(ResultImage::Remote { url }) => {
                self.result = Some(SessionResult::Remote { url });
                self.error = None;
                self.state = RequestState::Success;
            }
            Err(message) => {
                self.error = Some(message);
                self.state = RequestState::Error;
            }
        }
        self.touch();
        true
    }

    /// Release everything the session holds.
    pub fn teardown(&mut self, store: &ResultStore) {
        self.release_result(store);
        self.image = None;
        self.model = None;
        self.error = None;
        self.state = RequestState::Idle;
        self.touch();
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_deref()
    }

    pub fn model(&self) -> Option<ModelChoice> {
        self.model
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn release_result(&mut self, store: &ResultStore) {
        if let Some(SessionResult::Stored { handle, .. }) = self.result.take() {
            store.release(handle);
        }
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }
}
