//! Route definitions for Try-On sessions.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::try_on;
use crate::state::AppState;

/// Routes mounted at `/try-on/sessions`.
///
/// ```text
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// DELETE /{id}                    -> delete
/// PUT    /{id}/image              -> upload_image
/// GET    /{id}/image              -> preview_image
/// PUT    /{id}/model              -> select_model
/// POST   /{id}/generate           -> generate
/// GET    /{id}/result             -> view_result
/// GET    /{id}/result/download    -> download_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(try_on::create))
        .route("/{id}", get(try_on::get_by_id).delete(try_on::delete))
        .route(
            "/{id}/image",
            put(try_on::upload_image).get(try_on::preview_image),
        )
        .route("/{id}/model", put(try_on::select_model))
        .route("/{id}/generate", post(try_on::generate))
        .route("/{id}/result", get(try_on::view_result))
        .route("/{id}/result/download", get(try_on::download_result))
}
