pub mod content;
pub mod health;
pub mod try_on;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /catalog/categories                              gallery tabs
/// /catalog?category=men                            prompts in one category
/// /catalog/{category}/{index}/prompt               copy a prompt (with toast)
/// /pricing                                         pricing tiers
/// /testimonials                                    testimonials
/// /faq?open=1                                      FAQ accordion
///
/// /try-on/sessions                                 create (POST)
/// /try-on/sessions/{id}                            get, delete
/// /try-on/sessions/{id}/image                      upload (PUT), preview (GET)
/// /try-on/sessions/{id}/model                      choose model (PUT)
/// /try-on/sessions/{id}/generate                   run webhook round-trip (POST)
/// /try-on/sessions/{id}/result                     view result
/// /try-on/sessions/{id}/result/download            download result
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(content::router())
        .nest("/try-on/sessions", try_on::router())
}
