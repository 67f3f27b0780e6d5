//! Route definitions for the static marketing content.

use axum::routing::get;
use axum::Router;

use crate::handlers::content;
use crate::state::AppState;

/// Content routes, mounted directly under `/api/v1`.
///
/// ```text
/// GET /catalog/categories                  -> list_categories
/// GET /catalog                             -> list_prompts
/// GET /catalog/{category}/{index}/prompt   -> copy_prompt
/// GET /pricing                             -> list_pricing
/// GET /testimonials                        -> list_testimonials
/// GET /faq                                 -> list_faq
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog/categories", get(content::list_categories))
        .route("/catalog", get(content::list_prompts))
        .route("/catalog/{category}/{index}/prompt", get(content::copy_prompt))
        .route("/pricing", get(content::list_pricing))
        .route("/testimonials", get(content::list_testimonials))
        .route("/faq", get(content::list_faq))
}
