//! Handlers for the static landing-page content.
//!
//! All data comes from the compiled-in catalog; these handlers only apply
//! the small amount of view state the page needs (active gallery tab, open
//! FAQ entry, copy confirmation).

use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use promptory_core::catalog::{self, Category, PromptEntry};
use promptory_core::error::CoreError;
use promptory_core::types::Timestamp;
use promptory_core::views::{CopyToast, FaqAccordion, FaqItemView, GalleryView};

use crate::error::AppResult;
use crate::response::DataResponse;

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FaqParams {
    pub open: Option<usize>,
}

/// One gallery filter tab.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub prompt_count: usize,
}

/// The gallery filtered to one category.
#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    pub category: Category,
    pub prompts: &'static [PromptEntry],
}

/// Prompt text ready to be copied, plus the confirmation to show.
#[derive(Debug, Serialize)]
pub struct CopiedPrompt {
    pub category: Category,
    pub index: usize,
    pub title: &'static str,
    pub prompt: &'static str,
    pub toast: CopyToast,
}

#[derive(Debug, Serialize)]
pub struct FaqResponse {
    pub open_index: Option<usize>,
    pub items: Vec<FaqItemView>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/catalog/categories
pub async fn list_categories() -> impl IntoResponse {
    let data: Vec<CategorySummary> = Category::ALL
        .into_iter()
        .map(|category| CategorySummary {
            category,
            prompt_count: catalog::prompts(category).len(),
        })
        .collect();
    Json(DataResponse { data })
}

/// GET /api/v1/catalog?category=couple
///
/// Without `category` the gallery shows its default tab.
pub async fn list_prompts(Query(params): Query<CatalogParams>) -> AppResult<impl IntoResponse> {
    let mut gallery = GalleryView::default();
    if let Some(raw) = params.category.as_deref() {
        gallery.select(raw.parse()?);
    }
    Ok(Json(DataResponse {
        data: GalleryResponse {
            category: gallery.active(),
            prompts: gallery.entries(),
        },
    }))
}

/// GET /api/v1/catalog/{category}/{index}/prompt
///
/// Return the prompt text to place on the clipboard.
pub async fn copy_prompt(
    Path((category, index)): Path<(String, usize)>,
) -> AppResult<impl IntoResponse> {
    let category: Category = category.parse()?;
    let entry = catalog::find_prompt(category, index).ok_or_else(|| CoreError::NotFound {
        entity: "Prompt",
        id: format!("{category}/{index}"),
    })?;
    let now: Timestamp = chrono::Utc::now();

    tracing::debug!(%category, index, "Prompt copied");

    Ok(Json(DataResponse {
        data: CopiedPrompt {
            category,
            index,
            title: entry.title,
            prompt: entry.description,
            toast: CopyToast::copied(now),
        },
    }))
}

/// GET /api/v1/pricing
pub async fn list_pricing() -> impl IntoResponse {
    Json(DataResponse {
        data: catalog::pricing_tiers(),
    })
}

/// GET /api/v1/testimonials
pub async fn list_testimonials() -> impl IntoResponse {
    Json(DataResponse {
        data: catalog::testimonials(),
    })
}

/// GET /api/v1/faq?open=2
///
/// All entries are collapsed unless `open` names one.
pub async fn list_faq(Query(params): Query<FaqParams>) -> AppResult<impl IntoResponse> {
    let mut accordion = FaqAccordion::default();
    if let Some(index) = params.open {
        accordion.toggle(index)?;
    }
    Ok(Json(DataResponse {
        data: FaqResponse {
            open_index: accordion.open_index(),
            items: accordion.items(),
        },
    }))
}
