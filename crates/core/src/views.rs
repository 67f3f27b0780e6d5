//! View state for the interactive landing sections.
//!
//! Each section is a pure mapping from a little local state to what is
//! shown. The API computes these server-side so the client only renders.

use serde::Serialize;

use crate::catalog::{self, Category, PromptEntry};
use crate::error::CoreError;
use crate::types::Timestamp;

/// How long the "Copied to clipboard" confirmation stays visible.
pub const COPY_TOAST_SECS: i64 = 3;

/// Category-filtered prompt gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryView {
    active: Category,
}

impl Default for GalleryView {
    fn default() -> Self {
        Self {
            active: Category::Men,
        }
    }
}

impl GalleryView {
    pub fn select(&mut self, category: Category) {
        self.active = category;
    }

    pub fn active(&self) -> Category {
        self.active
    }

    pub fn entries(&self) -> &'static [PromptEntry] {
        catalog::prompts(self.active)
    }
}

/// FAQ accordion: at most one entry is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaqAccordion {
    open: Option<usize>,
}

/// An FAQ entry together with its expanded/collapsed state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaqItemView {
    pub index: usize,
    pub question: &'static str,
    pub answer: &'static str,
    pub is_open: bool,
}

impl FaqAccordion {
    /// Open entry `index`, or close it when it is already open.
    pub fn toggle(&mut self, index: usize) -> Result<(), CoreError> {
        if index >= catalog::faqs().len() {
            return Err(CoreError::Validation(format!(
                "FAQ index {index} out of range"
            )));
        }
        self.open = if self.open == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(())
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    pub fn items(&self) -> Vec<FaqItemView> {
        catalog::faqs()
            .iter()
            .enumerate()
            .map(|(index, entry)| FaqItemView {
                index,
                question: entry.question,
                answer: entry.answer,
                is_open: self.open == Some(index),
            })
            .collect()
    }
}

/// Confirmation shown after a prompt is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyToast {
    pub title: &'static str,
    pub description: &'static str,
    pub shown_at: Timestamp,
    pub visible_until: Timestamp,
}

impl CopyToast {
    pub fn copied(at: Timestamp) -> Self {
        Self {
            title: "Copied to clipboard",
            description: "The prompt has been copied to your clipboard.",
            shown_at: at,
            visible_until: at + chrono::Duration::seconds(COPY_TOAST_SECS),
        }
    }

    pub fn is_visible(&self, now: Timestamp) -> bool {
        now >= self.shown_at && now < self.visible_until
    }
}
