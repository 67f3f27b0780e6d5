//! Client for the external image-generation webhook.
//!
//! The webhook is an automation workflow hosted elsewhere. This crate sends
//! it the visitor's product image and model choice, captures the raw
//! response, and runs it through the response interpreter from
//! `promptory-core`.

pub mod client;
pub mod config;
pub mod generation;

pub use client::{ImageWebhook, WebhookClient, WebhookError};
pub use config::{RequestEncoding, WebhookConfig};
pub use generation::{generate_image, GenerationError};
