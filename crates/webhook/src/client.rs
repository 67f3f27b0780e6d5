//! HTTP client for the image-generation webhook.
//!
//! Sends the product image and model choice with [`reqwest`] and captures
//! the response (status, content type, body) without judging it. Deciding
//! whether the response holds an image is the interpreter's job.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};

use promptory_core::interpret::WebhookResponse;
use promptory_core::session::PendingRequest;

use crate::config::{RequestEncoding, WebhookConfig};

/// The webhook may answer with JSON, an image, or anything else.
const ACCEPT_ANY_RESULT: &str = "application/json, image/*, */*";

/// Errors raised before a response was received.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build webhook HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be assembled (e.g. bad MIME type on the file part).
    #[error("Invalid webhook request: {0}")]
    InvalidRequest(#[source] reqwest::Error),

    /// The request never completed (DNS, connect, TLS, timeout).
    #[error("Network error: cannot connect to the image webhook ({0}). Check the webhook URL and that the service is reachable.")]
    Transport(#[source] reqwest::Error),

    /// The response started but its body could not be read.
    #[error("Failed to read webhook response body: {0}")]
    Body(#[source] reqwest::Error),

    /// The response body exceeded `WebhookConfig::max_response_bytes`.
    #[error("Webhook response exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Something that can run a generation request.
///
/// Implemented by [`WebhookClient`]; tests substitute a fake.
#[async_trait]
pub trait ImageWebhook: Send + Sync {
    async fn submit(&self, request: &PendingRequest) -> Result<WebhookResponse, WebhookError>;
}

/// Client for one configured webhook endpoint.
pub struct WebhookClient {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookClient {
    pub fn new(config: WebhookConfig) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(WebhookError::Client)?;
        Ok(Self { client, config })
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    /// The client's own timeout applies instead of `config.timeout`.
    pub fn with_client(client: reqwest::Client, config: WebhookConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    fn build_request(&self, request: &PendingRequest) -> Result<reqwest::RequestBuilder, WebhookError> {
        let builder = self
            .client
            .post(&self.config.url)
            .header(ACCEPT, ACCEPT_ANY_RESULT);

        let image = &request.image;
        let builder = match self.config.encoding {
            RequestEncoding::Multipart => {
                let part = Part::bytes(image.bytes.clone())
                    .file_name(image.file_name.clone())
                    .mime_str(&image.mime)
                    .map_err(WebhookError::InvalidRequest)?;
                let form = Form::new()
                    .part("image", part)
                    .text("model", request.model.as_str());
                builder.multipart(form)
            }
            RequestEncoding::Json => builder.json(&serde_json::json!({
                "image": STANDARD.encode(&image.bytes),
                "model": request.model.as_str(),
            })),
        };
        Ok(builder)
    }
}

#[async_trait]
impl ImageWebhook for WebhookClient {
    async fn submit(&self, request: &PendingRequest) -> Result<WebhookResponse, WebhookError> {
        tracing::info!(
            url = %self.config.url,
            encoding = %self.config.encoding,
            model = %request.model,
            image_bytes = request.image.bytes.len(),
            "Sending generation request to webhook",
        );

        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %self.config.url, error = %e, "Webhook unreachable");
                WebhookError::Transport(e)
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = read_capped(response, self.config.max_response_bytes).await?;

        tracing::info!(
            status,
            content_type = content_type.as_deref().unwrap_or("none"),
            body_bytes = body.len(),
            "Webhook responded",
        );

        Ok(WebhookResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Buffer the response body, giving up once it passes `limit` bytes.
async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>, WebhookError> {
    let declared = usize::try_from(response.content_length().unwrap_or(0)).unwrap_or(usize::MAX);
    if declared > limit {
        tracing::warn!(declared, limit, "Webhook response too large");
        return Err(WebhookError::TooLarge { limit });
    }

    let mut body = Vec::with_capacity(declared);
    while let Some(chunk) = response.chunk().await.map_err(WebhookError::Body)? {
        if body.len() + chunk.len() > limit {
            tracing::warn!(limit, "Webhook response too large");
            return Err(WebhookError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builds_client() {
        let client = WebhookClient::new(WebhookConfig::new("http://localhost:5678/webhook")).unwrap();
        assert_eq!(client.config().url, "http://localhost:5678/webhook");
    }

    #[test]
    fn transport_error_mentions_connectivity() {
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = WebhookError::Transport(req_err);
        assert!(err.to_string().starts_with("Network error: cannot connect"));
    }

    #[test]
    fn too_large_names_the_limit() {
        let err = WebhookError::TooLarge { limit: 1024 };
        assert_eq!(err.to_string(), "Webhook response exceeds 1024 bytes");
    }
}
