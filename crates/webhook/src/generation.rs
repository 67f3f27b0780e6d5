//! One full generation round-trip: submit, then interpret.

use promptory_core::interpret::{interpret, InterpretError, ResultImage};
use promptory_core::session::PendingRequest;

use crate::client::{ImageWebhook, WebhookError};

/// Every way a generation request can fail, in user-facing form.
///
/// - [`Webhook`](Self::Webhook): the request never completed.
/// - [`Interpret`](Self::Interpret): the webhook answered with a failure
///   status or with something that is not an image.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),
}

/// Submit the request and turn whatever comes back into a result image.
pub async fn generate_image(
    webhook: &dyn ImageWebhook,
    request: &PendingRequest,
) -> Result<ResultImage, GenerationError> {
    let response = webhook.submit(request).await?;
    let result = interpret(&response).inspect_err(|e| {
        tracing::warn!(status = response.status, error = %e, "Webhook response not usable");
    })?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use promptory_core::interpret::WebhookResponse;
    use promptory_core::model_choice::ModelChoice;
    use promptory_core::session::UploadedImage;

    use super::*;

    struct Canned(WebhookResponse);

    #[async_trait]
    impl ImageWebhook for Canned {
        async fn submit(&self, _request: &PendingRequest) -> Result<WebhookResponse, WebhookError> {
            Ok(self.0.clone())
        }
    }

    fn pending() -> PendingRequest {
        PendingRequest {
            image: Arc::new(UploadedImage::new("a.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]).unwrap()),
            model: ModelChoice::Male,
        }
    }

    #[tokio::test]
    async fn image_response_yields_inline_result() {
        let webhook = Canned(WebhookResponse {
            status: 200,
            content_type: Some("image/png".into()),
            body: vec![1; 500],
        });
        let result = generate_image(&webhook, &pending()).await.unwrap();
        assert_matches!(result, ResultImage::Inline { bytes, .. } if bytes.len() == 500);
    }

    #[tokio::test]
    async fn failure_status_is_interpret_error() {
        let webhook = Canned(WebhookResponse {
            status: 500,
            content_type: Some("text/plain".into()),
            body: b"boom".to_vec(),
        });
        let err = generate_image(&webhook, &pending()).await.unwrap_err();
        assert_matches!(err, GenerationError::Interpret(InterpretError::WorkflowFailure { .. }));
        assert!(err.to_string().contains("boom"));
    }
}
