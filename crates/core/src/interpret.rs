//! Interpretation of image-generation webhook responses.
//!
//! The webhook is an external automation workflow whose output shape
//! depends on how its last node is configured. Depending on that node it
//! answers with:
//!
//! - binary image bytes under an `image/*` content type,
//! - a JSON envelope carrying a URL or base64 image under one of several
//!   field layouts,
//! - unlabeled bytes or raw base64 text.
//!
//! [`interpret`] classifies the captured response and yields either a
//! [`ResultImage`] or an [`InterpretError`] with enough detail (status,
//! content type, body sample) to debug a misconfigured workflow.

use serde_json::Value;

use crate::sniff::{
    decode_base64, is_known_image, looks_like_url, sniff_base64, sniff_bytes, strip_data_url,
    MIME_OCTET_STREAM,
};

/// Maximum number of characters of a response body quoted in errors.
pub const BODY_SAMPLE_LIMIT: usize = 500;

/// Raw text bodies shorter than this are never treated as base64 images.
pub const RAW_BASE64_MIN_LEN: usize = 100;

/// JSON pointers searched for an image payload, in priority order, each with
/// the pointer of its sibling MIME type field (if the layout has one).
const JSON_IMAGE_PATHS: [(&str, Option<&str>); 7] = [
    ("/image", None),
    ("/url", None),
    ("/result", None),
    ("/data/image/data", Some("/data/image/mimeType")),
    ("/image/data", Some("/image/mimeType")),
    ("/binary/image/data", Some("/binary/image/mimeType")),
    (
        "/items/0/binary/image/data",
        Some("/items/0/binary/image/mimeType"),
    ),
];

/// A webhook response captured in full.
///
/// The body is read from the wire exactly once; every interpretation
/// step works on this buffer.
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A displayable generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultImage {
    /// Image bytes held by this server.
    Inline { mime: String, bytes: Vec<u8> },
    /// An image hosted elsewhere; the client loads it directly.
    Remote { url: String },
}

/// Why a webhook response could not be turned into an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    /// HTTP 500 from the webhook, almost always a failing workflow node.
    #[error(
        "Workflow error (HTTP 500): {body}. Check the workflow configuration, API keys and node settings."
    )]
    WorkflowFailure { body: String },

    /// Any other non-2xx status.
    #[error("Request failed: {status} - {body}")]
    Server { status: u16, body: String },

    /// A 2xx response with no interpretable image in it.
    #[error("Unexpected response format (Content-Type: {content_type}): {detail}. Body sample: {sample}")]
    Shape {
        content_type: String,
        detail: String,
        sample: String,
    },
}

impl InterpretError {
    /// HTTP status reported by the webhook, when it reported a failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            InterpretError::WorkflowFailure { .. } => Some(500),
            InterpretError::Server { status, .. } => Some(*status),
            InterpretError::Shape { .. } => None,
        }
    }
}

/// Turn a captured webhook response into a result image.
pub fn interpret(response: &WebhookResponse) -> Result<ResultImage, InterpretError> {
    if !response.is_success() {
        return Err(server_failure(response));
    }

    let declared = response.content_type.as_deref().map(str::trim).unwrap_or("");
    let essence = declared
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if essence.starts_with("image/") {
        interpret_image(response, &essence)
    } else if declared.to_ascii_lowercase().contains("application/json") {
        interpret_json(response)
    } else {
        interpret_untyped(response)
    }
}

/// Quote at most [`BODY_SAMPLE_LIMIT`] characters of a body.
pub fn body_sample(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() <= BODY_SAMPLE_LIMIT {
        return text.to_string();
    }
    let mut sample: String = text.chars().take(BODY_SAMPLE_LIMIT).collect();
    sample.push_str("...");
    sample
}

fn server_failure(response: &WebhookResponse) -> InterpretError {
    let body = body_sample(&response.body);
    tracing::warn!(status = response.status, body = %body, "Webhook reported failure");
    if response.status == 500 {
        InterpretError::WorkflowFailure { body }
    } else {
        InterpretError::Server {
            status: response.status,
            body,
        }
    }
}

fn shape_error(response: &WebhookResponse, detail: impl Into<String>) -> InterpretError {
    InterpretError::Shape {
        content_type: content_type_label(response).to_string(),
        detail: detail.into(),
        sample: body_sample(&response.body),
    }
}

fn content_type_label(response: &WebhookResponse) -> &str {
    response
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or("none")
}

fn interpret_image(response: &WebhookResponse, mime: &str) -> Result<ResultImage, InterpretError> {
    if response.body.is_empty() {
        return Err(shape_error(response, "image response has an empty body"));
    }
    tracing::debug!(mime, size = response.body.len(), "Webhook returned binary image");
    Ok(ResultImage::Inline {
        mime: mime.to_string(),
        bytes: response.body.clone(),
    })
}

// ---------------------------------------------------------------------------
// JSON envelopes
// ---------------------------------------------------------------------------

/// A non-empty string found at one of the searched JSON paths.
struct JsonHit<'a> {
    path: &'static str,
    payload: &'a str,
    mime: Option<&'a str>,
}

fn interpret_json(response: &WebhookResponse) -> Result<ResultImage, InterpretError> {
    let text = std::str::from_utf8(&response.body)
        .map_err(|_| shape_error(response, "JSON body is not valid UTF-8"))?;
    let value: Value = serde_json::from_str(text)
        .map_err(|e| shape_error(response, format!("invalid JSON: {e}")))?;

    let hit = find_json_image(&value)
        .or_else(|| value.as_array().and_then(|items| items.first()).and_then(find_json_image))
        .ok_or_else(|| shape_error(response, "no image data or URL in JSON response"))?;

    tracing::debug!(path = hit.path, len = hit.payload.len(), "Found image payload in JSON");

    if looks_like_url(hit.payload) {
        return Ok(ResultImage::Remote {
            url: hit.payload.to_string(),
        });
    }

    let (prefix_mime, data) = strip_data_url(hit.payload);
    let bytes = decode_base64(data).map_err(|e| {
        shape_error(
            response,
            format!("field '{}' is neither a URL nor valid base64 ({e})", hit.path),
        )
    })?;
    if bytes.is_empty() {
        return Err(shape_error(
            response,
            format!("field '{}' decodes to an empty image", hit.path),
        ));
    }

    let mime = hit
        .mime
        .or(prefix_mime)
        .unwrap_or_else(|| sniff_base64(data))
        .to_string();
    Ok(ResultImage::Inline { mime, bytes })
}

fn find_json_image(value: &Value) -> Option<JsonHit<'_>> {
    JSON_IMAGE_PATHS.iter().find_map(|&(path, mime_path)| {
        let payload = value.pointer(path)?.as_str()?.trim();
        if payload.is_empty() {
            return None;
        }
        let mime = mime_path
            .and_then(|p| value.pointer(p))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty());
        Some(JsonHit {
            path,
            payload,
            mime,
        })
    })
}

// ---------------------------------------------------------------------------
// Missing or unrecognised content type
// ---------------------------------------------------------------------------

fn interpret_untyped(response: &WebhookResponse) -> Result<ResultImage, InterpretError> {
    let body = &response.body;
    if body.is_empty() {
        return Err(shape_error(response, "response body is empty"));
    }

    if is_known_image(body) {
        let mime = sniff_bytes(body);
        tracing::debug!(mime, size = body.len(), "Detected image from magic number");
        return Ok(ResultImage::Inline {
            mime: mime.to_string(),
            bytes: body.clone(),
        });
    }

    match std::str::from_utf8(body) {
        Ok(text) => interpret_raw_text(response, text.trim()),
        Err(_) => {
            tracing::debug!(size = body.len(), "Unrecognised binary body, passing through");
            Ok(ResultImage::Inline {
                mime: MIME_OCTET_STREAM.to_string(),
                bytes: body.clone(),
            })
        }
    }
}

fn interpret_raw_text(response: &WebhookResponse, text: &str) -> Result<ResultImage, InterpretError> {
    if text.len() <= RAW_BASE64_MIN_LEN || looks_like_url(text) {
        return Err(shape_error(response, "text body is not an image"));
    }

    let (prefix_mime, data) = strip_data_url(text);
    let bytes = decode_base64(data)
        .map_err(|e| shape_error(response, format!("text body is not valid base64 ({e})")))?;

    let mime = prefix_mime.unwrap_or_else(|| sniff_base64(data)).to_string();
    tracing::debug!(mime = %mime, size = bytes.len(), "Decoded raw base64 body");
    Ok(ResultImage::Inline { mime, bytes })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    const PNG_BYTES: [u8; 12] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];
    const JPEG_BYTES: [u8; 8] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

    fn response(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> WebhookResponse {
        WebhookResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    fn json(body: serde_json::Value) -> WebhookResponse {
        response(200, Some("application/json; charset=utf-8"), body.to_string())
    }

    fn png_b64() -> String {
        STANDARD.encode(PNG_BYTES)
    }

    // -- image/* --------------------------------------------------------------

    #[test]
    fn image_content_type_uses_body_verbatim() {
        let body = vec![7u8; 500];
        let result = interpret(&response(200, Some("image/png"), body.clone())).unwrap();
        assert_eq!(
            result,
            ResultImage::Inline {
                mime: "image/png".into(),
                bytes: body
            }
        );
    }

    #[test]
    fn image_content_type_parameters_are_dropped() {
        let result = interpret(&response(200, Some("Image/JPEG; q=0.9"), JPEG_BYTES)).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, .. } if mime == "image/jpeg");
    }

    #[test]
    fn empty_image_body_is_a_shape_error() {
        let err = interpret(&response(200, Some("image/png"), Vec::new())).unwrap_err();
        assert_matches!(err, InterpretError::Shape { content_type, .. } if content_type == "image/png");
    }

    // -- JSON paths -----------------------------------------------------------

    #[test]
    fn flat_image_field() {
        let result = interpret(&json(serde_json::json!({ "image": png_b64() }))).unwrap();
        assert_eq!(
            result,
            ResultImage::Inline {
                mime: "image/png".into(),
                bytes: PNG_BYTES.to_vec()
            }
        );
    }

    #[test]
    fn flat_image_field_sniffs_jpeg() {
        let b64 = STANDARD.encode(JPEG_BYTES);
        assert!(b64.starts_with("/9j/"));
        let result = interpret(&json(serde_json::json!({ "image": b64 }))).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, bytes } if mime == "image/jpeg" && bytes == JPEG_BYTES);
    }

    #[test]
    fn flat_url_field_is_remote() {
        let result =
            interpret(&json(serde_json::json!({ "url": "https://cdn.example.com/out.png" }))).unwrap();
        assert_eq!(
            result,
            ResultImage::Remote {
                url: "https://cdn.example.com/out.png".into()
            }
        );
    }

    #[test]
    fn flat_result_field() {
        let result = interpret(&json(serde_json::json!({ "result": png_b64() }))).unwrap();
        assert_matches!(result, ResultImage::Inline { bytes, .. } if bytes == PNG_BYTES);
    }

    #[test]
    fn nested_data_image_data_with_mime() {
        let body = serde_json::json!({
            "data": { "image": { "data": png_b64(), "mimeType": "image/png" } }
        });
        let result = interpret(&json(body)).unwrap();
        assert_eq!(
            result,
            ResultImage::Inline {
                mime: "image/png".into(),
                bytes: PNG_BYTES.to_vec()
            }
        );
    }

    #[test]
    fn nested_image_data_uses_declared_mime() {
        let body = serde_json::json!({
            "image": { "data": png_b64(), "mimeType": "image/webp" }
        });
        let result = interpret(&json(body)).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, .. } if mime == "image/webp");
    }

    #[test]
    fn nested_binary_image_data() {
        let body = serde_json::json!({
            "binary": { "image": { "data": STANDARD.encode(JPEG_BYTES), "mimeType": "image/jpeg" } }
        });
        let result = interpret(&json(body)).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, bytes } if mime == "image/jpeg" && bytes == JPEG_BYTES);
    }

    #[test]
    fn items_array_binary_image_data() {
        let body = serde_json::json!({
            "items": [ { "binary": { "image": { "data": png_b64() } } } ]
        });
        let result = interpret(&json(body)).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, bytes } if mime == "image/png" && bytes == PNG_BYTES);
    }

    #[test]
    fn top_level_array_searches_first_item() {
        let body = serde_json::json!([ { "binary": { "image": { "data": png_b64() } } } ]);
        let result = interpret(&json(body)).unwrap();
        assert_matches!(result, ResultImage::Inline { bytes, .. } if bytes == PNG_BYTES);
    }

    #[test]
    fn data_url_prefix_is_stripped_and_mime_honoured() {
        let body = serde_json::json!({
            "image": format!("data:image/jpeg;base64,{}", STANDARD.encode(JPEG_BYTES))
        });
        let result = interpret(&json(body)).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, bytes } if mime == "image/jpeg" && bytes == JPEG_BYTES);
    }

    #[test]
    fn earlier_paths_win_over_later_ones() {
        let body = serde_json::json!({
            "url": "https://cdn.example.com/first.png",
            "data": { "image": { "data": png_b64() } }
        });
        assert_matches!(interpret(&json(body)).unwrap(), ResultImage::Remote { .. });
    }

    #[test]
    fn empty_strings_are_skipped() {
        let body = serde_json::json!({
            "image": "",
            "binary": { "image": { "data": png_b64() } }
        });
        assert_matches!(interpret(&json(body)).unwrap(), ResultImage::Inline { .. });
    }

    #[test]
    fn json_without_image_is_a_shape_error() {
        let err = interpret(&json(serde_json::json!({ "message": "Workflow was started" }))).unwrap_err();
        assert_matches!(err, InterpretError::Shape { ref sample, .. } if sample.contains("Workflow was started"));
        assert!(err.to_string().contains("application/json"));
    }

    #[test]
    fn invalid_json_is_a_shape_error() {
        let err = interpret(&response(200, Some("application/json"), "{not json")).unwrap_err();
        assert_matches!(err, InterpretError::Shape { detail, .. } if detail.starts_with("invalid JSON"));
    }

    #[test]
    fn undecodable_payload_is_a_shape_error() {
        let err = interpret(&json(serde_json::json!({ "image": "%%% not base64 %%%" }))).unwrap_err();
        assert_matches!(err, InterpretError::Shape { detail, .. } if detail.contains("'/image'"));
    }

    // -- untyped bodies -------------------------------------------------------

    #[test]
    fn untyped_jpeg_bytes_are_labeled_jpeg() {
        let result = interpret(&response(200, None, JPEG_BYTES)).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, .. } if mime == "image/jpeg");
    }

    #[test]
    fn untyped_png_bytes_are_labeled_png() {
        let result = interpret(&response(200, Some("application/octet-stream"), PNG_BYTES)).unwrap();
        assert_matches!(result, ResultImage::Inline { mime, .. } if mime == "image/png");
    }

    #[test]
    fn untyped_other_binary_is_generic() {
        let body = vec![0x00, 0x01, 0xFE, 0xFF, 0x80];
        let result = interpret(&response(200, None, body.clone())).unwrap();
        assert_eq!(
            result,
            ResultImage::Inline {
                mime: MIME_OCTET_STREAM.into(),
                bytes: body
            }
        );
    }

    #[test]
    fn untyped_raw_base64_text_is_decoded() {
        let image: Vec<u8> = JPEG_BYTES.iter().copied().chain(std::iter::repeat(0xAB).take(120)).collect();
        let text = STANDARD.encode(&image);
        assert!(text.len() > RAW_BASE64_MIN_LEN);
        let result = interpret(&response(200, Some("text/plain"), text)).unwrap();
        assert_eq!(
            result,
            ResultImage::Inline {
                mime: "image/jpeg".into(),
                bytes: image
            }
        );
    }

    #[test]
    fn untyped_short_text_is_rejected_with_content_type() {
        let err = interpret(&response(200, None, "OK")).unwrap_err();
        assert_matches!(err, InterpretError::Shape { ref content_type, .. } if content_type == "none");
        assert!(err.to_string().contains("Content-Type: none"));
    }

    #[test]
    fn untyped_url_text_is_rejected() {
        let url = format!("https://example.com/{}", "a".repeat(150));
        let err = interpret(&response(200, Some("text/plain"), url)).unwrap_err();
        assert_matches!(err, InterpretError::Shape { .. });
    }

    #[test]
    fn untyped_long_plain_text_is_rejected_not_passed_through() {
        let text = "Workflow finished without producing an image. ".repeat(4);
        assert!(text.len() > RAW_BASE64_MIN_LEN);

        let err = interpret(&response(200, Some("text/plain"), text)).unwrap_err();

        assert_matches!(
            err,
            InterpretError::Shape { ref content_type, ref detail, ref sample }
                if content_type == "text/plain"
                    && detail.starts_with("text body is not valid base64")
                    && sample.starts_with("Workflow finished")
        );
    }

    #[test]
    fn untyped_short_ascii_is_rejected() {
        let err = interpret(&response(200, None, "GIF89a-ish ascii payload")).unwrap_err();
        assert_matches!(err, InterpretError::Shape { detail, .. } if detail == "text body is not an image");
    }

    #[test]
    fn untyped_empty_body_is_rejected() {
        let err = interpret(&response(204, None, Vec::new())).unwrap_err();
        assert_matches!(err, InterpretError::Shape { detail, .. } if detail == "response body is empty");
    }

    // -- failures -------------------------------------------------------------

    #[test]
    fn status_500_is_workflow_failure_with_body() {
        let err = interpret(&response(500, Some("text/plain"), "Node 'Edit Image' failed")).unwrap_err();
        assert_eq!(err.status(), Some(500));
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("Node 'Edit Image' failed"));
    }

    #[test]
    fn non_success_never_decodes_even_image_bodies() {
        let err = interpret(&response(404, Some("image/png"), PNG_BYTES)).unwrap_err();
        assert_matches!(err, InterpretError::Server { status: 404, .. });
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let err = interpret(&response(502, None, "x".repeat(2_000))).unwrap_err();
        assert_matches!(err, InterpretError::Server { body, .. } if body.len() == BODY_SAMPLE_LIMIT + 3 && body.ends_with("..."));
    }
}
