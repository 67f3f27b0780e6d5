use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default timeout for one webhook round-trip. Generation workflows are
/// slow, so this is far above a typical API timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default ceiling on the webhook response body (32 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

/// How the product image and model choice are sent to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestEncoding {
    /// `multipart/form-data` with an `image` file part and a `model` field.
    #[default]
    Multipart,
    /// `application/json` body `{"image": "<base64>", "model": "..."}`.
    Json,
}

impl fmt::Display for RequestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestEncoding::Multipart => f.write_str("multipart"),
            RequestEncoding::Json => f.write_str("json"),
        }
    }
}

impl FromStr for RequestEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multipart" | "form" => Ok(RequestEncoding::Multipart),
            "json" => Ok(RequestEncoding::Json),
            other => Err(format!(
                "unknown webhook encoding '{other}', expected 'multipart' or 'json'"
            )),
        }
    }
}

/// Connection settings for the image-generation webhook.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Full URL the upload is POSTed to.
    pub url: String,
    pub encoding: RequestEncoding,
    pub timeout: Duration,
    /// Responses larger than this are rejected instead of buffered.
    pub max_response_bytes: usize,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            encoding: RequestEncoding::default(),
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    pub fn with_encoding(mut self, encoding: RequestEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }
}
