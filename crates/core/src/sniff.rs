//! MIME detection for image payloads of unknown provenance.
//!
//! The generation webhook does not reliably label what it returns, so the
//! interpreter falls back to these helpers: magic-number checks on raw
//! bytes, a prefix check on base64 text, and `data:` URL handling.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];
const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

/// Base64 of `FF D8 FF`, the start of every JPEG.
const JPEG_BASE64_PREFIX: &str = "/9j/";

const TOLERANT_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_TOLERANT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, TOLERANT_CONFIG);
const URL_SAFE_TOLERANT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, TOLERANT_CONFIG);

/// Pick a MIME type from the leading bytes of a binary body.
pub fn sniff_bytes(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&JPEG_MAGIC) {
        MIME_JPEG
    } else if bytes.starts_with(&PNG_MAGIC) {
        MIME_PNG
    } else {
        MIME_OCTET_STREAM
    }
}

/// Whether the bytes start with a JPEG or PNG signature.
pub fn is_known_image(bytes: &[u8]) -> bool {
    sniff_bytes(bytes) != MIME_OCTET_STREAM
}

/// Guess the MIME type of base64 text without decoding it.
///
/// Anything that is not recognisably JPEG is assumed to be PNG.
pub fn sniff_base64(text: &str) -> &'static str {
    if text.trim_start().starts_with(JPEG_BASE64_PREFIX) {
        MIME_JPEG
    } else {
        MIME_PNG
    }
}

/// Split a `data:<mime>;base64,<payload>` URL into its declared MIME type
/// and payload. Text without a `data:` prefix is returned as-is.
pub fn strip_data_url(text: &str) -> (Option<&str>, &str) {
    let trimmed = text.trim();
    let Some(rest) = strip_prefix_ignore_case(trimmed, "data:") else {
        return (None, trimmed);
    };
    match rest.split_once(',') {
        Some((header, payload)) => {
            let mime = header
                .split(';')
                .next()
                .map(str::trim)
                .filter(|m| !m.is_empty());
            (mime, payload.trim())
        }
        None => (None, trimmed),
    }
}

/// Decode base64 text, ignoring embedded whitespace and missing padding.
///
/// Both the standard and URL-safe alphabets are accepted.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.contains(['-', '_']) {
        URL_SAFE_TOLERANT.decode(cleaned.as_bytes())
    } else {
        STANDARD_TOLERANT.decode(cleaned.as_bytes())
    }
}

/// Whether the text is a bare `http(s)` or protocol-relative URL.
pub fn looks_like_url(text: &str) -> bool {
    let trimmed = text.trim_start();
    strip_prefix_ignore_case(trimmed, "http://").is_some()
        || strip_prefix_ignore_case(trimmed, "https://").is_some()
        || trimmed.starts_with("//")
}

/// File extension used when offering a result image for download.
pub fn extension_for(mime: &str) -> &'static str {
    match mime.split(';').next().unwrap_or("").trim() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
