//! `data:` URL decoding
//!
//! Accepts `data:[<mediatype>][;base64],<payload>`. The payload is
//! percent-decoded first; base64 payloads are then decoded leniently
//! (whitespace ignored, padding optional).

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use percent_encoding::percent_decode_str;

use crate::error::DecodeError;
use crate::types::FileBlob;

/// Content type used when the URL does not declare one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const SCHEME: &str = "data:";

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode `data_url` into a [`FileBlob`] called `filename`.
pub fn decode_data_url(data_url: &str, filename: &str) -> Result<FileBlob, DecodeError> {
    let input = data_url.trim();

    let rest = match input.get(..SCHEME.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => &input[SCHEME.len()..],
        _ => return Err(DecodeError::NotADataUrl),
    };

    let (header, payload) = rest.split_once(',').ok_or(DecodeError::MissingSeparator)?;
    let (content_type, is_base64) = parse_header(header);

    let raw: Vec<u8> = percent_decode_str(payload).collect();
    let data = if is_base64 {
        let compact: Vec<u8> = raw
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        LENIENT_BASE64.decode(compact)?
    } else {
        raw
    };

    Ok(FileBlob::new(
        filename,
        content_type.unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
        data,
    ))
}

/// Split the header into its media type (if any) and the base64 flag.
fn parse_header(header: &str) -> (Option<String>, bool) {
    let mut parts: Vec<&str> = header.split(';').map(str::trim).collect();

    let is_base64 = parts.len() > 1
        && parts
            .last()
            .is_some_and(|p| p.eq_ignore_ascii_case("base64"));
    if is_base64 {
        parts.pop();
    }

    let essence = parts.first().copied().unwrap_or_default();
    if !essence.contains('/') {
        return (None, is_base64);
    }

    let mut content_type = essence.to_ascii_lowercase();
    for param in parts.iter().skip(1).filter(|p| !p.is_empty()) {
        content_type.push(';');
        content_type.push_str(param);
    }
    (Some(content_type), is_base64)
}

impl FileBlob {
    /// Build a blob from an inline `data:` URL. See [`decode_data_url`].
    pub fn from_data_url(data_url: &str, filename: &str) -> Result<Self, DecodeError> {
        decode_data_url(data_url, filename)
    }
}
