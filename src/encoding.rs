//! Charset resolution and strict decode/encode.
//!
//! Encodings are chosen per request by label (default `utf-8`); there is no
//! auto-detection. Decoding and encoding are strict: the first malformed byte
//! or unmappable character fails the operation with its offset instead of
//! being replaced.

use crate::error::EditorError;
use encoding_rs::{DecoderResult, Encoding, EncoderResult};

pub const DEFAULT_ENCODING: &str = "utf-8";

/// Resolve an encoding label, falling back to UTF-8 when absent.
pub fn resolve(label: Option<&str>) -> Result<&'static Encoding, EditorError> {
    let label = label.unwrap_or(DEFAULT_ENCODING);
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| EditorError::UnknownEncoding(label.to_string()))
}

/// Decode file bytes under `encoding`, reporting the byte offset of the
/// first malformed sequence on failure.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String, EditorError> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len().saturating_mul(3));
    let mut out = String::with_capacity(capacity);
    let (result, read) = decoder.decode_to_string_without_replacement(bytes, &mut out, true);
    match result {
        DecoderResult::InputEmpty => Ok(out),
        DecoderResult::Malformed(len, extra) => Err(EditorError::Decode {
            encoding: encoding.name().to_ascii_lowercase(),
            offset: read.saturating_sub(len as usize + extra as usize),
        }),
        DecoderResult::OutputFull => Err(EditorError::Decode {
            encoding: encoding.name().to_ascii_lowercase(),
            offset: read,
        }),
    }
}

/// Encode a decoded string back to file bytes under `encoding`, reporting
/// the character offset of the first unmappable character on failure.
pub fn encode(content: &str, encoding: &'static Encoding) -> Result<Vec<u8>, EditorError> {
    // UTF-8 output is the identity transform.
    if encoding == encoding_rs::UTF_8 {
        return Ok(content.as_bytes().to_vec());
    }
    // UTF-16 is decode-only in encoding_rs; refuse instead of silently
    // writing UTF-8 bytes.
    if encoding.output_encoding() != encoding {
        return Err(EditorError::InvalidRequest(format!(
            "encoding '{}' is not supported for writing",
            encoding.name().to_ascii_lowercase()
        )));
    }
    let mut encoder = encoding.new_encoder();
    let capacity = encoder
        .max_buffer_length_from_utf8_without_replacement(content.len())
        .unwrap_or(content.len().saturating_mul(2));
    let mut out = Vec::with_capacity(capacity);
    let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(content, &mut out, true);
    match result {
        EncoderResult::InputEmpty => Ok(out),
        // `read` includes the unmappable character itself.
        EncoderResult::Unmappable(_) => Err(EditorError::Encode {
            encoding: encoding.name().to_ascii_lowercase(),
            offset: content[..read].chars().count().saturating_sub(1),
        }),
        EncoderResult::OutputFull => Err(EditorError::Encode {
            encoding: encoding.name().to_ascii_lowercase(),
            offset: content[..read].chars().count(),
        }),
    }
}
