//! Error taxonomy for the edit engine and its wire representation.
//!
//! Engine operations return [`EditorError`] values; the transport never sees
//! a panic or an exception. [`ErrorResponse`] is the JSON object clients
//! receive, carrying the current file hash where re-reading would help and a
//! capability suggestion where a different tool is the right fix.

use serde::Serialize;
use thiserror::Error;

fn end_label(end: &Option<usize>) -> String {
    match end {
        Some(e) => e.to_string(),
        None => "end".to_string(),
    }
}

fn range_label(range: &(usize, Option<usize>)) -> String {
    format!("{}-{}", range.0, end_label(&range.1))
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("invalid path: {reason}: {path}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("line {line_start} is beyond end of file (total lines: {total_lines})")]
    BeyondEndOfFile {
        line_start: usize,
        total_lines: usize,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("file already exists: {path}")]
    AlreadyExists { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("could not create directory {path}: {source}")]
    Directory {
        path: String,
        source: std::io::Error,
    },

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("cannot decode byte at offset {offset} as {encoding}")]
    Decode { encoding: String, offset: usize },

    #[error("cannot encode character at offset {offset} with {encoding}")]
    Encode { encoding: String, offset: usize },

    #[error("file hash mismatch")]
    FileHashMismatch { current: String },

    #[error("range hash mismatch for range {line_start}-{}", end_label(.line_end))]
    RangeHashMismatch {
        line_start: usize,
        line_end: Option<usize>,
        current: String,
    },

    #[error("patches overlap: {} and {}", range_label(.first), range_label(.second))]
    OverlappingPatches {
        first: (usize, Option<usize>),
        second: (usize, Option<usize>),
    },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Wire shape for failed operations.
///
/// `file_hash` is present on hash mismatches so the caller can re-read and
/// retry without an extra round trip.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub result: &'static str,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl ErrorResponse {
    fn new(reason: String) -> Self {
        Self {
            result: "error",
            reason,
            file_hash: None,
            suggestion: None,
            hint: None,
        }
    }
}

impl EditorError {
    /// Render this error as the wire object.
    pub fn to_response(&self) -> ErrorResponse {
        let mut resp = ErrorResponse::new(self.to_string());
        match self {
            EditorError::FileNotFound { .. } => {
                resp.suggestion = Some("create_text_file");
                resp.hint = Some("File does not exist. Use create_text_file to create it.");
            }
            EditorError::AlreadyExists { .. } => {
                resp.suggestion = Some("patch_text_file_contents");
                resp.hint = Some(
                    "File already exists. Use patch_text_file_contents or \
                     append_text_file_contents to modify it.",
                );
            }
            EditorError::BeyondEndOfFile { .. } => {
                resp.suggestion = Some("append_text_file_contents");
                resp.hint =
                    Some("Use append_text_file_contents to add content at the end of the file.");
            }
            EditorError::FileHashMismatch { current } => {
                resp.file_hash = Some(current.clone());
                resp.suggestion = Some("get_text_file_contents");
                resp.hint = Some(
                    "File was modified since it was read. Fetch the current content \
                     and hash with get_text_file_contents, then retry.",
                );
            }
            EditorError::RangeHashMismatch { current, .. } => {
                resp.file_hash = Some(current.clone());
                resp.suggestion = Some("get_text_file_contents");
                resp.hint = Some(
                    "The targeted lines changed since they were read. Re-read the \
                     range to obtain a fresh range_hash.",
                );
            }
            EditorError::OverlappingPatches { .. } => {
                resp.hint = Some("Patches within one request must not touch the same lines.");
            }
            _ => {}
        }
        resp
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Internal(e.to_string())
    }
}
