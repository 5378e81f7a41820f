//! Wire models for the tool surface.
//!
//! Field names are fixed for wire compatibility. Input structs derive
//! `JsonSchema`; their doc comments become the property descriptions clients
//! see in `tools/list`.

use crate::error::ErrorResponse;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Inclusive 1-based line range.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LineRange {
    /// Starting line number (1-based, inclusive)
    pub line_start: usize,
    /// Ending line number (inclusive); omit to read to end of file
    #[serde(default)]
    pub line_end: Option<usize>,
}

/// One file plus the line ranges to read from it.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FileRangesRequest {
    /// Absolute path to the text file
    pub file_path: String,
    /// Line ranges to read
    pub ranges: Vec<LineRange>,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// A single range read back from a file.
#[derive(Debug, Clone, Serialize)]
pub struct RangeRead {
    pub content: String,
    pub line_start: usize,
    pub line_end: usize,
    pub range_hash: String,
    pub total_lines: usize,
    pub content_size: usize,
}

/// `read_range` result: one range plus the whole-file hash.
#[derive(Debug, Clone, Serialize)]
pub struct RangeReadResult {
    pub content: String,
    pub line_start: usize,
    pub line_end: usize,
    pub file_hash: String,
    pub range_hash: String,
    pub total_lines: usize,
    pub content_size: usize,
}

/// Per-path entry of a multi-file read; failed paths carry an error object
/// while the rest of the request still succeeds.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FileReadEntry {
    Ok {
        file_hash: String,
        ranges: Vec<RangeRead>,
    },
    Err(ErrorResponse),
}

/// A single patch: replace or delete an inclusive range, or insert at a
/// boundary (`line_end = line_start - 1`).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EditPatch {
    /// Starting line (1-based, inclusive)
    pub line_start: usize,
    /// Ending line (inclusive); omit for end of file; line_start - 1 marks a pure insertion
    #[serde(default)]
    pub line_end: Option<usize>,
    /// Replacement text; empty string deletes the range
    pub contents: String,
    /// Hash of the current text of the range; required except for insertions at end of file
    #[serde(default)]
    pub range_hash: Option<String>,
}

/// An inclusive range to delete, with the hash of its current text.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteRange {
    /// Starting line (1-based, inclusive)
    pub line_start: usize,
    /// Ending line (inclusive); omit to delete to end of file
    #[serde(default)]
    pub line_end: Option<usize>,
    /// Hash of the current text of the range
    pub range_hash: String,
}

/// Successful write result.
#[derive(Debug, Clone, Serialize)]
pub struct EditOk {
    pub result: &'static str,
    pub file_hash: String,
}

impl EditOk {
    pub fn new(file_hash: String) -> Self {
        Self {
            result: "ok",
            file_hash,
        }
    }
}

// ============================================================================
// Tool argument shapes (one struct per capability)
// ============================================================================

/// Arguments for `get_text_file_contents`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTextFileContentsArgs {
    /// Files and ranges to read
    pub files: Vec<FileRangesRequest>,
}

/// Arguments for `create_text_file`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTextFileArgs {
    /// Absolute path of the file to create
    pub file_path: String,
    /// Initial file content
    pub contents: String,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Arguments for `append_text_file_contents`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AppendTextFileArgs {
    /// Absolute path to the text file
    pub file_path: String,
    /// Current whole-file hash; empty string when the file does not exist yet
    pub file_hash: String,
    /// Content to append at end of file
    pub contents: String,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Arguments for `insert_text_file_contents`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InsertTextFileArgs {
    /// Absolute path to the text file
    pub file_path: String,
    /// Current whole-file hash
    pub file_hash: String,
    /// Content to insert
    pub contents: String,
    /// Insert immediately after this line (0 means before line 1); mutually exclusive with `before`
    #[serde(default)]
    pub after: Option<usize>,
    /// Insert immediately before this line; mutually exclusive with `after`
    #[serde(default)]
    pub before: Option<usize>,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Arguments for `delete_text_file_contents`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteTextFileArgs {
    /// Absolute path to the text file
    pub file_path: String,
    /// Current whole-file hash
    pub file_hash: String,
    /// Ranges to delete
    pub ranges: Vec<DeleteRange>,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Arguments for `patch_text_file_contents`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PatchTextFileArgs {
    /// Absolute path to the text file
    pub file_path: String,
    /// Current whole-file hash; empty string when creating a new file
    pub file_hash: String,
    /// Patches to apply; ranges must not overlap
    pub patches: Vec<EditPatch>,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Arguments for `explore_directory_contents`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExploreDirectoryArgs {
    /// Absolute path of the directory to explore
    pub directory_path: String,
    /// Recurse into subdirectories (default: true)
    #[serde(default)]
    pub include_subdirectories: Option<bool>,
    /// Compute a content hash per file (default: true)
    #[serde(default)]
    pub include_file_hashes: Option<bool>,
    /// Text encoding used for hashing (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Arguments for `peek_text_file_contents`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PeekTextFileArgs {
    /// Absolute paths of the files to peek at
    pub file_paths: Vec<String>,
    /// Number of leading lines to read per file (default: 10)
    #[serde(default)]
    pub num_lines: Option<usize>,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Arguments for `append_text_file_from_path`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AppendFromPathArgs {
    /// Absolute path of the file whose content is appended
    pub source_file_path: String,
    /// Absolute path of the file appended to
    pub target_file_path: String,
    /// Current whole-file hash of the target
    pub target_file_hash: String,
    /// Text encoding (default: utf-8)
    #[serde(default)]
    pub encoding: Option<String>,
}
