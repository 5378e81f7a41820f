//! Directory exploration and file peeking.
//!
//! Read-only helpers for orienting an agent before it starts editing:
//! a recursive directory listing with per-file content hashes, and a
//! first-N-lines peek across a batch of files.

use crate::encoding;
use crate::error::{EditorError, ErrorResponse};
use crate::hash;
use crate::lines::{self, FileImage};
use crate::paths;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Result of `explore_directory_contents`.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryListing {
    pub result: &'static str,
    pub directory: String,
    pub contents: Vec<DirEntry>,
}

/// One entry in a directory listing. Unreadable subtrees degrade to an
/// `error` entry instead of failing the whole listing.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DirEntry {
    Entry {
        name: String,
        path: String,
        is_directory: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hash: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hash_error: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        contents: Option<Vec<DirEntry>>,
    },
    Error {
        error: String,
    },
}

/// Per-path entry of a peek request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PeekEntry {
    Ok(PeekResult),
    Err(ErrorResponse),
}

/// First lines of one file, with hashes for follow-up edits.
#[derive(Debug, Clone, Serialize)]
pub struct PeekResult {
    pub result: &'static str,
    pub filename: String,
    /// Leading lines, terminators included.
    pub lines: Vec<String>,
    pub num_lines_peeked: usize,
    pub total_lines: usize,
    pub size: u64,
    pub peek_hash: String,
    pub file_hash: String,
}

pub const DEFAULT_PEEK_LINES: usize = 10;

/// List a directory, optionally recursing and hashing file contents.
pub fn explore(
    directory_path: &str,
    include_subdirectories: bool,
    include_file_hashes: bool,
    encoding: Option<&str>,
) -> Result<DirectoryListing, EditorError> {
    paths::validate_path(directory_path)?;
    let enc = encoding::resolve(encoding)?;
    let path = Path::new(directory_path);
    if !path.exists() {
        return Err(EditorError::FileNotFound {
            path: directory_path.to_string(),
        });
    }
    if !path.is_dir() {
        return Err(EditorError::InvalidRequest(format!(
            "path is not a directory: {directory_path}"
        )));
    }
    Ok(DirectoryListing {
        result: "ok",
        directory: directory_path.to_string(),
        contents: explore_dir(path, include_subdirectories, include_file_hashes, enc),
    })
}

fn explore_dir(
    path: &Path,
    recurse: bool,
    hashes: bool,
    enc: &'static encoding_rs::Encoding,
) -> Vec<DirEntry> {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return vec![DirEntry::Error {
                error: format!("permission denied accessing {}", path.display()),
            }];
        }
        Err(e) => {
            return vec![DirEntry::Error {
                error: format!("error exploring {}: {e}", path.display()),
            }];
        }
    };

    let mut contents = Vec::new();
    for entry in entries.flatten() {
        let entry_path = entry.path();
        let is_directory = entry_path.is_dir();
        let size = if is_directory {
            None
        } else {
            entry.metadata().ok().map(|m| m.len())
        };

        let (mut hash_value, mut hash_error) = (None, None);
        if !is_directory && hashes {
            match FileImage::load(&entry_path, enc) {
                Ok(image) => hash_value = Some(image.file_hash().to_string()),
                // Binary files and wrong-encoding files stay listed, unhashed.
                Err(_) => {
                    hash_error =
                        Some("could not calculate hash (binary file or encoding error)");
                }
            }
        }

        let children = if is_directory && recurse {
            Some(explore_dir(&entry_path, recurse, hashes, enc))
        } else {
            None
        };

        contents.push(DirEntry::Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry_path.display().to_string(),
            is_directory,
            size,
            hash: hash_value,
            hash_error,
            contents: children,
        });
    }

    // Directories first, then case-insensitive by name.
    contents.sort_by(|a, b| {
        let key = |e: &DirEntry| match e {
            DirEntry::Entry {
                name, is_directory, ..
            } => (!is_directory, name.to_lowercase()),
            DirEntry::Error { error } => (true, error.to_lowercase()),
        };
        key(a).cmp(&key(b))
    });
    contents
}

/// Peek at the first `num_lines` lines of each file. Failures are reported
/// per path; the batch always returns.
pub fn peek(
    file_paths: &[String],
    num_lines: usize,
    encoding: Option<&str>,
) -> BTreeMap<String, PeekEntry> {
    let mut out = BTreeMap::new();
    for file_path in file_paths {
        out.insert(file_path.clone(), peek_one(file_path, num_lines, encoding));
    }
    out
}

fn peek_one(file_path: &str, num_lines: usize, encoding: Option<&str>) -> PeekEntry {
    let result = (|| -> Result<PeekResult, EditorError> {
        paths::validate_path(file_path)?;
        let enc = encoding::resolve(encoding)?;
        let path = Path::new(file_path);
        if path.exists() && !path.is_file() {
            return Err(EditorError::InvalidRequest(format!(
                "path is not a file: {file_path}"
            )));
        }
        let image = FileImage::load(path, enc)?;
        let size = std::fs::metadata(path)
            .map_err(|e| lines::io_error(path, e))?
            .len();

        let peeked: Vec<String> = image
            .records()
            .iter()
            .take(num_lines)
            .map(|r| format!("{}{}", r.text, r.terminator.as_str()))
            .collect();
        let peek_hash = hash::content_hash(&peeked.concat());

        Ok(PeekResult {
            result: "ok",
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            num_lines_peeked: peeked.len(),
            total_lines: image.total_lines(),
            size,
            peek_hash,
            file_hash: image.file_hash().to_string(),
            lines: peeked,
        })
    })();

    match result {
        Ok(peeked) => PeekEntry::Ok(peeked),
        Err(e) => PeekEntry::Err(e.to_response()),
    }
}
