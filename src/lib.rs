pub mod apply;
pub mod browse;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod lines;
pub mod paths;
pub mod resource;
pub mod server;
pub mod types;

use crate::apply::PatchInput;
use crate::error::EditorError;
use crate::lines::FileImage;
use crate::types::{
    DeleteRange, EditOk, EditPatch, FileRangesRequest, FileReadEntry, RangeRead, RangeReadResult,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Line-oriented text editing with hash-based conflict detection.
///
/// Every operation loads the target file fresh, validates the caller's
/// expectations (whole-file hash, per-range hashes), computes the new content
/// in memory, and commits through an atomic rename. No state survives across
/// calls; concurrency control is purely optimistic.
#[derive(Clone, Default)]
pub struct TextEditorTools;

impl TextEditorTools {
    pub fn new() -> Self {
        Self
    }

    /// Read one or more line ranges from each of the given files.
    ///
    /// Each file is loaded once per (path, encoding) pair. A file that cannot
    /// be read yields an error entry for its path; other paths still succeed.
    pub async fn get_text_file_contents(
        &self,
        files: Vec<FileRangesRequest>,
    ) -> BTreeMap<String, FileReadEntry> {
        let mut images: HashMap<(String, String), Result<FileImage, error::ErrorResponse>> =
            HashMap::new();
        let mut out = BTreeMap::new();

        for req in files {
            let label = req
                .encoding
                .clone()
                .unwrap_or_else(|| encoding::DEFAULT_ENCODING.to_string());
            let loaded = images
                .entry((req.file_path.clone(), label))
                .or_insert_with(|| {
                    load_for_read(&req.file_path, req.encoding.as_deref())
                        .map_err(|e| e.to_response())
                });

            let entry = match loaded {
                Ok(image) => {
                    let mut ranges = Vec::with_capacity(req.ranges.len());
                    let mut failed = None;
                    for range in &req.ranges {
                        match read_image_range(image, range.line_start, range.line_end) {
                            Ok(read) => ranges.push(read),
                            Err(e) => {
                                failed = Some(e.to_response());
                                break;
                            }
                        }
                    }
                    match failed {
                        Some(resp) => FileReadEntry::Err(resp),
                        None => FileReadEntry::Ok {
                            file_hash: image.file_hash().to_string(),
                            ranges,
                        },
                    }
                }
                Err(resp) => FileReadEntry::Err(resp.clone()),
            };
            out.insert(req.file_path, entry);
        }
        out
    }

    /// Read a single inclusive line range, returning the exact on-disk text
    /// of those lines plus whole-file and range hashes.
    pub async fn read_range(
        &self,
        file_path: &str,
        line_start: usize,
        line_end: Option<usize>,
        encoding: Option<&str>,
    ) -> Result<RangeReadResult, EditorError> {
        let image = load_for_read(file_path, encoding)?;
        let read = read_image_range(&image, line_start, line_end)?;
        Ok(RangeReadResult {
            content: read.content,
            line_start: read.line_start,
            line_end: read.line_end,
            file_hash: image.file_hash().to_string(),
            range_hash: read.range_hash,
            total_lines: read.total_lines,
            content_size: read.content_size,
        })
    }

    /// Apply a set of non-overlapping patches to one file.
    ///
    /// Nothing is written unless every pre-validation step passes: the file
    /// hash matches (when expected), no two patches overlap, and every
    /// replacement's range hash agrees with the current text.
    pub async fn patch_text_file_contents(
        &self,
        file_path: &str,
        expected_file_hash: &str,
        patches: Vec<EditPatch>,
        encoding: Option<&str>,
    ) -> Result<EditOk, EditorError> {
        paths::validate_path(file_path)?;
        let enc = encoding::resolve(encoding)?;
        let path = Path::new(file_path);
        let image = load_for_write(path, expected_file_hash, enc)?;

        if patches.is_empty() {
            return Err(EditorError::InvalidRequest(
                "patches must not be empty".to_string(),
            ));
        }

        let mut normalized = patches
            .into_iter()
            .map(|p| {
                apply::normalize(
                    &image,
                    PatchInput {
                        line_start: p.line_start,
                        line_end: p.line_end,
                        contents: p.contents,
                        range_hash: p.range_hash,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        apply::check_overlaps(&mut normalized)?;
        apply::require_range_hashes(&normalized)?;
        apply::verify_range_hashes(&image, &normalized)?;

        let records = apply::apply(&image, &normalized);
        tracing::debug!(path = file_path, patches = normalized.len(), "patching file");
        commit(path, &records, enc)
    }

    /// Insert content before or after a specific line. Exactly one of
    /// `after` / `before` must be given; `after = 0` means before line 1.
    pub async fn insert_text_file_contents(
        &self,
        file_path: &str,
        file_hash: &str,
        contents: &str,
        after: Option<usize>,
        before: Option<usize>,
        encoding: Option<&str>,
    ) -> Result<EditOk, EditorError> {
        paths::validate_path(file_path)?;
        let enc = encoding::resolve(encoding)?;
        if matches!((after, before), (Some(_), Some(_)) | (None, None)) {
            return Err(EditorError::InvalidRequest(
                "exactly one of 'after' or 'before' must be specified".to_string(),
            ));
        }

        let path = Path::new(file_path);
        let image = FileImage::load(path, enc)?;
        check_file_hash(&image, file_hash)?;
        let total = image.total_lines();

        let line_start = match (after, before) {
            (Some(k), None) => {
                if k > total {
                    return Err(EditorError::InvalidRange(format!(
                        "cannot insert after line {k}: file has {total} lines"
                    )));
                }
                k + 1
            }
            (None, Some(k)) => {
                if k < 1 || k > total + 1 {
                    return Err(EditorError::InvalidRange(format!(
                        "cannot insert before line {k}: file has {total} lines"
                    )));
                }
                k
            }
            _ => unreachable!("validated above"),
        };

        let patch = apply::normalize(
            &image,
            PatchInput {
                line_start,
                line_end: Some(line_start - 1),
                contents: contents.to_string(),
                range_hash: None,
            },
        )?;
        commit(path, &apply::apply(&image, &[patch]), enc)
    }

    /// Delete a list of inclusive line ranges, each guarded by the hash of
    /// its current text.
    pub async fn delete_text_file_contents(
        &self,
        file_path: &str,
        file_hash: &str,
        ranges: Vec<DeleteRange>,
        encoding: Option<&str>,
    ) -> Result<EditOk, EditorError> {
        paths::validate_path(file_path)?;
        let enc = encoding::resolve(encoding)?;
        let path = Path::new(file_path);
        let image = FileImage::load(path, enc)?;
        check_file_hash(&image, file_hash)?;

        if ranges.is_empty() {
            return Err(EditorError::InvalidRequest(
                "ranges must not be empty".to_string(),
            ));
        }

        let mut patches = ranges
            .into_iter()
            .map(|r| {
                apply::normalize(
                    &image,
                    PatchInput {
                        line_start: r.line_start,
                        line_end: r.line_end,
                        contents: String::new(),
                        range_hash: Some(r.range_hash),
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        apply::check_overlaps(&mut patches)?;
        apply::require_range_hashes(&patches)?;
        apply::verify_range_hashes(&image, &patches)?;

        commit(path, &apply::apply(&image, &patches), enc)
    }

    /// Append content at end of file. A missing file is accepted only with
    /// an empty `file_hash` and is created. An unterminated final line gains
    /// the dominant terminator first, so the new text starts on its own line.
    pub async fn append_text_file_contents(
        &self,
        file_path: &str,
        file_hash: &str,
        contents: &str,
        encoding: Option<&str>,
    ) -> Result<EditOk, EditorError> {
        paths::validate_path(file_path)?;
        let enc = encoding::resolve(encoding)?;
        let path = Path::new(file_path);
        let image = load_for_write(path, file_hash, enc)?;

        let patch = apply::normalize(
            &image,
            PatchInput {
                line_start: image.total_lines() + 1,
                line_end: None,
                contents: contents.to_string(),
                range_hash: None,
            },
        )?;
        commit(path, &apply::apply(&image, &[patch]), enc)
    }

    /// Create a new file, refusing to overwrite an existing one. Missing
    /// parent directories are created.
    pub async fn create_text_file(
        &self,
        file_path: &str,
        contents: &str,
        encoding: Option<&str>,
    ) -> Result<EditOk, EditorError> {
        paths::validate_path(file_path)?;
        let enc = encoding::resolve(encoding)?;
        let path = Path::new(file_path);
        if path.exists() {
            return Err(EditorError::AlreadyExists {
                path: file_path.to_string(),
            });
        }
        lines::ensure_parent_dir(path)?;
        let bytes = encoding::encode(contents, enc)?;
        lines::store_atomic(path, &bytes, false)?;
        tracing::debug!(path = file_path, bytes = bytes.len(), "created file");
        Ok(EditOk::new(hash::content_hash(contents)))
    }

    /// Append one file's content to another, guarded by the target's
    /// whole-file hash. Both files must exist. A source that does not end in
    /// a newline gains the target's dominant terminator.
    pub async fn append_text_file_from_path(
        &self,
        source_file_path: &str,
        target_file_path: &str,
        target_file_hash: &str,
        encoding: Option<&str>,
    ) -> Result<EditOk, EditorError> {
        paths::validate_path(source_file_path)?;
        paths::validate_path(target_file_path)?;
        let enc = encoding::resolve(encoding)?;

        let source = FileImage::load(Path::new(source_file_path), enc)?;
        let target_path = Path::new(target_file_path);
        let target = FileImage::load(target_path, enc)?;
        if target.file_hash() != target_file_hash {
            return Err(EditorError::FileHashMismatch {
                current: target.file_hash().to_string(),
            });
        }

        let mut contents = source.content().to_string();
        if !contents.is_empty() && !contents.ends_with(['\n', '\r']) {
            contents.push_str(target.dominant_terminator().as_str());
        }

        let patch = apply::normalize(
            &target,
            PatchInput {
                line_start: target.total_lines() + 1,
                line_end: None,
                contents,
                range_hash: None,
            },
        )?;
        commit(target_path, &apply::apply(&target, &[patch]), enc)
    }

    /// Recursively list a directory, hashing file contents on request.
    pub async fn explore_directory_contents(
        &self,
        directory_path: &str,
        include_subdirectories: bool,
        include_file_hashes: bool,
        encoding: Option<&str>,
    ) -> Result<browse::DirectoryListing, EditorError> {
        browse::explore(
            directory_path,
            include_subdirectories,
            include_file_hashes,
            encoding,
        )
    }

    /// Peek at the first lines of a batch of files.
    pub async fn peek_text_file_contents(
        &self,
        file_paths: &[String],
        num_lines: usize,
        encoding: Option<&str>,
    ) -> BTreeMap<String, browse::PeekEntry> {
        browse::peek(file_paths, num_lines, encoding)
    }
}

/// Validate the path, resolve the encoding, and load the image for reading.
fn load_for_read(file_path: &str, encoding: Option<&str>) -> Result<FileImage, EditorError> {
    paths::validate_path(file_path)?;
    let enc = encoding::resolve(encoding)?;
    FileImage::load(Path::new(file_path), enc)
}

/// Load a file for writing. A missing file passes only when the expected
/// hash is the new-file sentinel, yielding an empty image.
fn load_for_write(
    path: &Path,
    expected_file_hash: &str,
    enc: &'static encoding_rs::Encoding,
) -> Result<FileImage, EditorError> {
    match FileImage::load(path, enc) {
        Ok(image) => {
            check_file_hash(&image, expected_file_hash)?;
            Ok(image)
        }
        Err(EditorError::FileNotFound { .. })
            if hash::is_new_file_sentinel(expected_file_hash) =>
        {
            Ok(FileImage::empty(enc))
        }
        Err(e) => Err(e),
    }
}

/// A non-empty expected hash must match the loaded file exactly.
fn check_file_hash(image: &FileImage, expected: &str) -> Result<(), EditorError> {
    if !expected.is_empty() && image.file_hash() != expected {
        return Err(EditorError::FileHashMismatch {
            current: image.file_hash().to_string(),
        });
    }
    Ok(())
}

/// Resolve an inclusive 1-based range against a loaded image.
fn read_image_range(
    image: &FileImage,
    line_start: usize,
    line_end: Option<usize>,
) -> Result<RangeRead, EditorError> {
    if let Some(end) = line_end
        && end < line_start
    {
        return Err(EditorError::InvalidRange(format!(
            "line_end {end} is before line_start {line_start}"
        )));
    }
    let total = image.total_lines();
    if total == 0 {
        return Ok(RangeRead {
            content: String::new(),
            line_start: 0,
            line_end: 0,
            range_hash: hash::empty_hash(),
            total_lines: 0,
            content_size: 0,
        });
    }
    let start = line_start.max(1);
    if start > total {
        return Ok(RangeRead {
            content: String::new(),
            line_start,
            line_end: total,
            range_hash: hash::empty_hash(),
            total_lines: total,
            content_size: 0,
        });
    }
    let end = line_end.unwrap_or(total).min(total);
    let content = image.slice(start - 1, end);
    Ok(RangeRead {
        line_start: start,
        line_end: end,
        range_hash: hash::content_hash(&content),
        total_lines: total,
        content_size: content.chars().count(),
        content,
    })
}

/// Encode and atomically persist the new line vector, returning the new
/// whole-file hash. Encoding or I/O failures leave the target untouched.
fn commit(
    path: &Path,
    records: &[lines::LineRecord],
    enc: &'static encoding_rs::Encoding,
) -> Result<EditOk, EditorError> {
    let content = lines::render(records);
    let bytes = encoding::encode(&content, enc)?;
    lines::store_atomic(path, &bytes, true)?;
    Ok(EditOk::new(hash::content_hash(&content)))
}
