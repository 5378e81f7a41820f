//! The single apply path behind every write operation.
//!
//! `patch`, `insert`, `delete`, and `append` all lower to a list of
//! [`PatchInput`]s which are normalized against the current file image,
//! checked for overlap and range-hash agreement, and spliced into a new line
//! vector in one pass. Nothing here touches the filesystem; callers commit
//! the resulting records atomically or not at all.

use crate::error::EditorError;
use crate::hash;
use crate::lines::{self, FileImage, LineRecord, Terminator};

/// How a normalized patch touches the line vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchKind {
    /// Replace (or, with empty contents, delete) an existing range.
    Replace,
    /// Insert at a line boundary inside the file.
    Insert,
    /// Insert at end of file; no range hash applies.
    Append,
}

/// A patch as the operations hand it down, in wire terms.
#[derive(Clone, Debug)]
pub struct PatchInput {
    pub line_start: usize,
    pub line_end: Option<usize>,
    pub contents: String,
    pub range_hash: Option<String>,
}

/// A patch resolved against a concrete file image.
#[derive(Clone, Debug)]
pub struct NormalizedPatch {
    /// Original 1-based bounds, kept for error reporting.
    pub line_start: usize,
    pub line_end: Option<usize>,
    /// 0-based splice window, end exclusive; `start0 == end0` for pure
    /// insertions and appends.
    pub start0: usize,
    pub end0: usize,
    pub kind: PatchKind,
    pub contents: String,
    pub range_hash: Option<String>,
}

impl NormalizedPatch {
    fn bounds(&self) -> (usize, Option<usize>) {
        (self.line_start, self.line_end)
    }
}

/// Resolve a wire patch against the image, classifying it and validating
/// its bounds.
pub fn normalize(image: &FileImage, input: PatchInput) -> Result<NormalizedPatch, EditorError> {
    let total = image.total_lines();
    if input.line_start < 1 {
        return Err(EditorError::InvalidRange(format!(
            "line_start must be at least 1, got {}",
            input.line_start
        )));
    }
    if input.line_start > total + 1 {
        return Err(EditorError::BeyondEndOfFile {
            line_start: input.line_start,
            total_lines: total,
        });
    }

    let (kind, start0, end0) = if input.line_start == total + 1 {
        // End-of-file anchor; covers the empty file as well.
        if let Some(end) = input.line_end
            && end >= input.line_start
        {
            return Err(EditorError::InvalidRange(format!(
                "line_end {end} exceeds total lines {total}"
            )));
        }
        (PatchKind::Append, total, total)
    } else if input.line_end == Some(input.line_start - 1) {
        (PatchKind::Insert, input.line_start - 1, input.line_start - 1)
    } else {
        let end = input.line_end.unwrap_or(total);
        if end < input.line_start {
            return Err(EditorError::InvalidRange(format!(
                "line_end {end} is before line_start {}",
                input.line_start
            )));
        }
        if end > total {
            return Err(EditorError::InvalidRange(format!(
                "line_end {end} exceeds total lines {total}"
            )));
        }
        (PatchKind::Replace, input.line_start - 1, end)
    };

    Ok(NormalizedPatch {
        line_start: input.line_start,
        line_end: input.line_end,
        start0,
        end0,
        kind,
        contents: input.contents,
        range_hash: input.range_hash,
    })
}

/// Sort patches and reject any two that touch the same lines.
///
/// A pure insertion conflicts with a replacement only when its anchor lies
/// strictly inside the replaced range; insertions at a range boundary (and
/// several insertions at the same point) are fine. A running maximum of the
/// replaced extent is kept so an insertion sitting between two replacements
/// cannot mask their overlap.
pub fn check_overlaps(patches: &mut [NormalizedPatch]) -> Result<(), EditorError> {
    patches.sort_by(|a, b| a.start0.cmp(&b.start0).then(a.end0.cmp(&b.end0)));
    // Zero-length patches sort before any replacement sharing their start
    // line, so by the time one is swept, `start0 < max_end` can only mean its
    // anchor is strictly inside an earlier replacement.
    let mut max_end = 0usize;
    let mut widest: Option<(usize, Option<usize>)> = None;
    for patch in patches.iter() {
        if patch.start0 < max_end {
            return Err(EditorError::OverlappingPatches {
                first: widest.unwrap_or((0, None)),
                second: patch.bounds(),
            });
        }
        if patch.end0 > max_end {
            max_end = patch.end0;
            widest = Some(patch.bounds());
        }
    }
    Ok(())
}

/// Replacement (and deletion) patches must name the content they replace.
pub fn require_range_hashes(patches: &[NormalizedPatch]) -> Result<(), EditorError> {
    for patch in patches {
        if patch.kind == PatchKind::Replace
            && patch.range_hash.as_deref().is_none_or(str::is_empty)
        {
            return Err(EditorError::InvalidRequest(format!(
                "range_hash is required for range {}-{}; read the range first to obtain it",
                patch.line_start,
                patch
                    .line_end
                    .map_or_else(|| "end".to_string(), |e| e.to_string()),
            )));
        }
    }
    Ok(())
}

/// Verify every provided range hash against the exact current slice.
pub fn verify_range_hashes(
    image: &FileImage,
    patches: &[NormalizedPatch],
) -> Result<(), EditorError> {
    for patch in patches {
        let Some(expected) = patch.range_hash.as_deref().filter(|h| !h.is_empty()) else {
            continue;
        };
        let slice = image.slice(patch.start0, patch.end0);
        if hash::content_hash(&slice) != expected {
            return Err(EditorError::RangeHashMismatch {
                line_start: patch.line_start,
                line_end: patch.line_end,
                current: image.file_hash().to_string(),
            });
        }
    }
    Ok(())
}

/// Splice normalized, sorted, non-overlapping patches into the image's
/// records and return the new line vector.
///
/// Patched text keeps the terminators it brings; a final segment without one
/// gets the file's dominant terminator unless it lands at end of file, where
/// it stays unterminated. A pre-existing unterminated last line that ends up
/// with lines after it is promoted to the dominant terminator.
pub fn apply(image: &FileImage, patches: &[NormalizedPatch]) -> Vec<LineRecord> {
    let total = image.total_lines();
    let dominant = image.dominant_terminator();
    let mut records = image.records().to_vec();

    // Bottom-up so earlier splice windows stay valid.
    for patch in patches.iter().rev() {
        let mut new_records = lines::split_lines(&patch.contents);
        let at_eof = patch.end0 == total;
        if let Some(last) = new_records.last_mut()
            && last.terminator == Terminator::None
            && !at_eof
        {
            last.terminator = dominant;
        }
        records.splice(patch.start0..patch.end0, new_records);
    }

    let len = records.len();
    for (idx, record) in records.iter_mut().enumerate() {
        if record.terminator == Terminator::None && idx + 1 != len {
            record.terminator = dominant;
        }
    }
    records
}
