//! Terminator-preserving line image of a text file.
//!
//! A loaded file is a vector of `(text, terminator)` records. Terminators are
//! kept exactly as found, per line, so a file that mixes LF and CRLF writes
//! back byte-identical. A final line with no terminator is recorded as
//! [`Terminator::None`]; at most one such record exists and only at the end.

use crate::encoding;
use crate::error::EditorError;
use crate::hash;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use encoding_rs::Encoding;
use std::io::Write as _;
use std::path::Path;

/// Line terminator kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terminator {
    Lf,
    CrLf,
    Cr,
    /// Final line of a file that does not end with a newline.
    None,
}

impl Terminator {
    pub fn as_str(self) -> &'static str {
        match self {
            Terminator::Lf => "\n",
            Terminator::CrLf => "\r\n",
            Terminator::Cr => "\r",
            Terminator::None => "",
        }
    }
}

/// One line of a file: its text without the terminator, plus the terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRecord {
    pub text: String,
    pub terminator: Terminator,
}

/// Split decoded content into line records, preserving each terminator.
pub fn split_lines(content: &str) -> Vec<LineRecord> {
    let bytes = content.as_bytes();
    let mut records = Vec::new();
    let mut line_start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                records.push(LineRecord {
                    text: content[line_start..i].to_string(),
                    terminator: Terminator::Lf,
                });
                i += 1;
                line_start = i;
            }
            b'\r' => {
                let terminator = if bytes.get(i + 1) == Some(&b'\n') {
                    i += 2;
                    Terminator::CrLf
                } else {
                    i += 1;
                    Terminator::Cr
                };
                records.push(LineRecord {
                    text: content[line_start..i - terminator.as_str().len()].to_string(),
                    terminator,
                });
                line_start = i;
            }
            _ => i += 1,
        }
    }
    if line_start < bytes.len() {
        records.push(LineRecord {
            text: content[line_start..].to_string(),
            terminator: Terminator::None,
        });
    }
    records
}

/// Re-render records into file content.
pub fn render(records: &[LineRecord]) -> String {
    let capacity = records
        .iter()
        .map(|r| r.text.len() + r.terminator.as_str().len())
        .sum();
    let mut out = String::with_capacity(capacity);
    for record in records {
        out.push_str(&record.text);
        out.push_str(record.terminator.as_str());
    }
    out
}

/// Most frequent terminator in `records`; ties break LF > CRLF > CR, and a
/// file with no terminators at all (or no lines) defaults to LF.
pub fn dominant_terminator(records: &[LineRecord]) -> Terminator {
    let (mut lf, mut crlf, mut cr) = (0usize, 0usize, 0usize);
    for record in records {
        match record.terminator {
            Terminator::Lf => lf += 1,
            Terminator::CrLf => crlf += 1,
            Terminator::Cr => cr += 1,
            Terminator::None => {}
        }
    }
    if lf >= crlf && lf >= cr {
        Terminator::Lf
    } else if crlf >= cr {
        Terminator::CrLf
    } else {
        Terminator::Cr
    }
}

/// A file loaded into line records under a fixed encoding.
///
/// The image is a value: it lives for one operation and is never cached
/// across requests.
#[derive(Clone, Debug)]
pub struct FileImage {
    records: Vec<LineRecord>,
    content: String,
    file_hash: String,
    encoding: &'static Encoding,
}

impl FileImage {
    pub fn from_content(content: String, encoding: &'static Encoding) -> Self {
        let records = split_lines(&content);
        let file_hash = hash::content_hash(&content);
        Self {
            records,
            content,
            file_hash,
            encoding,
        }
    }

    pub fn empty(encoding: &'static Encoding) -> Self {
        Self::from_content(String::new(), encoding)
    }

    /// Read and decode the file at `path`.
    pub fn load(path: &Path, encoding: &'static Encoding) -> Result<Self, EditorError> {
        let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
        let content = encoding::decode(&bytes, encoding)?;
        Ok(Self::from_content(content, encoding))
    }

    pub fn total_lines(&self) -> usize {
        self.records.len()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    pub fn records(&self) -> &[LineRecord] {
        &self.records
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Exact content of records `start0..end0` (0-based, end exclusive),
    /// terminators included.
    pub fn slice(&self, start0: usize, end0: usize) -> String {
        render(&self.records[start0..end0])
    }

    pub fn dominant_terminator(&self) -> Terminator {
        dominant_terminator(&self.records)
    }
}

/// Map an I/O failure on `path` to the engine's error taxonomy.
pub fn io_error(path: &Path, e: std::io::Error) -> EditorError {
    let path = path.display().to_string();
    match e.kind() {
        std::io::ErrorKind::NotFound => EditorError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => EditorError::PermissionDenied { path },
        std::io::ErrorKind::AlreadyExists => EditorError::AlreadyExists { path },
        _ => EditorError::Io { path, source: e },
    }
}

/// Persist `bytes` at `path` through a sibling temporary file plus rename.
/// On any failure the previous file content is untouched.
pub fn store_atomic(path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), EditorError> {
    let behavior = if overwrite {
        OverwriteBehavior::AllowOverwrite
    } else {
        OverwriteBehavior::DisallowOverwrite
    };
    let af = AtomicFile::new(path, behavior);
    af.write(|f| f.write_all(bytes)).map_err(|e| match e {
        atomicwrites::Error::Internal(ioe) => io_error(path, ioe),
        atomicwrites::Error::User(ioe) => io_error(path, ioe),
    })
}

/// Create missing parent directories for a file about to be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), EditorError> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| EditorError::Directory {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}
