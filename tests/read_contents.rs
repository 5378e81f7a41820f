//! Read-side behavior: exact slices, hashes, clamping, and per-path errors.

use tempfile::TempDir;
use text_editor_tools::TextEditorTools;
use text_editor_tools::error::EditorError;
use text_editor_tools::hash::content_hash;
use text_editor_tools::types::{FileRangesRequest, FileReadEntry, LineRange};

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[tokio::test]
async fn reads_single_middle_line() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "f.txt", "a\nb\nc\n");
    let tools = TextEditorTools::new();

    let read = tools.read_range(&path, 2, Some(2), None).await.unwrap();
    assert_eq!(read.content, "b\n");
    assert_eq!(read.line_start, 2);
    assert_eq!(read.line_end, 2);
    assert_eq!(read.total_lines, 3);
    assert_eq!(read.range_hash, content_hash("b\n"));
    assert_eq!(read.file_hash, content_hash("a\nb\nc\n"));
    assert_eq!(read.content_size, 2);
}

#[tokio::test]
async fn omitted_end_reads_to_eof() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "f.txt", "a\nb\nc\n");
    let tools = TextEditorTools::new();

    let read = tools.read_range(&path, 2, None, None).await.unwrap();
    assert_eq!(read.content, "b\nc\n");
    assert_eq!(read.line_end, 3);
}

#[tokio::test]
async fn oversized_end_is_clamped() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "f.txt", "a\nb\n");
    let tools = TextEditorTools::new();

    let read = tools.read_range(&path, 1, Some(100), None).await.unwrap();
    assert_eq!(read.content, "a\nb\n");
    assert_eq!(read.line_end, 2);
}

#[tokio::test]
async fn empty_file_reads_as_zero_lines() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "empty.txt", "");
    let tools = TextEditorTools::new();

    let read = tools.read_range(&path, 1, None, None).await.unwrap();
    assert_eq!(read.content, "");
    assert_eq!(read.line_start, 0);
    assert_eq!(read.line_end, 0);
    assert_eq!(read.total_lines, 0);
    assert_eq!(read.range_hash, content_hash(""));
}

#[tokio::test]
async fn start_beyond_eof_reads_empty() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "f.txt", "a\nb\n");
    let tools = TextEditorTools::new();

    let read = tools.read_range(&path, 10, None, None).await.unwrap();
    assert_eq!(read.content, "");
    assert_eq!(read.line_start, 10);
    assert_eq!(read.line_end, 2);
    assert_eq!(read.content_size, 0);
    assert_eq!(read.range_hash, content_hash(""));
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "f.txt", "a\nb\nc\n");
    let tools = TextEditorTools::new();

    let err = tools.read_range(&path, 3, Some(1), None).await.unwrap_err();
    assert!(matches!(err, EditorError::InvalidRange(_)));
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("absent.txt").display().to_string();
    let tools = TextEditorTools::new();

    let err = tools.read_range(&path, 1, None, None).await.unwrap_err();
    assert!(matches!(err, EditorError::FileNotFound { .. }));
}

#[tokio::test]
async fn relative_path_is_rejected_before_io() {
    let tools = TextEditorTools::new();
    let err = tools
        .read_range("relative/path.txt", 1, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::InvalidPath { .. }));
}

#[tokio::test]
async fn undecodable_bytes_are_an_encoding_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bin.txt");
    std::fs::write(&path, [b'o', b'k', 0xff, 0xfe]).unwrap();
    let tools = TextEditorTools::new();

    let err = tools
        .read_range(&path.display().to_string(), 1, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Decode { offset: 2, .. }));
}

#[tokio::test]
async fn content_size_counts_characters_not_bytes() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "f.txt", "héllo\n");
    let tools = TextEditorTools::new();

    let read = tools.read_range(&path, 1, Some(1), None).await.unwrap();
    // 6 characters, 7 bytes in UTF-8.
    assert_eq!(read.content_size, 6);
}

#[tokio::test]
async fn named_encoding_decodes_legacy_bytes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("latin.txt");
    std::fs::write(&path, [0x63, 0x61, 0x66, 0xe9, 0x0a]).unwrap();
    let tools = TextEditorTools::new();

    let read = tools
        .read_range(&path.display().to_string(), 1, Some(1), Some("windows-1252"))
        .await
        .unwrap();
    assert_eq!(read.content, "café\n");
    assert_eq!(read.file_hash, content_hash("café\n"));
}

#[tokio::test]
async fn multi_read_returns_per_path_results() {
    let tmp = TempDir::new().unwrap();
    let a = write_file(&tmp, "a.txt", "1\n2\n3\n");
    let b = write_file(&tmp, "b.txt", "x\ny\n");
    let tools = TextEditorTools::new();

    let out = tools
        .get_text_file_contents(vec![
            FileRangesRequest {
                file_path: a.clone(),
                ranges: vec![
                    LineRange {
                        line_start: 1,
                        line_end: Some(1),
                    },
                    LineRange {
                        line_start: 3,
                        line_end: None,
                    },
                ],
                encoding: None,
            },
            FileRangesRequest {
                file_path: b.clone(),
                ranges: vec![LineRange {
                    line_start: 1,
                    line_end: Some(2),
                }],
                encoding: None,
            },
        ])
        .await;

    match out.get(&a).unwrap() {
        FileReadEntry::Ok { file_hash, ranges } => {
            assert_eq!(file_hash, &content_hash("1\n2\n3\n"));
            assert_eq!(ranges.len(), 2);
            assert_eq!(ranges[0].content, "1\n");
            assert_eq!(ranges[1].content, "3\n");
        }
        FileReadEntry::Err(e) => panic!("unexpected error: {e:?}"),
    }
    match out.get(&b).unwrap() {
        FileReadEntry::Ok { ranges, .. } => assert_eq!(ranges[0].content, "x\ny\n"),
        FileReadEntry::Err(e) => panic!("unexpected error: {e:?}"),
    }
}

#[tokio::test]
async fn multi_read_missing_file_does_not_fail_the_batch() {
    let tmp = TempDir::new().unwrap();
    let present = write_file(&tmp, "a.txt", "ok\n");
    let absent = tmp.path().join("gone.txt").display().to_string();
    let tools = TextEditorTools::new();

    let request = |path: &str| FileRangesRequest {
        file_path: path.to_string(),
        ranges: vec![LineRange {
            line_start: 1,
            line_end: None,
        }],
        encoding: None,
    };
    let out = tools
        .get_text_file_contents(vec![request(&present), request(&absent)])
        .await;

    assert!(matches!(out.get(&present), Some(FileReadEntry::Ok { .. })));
    match out.get(&absent) {
        Some(FileReadEntry::Err(resp)) => {
            assert_eq!(resp.result, "error");
            assert_eq!(resp.suggestion, Some("create_text_file"));
        }
        other => panic!("unexpected entry: {other:?}"),
    }
}

#[tokio::test]
async fn multi_read_file_hash_computed_once_per_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "a.txt", "1\n2\n3\n4\n");
    let tools = TextEditorTools::new();

    // Same file twice in one request: both entries resolve, last one wins the
    // map slot, and every range agrees on the same file hash.
    let out = tools
        .get_text_file_contents(vec![
            FileRangesRequest {
                file_path: path.clone(),
                ranges: vec![LineRange {
                    line_start: 1,
                    line_end: Some(2),
                }],
                encoding: None,
            },
            FileRangesRequest {
                file_path: path.clone(),
                ranges: vec![LineRange {
                    line_start: 3,
                    line_end: Some(4),
                }],
                encoding: None,
            },
        ])
        .await;

    match out.get(&path).unwrap() {
        FileReadEntry::Ok { file_hash, ranges } => {
            assert_eq!(file_hash, &content_hash("1\n2\n3\n4\n"));
            assert_eq!(ranges[0].content, "3\n4\n");
        }
        FileReadEntry::Err(e) => panic!("unexpected error: {e:?}"),
    }
}
