//! Directory exploration, file peeking, and file-to-file append.

use tempfile::TempDir;
use text_editor_tools::TextEditorTools;
use text_editor_tools::browse::{DirEntry, PeekEntry};
use text_editor_tools::error::EditorError;
use text_editor_tools::hash::content_hash;

fn write_file(tmp: &TempDir, name: &str, content: &str) -> String {
    let path = tmp.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[tokio::test]
async fn explore_recurses_and_hashes() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, "top.txt", "top\n");
    std::fs::create_dir(tmp.path().join("sub")).unwrap();
    std::fs::write(tmp.path().join("sub").join("inner.txt"), "inner\n").unwrap();
    let tools = TextEditorTools::new();

    let listing = tools
        .explore_directory_contents(&tmp.path().display().to_string(), true, true, None)
        .await
        .unwrap();

    assert_eq!(listing.result, "ok");
    assert_eq!(listing.contents.len(), 2);
    match &listing.contents[0] {
        DirEntry::Entry {
            name,
            is_directory,
            contents,
            ..
        } => {
            assert_eq!(name, "sub");
            assert!(is_directory);
            let children = contents.as_ref().unwrap();
            match &children[0] {
                DirEntry::Entry { name, hash, .. } => {
                    assert_eq!(name, "inner.txt");
                    assert_eq!(hash.as_deref(), Some(content_hash("inner\n").as_str()));
                }
                other => panic!("unexpected child: {other:?}"),
            }
        }
        other => panic!("unexpected entry: {other:?}"),
    }
}

#[tokio::test]
async fn explore_without_recursion_stays_shallow() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("sub")).unwrap();
    let tools = TextEditorTools::new();

    let listing = tools
        .explore_directory_contents(&tmp.path().display().to_string(), false, false, None)
        .await
        .unwrap();
    match &listing.contents[0] {
        DirEntry::Entry { contents, .. } => assert!(contents.is_none()),
        other => panic!("unexpected entry: {other:?}"),
    }
}

#[tokio::test]
async fn explore_missing_directory_errors() {
    let tmp = TempDir::new().unwrap();
    let tools = TextEditorTools::new();
    let err = tools
        .explore_directory_contents(
            &tmp.path().join("gone").display().to_string(),
            true,
            true,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::FileNotFound { .. }));
}

#[tokio::test]
async fn peek_defaults_to_ten_lines() {
    let tmp = TempDir::new().unwrap();
    let content: String = (1..=15).map(|i| format!("{i}\n")).collect();
    let path = write_file(&tmp, "long.txt", &content);
    let tools = TextEditorTools::new();

    let out = tools.peek_text_file_contents(&[path.clone()], 10, None).await;
    match out.get(&path).unwrap() {
        PeekEntry::Ok(p) => {
            assert_eq!(p.num_lines_peeked, 10);
            assert_eq!(p.total_lines, 15);
            assert_eq!(p.lines.first().map(String::as_str), Some("1\n"));
            assert_eq!(p.file_hash, content_hash(&content));
        }
        PeekEntry::Err(e) => panic!("unexpected error: {e:?}"),
    }
}

#[tokio::test]
async fn append_from_path_joins_files() {
    let tmp = TempDir::new().unwrap();
    let source = write_file(&tmp, "src.txt", "tail\n");
    let target = write_file(&tmp, "dst.txt", "head\n");
    let tools = TextEditorTools::new();

    let ok = tools
        .append_text_file_from_path(&source, &target, &content_hash("head\n"), None)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "head\ntail\n");
    assert_eq!(ok.file_hash, content_hash("head\ntail\n"));
    // Source is untouched.
    assert_eq!(std::fs::read_to_string(&source).unwrap(), "tail\n");
}

#[tokio::test]
async fn append_from_path_completes_missing_newline() {
    let tmp = TempDir::new().unwrap();
    let source = write_file(&tmp, "src.txt", "no newline");
    let target = write_file(&tmp, "dst.txt", "head\n");
    let tools = TextEditorTools::new();

    tools
        .append_text_file_from_path(&source, &target, &content_hash("head\n"), None)
        .await
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "head\nno newline\n"
    );
}

#[tokio::test]
async fn append_from_path_requires_source() {
    let tmp = TempDir::new().unwrap();
    let target = write_file(&tmp, "dst.txt", "head\n");
    let missing = tmp.path().join("gone.txt").display().to_string();
    let tools = TextEditorTools::new();

    let err = tools
        .append_text_file_from_path(&missing, &target, &content_hash("head\n"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::FileNotFound { .. }));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "head\n");
}

#[tokio::test]
async fn append_from_path_requires_target() {
    let tmp = TempDir::new().unwrap();
    let source = write_file(&tmp, "src.txt", "tail\n");
    let missing = tmp.path().join("gone.txt").display().to_string();
    let tools = TextEditorTools::new();

    let err = tools
        .append_text_file_from_path(&source, &missing, "", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::FileNotFound { .. }));
}

#[tokio::test]
async fn append_from_path_checks_target_hash() {
    let tmp = TempDir::new().unwrap();
    let source = write_file(&tmp, "src.txt", "tail\n");
    let target = write_file(&tmp, "dst.txt", "head\n");
    let tools = TextEditorTools::new();

    let err = tools
        .append_text_file_from_path(&source, &target, &"0".repeat(64), None)
        .await
        .unwrap_err();
    match err {
        EditorError::FileHashMismatch { current } => {
            assert_eq!(current, content_hash("head\n"));
        }
        other => panic!("expected FileHashMismatch, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "head\n");
}
