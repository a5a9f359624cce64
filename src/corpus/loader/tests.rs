use super::*;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("should create parent directory");
    }
    fs::write(&path, content).expect("should write test file");
    path
}

#[test]
fn document_kind_detection() {
    assert_eq!(
        DocumentKind::from_path(Path::new("rules.txt")),
        Some(DocumentKind::PlainText)
    );
    assert_eq!(
        DocumentKind::from_path(Path::new("notes.MD")),
        Some(DocumentKind::PlainText)
    );
    assert_eq!(
        DocumentKind::from_path(Path::new("kniga-1.PDF")),
        Some(DocumentKind::Pdf)
    );
    assert_eq!(DocumentKind::from_path(Path::new("image.png")), None);
    assert_eq!(DocumentKind::from_path(Path::new("README")), None);
}

#[test]
fn collect_sources_walks_directories_in_name_order() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    write_file(temp_dir.path(), "b.txt", "second");
    write_file(temp_dir.path(), "a.md", "first");
    write_file(temp_dir.path(), "nested/c.txt", "third");
    write_file(temp_dir.path(), "skip.png", "binary");

    let sources = collect_sources(&[temp_dir.path().to_path_buf()]);
    let names = sources
        .iter()
        .map(|p| {
            p.strip_prefix(temp_dir.path())
                .expect("source should be inside temp dir")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect::<Vec<_>>();

    assert_eq!(names, vec!["a.md", "b.txt", "nested/c.txt"]);
}

#[test]
fn explicit_files_are_kept_as_given() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let custom = write_file(temp_dir.path(), "notes.rules", "custom extension");
    let missing = temp_dir.path().join("missing.txt");

    let sources = collect_sources(&[custom.clone(), missing.clone()]);

    assert_eq!(sources, vec![custom, missing]);
}

#[test]
fn read_plain_text_document() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let path = write_file(temp_dir.path(), "walls.txt", "Стены можно выровнять штукатуркой.");

    let document = read_document(&path).expect("should read text document");

    assert_eq!(document.source, path);
    assert_eq!(document.text, "Стены можно выровнять штукатуркой.");
}

#[test]
fn unreadable_documents_are_skipped() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let good = write_file(temp_dir.path(), "good.txt", "Readable content.");
    let not_a_file = temp_dir.path().join("folder.txt");
    fs::create_dir_all(&not_a_file).expect("should create directory");
    let missing = temp_dir.path().join("missing.txt");

    let mut seen = Vec::new();
    let documents = load_documents_with(&[missing, good.clone()], |source| {
        seen.push(source.to_path_buf());
    });

    assert_eq!(seen.len(), 2);
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].source, good);
    assert_eq!(documents[0].text, "Readable content.");
    assert!(read_document(&not_a_file).is_err());
}

#[test]
fn invalid_utf8_is_reported_as_error() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let path = temp_dir.path().join("latin1.txt");
    fs::write(&path, [0xff, 0xfe, 0xfd]).expect("should write bytes");

    assert!(read_document(&path).is_err());
}

#[test]
fn normalize_whitespace_collapses_line_breaks() {
    assert_eq!(
        normalize_whitespace("Плитка\nкрепится   на\r\n\x0cклей. "),
        "Плитка крепится на клей."
    );
    assert_eq!(normalize_whitespace("  \n "), "");
}
