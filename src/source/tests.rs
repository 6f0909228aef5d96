use super::*;
use std::fs;
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_detect_language() {
    assert_eq!(detect_language(Path::new("test.rs")), Some("rust"));
    assert_eq!(detect_language(Path::new("test.py")), Some("python"));
    assert_eq!(detect_language(Path::new("test.JS")), Some("javascript"));
    assert_eq!(detect_language(Path::new("include/x.hpp")), Some("cpp"));
    assert_eq!(detect_language(Path::new("test.unknown")), None);
    assert_eq!(detect_language(Path::new("Makefile")), None);
}

#[test]
fn test_should_ignore() {
    assert!(should_ignore(Path::new("target/debug/foo.rs")));
    assert!(should_ignore(Path::new("node_modules/package/index.js")));
    assert!(should_ignore(Path::new(".git/config")));
    assert!(should_ignore(Path::new("web/app.min.js")));
    assert!(should_ignore(Path::new("Cargo.lock")));
    assert!(!should_ignore(Path::new("src/main.rs")));
    // only whole components match
    assert!(!should_ignore(Path::new("src/environment.py")));
    assert!(!should_ignore(Path::new("targets/main.rs")));
}

#[test]
fn test_collect_walks_directory_sorted() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/b.rs", b"fn b() {}");
    write(dir.path(), "src/a.py", b"def a(): pass");
    write(dir.path(), "README", b"no extension");
    write(dir.path(), "target/debug/gen.rs", b"fn gen() {}");
    write(dir.path(), "node_modules/x/index.js", b"module.exports = 1");

    let sources = collect_sources(&[dir.path()]).unwrap();
    let names: Vec<_> = sources
        .iter()
        .map(|s| s.path.strip_prefix(dir.path()).unwrap().to_path_buf())
        .collect();

    assert_eq!(names, vec![PathBuf::from("src/a.py"), PathBuf::from("src/b.rs")]);
    assert_eq!(sources[0].language, Some("python"));
    assert_eq!(sources[1].content, "fn b() {}");
}

#[test]
fn test_explicit_file_always_collected() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "script", b"#!/bin/sh\necho hi\n");

    let sources = collect_sources(&[&path]).unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].language, None);
}

#[test]
fn test_non_utf8_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.rs", &[0xff, 0xfe, 0x00, 0x80]);
    write(dir.path(), "good.rs", b"fn ok() {}");

    let sources = collect_sources(&[dir.path()]).unwrap();
    assert_eq!(sources.len(), 1);
    assert!(sources[0].path.ends_with("good.rs"));
}

#[test]
fn test_duplicate_paths_collapsed() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "lib.rs", b"pub fn f() {}");

    let sources = collect_sources(&[path.clone(), path]).unwrap();
    assert_eq!(sources.len(), 1);
}

#[test]
fn test_missing_path_is_error() {
    let dir = TempDir::new().unwrap();
    let result = collect_sources(&[dir.path().join("nope")]);
    assert!(result.is_err());
}
