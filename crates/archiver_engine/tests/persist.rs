use std::fs;

use archiver_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("data").join("archive");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("archive"));

    let first = writer.write("1-doc--abcd.md", "hello").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("1-doc--abcd.md", b"world".as_slice()).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
    assert_eq!(fs::read_dir(writer.dir()).unwrap().count(), 1);
}

#[test]
fn file_in_place_of_directory_is_an_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("archive");
    fs::write(&blocker, "x").unwrap();

    let writer = AtomicFileWriter::new(blocker.clone());
    assert!(writer.write("doc.md", "data").is_err());
    assert!(!temp.path().join("doc.md").exists());
}

#[tokio::test]
async fn detached_writes_run_side_by_side() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("archive"));

    let writes = (0..8).map(|n| writer.write_detached(format!("{n}-doc.md"), format!("body {n}")));
    let paths = futures_util::future::join_all(writes).await;

    for (n, path) in paths.into_iter().enumerate() {
        let path = path.unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), format!("body {n}"));
    }
    assert_eq!(fs::read_dir(writer.dir()).unwrap().count(), 8);
}

#[tokio::test]
async fn detached_write_reports_blocked_dir() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("archive");
    fs::write(&blocker, "x").unwrap();

    let writer = AtomicFileWriter::new(blocker);
    let err = writer
        .write_detached("doc.md".to_string(), "data".to_string())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not a directory"));
}
