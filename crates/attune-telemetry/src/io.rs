//! JSONL I/O and whole-file rewrites

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append one JSON record as a single line.
///
/// The line is serialized up front and handed to the OS in one `write_all`,
/// so concurrent appenders on a local filesystem do not interleave mid-line.
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Read all records from a JSONL file, skipping blank and malformed lines
pub fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> std::io::Result<Vec<T>> {
    let mut records = Vec::new();

    for (lineno, line) in read_lines(path)?.iter().enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!(path = %path.display(), line = lineno + 1, error = %e, "skipping malformed record");
            }
        }
    }

    Ok(records)
}

/// Read raw lines as bytes, without their terminators. Content is not
/// required to be UTF-8. A missing file reads as empty.
pub fn read_lines(path: &Path) -> std::io::Result<Vec<Vec<u8>>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = std::fs::read(path)?;
    let body = data.strip_suffix(b"\n").unwrap_or(&data[..]);
    if body.is_empty() {
        return Ok(Vec::new());
    }

    Ok(body
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect())
}

/// Replace the file's content with `lines`, each newline-terminated
pub fn rewrite_lines(path: &Path, lines: &[Vec<u8>]) -> std::io::Result<()> {
    let mut data = Vec::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        data.extend_from_slice(line);
        data.push(b'\n');
    }
    atomic_write(path, &data)
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Signal {
        id: u32,
        topic: String,
    }

    #[test]
    fn test_jsonl_append_and_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("log.jsonl");

        let records = vec![
            Signal {
                id: 1,
                topic: "auth".to_string(),
            },
            Signal {
                id: 2,
                topic: "billing".to_string(),
            },
        ];
        for record in &records {
            append_jsonl(&path, record).unwrap();
        }

        let read_back: Vec<Signal> = read_jsonl(&path).unwrap();
        assert_eq!(records, read_back);
    }

    #[test]
    fn test_read_jsonl_skips_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(
            &path,
            "{\"id\":1,\"topic\":\"a\"}\nnot json\n\n{\"id\":2,\"topic\":\"b\"}\n",
        )
        .unwrap();

        let read_back: Vec<Signal> = read_jsonl(&path).unwrap();
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[1].topic, "b");
    }

    #[test]
    fn test_invalid_utf8_line_is_isolated() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut data = b"{\"id\":1,\"topic\":\"a\"}\n".to_vec();
        data.extend_from_slice(b"\xff\xfe garbage\r\n");
        data.extend_from_slice(b"{\"id\":2,\"topic\":\"b\"}");

        std::fs::write(&path, &data).unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], b"\xff\xfe garbage");

        let read_back: Vec<Signal> = read_jsonl(&path).unwrap();
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[1].id, 2);

        rewrite_lines(&path, &lines[1..]).unwrap();
        assert_eq!(
            std::fs::read(&path).unwrap(),
            b"\xff\xfe garbage\n{\"id\":2,\"topic\":\"b\"}\n"
        );
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.jsonl");
        assert!(read_lines(&path).unwrap().is_empty());
        let records: Vec<Signal> = read_jsonl(&path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_rewrite_lines_replaces_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(&path, "one\ntwo\nthree\n").unwrap();

        rewrite_lines(&path, &[b"two".to_vec(), b"three".to_vec()]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two\nthree\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        atomic_write(&path, b"{}").unwrap();
        atomic_write(&path, b"{\"turn_count\":1}").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{\"turn_count\":1}");
    }
}
