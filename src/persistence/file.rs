//! Whole-file helpers over `std::fs`

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// True if `path` names an existing regular file
pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// File size in bytes
pub fn size(path: impl AsRef<Path>) -> io::Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Read the whole file
pub fn read(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Read the whole file as UTF-8 text
pub fn read_to_string(path: impl AsRef<Path>) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Create or truncate `path` and write `data`, creating parent directories
pub fn write(path: impl AsRef<Path>, data: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}

/// Append `data`, creating the file if needed
pub fn append(path: impl AsRef<Path>, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_append_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file-roundtrip.bin");
        write(&path, b"abc").unwrap();
        append(&path, b"def").unwrap();

        assert!(exists(&path));
        assert_eq!(size(&path).unwrap(), 6);
        assert_eq!(read(&path).unwrap(), b"abcdef");
        assert_eq!(read_to_string(&path).unwrap(), "abcdef");

        fs::remove_file(&path).unwrap();
        assert!(!exists(&path));
    }

    #[test]
    fn test_missing_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.bin");
        assert!(!exists(&path));
        assert!(size(&path).is_err());
        assert!(read(&path).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b.txt");
        write(&path, b"x").unwrap();
        assert_eq!(read(&path).unwrap(), b"x");
        assert!(dir.path().join("a").is_dir());
    }
}
