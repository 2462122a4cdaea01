//! Texture atlas lookup table
//!
//! Maps short names to UV rectangles. Persisted as a little-endian blob:
//! an `i32` record count, then per record four `f32` (u, v, du, dv) and a
//! 16-byte NUL-padded name.

use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::file;

/// Bytes per blob record
pub const RECORD_SIZE: usize = 32;
/// Bytes reserved for a name
pub const NAME_LEN: usize = 16;

/// Texture-space rectangle: origin plus size, in 0..1 units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UvQuad {
    pub u: f32,
    pub v: f32,
    pub du: f32,
    pub dv: f32,
}

impl UvQuad {
    pub const ZERO: UvQuad = UvQuad::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(u: f32, v: f32, du: f32, dv: f32) -> Self {
        Self { u, v, du, dv }
    }
}

/// Errors reading or writing an atlas blob
#[derive(Debug)]
pub enum AtlasError {
    Io(io::Error),
    /// Blob shorter than its header promises
    Truncated { expected: usize, actual: usize },
    NegativeCount(i32),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::Io(e) => write!(f, "atlas I/O error: {e}"),
            AtlasError::Truncated { expected, actual } => {
                write!(f, "atlas blob truncated: need {expected} bytes, have {actual}")
            }
            AtlasError::NegativeCount(n) => write!(f, "atlas blob has negative record count {n}"),
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtlasError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for AtlasError {
    fn from(e: io::Error) -> Self {
        AtlasError::Io(e)
    }
}

/// Named atlas entries, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atlas {
    entries: Vec<(String, UvQuad)>,
}

impl Atlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table matching the generated built-in texture
    pub fn builtin() -> Self {
        let mut atlas = Self::new();
        atlas.insert("font", UvQuad::new(0.0, 0.0, 0.5, 0.5));
        atlas.insert("white", UvQuad::new(0.5, 0.0, 0.125, 0.125));
        atlas.insert("brick", UvQuad::new(0.625, 0.0, 0.125, 0.125));
        atlas.insert("ball", UvQuad::new(0.75, 0.0, 0.125, 0.125));
        atlas.insert("paddle", UvQuad::new(0.875, 0.0, 0.125, 0.125));
        atlas.insert("brick_solid", UvQuad::new(0.5, 0.125, 0.125, 0.125));
        atlas
    }

    /// Add or replace an entry. Names longer than 16 bytes are cut at a
    /// character boundary.
    pub fn insert(&mut self, name: &str, quad: UvQuad) {
        let name = truncate_name(name);
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = quad,
            None => self.entries.push((name.to_string(), quad)),
        }
    }

    /// UV rectangle for `name`; unknown names give the zero quad
    pub fn lookup(&self, name: &str) -> UvQuad {
        self.get(name).unwrap_or(UvQuad::ZERO)
    }

    pub fn get(&self, name: &str) -> Option<UvQuad> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, quad)| *quad)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UvQuad)> {
        self.entries.iter().map(|(n, q)| (n.as_str(), *q))
    }

    /// Serialize to the blob format
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.entries.len() * RECORD_SIZE);
        out.extend_from_slice(&(self.entries.len() as i32).to_le_bytes());
        for (name, quad) in &self.entries {
            for value in [quad.u, quad.v, quad.du, quad.dv] {
                out.extend_from_slice(&value.to_le_bytes());
            }
            let mut padded = [0u8; NAME_LEN];
            padded[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&padded);
        }
        out
    }

    /// Parse a blob. Bytes past the last record are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, AtlasError> {
        let Some(header) = bytes.get(..4) else {
            return Err(AtlasError::Truncated {
                expected: 4,
                actual: bytes.len(),
            });
        };
        let count = i32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if count < 0 {
            return Err(AtlasError::NegativeCount(count));
        }

        let expected = 4 + count as usize * RECORD_SIZE;
        if bytes.len() < expected {
            return Err(AtlasError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let mut atlas = Self::new();
        for record in bytes[4..expected].chunks_exact(RECORD_SIZE) {
            let f = |i: usize| {
                f32::from_le_bytes([record[i], record[i + 1], record[i + 2], record[i + 3]])
            };
            let quad = UvQuad::new(f(0), f(4), f(8), f(12));
            let raw = &record[16..RECORD_SIZE];
            let end = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
            let name = String::from_utf8_lossy(&raw[..end]);
            atlas.insert(&name, quad);
        }
        Ok(atlas)
    }

    /// Read and parse the blob at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        Self::decode(&file::read(path)?)
    }

    /// Write the blob to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AtlasError> {
        file::write(path, &self.encode())?;
        Ok(())
    }

    /// Load the atlas at `path`.
    ///
    /// A missing or empty file is replaced by the built-in table, which is
    /// written back. A malformed file is left alone and the built-in table is
    /// used for this run.
    pub fn load_or_create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let empty = file::size(path).map(|n| n == 0).unwrap_or(true);
        if !file::exists(path) || empty {
            let atlas = Self::builtin();
            match atlas.save(path) {
                Ok(()) => log::info!("Wrote default atlas to {}", path.display()),
                Err(e) => log::warn!("Could not write default atlas {}: {}", path.display(), e),
            }
            return atlas;
        }

        match Self::load(path) {
            Ok(atlas) => {
                log::info!("Loaded {} atlas entries from {}", atlas.len(), path.display());
                atlas
            }
            Err(e) => {
                log::warn!("Ignoring atlas {}: {}", path.display(), e);
                Self::builtin()
            }
        }
    }
}

fn truncate_name(name: &str) -> &str {
    if name.len() <= NAME_LEN {
        return name;
    }
    let mut end = NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_is_zero() {
        let atlas = Atlas::builtin();
        assert_eq!(atlas.lookup("nope"), UvQuad::ZERO);
        assert_eq!(atlas.lookup("ball"), UvQuad::new(0.75, 0.0, 0.125, 0.125));
    }

    #[test]
    fn test_blob_layout() {
        let mut atlas = Atlas::new();
        atlas.insert("ab", UvQuad::new(1.0, 2.0, 3.0, 4.0));
        let blob = atlas.encode();

        assert_eq!(blob.len(), 4 + RECORD_SIZE);
        assert_eq!(&blob[..4], &1i32.to_le_bytes());
        assert_eq!(&blob[4..8], &1.0f32.to_le_bytes());
        assert_eq!(&blob[16..20], &4.0f32.to_le_bytes());
        assert_eq!(&blob[20..22], b"ab");
        assert!(blob[22..36].iter().all(|&b| b == 0));

        assert_eq!(Atlas::decode(&blob).unwrap(), atlas);
    }

    #[test]
    fn test_full_length_name_without_nul() {
        let mut atlas = Atlas::new();
        atlas.insert("sixteen_chars_xx", UvQuad::new(0.1, 0.2, 0.3, 0.4));
        atlas.insert("this_name_is_too_long", UvQuad::ZERO);
        let decoded = Atlas::decode(&atlas.encode()).unwrap();
        assert!(decoded.get("sixteen_chars_xx").is_some());
        assert!(decoded.get("this_name_is_too").is_some());
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            Atlas::decode(&[1, 0]),
            Err(AtlasError::Truncated { expected: 4, .. })
        ));
        assert!(matches!(
            Atlas::decode(&(-3i32).to_le_bytes()),
            Err(AtlasError::NegativeCount(-3))
        ));
        let mut short = 2i32.to_le_bytes().to_vec();
        short.extend_from_slice(&[0u8; RECORD_SIZE]);
        assert!(matches!(
            Atlas::decode(&short),
            Err(AtlasError::Truncated { expected: 68, actual: 36 })
        ));
        assert!(Atlas::decode(&0i32.to_le_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_load_or_create_persists_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.atlas");

        let atlas = Atlas::load_or_create(&path);
        assert_eq!(atlas, Atlas::builtin());
        assert!(file::exists(&path));
        assert_eq!(Atlas::load(&path).unwrap(), Atlas::builtin());

        // Empty file counts as missing
        file::write(&path, b"").unwrap();
        assert_eq!(Atlas::load_or_create(&path), Atlas::builtin());
        assert!(file::size(&path).unwrap() > 0);
    }

    #[test]
    fn test_malformed_file_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.atlas");
        file::write(&path, &[9, 0, 0, 0, 1, 2]).unwrap();
        assert_eq!(Atlas::load_or_create(&path), Atlas::builtin());
        assert_eq!(file::read(&path).unwrap(), vec![9, 0, 0, 0, 1, 2]);
    }
}
