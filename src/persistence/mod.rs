//! File persistence
//!
//! Small blocking file service used by the settings, atlas, texture and
//! shader loaders. Everything is whole-file: no streaming, no directory
//! scanning.

pub mod file;

pub use file::{append, exists, read, read_to_string, size, write};
