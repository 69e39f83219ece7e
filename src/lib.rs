//! JPT - JPEG-PNG-Tarred container packer
//!
//! A JPT file carries exactly two opaque payloads: the bytes of a JPEG file
//! and the bytes of a PNG file (typically the colour image and its alpha
//! mask). This crate packs the two into one container and recovers them
//! byte-for-byte.
//!
//! ## Container layout
//!
//! ```text
//! "JPT" | version | len1 | JPEG bytes | len2 | PNG bytes
//! ```
//!
//! - **v2** (default): 64-bit little-endian lengths
//! - **v1**: 32-bit little-endian lengths, the layout read by the April engine
//!
//! Decoding checks the tag, both lengths, and rejects trailing bytes, so
//! truncated or concatenated files are reported rather than misread.
//!
//! ## Example
//!
//! ```no_run
//! use jpt::{merge, split};
//! use std::path::Path;
//!
//! let message = merge(
//!     Path::new("out.jpt"),
//!     Path::new("photo.jpg"),
//!     Path::new("photo.png"),
//! ).unwrap();
//! println!("{}", message);
//!
//! split(
//!     Path::new("out.jpt"),
//!     Path::new("restored.jpg"),
//!     Path::new("restored.png"),
//! ).unwrap();
//! ```

pub mod cli;
pub mod container;
pub mod error;
pub mod file;
pub mod header;

pub use cli::{inspect, merge, merge_files, split, split_file, MergeOptions};
pub use container::{decode, encode, encode_versioned, Container, Entry};
pub use error::{ErrorKind, FileRole, FormatError, JptError, Result};
pub use header::FormatVersion;
