//! # ziplist
//!
//! A minimal streaming ZIP reader with bounded-memory listing and extraction.
//!
//! This library locates and parses the end-of-central-directory record,
//! walks the central directory to enumerate entries, parses local file
//! headers on demand, and streams compressed payloads through a fixed-size
//! working buffer into a raw-deflate decompressor. All offsets and lengths
//! taken from the archive are treated as untrusted.
//!
//! ## Features
//!
//! - List and extract single-disk ZIP archives from any `Read + Seek` source
//! - STORED (uncompressed) and DEFLATE compression methods
//! - Bounded memory: one scratch buffer per reader, sized at construction
//! - Selective extraction with glob pattern matching (CLI)
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use ziplist::ZipExtractor;
//!
//! fn main() -> anyhow::Result<()> {
//!     let file = File::open("archive.zip")?;
//!     let mut extractor = ZipExtractor::new(file);
//!
//!     // List all files in the archive
//!     let files = extractor.list_files()?;
//!     for file in &files {
//!         println!("{}", file.file_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod zip;

pub use cli::Cli;
pub use zip::{
    CompressionMethod, EndRecord, Entries, FileHeader, ZipError, ZipExtractor, ZipFileEntry,
    ZipReader,
};
