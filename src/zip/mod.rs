//! ZIP archive parsing and extraction.
//!
//! This module provides functionality for reading and extracting ZIP
//! archives with bounded memory: metadata is parsed through a fixed-size
//! scratch buffer and payloads are inflated in bounded chunks.
//!
//! ## Architecture
//!
//! The module is organized into four components:
//!
//! - [`structures`]: Data structures representing ZIP format elements (end
//!   record, normalized file header, compression methods)
//! - [`parser`]: Low-level streaming parsing of ZIP structures
//! - [`extractor`]: High-level extraction API for end users
//! - [`error`]: The error taxonomy shared by all of the above
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the EOCD first (from the end of the file),
//! then walks the Central Directory entry by entry, so listing never loads
//! more than one header and one filename at a time.
//!
//! ## Supported Features
//!
//! - Standard single-disk ZIP archives (PKZIP APPNOTE 6.3.x layouts)
//! - STORED (no compression) method
//! - DEFLATE compression method (raw, no zlib/gzip wrapper)
//!
//! ## Limitations
//!
//! - No encryption or data descriptor support (nonzero general purpose
//!   flags are rejected)
//! - No multi-disk archive support
//! - No ZIP64 extensions
//! - No BZIP2, LZMA, or other compression methods (they are recognized by
//!   name for diagnostics only)

mod error;
mod extractor;
mod parser;
mod structures;

pub use error::ZipError;
pub use extractor::ZipExtractor;
pub use parser::{DEFAULT_SCRATCH_SIZE, Entries, ZipReader};
pub use structures::*;
