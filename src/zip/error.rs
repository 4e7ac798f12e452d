use thiserror::Error;

use super::structures::CompressionMethod;

/// Errors produced while reading a ZIP archive.
///
/// Central directory errors (`TooSmall`, `SignatureNotFound`,
/// `MultiDiskUnsupported`, `InvalidHeaderSignature`) are fatal to the whole
/// scan. Local header and data errors are scoped to a single entry; a caller
/// can skip the entry and keep going.
#[derive(Debug, Error)]
pub enum ZipError {
    /// Seek or read failure at any stage. Never retried.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is shorter than the end-of-central-directory record.
    #[error("too small file to be a zip")]
    TooSmall,

    /// No end record signature inside the scan window. Either the file is not
    /// a ZIP archive or its trailing comment exceeds the scratch buffer.
    #[error("end record signature not found in zip")]
    SignatureNotFound,

    /// The archive spans multiple volumes.
    #[error("multifile zips not supported")]
    MultiDiskUnsupported,

    /// A central directory file header did not start with PK\x01\x02.
    /// Carries the entry index; the scan cannot resynchronize past this.
    #[error("invalid file header signature for entry {0}")]
    InvalidHeaderSignature(u16),

    /// A local file header failed cheap validation. Deliberately generic:
    /// the local header reader is used optimistically in hot paths.
    #[error("malformed local file header")]
    Malformed,

    /// Nonzero general purpose flags (encryption, data descriptors, patches).
    #[error("unsupported general purpose flags {0:#06x}")]
    UnsupportedFeature(u16),

    /// A stored entry whose compressed and uncompressed sizes differ.
    #[error("stored entry size mismatch: {compressed} compressed vs {uncompressed} uncompressed")]
    SizeMismatch { compressed: u32, uncompressed: u32 },

    /// Extraction requested for a method other than Store or Deflate.
    #[error("unsupported compression method {} ({})", .0, CompressionMethod::from_u16(*.0).name())]
    UnsupportedMethod(u16),

    /// The inflater reported corruption or ran out of memory mid-stream.
    #[error("decompression failed")]
    DecompressionFailed,

    /// The archive ended before an entry's payload did.
    #[error("short read in entry data")]
    ShortRead,

    /// A local header filename does not fit the caller's buffer. Carries the
    /// on-disk filename length. Never truncated, unlike the central
    /// directory path.
    #[error("filename of {0} bytes does not fit the provided buffer")]
    FilenameTooLarge(usize),
}
