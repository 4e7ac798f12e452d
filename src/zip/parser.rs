//! Low-level streaming ZIP archive reader.
//!
//! This module handles the binary parsing of ZIP file structures, reading
//! from any seekable byte source through a bounded scratch buffer.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) record in the file's tail
//! 2. Walk the Central Directory to enumerate entries
//! 3. For extraction, read each entry's Local File Header and inflate the
//!    payload through a fixed-size read buffer
//!
//! Offsets and lengths come from the archive and are untrusted: every
//! fixed-layout structure is decoded field by field with explicit
//! little-endian reads, never by overlaying structs onto raw bytes.

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::{Decompress, FlushDecompress, Status};
use std::io::{Cursor, Read, Seek, SeekFrom};

use super::error::ZipError;
use super::structures::*;

/// Default scratch buffer size (64 KiB).
///
/// The scratch buffer bounds the EOCD scan window (and therefore the longest
/// supported trailing comment), the longest central-directory filename kept
/// without truncation, and the chunk size of streaming decompression reads.
pub const DEFAULT_SCRATCH_SIZE: usize = 65536;

/// Search a buffer for the first occurrence of a byte pattern.
///
/// Single forward scan with an in-progress match counter; cheap restarts are
/// fine for 4-byte ZIP signatures. Returns the offset of the first match.
fn find_signature(buffer: &[u8], signature: &[u8]) -> Option<usize> {
    let mut matched = 0;
    for (i, &byte) in buffer.iter().enumerate() {
        if byte == signature[matched] {
            matched += 1;
            if matched == signature.len() {
                return Some(i + 1 - matched);
            }
        } else {
            // Restart, re-testing the current byte as a new first byte.
            matched = usize::from(byte == signature[0]);
        }
    }
    None
}

/// Streaming reader over a single ZIP archive handle.
///
/// Owns the archive cursor and a scratch buffer sized at construction, so
/// every metadata read and decompression chunk is bounded regardless of what
/// the archive claims. One reader means one cursor: concurrent extraction
/// needs one `ZipReader` per caller.
///
/// ## Example
///
/// ```no_run
/// use std::fs::File;
/// use ziplist::ZipReader;
///
/// fn main() -> anyhow::Result<()> {
///     let file = File::open("archive.zip")?;
///     let mut zip = ZipReader::new(file);
///
///     let end = zip.read_end_record()?;
///     for entry in zip.entries(&end)? {
///         let entry = entry?;
///         println!("{} ({} bytes)", entry.file_name, entry.header.uncompressed_size);
///     }
///     Ok(())
/// }
/// ```
pub struct ZipReader<R: Read + Seek> {
    reader: R,
    scratch: Vec<u8>,
}

impl<R: Read + Seek> ZipReader<R> {
    /// Create a reader with the default 64 KiB scratch buffer.
    pub fn new(reader: R) -> Self {
        Self::with_scratch_size(reader, DEFAULT_SCRATCH_SIZE)
    }

    /// Create a reader with an explicit scratch buffer size.
    ///
    /// The size must be at least [`EndRecord::SIZE`]; smaller values are
    /// rounded up so the end record always fits the scan window.
    pub fn with_scratch_size(reader: R, scratch_size: usize) -> Self {
        Self {
            reader,
            scratch: vec![0u8; scratch_size.max(EndRecord::SIZE)],
        }
    }

    /// Consume the reader, returning the underlying archive handle.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Position the archive cursor at an absolute offset.
    ///
    /// Used to move to an entry's local header before calling
    /// [`read_local_header`](Self::read_local_header).
    pub fn seek_to(&mut self, offset: u64) -> Result<(), ZipError> {
        self.reader.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Find and parse the End of Central Directory record. Moves the cursor.
    ///
    /// Reads the last `min(file size, scratch size)` bytes and scans forward
    /// for the EOCD signature, naively assuming it occurs in one place only.
    /// Archives whose end record plus trailing comment fall outside the scan
    /// window fail with [`ZipError::SignatureNotFound`].
    pub fn read_end_record(&mut self) -> Result<EndRecord, ZipError> {
        let file_size = self.reader.seek(SeekFrom::End(0))?;

        if file_size <= EndRecord::SIZE as u64 {
            return Err(ZipError::TooSmall);
        }

        let window = (self.scratch.len() as u64).min(file_size) as usize;
        self.reader.seek(SeekFrom::Start(file_size - window as u64))?;
        self.reader.read_exact(&mut self.scratch[..window])?;

        let pos = find_signature(&self.scratch[..window], EndRecord::SIGNATURE)
            .ok_or(ZipError::SignatureNotFound)?;
        if window - pos < EndRecord::SIZE {
            // Spurious signature bytes too close to the end of the file.
            return Err(ZipError::SignatureNotFound);
        }

        let end = EndRecord::from_bytes(&self.scratch[pos..window])?;

        if !end.is_single_disk() {
            return Err(ZipError::MultiDiskUnsupported);
        }

        Ok(end)
    }

    /// Iterate over the central directory described by `end`.
    ///
    /// Seeks to the central directory and returns a lazy iterator yielding
    /// one [`ZipFileEntry`] per entry, in on-disk order. Dropping the
    /// iterator early aborts the scan without error; any yielded error is
    /// fatal and the iterator yields nothing further.
    pub fn entries(&mut self, end: &EndRecord) -> Result<Entries<'_, R>, ZipError> {
        self.reader.seek(SeekFrom::Start(end.cd_offset as u64))?;
        Ok(Entries {
            zip: self,
            total: end.total_entries,
            index: 0,
            failed: false,
        })
    }

    /// Parse one central directory file header at the current cursor.
    ///
    /// Filenames longer than the scratch buffer are lossily truncated rather
    /// than rejected, so enumeration survives hostile length fields; the
    /// cursor still advances past the full declared lengths, keeping the
    /// next entry aligned.
    fn read_central_entry(&mut self, index: u16) -> Result<ZipFileEntry, ZipError> {
        let mut fixed = [0u8; CDFH_SIZE];
        self.reader.read_exact(&mut fixed)?;

        if &fixed[0..4] != CDFH_SIGNATURE {
            return Err(ZipError::InvalidHeaderSignature(index));
        }

        let mut cursor = Cursor::new(&fixed[4..]);
        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _flags = cursor.read_u16::<LittleEndian>()?;
        let method = cursor.read_u16::<LittleEndian>()?;
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let file_name_length = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        let file_comment_length = cursor.read_u16::<LittleEndian>()?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let _external_attrs = cursor.read_u32::<LittleEndian>()?;
        let lfh_offset = cursor.read_u32::<LittleEndian>()?;

        // I really don't believe there will be 65536-character filenames, but
        let kept = file_name_length.min(self.scratch.len());
        self.reader.read_exact(&mut self.scratch[..kept])?;
        if kept < file_name_length {
            self.reader
                .seek(SeekFrom::Current((file_name_length - kept) as i64))?;
        }
        // Lossy conversion keeps enumeration alive on non-UTF8 names
        let file_name = String::from_utf8_lossy(&self.scratch[..kept]).into_owned();

        self.reader.seek(SeekFrom::Current(
            extra_field_length as i64 + file_comment_length as i64,
        ))?;

        let is_directory = file_name.ends_with('/');

        Ok(ZipFileEntry {
            file_name,
            header: FileHeader {
                method: CompressionMethod::from_u16(method),
                last_mod_time,
                last_mod_date,
                crc32,
                compressed_size,
                uncompressed_size,
                offset: lfh_offset as u64,
            },
            is_directory,
        })
    }

    /// Read the local file header at the current cursor, skipping its name.
    ///
    /// Optimistic by design: a bad signature fails with the generic
    /// [`ZipError::Malformed`] so callers probing offsets get a cheap
    /// failure. On success the returned header's `offset` is the payload
    /// start, with the cursor already positioned there.
    pub fn read_local_header(&mut self) -> Result<FileHeader, ZipError> {
        Ok(self.read_local_header_impl(None)?.0)
    }

    /// Read the local file header, copying the embedded filename into
    /// `filename_buf`.
    ///
    /// Fails with [`ZipError::FilenameTooLarge`] unless the buffer holds at
    /// least one byte more than the on-disk name; the buffer is never
    /// overrun and the name is never truncated. Returns the header and the
    /// number of name bytes written.
    pub fn read_local_header_named(
        &mut self,
        filename_buf: &mut [u8],
    ) -> Result<(FileHeader, usize), ZipError> {
        self.read_local_header_impl(Some(filename_buf))
    }

    fn read_local_header_impl(
        &mut self,
        filename_buf: Option<&mut [u8]>,
    ) -> Result<(FileHeader, usize), ZipError> {
        let mut fixed = [0u8; LFH_SIZE];
        self.reader.read_exact(&mut fixed)?;

        if &fixed[0..4] != LFH_SIGNATURE {
            return Err(ZipError::Malformed);
        }

        let mut cursor = Cursor::new(&fixed[4..]);
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let method = cursor.read_u16::<LittleEndian>()?;
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let file_name_length = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;

        let written = match filename_buf {
            Some(buf) => {
                if file_name_length >= buf.len() {
                    return Err(ZipError::FilenameTooLarge(file_name_length));
                }
                self.reader.read_exact(&mut buf[..file_name_length])?;
                file_name_length
            }
            None => {
                self.reader
                    .seek(SeekFrom::Current(file_name_length as i64))?;
                0
            }
        };

        self.reader
            .seek(SeekFrom::Current(extra_field_length as i64))?;

        if flags != 0 {
            // Encryption, data descriptors and patched data all live here
            return Err(ZipError::UnsupportedFeature(flags));
        }

        let method = CompressionMethod::from_u16(method);
        if method == CompressionMethod::Stored && compressed_size != uncompressed_size {
            return Err(ZipError::SizeMismatch {
                compressed: compressed_size,
                uncompressed: uncompressed_size,
            });
        }

        let offset = self.reader.stream_position()?;

        Ok((
            FileHeader {
                method,
                last_mod_time,
                last_mod_date,
                crc32,
                compressed_size,
                uncompressed_size,
                offset,
            },
            written,
        ))
    }

    /// Read and decompress an entry's payload from the current cursor into
    /// `out`, which the caller has sized to exactly `header.uncompressed_size`.
    ///
    /// Either `out` is fully filled on success or an error is returned and
    /// its contents are undefined. The cursor must be at the payload start,
    /// where [`read_local_header`](Self::read_local_header) leaves it.
    pub fn read_data(&mut self, header: &FileHeader, out: &mut [u8]) -> Result<(), ZipError> {
        debug_assert_eq!(out.len(), header.uncompressed_size as usize);

        match header.method {
            CompressionMethod::Stored => self.reader.read_exact(out).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    ZipError::ShortRead
                } else {
                    ZipError::Io(e)
                }
            }),
            CompressionMethod::Deflate => self.inflate_raw(header.compressed_size, out),
            CompressionMethod::Unknown(method) => Err(ZipError::UnsupportedMethod(method)),
        }
    }

    /// Streaming raw inflate (no zlib/gzip wrapper) through the scratch
    /// buffer, writing directly into the remaining slice of `out`.
    fn inflate_raw(&mut self, compressed_size: u32, out: &mut [u8]) -> Result<(), ZipError> {
        let mut inflater = Decompress::new(false);
        let mut remaining = compressed_size as u64;
        let mut produced = 0usize;

        'stream: while produced < out.len() && remaining > 0 {
            let want = (self.scratch.len() as u64).min(remaining) as usize;
            let read = self.reader.read(&mut self.scratch[..want])?;
            if read == 0 {
                return Err(ZipError::ShortRead);
            }
            remaining -= read as u64;

            let mut chunk = &self.scratch[..read];
            while !chunk.is_empty() && produced < out.len() {
                let before_in = inflater.total_in();
                let before_out = inflater.total_out();

                let status = inflater
                    .decompress(chunk, &mut out[produced..], FlushDecompress::None)
                    .map_err(|_| ZipError::DecompressionFailed)?;

                let consumed = (inflater.total_in() - before_in) as usize;
                produced += (inflater.total_out() - before_out) as usize;
                chunk = &chunk[consumed..];

                match status {
                    Status::StreamEnd => break 'stream,
                    Status::Ok => {}
                    // No progress on either side means a stuck stream
                    Status::BufError if consumed == 0 => {
                        return Err(ZipError::DecompressionFailed);
                    }
                    Status::BufError => {}
                }
            }
        }

        if produced != out.len() {
            return Err(ZipError::DecompressionFailed);
        }
        Ok(())
    }
}

/// Lazy iterator over central directory entries.
///
/// Produced by [`ZipReader::entries`]; yields `total_entries` items unless an
/// error fuses it early. A central directory cannot be resynchronized after
/// a bad header, so the first error is also the last item.
pub struct Entries<'a, R: Read + Seek> {
    zip: &'a mut ZipReader<R>,
    total: u16,
    index: u16,
    failed: bool,
}

impl<R: Read + Seek> Iterator for Entries<'_, R> {
    type Item = Result<ZipFileEntry, ZipError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index == self.total {
            return None;
        }

        let index = self.index;
        self.index += 1;

        match self.zip.read_central_entry(index) {
            Ok(entry) => Some(Ok(entry)),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = (self.total - self.index) as usize;
        (0, Some(left))
    }
}
