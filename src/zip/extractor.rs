use std::fs;
use std::io::{Read, Seek, Write};
use std::path::Path;

use super::error::ZipError;
use super::parser::ZipReader;
use super::structures::ZipFileEntry;

/// ZIP file extractor
///
/// High-level wrapper over [`ZipReader`]: enumerate entries once, then
/// materialize whichever payloads the caller wants. Extraction re-reads each
/// entry's local file header before trusting its offsets.
pub struct ZipExtractor<R: Read + Seek> {
    zip: ZipReader<R>,
}

impl<R: Read + Seek> ZipExtractor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            zip: ZipReader::new(reader),
        }
    }

    /// List all files in the archive
    pub fn list_files(&mut self) -> Result<Vec<ZipFileEntry>, ZipError> {
        let end = self.zip.read_end_record()?;
        self.zip.entries(&end)?.collect()
    }

    /// Extract file data to memory
    pub fn extract_to_memory(&mut self, entry: &ZipFileEntry) -> Result<Vec<u8>, ZipError> {
        // The central directory gave us the local header offset; confirm the
        // header there before believing its payload position.
        self.zip.seek_to(entry.header.offset)?;
        let local = self.zip.read_local_header()?;

        let mut buf = vec![0u8; local.uncompressed_size as usize];
        self.zip.read_data(&local, &mut buf)?;

        Ok(buf)
    }

    /// Extract file to disk
    pub fn extract_to_file(
        &mut self,
        entry: &ZipFileEntry,
        output_path: &Path,
    ) -> Result<(), ZipError> {
        // Create parent directories if needed
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = self.extract_to_memory(entry)?;

        let mut file = fs::File::create(output_path)?;
        file.write_all(&data)?;

        Ok(())
    }

    /// Extract file to stdout
    pub fn extract_to_stdout(&mut self, entry: &ZipFileEntry) -> Result<(), ZipError> {
        let data = self.extract_to_memory(entry)?;

        let mut stdout = std::io::stdout();
        stdout.write_all(&data)?;

        Ok(())
    }
}
