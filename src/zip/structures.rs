use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::error::ZipError;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    /// Diagnostic name for the method, per the PKWARE method table.
    ///
    /// Methods other than Store and Deflate are named here for listings and
    /// error messages only; extraction rejects them.
    pub fn name(&self) -> &'static str {
        match self.as_u16() {
            0 => "Store",
            1 => "Shrunk",
            2 => "Reduced #1",
            3 => "Reduced #2",
            4 => "Reduced #3",
            5 => "Reduced #4",
            6 => "Implode",
            7 => "Reserved",
            8 => "Deflate",
            9 => "Deflate64",
            10 => "PKImplode",
            11 => "PKReserved",
            12 => "BZIP2",
            _ => "Unknown",
        }
    }
}

/// End of Central Directory (EOCD) record - 22 bytes minimum
pub struct EndRecord {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndRecord {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::SignatureNotFound);
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Single-disk invariant: multi-volume archives are unsupported.
    pub fn is_single_disk(&self) -> bool {
        self.disk_number == 0 && self.disk_with_cd == 0 && self.total_entries == self.disk_entries
    }
}

/// Central Directory File Header (CDFH) - 46 bytes fixed part
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes fixed part
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Normalized file header shared by the central directory and local header
/// paths. Both on-disk layouts carry this sub-range of fields.
///
/// `offset` depends on where the header came from: the absolute offset of the
/// entry's local header when read from the central directory, or the offset
/// of the payload's first byte when read from a local header.
#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    pub method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub offset: u64,
}

impl FileHeader {
    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

/// A central directory entry as handed to the caller during enumeration.
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub header: FileHeader,
    pub is_directory: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trip() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(
            CompressionMethod::from_u16(12),
            CompressionMethod::Unknown(12)
        );
        assert_eq!(CompressionMethod::Unknown(12).as_u16(), 12);
        assert_eq!(CompressionMethod::Unknown(12).name(), "BZIP2");
        assert_eq!(CompressionMethod::Deflate.name(), "Deflate");
    }

    #[test]
    fn dos_timestamp_decoding() {
        // 2024-06-15 13:45:30 in DOS packed form
        let header = FileHeader {
            method: CompressionMethod::Stored,
            last_mod_time: (13 << 11) | (45 << 5) | (30 / 2),
            last_mod_date: ((2024 - 1980) << 9) | (6 << 5) | 15,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            offset: 0,
        };
        assert_eq!(header.mod_date(), (2024, 6, 15));
        assert_eq!(header.mod_time(), (13, 45, 30));
    }

    #[test]
    fn end_record_rejects_wrong_signature() {
        let data = [0u8; EndRecord::SIZE];
        assert!(matches!(
            EndRecord::from_bytes(&data),
            Err(ZipError::SignatureNotFound)
        ));
    }
}
