use byteorder::{BigEndian, ByteOrder};
use flate2::read::ZlibDecoder;
use std::io::Read;
use std::path::Path;
use strata_common::{RegionGeometry, Result, StrataError};
use strata_logger::{log, LogSeverity::Debug};

/// Compression method byte for zlib streams, the only scheme supported.
pub const COMPRESSION_ZLIB: u8 = 2;

/// Location of one cell's payload, from the region header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionIndexEntry {
    /// First sector of the payload, 0 if the cell holds no data.
    pub sector_offset: u32,
    /// Sectors reserved for the payload; informational only.
    pub sector_count: u8,
}

impl RegionIndexEntry {
    /// Splits a pointer word: high three bytes are the sector offset, the low
    /// byte the sector count.
    pub fn from_pointer(pointer: u32) -> Self {
        RegionIndexEntry {
            sector_offset: pointer >> 8,
            sector_count: (pointer & 0xFF) as u8,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.sector_offset == 0
    }
}

/// Inflated payload of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellPayload {
    Absent,
    Inflated(Vec<u8>),
}

pub type CellResult = Result<CellPayload>;

/// Parsed region header over a borrowed copy of the whole file.
#[derive(Debug)]
pub struct RegionFile<'a> {
    bytes: &'a [u8],
    entries: Vec<RegionIndexEntry>,
    geometry: RegionGeometry,
}

impl<'a> RegionFile<'a> {
    pub fn parse(bytes: &'a [u8], geometry: RegionGeometry) -> Result<Self> {
        geometry.validate()?;
        if bytes.len() < geometry.header_len() {
            return Err(StrataError::MalformedHeader {
                expected: geometry.header_len(),
                found: bytes.len(),
            });
        }

        let entries = bytes[..geometry.cell_count() * 4]
            .chunks_exact(4)
            .map(|word| RegionIndexEntry::from_pointer(BigEndian::read_u32(word)))
            .collect();

        Ok(RegionFile {
            bytes,
            entries,
            geometry,
        })
    }

    pub fn entries(&self) -> &[RegionIndexEntry] {
        &self.entries
    }

    pub fn geometry(&self) -> &RegionGeometry {
        &self.geometry
    }

    /// Compressed bytes of cell `index`, `None` for an absent cell.
    pub fn compressed_payload(&self, index: usize) -> Result<Option<&'a [u8]>> {
        let entry = match self.entries.get(index) {
            Some(entry) if !entry.is_absent() => *entry,
            _ => return Ok(None),
        };

        let start = (entry.sector_offset as usize)
            .checked_mul(self.geometry.sector_size)
            .ok_or(StrataError::OutOfBounds {
                offset: usize::MAX,
                length: 4,
                available: self.bytes.len(),
            })?;
        let declared = self.slice(start, 4)?;
        let declared_length = BigEndian::read_u32(declared) as usize;
        if declared_length == 0 {
            // The length covers the compression byte, so zero cannot be valid.
            return Err(StrataError::OutOfBounds {
                offset: start + 4,
                length: 1,
                available: 0,
            });
        }

        // The slice above ends at `start + 4`, so these offsets cannot overflow.
        let method = self.slice(start + 4, 1)?[0];
        if method != COMPRESSION_ZLIB {
            return Err(StrataError::UnsupportedCompression(method));
        }

        log(
            format!(
                "Cell {} at sector {} ({} sectors, {} bytes)",
                index, entry.sector_offset, entry.sector_count, declared_length
            ),
            Debug,
        );
        self.slice(start + 5, declared_length - 1).map(Some)
    }

    /// Compressed payload of cell `index`, inflated.
    pub fn cell_payload(&self, index: usize) -> CellResult {
        match self.compressed_payload(index)? {
            None => Ok(CellPayload::Absent),
            Some(compressed) => inflate(compressed).map(CellPayload::Inflated),
        }
    }

    fn slice(&self, offset: usize, length: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(length)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(StrataError::OutOfBounds {
                offset,
                length,
                available: self.bytes.len(),
            })
    }
}

pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(StrataError::DecompressionFailure)?;
    Ok(inflated)
}

/// Reads the region file at `path` and inflates every cell. Only an
/// unreadable file or a truncated header fail the whole call; everything
/// else is reported per cell.
pub fn read_container<P: AsRef<Path>>(path: P, geometry: RegionGeometry) -> Result<Vec<CellResult>> {
    let bytes = std::fs::read(path)?;
    let region = RegionFile::parse(&bytes, geometry)?;
    Ok((0..geometry.cell_count())
        .map(|index| region.cell_payload(index))
        .collect())
}
