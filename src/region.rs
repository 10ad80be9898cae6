use crate::error::ChunkReadError;
use byteorder::{BigEndian, ReadBytesExt};
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Length of each of the two header tables in bytes.
const HEADER_TABLE_LENGTH: usize = 4096;
/// Region sector length in bytes.
const SECTOR_BYTES_LENGTH: u64 = 4096;
/// Maximum chunk length in bytes.
const CHUNK_MAXIMUM_BYTES_LENGTH: u32 = SECTOR_BYTES_LENGTH as u32 * 256;

/// Zlib compression type value.
const ZLIB_COMPRESSION_TYPE: u8 = 2;

/// Read-only view of a region file: the two header tables plus random access
/// to the framed chunk payloads.
///
/// A region stores a 32x32 group of chunks. The first 4096 bytes are the
/// location table (1024 entries of 3-byte sector offset and 1-byte sector
/// count), the next 4096 bytes are the timestamp table, and chunk payloads
/// follow in 4096-byte sectors.
#[derive(Debug)]
pub struct RegionReader<S> {
    /// Source in which the region is stored.
    source: S,
    /// Raw location table.
    locations: [u8; HEADER_TABLE_LENGTH],
    /// Raw timestamp table.
    timestamps: [u8; HEADER_TABLE_LENGTH],
}

/// Index of a chunk's location table entry.
fn location_index(chunk_x: u8, chunk_z: u8) -> usize {
    (((chunk_x & 31) as usize) << 2) + (((chunk_z & 31) as usize) << 7)
}

impl RegionReader<File> {
    /// Opens a region file for random read and loads its header tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<RegionReader<File>, io::Error> {
        let file = OpenOptions::new().read(true).open(path)?;

        RegionReader::load(file)
    }
}

impl<S: Read + Seek> RegionReader<S> {
    /// Loads the two header tables from the source.
    ///
    /// Fails with `UnexpectedEof` if the source is shorter than the 8192
    /// header bytes.
    pub fn load(mut source: S) -> Result<RegionReader<S>, io::Error> {
        let mut locations = [0u8; HEADER_TABLE_LENGTH];
        let mut timestamps = [0u8; HEADER_TABLE_LENGTH];

        source.seek(SeekFrom::Start(0))?;
        source.read_exact(&mut locations)?;
        source.read_exact(&mut timestamps)?;

        Ok(RegionReader {
            source,
            locations,
            timestamps,
        })
    }

    /// Returns the sector offset of a chunk from the location table.
    ///
    /// Coordinates are masked to `0..32` by the entry index formula. A zero
    /// offset together with a zero sector count means the chunk has not been
    /// generated.
    pub fn offset(&self, chunk_x: u8, chunk_z: u8) -> u32 {
        let i = location_index(chunk_x, chunk_z);

        // Offsets are 24 bits wide with the top nibble masked off.
        ((self.locations[i] as u32 & 0x0F) << 16)
            | ((self.locations[i + 1] as u32) << 8)
            | self.locations[i + 2] as u32
    }

    /// Returns the sector count of a chunk from the location table.
    pub fn sectors(&self, chunk_x: u8, chunk_z: u8) -> u8 {
        self.locations[location_index(chunk_x, chunk_z) + 3]
    }

    /// Reads the compressed payload of the chunk stored at the given sector
    /// offset.
    ///
    /// The 5-byte frame header holds the payload length and the compression
    /// scheme byte; only zlib payloads are accepted.
    pub fn chunk_compressed(&mut self, sector_offset: u32) -> Result<Vec<u8>, ChunkReadError> {
        self.source
            .seek(SeekFrom::Start(sector_offset as u64 * SECTOR_BYTES_LENGTH))?;

        let length = self.source.read_u32::<BigEndian>()?;

        if length > CHUNK_MAXIMUM_BYTES_LENGTH {
            return Err(ChunkReadError::LengthExceedsMaximum {
                length,
                maximum_length: CHUNK_MAXIMUM_BYTES_LENGTH,
            });
        }

        let compression_scheme = self.source.read_u8()?;

        if compression_scheme != ZLIB_COMPRESSION_TYPE {
            return Err(ChunkReadError::UnsupportedCompressionScheme {
                compression_scheme,
            });
        }

        let mut buffer = vec![0u8; length as usize];
        self.source.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    /// Returns the raw timestamp table.
    pub fn timestamps(&self) -> &[u8; HEADER_TABLE_LENGTH] {
        &self.timestamps
    }

    /// Consumes the reader, returning the underlying source.
    ///
    /// Dropping the reader releases the source as well.
    pub fn into_inner(self) -> S {
        self.source
    }
}
