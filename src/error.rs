use std::io;

/// Possible errors while reading a chunk payload from a region file.
#[derive(Debug)]
pub enum ChunkReadError {
    /// Chunk length overlaps declared maximum.
    ///
    /// This should not occur under normal conditions.
    ///
    /// Region file is corrupted.
    LengthExceedsMaximum {
        /// Chunk length.
        length: u32,
        /// Chunk maximum expected length.
        maximum_length: u32,
    },
    /// Region files compress chunks with Gzip (1) or Zlib (2), and in
    /// practice only Zlib is ever written. Any other scheme byte would be
    /// fed to the wrong decoder, so it is rejected up front.
    UnsupportedCompressionScheme {
        /// Compression scheme type id.
        compression_scheme: u8,
    },
    /// I/O error which happened while reading chunk data from the region file.
    Io { io_error: io::Error },
}

impl From<io::Error> for ChunkReadError {
    fn from(io_error: io::Error) -> Self {
        ChunkReadError::Io { io_error }
    }
}

/// Possible errors while walking a chunk's NBT stream.
#[derive(Debug)]
pub enum NbtError {
    /// Tag id outside the closed 0..12 domain at a position where a tag id
    /// is required. Continuing would desynchronize the byte stream.
    UnknownTagId {
        /// The offending tag id.
        tag_id: u8,
    },
    /// A length field (array, list, string or tag name) decoded negative.
    NegativeLength {
        /// The decoded length.
        length: i32,
    },
    /// Short read or other I/O failure on the underlying stream.
    Io { io_error: io::Error },
}

impl From<io::Error> for NbtError {
    fn from(io_error: io::Error) -> Self {
        NbtError::Io { io_error }
    }
}

/// Possible errors while cloning a region file.
#[derive(Debug)]
pub enum CloneError {
    /// I/O error on the source header or the destination file.
    Io { io_error: io::Error },
    /// Failure while reading a chunk payload from the source region.
    ChunkRead { chunk_read_error: ChunkReadError },
    /// Inflate or deflate failure on a chunk payload.
    Compression { io_error: io::Error },
    /// Malformed NBT inside a chunk payload.
    Nbt { nbt_error: NbtError },
    /// A rewritten chunk does not fit in the 8-bit sector count of its
    /// location table entry.
    SectorOverflow {
        /// The (relative) chunk X coordinate.
        chunk_x: u8,
        /// The (relative) chunk Z coordinate.
        chunk_z: u8,
        /// Sectors the rewritten chunk would require.
        sectors: u32,
    },
}

impl From<io::Error> for CloneError {
    fn from(io_error: io::Error) -> Self {
        CloneError::Io { io_error }
    }
}

impl From<ChunkReadError> for CloneError {
    fn from(chunk_read_error: ChunkReadError) -> Self {
        CloneError::ChunkRead { chunk_read_error }
    }
}

impl From<NbtError> for CloneError {
    fn from(nbt_error: NbtError) -> Self {
        CloneError::Nbt { nbt_error }
    }
}
