use crate::error::CloneError;
use crate::position::{Displacement, RegionPosition};
use crate::region::RegionReader;
use crate::rewrite::NbtRewriter;
use byteorder::{BigEndian, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;
use std::fs::OpenOptions;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Region sector length in bytes.
const SECTOR_BYTES_LENGTH: usize = 4096;
/// Length of the region header in bytes: one sector of chunk locations
/// followed by one sector of timestamps.
const REGION_HEADER_BYTES_LENGTH: u64 = SECTOR_BYTES_LENGTH as u64 * 2;
/// First sector available for chunk data.
const FIRST_DATA_SECTOR: u32 = 2;
/// Zlib compression type value.
const ZLIB_COMPRESSION_TYPE: u8 = 2;

/// Zero padding written after each chunk to align the next sector.
const SECTOR_PADDING: [u8; SECTOR_BYTES_LENGTH] = [0u8; SECTOR_BYTES_LENGTH];

/// Clones a whole region into `destination`, displacing every
/// coordinate-bearing tag.
///
/// Chunks are re-packed in (z, x) order starting at sector 2, so the
/// destination layout is compact and deterministic while chunk grid indices
/// match the source exactly. The timestamp table is copied verbatim. The two
/// header tables are written last, after all payloads are flushed: an
/// interrupted clone leaves a destination whose header never points at
/// partially-written payloads, and the caller discards it.
///
/// Chunks are recompressed with deflate level 1; one zlib inflater and one
/// deflater are reused for the whole clone and reset between chunks.
pub fn clone_region<S, D>(
    reader: &mut RegionReader<S>,
    mut destination: D,
    displacement: Displacement,
) -> Result<(), CloneError>
where
    S: Read + Seek,
    D: Write + Seek,
{
    let rewriter = NbtRewriter::new(displacement);

    let mut decoder = ZlibDecoder::new(Cursor::new(Vec::new()));
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(1));

    let mut locations = [0u8; SECTOR_BYTES_LENGTH];
    let mut next_sector = FIRST_DATA_SECTOR;

    let mut inflated = Vec::new();
    let mut rewritten = Vec::new();

    destination.seek(SeekFrom::Start(REGION_HEADER_BYTES_LENGTH))?;

    for chunk_z in 0..32u8 {
        for chunk_x in 0..32u8 {
            let offset = reader.offset(chunk_x, chunk_z);
            let sectors = reader.sectors(chunk_x, chunk_z);

            // An all-zero entry means the chunk has not been generated; its
            // destination entry stays zero as well.
            if offset == 0 && sectors == 0 {
                continue;
            }

            let compressed = reader.chunk_compressed(offset)?;

            decoder.reset(Cursor::new(compressed));
            inflated.clear();
            decoder
                .read_to_end(&mut inflated)
                .map_err(|io_error| CloneError::Compression { io_error })?;

            rewritten.clear();
            rewriter.rewrite(&mut inflated.as_slice(), &mut rewritten)?;

            encoder
                .write_all(&rewritten)
                .map_err(|io_error| CloneError::Compression { io_error })?;
            let chunk_data = encoder
                .reset(Vec::new())
                .map_err(|io_error| CloneError::Compression { io_error })?;

            // 4 bytes for the length field plus the compression scheme byte.
            let part_length = chunk_data.len() + 5;
            let required_sectors =
                ((part_length + SECTOR_BYTES_LENGTH - 1) / SECTOR_BYTES_LENGTH) as u32;

            if required_sectors > u8::max_value() as u32 {
                return Err(CloneError::SectorOverflow {
                    chunk_x,
                    chunk_z,
                    sectors: required_sectors,
                });
            }

            let padding_length = required_sectors as usize * SECTOR_BYTES_LENGTH - part_length;

            destination.write_u32::<BigEndian>(chunk_data.len() as u32)?;
            destination.write_u8(ZLIB_COMPRESSION_TYPE)?;
            destination.write_all(&chunk_data)?;

            if padding_length > 0 {
                destination.write_all(&SECTOR_PADDING[..padding_length])?;
            }

            let location_offset =
                (chunk_z as usize * 32 + chunk_x as usize) * 4;

            locations[location_offset] = (next_sector >> 16) as u8;
            locations[location_offset + 1] = (next_sector >> 8) as u8;
            locations[location_offset + 2] = next_sector as u8;
            locations[location_offset + 3] = required_sectors as u8;

            debug!(
                target: "anvil-clone",
                "chunk x: {}, z: {} repacked into {} sectors at sector {}",
                chunk_x,
                chunk_z,
                required_sectors,
                next_sector
            );

            next_sector += required_sectors;
        }
    }

    // Headers go in last so an aborted clone never leaves a location table
    // pointing at missing payloads.
    destination.flush()?;
    destination.seek(SeekFrom::Start(0))?;
    destination.write_all(&locations)?;
    destination.write_all(reader.timestamps())?;
    destination.flush()?;

    Ok(())
}

/// Clones the region file at `from` into a new region file at `to`,
/// displacing coordinates by the delta between the two region positions.
///
/// The destination file is created if missing and truncated otherwise.
pub fn clone_region_file<P, Q>(
    from: P,
    to: Q,
    from_position: RegionPosition,
    to_position: RegionPosition,
) -> Result<(), CloneError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let displacement = Displacement::between(from_position, to_position);
    let mut reader = RegionReader::open(from)?;

    let destination = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(to)?;
    destination.set_len(REGION_HEADER_BYTES_LENGTH)?;

    clone_region(&mut reader, destination, displacement)
}
