use std::io;
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

/// Position of a region on the 512x512 block region grid.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
pub struct RegionPosition {
    pub x: i32,
    pub z: i32,
}

impl RegionPosition {
    pub fn new(x: i32, z: i32) -> RegionPosition {
        RegionPosition { x, z }
    }

    pub fn from_chunk_position(chunk_x: i32, chunk_z: i32) -> RegionPosition {
        let x = chunk_x >> 5;
        let z = chunk_z >> 5;

        RegionPosition::new(x, z)
    }

    /// Returns the position of the region containing the given block column.
    pub fn from_block_position(block_x: i32, block_z: i32) -> RegionPosition {
        let x = block_x.div_euclid(512);
        let z = block_z.div_euclid(512);

        RegionPosition::new(x, z)
    }

    pub fn from_filename(path: &Path) -> Result<RegionPosition, io::Error> {
        // we can use lossy because of the bound check later
        let filename = path.file_name().unwrap_or_default().to_string_lossy();

        let parts: Vec<_> = filename.split('.').collect();

        let (x, z) = parse_coords(parts).map_err(|_| io::ErrorKind::InvalidInput)?;

        Ok(RegionPosition::new(x, z))
    }

    pub fn filename(self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }
}

fn parse_coords(parts: Vec<&str>) -> Result<(i32, i32), ParseIntError> {
    let incorrect_format = parts.len() != 4 || parts[0] != "r" || parts[3] != "mca";

    if incorrect_format {
        // to throw the error (cant instantiate from outside)
        i32::from_str("")?;
    }

    Ok((i32::from_str(parts[1])?, i32::from_str(parts[2])?))
}

/// Signed additive offsets applied to coordinate-bearing tags when a region
/// is cloned to another grid position.
///
/// A region is 32 chunks across and a chunk is 16 blocks across, so moving a
/// region by one grid step displaces chunk coordinates by 32 and block
/// coordinates by 512.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
pub struct Displacement {
    /// Offset added to chunk X coordinates.
    pub chunk_x: i32,
    /// Offset added to chunk Z coordinates.
    pub chunk_z: i32,
    /// Offset added to block X coordinates.
    pub block_x: i32,
    /// Offset added to block Z coordinates.
    pub block_z: i32,
}

impl Displacement {
    /// Returns the displacement a clone from `from` to `to` applies.
    pub fn between(from: RegionPosition, to: RegionPosition) -> Displacement {
        let chunk_x = (to.x - from.x) * 32;
        let chunk_z = (to.z - from.z) * 32;

        Displacement {
            chunk_x,
            chunk_z,
            block_x: chunk_x * 16,
            block_z: chunk_z * 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::position::{Displacement, RegionPosition};
    use std::path::PathBuf;

    #[test]
    fn test_position_parse() {
        let mut path = PathBuf::new();
        path.set_file_name("r.-1.1.mca");

        let pos = RegionPosition::from_filename(&path).unwrap();
        assert_eq!(RegionPosition { x: -1, z: 1 }, pos)
    }

    #[test]
    #[should_panic]
    fn test_position_parse_invalid_format() {
        let mut path = PathBuf::new();
        path.set_file_name("this is not a valid region.filename");

        RegionPosition::from_filename(&path).unwrap();
    }

    #[test]
    fn test_position_filename() {
        assert_eq!(RegionPosition::new(-3, 12).filename(), "r.-3.12.mca");
    }

    #[test]
    fn test_position_from_chunk() {
        assert_eq!(
            RegionPosition::from_chunk_position(33, -1),
            RegionPosition::new(1, -1)
        );
    }

    #[test]
    fn test_position_from_block() {
        assert_eq!(
            RegionPosition::from_block_position(511, 512),
            RegionPosition::new(0, 1)
        );
        // Negative blocks round towards negative infinity.
        assert_eq!(
            RegionPosition::from_block_position(-1, -513),
            RegionPosition::new(-1, -2)
        );
    }

    #[test]
    fn test_displacement_between() {
        let displacement =
            Displacement::between(RegionPosition::new(0, 0), RegionPosition::new(1, 2));

        assert_eq!(
            displacement,
            Displacement {
                chunk_x: 32,
                chunk_z: 64,
                block_x: 512,
                block_z: 1024,
            }
        );
    }

    #[test]
    fn test_displacement_between_same_region() {
        let position = RegionPosition::new(7, -4);
        let displacement = Displacement::between(position, position);

        assert_eq!(
            displacement,
            Displacement {
                chunk_x: 0,
                chunk_z: 0,
                block_x: 0,
                block_z: 0,
            }
        );
    }
}
