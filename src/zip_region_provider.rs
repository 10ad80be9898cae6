use crate::position::RegionPosition;
use crate::region::RegionReader;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

pub use zip::result::ZipError;

/// Serves regions out of a zipped world folder, for example a world backup.
///
/// Regions are extracted into an in-memory cache, so each region file is
/// only decompressed once. The archive is never written to; cloning out of
/// a backup always targets a destination outside the archive.
#[derive(Debug)]
pub struct ZipRegionProvider<R: Read + Seek> {
    zip_archive: ZipArchive<R>,
    // Prefix for the region folder. Must end with "/".
    // For example: "region/", "world/region/" or "saves/world/region/"
    region_prefix: String,
    // Cache (region_x, region_z) to extracted file contents.
    cache: HashMap<(i32, i32), Vec<u8>>,
}

#[derive(Debug)]
pub enum ZipProviderError {
    Io(io::Error),
    Zip(ZipError),
    RegionFolderNotFound,
    MoreThanOneRegionFolder,
    RegionNotFound { region_x: i32, region_z: i32 },
}

impl From<io::Error> for ZipProviderError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ZipError> for ZipProviderError {
    fn from(e: ZipError) -> Self {
        Self::Zip(e)
    }
}

// Find the path of the region folder inside the zip archive.
// For example: "region/", "world/region/" or "saves/world/region/"
fn find_region_folder_path<R: Read + Seek>(
    zip_archive: &mut ZipArchive<R>,
) -> Result<String, ZipProviderError> {
    let mut region_prefix = String::from("/");
    let mut found_region_count = 0;
    for i in 0..zip_archive.len() {
        // This unwrap is safe because we are iterating from 0 to len
        let file = zip_archive.by_index(i).unwrap();
        let full_path = file.mangled_name();
        // file_name() returns None when the path ends with "/.."
        // we handle that case as an empty string
        let folder_name = full_path.file_name().unwrap_or_default();
        if folder_name == "region" {
            found_region_count += 1;
            region_prefix = file.name().to_string();
            // Keep searching after finding the first folder, to make sure
            // there is only one region/ folder
        }
    }
    if found_region_count == 0 {
        return Err(ZipProviderError::RegionFolderNotFound);
    }
    if found_region_count > 1 {
        return Err(ZipProviderError::MoreThanOneRegionFolder);
    }

    Ok(region_prefix)
}

impl<R: Read + Seek> ZipRegionProvider<R> {
    pub fn new(reader: R) -> Result<Self, ZipProviderError> {
        let mut zip_archive = ZipArchive::new(reader)?;
        let region_prefix = find_region_folder_path(&mut zip_archive)?;
        let cache = HashMap::new();

        Ok(ZipRegionProvider {
            zip_archive,
            region_prefix,
            cache,
        })
    }

    fn region_path(&self, position: RegionPosition) -> String {
        format!("{}{}", self.region_prefix, position.filename())
    }

    /// Extracts the region at the given position and loads its header.
    ///
    /// The returned reader owns a copy of the extracted bytes, so it stays
    /// usable independently of the provider.
    pub fn get_region(
        &mut self,
        position: RegionPosition,
    ) -> Result<RegionReader<Cursor<Vec<u8>>>, ZipProviderError> {
        if let Some(buf) = self.cache.get(&(position.x, position.z)) {
            return Ok(RegionReader::load(Cursor::new(buf.clone()))?);
        }

        let region_path = self.region_path(position);

        let mut region_file = match self.zip_archive.by_name(&region_path) {
            Ok(x) => x,
            Err(ZipError::FileNotFound) => {
                return Err(ZipProviderError::RegionNotFound {
                    region_x: position.x,
                    region_z: position.z,
                })
            }
            Err(e) => return Err(ZipProviderError::Zip(e)),
        };

        let uncompressed_size = region_file.size();
        let mut buf = Vec::with_capacity(uncompressed_size as usize);
        region_file.read_to_end(&mut buf)?;

        let region = RegionReader::load(Cursor::new(buf.clone()))?;
        self.cache.insert((position.x, position.z), buf);

        Ok(region)
    }
}

impl ZipRegionProvider<File> {
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self, ZipProviderError> {
        let file = OpenOptions::new()
            .write(false)
            .read(true)
            .create(false)
            .open(path)?;

        Self::new(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clone::clone_region;
    use crate::position::Displacement;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn world_backup(region_files: &[(&str, Vec<u8>)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        writer.add_directory("world/region", options).unwrap();
        for (name, contents) in region_files {
            writer
                .start_file(format!("world/region/{}", name), options)
                .unwrap();
            writer.write_all(contents).unwrap();
        }

        writer.finish().unwrap()
    }

    fn empty_region_bytes() -> Vec<u8> {
        let mut data = vec![0u8; 8192];
        data[4200] = 0x77;
        data
    }

    #[test]
    fn read_empty_buffer_as_zip() {
        // Try to read an empty buffer as a zip file
        let zip = b"";

        let z = ZipRegionProvider::new(Cursor::new(zip.to_vec()));

        match z.err().unwrap() {
            ZipProviderError::Zip(_) => {}
            e => panic!("Expected `Zip` but got `{:?}`", e),
        }
    }

    #[test]
    fn read_small_valid_zip() {
        // Smallest possible valid zip file:
        let zip = b"\x50\x4B\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0";

        // Reading works but since it has zero entries, the region/ folder
        // does not exist
        let z = ZipRegionProvider::new(Cursor::new(zip.to_vec()));

        match z {
            Err(ZipProviderError::RegionFolderNotFound) => {}
            e => panic!("Expected `RegionFolderNotFound` but got `{:?}`", e),
        }
    }

    #[test]
    fn read_zip_with_empty_region_folder() {
        let backup = world_backup(&[]);
        let mut provider = ZipRegionProvider::new(backup).unwrap();

        let err = provider.get_region(RegionPosition::new(0, 0)).unwrap_err();

        match err {
            ZipProviderError::RegionNotFound {
                region_x: 0,
                region_z: 0,
            } => {}
            e => panic!("Expected `RegionNotFound` but got `{:?}`", e),
        }
    }

    #[test]
    fn read_zip_with_region_file() {
        let backup = world_backup(&[("r.0.0.mca", empty_region_bytes())]);
        let mut provider = ZipRegionProvider::new(backup).unwrap();

        let region = provider.get_region(RegionPosition::new(0, 0)).unwrap();

        assert_eq!(region.timestamps()[104], 0x77);

        // A second lookup is served from the cache.
        let cached = provider.get_region(RegionPosition::new(0, 0)).unwrap();
        assert_eq!(cached.timestamps()[104], 0x77);
    }

    #[test]
    fn clone_region_out_of_backup() {
        let backup = world_backup(&[("r.-1.3.mca", empty_region_bytes())]);
        let mut provider = ZipRegionProvider::new(backup).unwrap();

        let mut reader = provider.get_region(RegionPosition::new(-1, 3)).unwrap();
        let mut destination = Cursor::new(Vec::new());

        let displacement = Displacement::between(
            RegionPosition::new(-1, 3),
            RegionPosition::new(0, 0),
        );

        clone_region(&mut reader, &mut destination, displacement).unwrap();

        let cloned = destination.into_inner();
        assert_eq!(cloned.len(), 8192);
        assert_eq!(cloned[4200], 0x77);
    }
}
