use crate::clone::clone_region;
use crate::error::CloneError;
use crate::position::{Displacement, RegionPosition};
use crate::region::RegionReader;
use std::fs::{read_dir, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Resolves and opens region files inside a world's region folder.
pub struct FolderRegionProvider<'a> {
    /// Folder where region files are located.
    folder_path: &'a Path,
}

impl<'a> FolderRegionProvider<'a> {
    pub fn new(folder: &'a str) -> FolderRegionProvider<'a> {
        let folder_path = Path::new(folder);

        FolderRegionProvider { folder_path }
    }

    /// Returns the path of the region file at the given position.
    pub fn region_path(&self, position: RegionPosition) -> PathBuf {
        self.folder_path.join(position.filename())
    }

    /// Opens the region at the given position for reading.
    pub fn get_region(&self, position: RegionPosition) -> Result<RegionReader<File>, io::Error> {
        let file = OpenOptions::new()
            .read(true)
            .open(self.region_path(position))?;

        RegionReader::load(file)
    }

    /// Creates an empty destination region file at the given position,
    /// truncating any previous content and sizing it to the two header
    /// sectors.
    pub fn create_region_file(&self, position: RegionPosition) -> Result<File, io::Error> {
        if !self.folder_path.exists() {
            fs::create_dir_all(self.folder_path)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.region_path(position))?;
        file.set_len(4096 * 2)?;

        Ok(file)
    }

    // leave implementing this to the specific provider,
    // makes function declaration bearable for now
    pub fn iter_positions(&self) -> Result<impl Iterator<Item = RegionPosition>, io::Error> {
        let positions: Vec<_> = read_dir(self.folder_path)?
            .filter_map(|dir| dir.ok())
            .filter_map(|dir| RegionPosition::from_filename(&dir.path()).ok())
            .collect();

        Ok(positions.into_iter())
    }

    /// Clones the region at `from` to a new region file at `to` inside the
    /// same folder, displacing coordinates by the grid delta.
    pub fn clone_region(
        &self,
        from: RegionPosition,
        to: RegionPosition,
    ) -> Result<(), CloneError> {
        let mut reader = self.get_region(from)?;
        let destination = self.create_region_file(to)?;

        clone_region(&mut reader, destination, Displacement::between(from, to))
    }
}
