//! Clone Minecraft Anvil region files to another region grid position.
//!
//! A region file stores a 32x32 group of chunks, and every chunk embeds its
//! own absolute world position inside its zlib-compressed NBT payload. A raw
//! byte copy of a region therefore still points back at the original
//! location; a clone has to rewrite each coordinate-bearing tag while it
//! copies.
//!
//! The crate reads the source region through [`RegionReader`], streams every
//! present chunk through inflate, the [`NbtRewriter`] and deflate, and packs
//! the results into a fresh sector layout with [`clone_region`]. The
//! timestamp table is carried over verbatim.
//!
//! ```no_run
//! use anvil_clone::{clone_region_file, RegionPosition};
//!
//! let from = RegionPosition::new(0, 0);
//! let to = RegionPosition::new(1, 2);
//!
//! clone_region_file(
//!     "world/region/r.0.0.mca",
//!     "world/region/r.1.2.mca",
//!     from,
//!     to,
//! )
//! .unwrap();
//! ```

pub mod clone;
pub mod error;
pub mod position;
pub mod provider;
pub mod region;
pub mod rewrite;
pub mod zip_region_provider;

pub use crate::clone::{clone_region, clone_region_file};
pub use crate::error::{ChunkReadError, CloneError, NbtError};
pub use crate::position::{Displacement, RegionPosition};
pub use crate::provider::FolderRegionProvider;
pub use crate::region::RegionReader;
pub use crate::rewrite::NbtRewriter;
pub use crate::zip_region_provider::{ZipProviderError, ZipRegionProvider};
