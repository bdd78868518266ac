//! Decoding of region containers into dense voxel grids.
//!
//! A region file holds up to `region_dim^2` cells, each a zlib-compressed
//! NBT stream. [`container`] locates and inflates the streams, [`walker`]
//! pulls coordinates and sections out of them, [`assembler`] builds the
//! grids and [`grid`] writes them out.

pub mod assembler;
pub mod container;
pub mod decode;
pub mod grid;
pub mod walker;

pub use assembler::{assemble_cell, AssembledCell, CellAssembler, SectionData};
pub use container::{read_container, CellPayload, CellResult, RegionFile, RegionIndexEntry};
pub use decode::{decode_cell, decode_container, decode_region_file, CellFailure, RegionDecode};
pub use grid::{serialize_grid, VoxelGrid};
pub use walker::{walk, TagVisitor};
