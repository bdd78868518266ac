use serde::{Deserialize, Serialize};

use crate::error::StrataError;

pub type Result<T> = std::result::Result<T, crate::error::StrataError>;

/// Slot of a cell inside the region grid, `(x, z)`.
pub type CellSlot = (u8, u8);

/// Largest sector offset a 24-bit pointer can hold.
pub const MAX_SECTOR_OFFSET: usize = 0xFF_FFFF;

/// Upper bound on section and grid sizes; array lengths in the tag stream
/// are signed 32-bit.
pub const MAX_ARRAY_LEN: usize = i32::MAX as usize;

fn checked_product(factors: &[usize]) -> Option<usize> {
    factors
        .iter()
        .try_fold(1usize, |product, &factor| product.checked_mul(factor))
}

/// Geometry of a region container and of the grids decoded from it.
///
/// The defaults describe the only format observed in the wild: 32x32 cells,
/// 4 KiB sectors, 16^3 sections stacked into a 256 tall column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionGeometry {
    pub region_dim: usize,
    pub sector_size: usize,
    pub section_dim: usize,
    pub column_height: usize,
}

impl Default for RegionGeometry {
    fn default() -> Self {
        RegionGeometry {
            region_dim: 32,
            sector_size: 4096,
            section_dim: 16,
            column_height: 256,
        }
    }
}

impl RegionGeometry {
    /// Rejects geometries whose derived sizes cannot be computed without
    /// overflow. The size accessors below assume a validated geometry.
    pub fn validate(&self) -> Result<()> {
        if self.region_dim == 0
            || self.sector_size == 0
            || self.section_dim == 0
            || self.column_height == 0
        {
            return Err(StrataError::InvalidGeometry(
                "dimensions must be non-zero".to_owned(),
            ));
        }
        if self.region_dim > 256 {
            return Err(StrataError::InvalidGeometry(format!(
                "region dimension {} does not fit a u8 slot",
                self.region_dim
            )));
        }
        // Payload header of the furthest sector must still be addressable.
        if MAX_SECTOR_OFFSET
            .checked_mul(self.sector_size)
            .and_then(|start| start.checked_add(5))
            .is_none()
        {
            return Err(StrataError::InvalidGeometry(format!(
                "sector size {} overflows the furthest sector offset",
                self.sector_size
            )));
        }
        let volume = checked_product(&[self.section_dim, self.section_dim, self.section_dim]);
        if !matches!(volume, Some(volume) if volume <= MAX_ARRAY_LEN) {
            return Err(StrataError::InvalidGeometry(format!(
                "section dimension {} is too large",
                self.section_dim
            )));
        }
        let grid = checked_product(&[self.section_dim, self.column_height, self.section_dim]);
        if !matches!(grid, Some(grid) if grid <= MAX_ARRAY_LEN) {
            return Err(StrataError::InvalidGeometry(format!(
                "column of {} x {} x {} is too large",
                self.section_dim, self.column_height, self.section_dim
            )));
        }
        if self.column_height % self.section_dim != 0 {
            return Err(StrataError::InvalidGeometry(format!(
                "column height {} is not a multiple of section dimension {}",
                self.column_height, self.section_dim
            )));
        }
        if self.section_count() > 256 {
            return Err(StrataError::InvalidGeometry(format!(
                "{} sections do not fit a u8 vertical index",
                self.section_count()
            )));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.region_dim * self.region_dim
    }

    /// Sector pointers followed by timestamps, four bytes each.
    pub fn header_len(&self) -> usize {
        self.cell_count() * 8
    }

    pub fn section_volume(&self) -> usize {
        self.section_dim * self.section_dim * self.section_dim
    }

    pub fn section_count(&self) -> usize {
        self.column_height / self.section_dim
    }

    pub fn grid_len(&self) -> usize {
        self.section_dim * self.column_height * self.section_dim
    }

    /// Maps a signed cell coordinate to a slot index as
    /// `dim - (|coord| % dim) - 1`.
    ///
    /// Existing `.vdat` file names depend on this mapping. It has not been
    /// checked against the container's own indexing (`coord & (dim - 1)`),
    /// which disagrees for every non-negative coordinate.
    pub fn normalize_coordinate(&self, coord: i32) -> u8 {
        let dim = self.region_dim as u32;
        (dim - (coord.unsigned_abs() % dim) - 1) as u8
    }

    pub fn slot_for(&self, x: i32, z: i32) -> CellSlot {
        (self.normalize_coordinate(x), self.normalize_coordinate(z))
    }
}
