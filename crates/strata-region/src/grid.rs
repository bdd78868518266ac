use strata_common::{RegionGeometry, Result, StrataError};

/// Dense column of voxel identifiers for one cell, logically `[x][y][z]`.
///
/// Storage follows the section layout (`y`, then `z`, then `x`), so a
/// section's identifiers keep their relative order inside the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    width: usize,
    height: usize,
    depth: usize,
    voxels: Vec<u8>,
}

impl VoxelGrid {
    pub fn new(geometry: &RegionGeometry) -> Self {
        let (width, height, depth) = (
            geometry.section_dim,
            geometry.column_height,
            geometry.section_dim,
        );
        VoxelGrid {
            width,
            height,
            depth,
            voxels: vec![0; width * height * depth],
        }
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        (y * self.depth + z) * self.width + x
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.voxels[self.index(x, y, z)]
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, id: u8) {
        let index = self.index(x, y, z);
        self.voxels[index] = id;
    }

    /// Rebuilds a grid from the bytes produced by [`serialize_grid`].
    pub fn from_serialized(bytes: &[u8], geometry: &RegionGeometry) -> Result<Self> {
        let mut grid = VoxelGrid::new(geometry);
        if bytes.len() != grid.len() {
            return Err(StrataError::GridSizeMismatch {
                expected: grid.len(),
                found: bytes.len(),
            });
        }

        let (height, depth) = (grid.height, grid.depth);
        for x in 0..grid.width {
            for y in 0..height {
                for z in 0..depth {
                    grid.set(x, y, z, bytes[(x * height + y) * depth + z]);
                }
            }
        }
        Ok(grid)
    }
}

/// Flattens a grid into its on-disk order: `x` outermost, then `y`, then `z`,
/// so byte `x * height * depth + y * depth + z` holds voxel `(x, y, z)`.
pub fn serialize_grid(grid: &VoxelGrid) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(grid.len());
    for x in 0..grid.width {
        for y in 0..grid.height {
            for z in 0..grid.depth {
                bytes.push(grid.get(x, y, z));
            }
        }
    }
    bytes
}
