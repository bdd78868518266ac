use crate::grid::VoxelGrid;
use crate::walker::{walk, TagVisitor};
use strata_common::{Axis, CellSlot, RegionGeometry, Result, StrataError};

/// One vertical slab of a cell: the section's identifiers, `y`-major as
/// stored in the stream, and the band of the column they belong to.
#[derive(Debug, Clone, Copy)]
pub struct SectionData<'a> {
    pub vertical_index: u8,
    pub identifiers: &'a [u8],
}

/// A fully decoded cell, ready to be filed in the region grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledCell {
    pub coordinate: (i32, i32),
    pub slot: CellSlot,
    pub grid: VoxelGrid,
}

/// Builds a cell's grid from the values reported by the walker.
///
/// `Y` and `Blocks` of a section may arrive in either order; whichever comes
/// first is held until its partner shows up.
pub struct CellAssembler {
    geometry: RegionGeometry,
    x: Option<i32>,
    z: Option<i32>,
    pending_index: Option<u8>,
    pending_identifiers: Option<Vec<u8>>,
    committed: Vec<bool>,
    grid: Option<VoxelGrid>,
}

impl CellAssembler {
    pub fn new(geometry: RegionGeometry) -> Self {
        CellAssembler {
            geometry,
            x: None,
            z: None,
            pending_index: None,
            pending_identifiers: None,
            committed: vec![false; geometry.section_count()],
            grid: None,
        }
    }

    pub fn sections_committed(&self) -> usize {
        self.committed.iter().filter(|&&done| done).count()
    }

    /// Scatters a section into its band of the grid, allocating the grid on
    /// the first commit. Section index `y * dim^2 + z * dim + x` lands on
    /// `(x, y + vertical_index * dim, z)`.
    pub fn commit(&mut self, section: SectionData<'_>) -> Result<()> {
        if section.identifiers.len() != self.geometry.section_volume() {
            return Err(StrataError::InvalidBlockArray {
                expected: self.geometry.section_volume(),
                found: section.identifiers.len(),
            });
        }
        let band = section.vertical_index as usize;
        match self.committed.get_mut(band) {
            None => {
                return Err(StrataError::VerticalIndexOutOfRange {
                    index: section.vertical_index,
                    limit: self.geometry.section_count(),
                })
            }
            Some(true) => return Err(StrataError::DuplicateSection(section.vertical_index)),
            Some(done) => *done = true,
        }

        let dim = self.geometry.section_dim;
        let geometry = &self.geometry;
        let grid = self.grid.get_or_insert_with(|| VoxelGrid::new(geometry));
        let base = band * dim;
        for x in 0..dim {
            for y in 0..dim {
                for z in 0..dim {
                    let id = section.identifiers[y * dim * dim + z * dim + x];
                    grid.set(x, y + base, z, id);
                }
            }
        }
        Ok(())
    }

    /// Ends the stream. A half-received section is an error; a cell without
    /// any section is absent rather than an empty grid.
    pub fn finish(self) -> Result<Option<AssembledCell>> {
        if let Some(index) = self.pending_index {
            return Err(StrataError::IncompleteSection(format!(
                "vertical index {} never received its identifiers",
                index
            )));
        }
        if self.pending_identifiers.is_some() {
            return Err(StrataError::IncompleteSection(
                "identifiers never received a vertical index".to_owned(),
            ));
        }

        let grid = match self.grid {
            Some(grid) => grid,
            None => return Ok(None),
        };
        let x = self.x.ok_or(StrataError::MissingCoordinate(Axis::X))?;
        let z = self.z.ok_or(StrataError::MissingCoordinate(Axis::Z))?;

        Ok(Some(AssembledCell {
            coordinate: (x, z),
            slot: self.geometry.slot_for(x, z),
            grid,
        }))
    }
}

impl TagVisitor for CellAssembler {
    fn coordinate(&mut self, axis: Axis, value: i32) -> Result<()> {
        match axis {
            Axis::X => self.x = Some(value),
            Axis::Z => self.z = Some(value),
        }
        Ok(())
    }

    fn vertical_index(&mut self, index: u8) -> Result<()> {
        if let Some(previous) = self.pending_index {
            return Err(StrataError::IncompleteSection(format!(
                "vertical index {} superseded by {} before its identifiers arrived",
                previous, index
            )));
        }
        match self.pending_identifiers.take() {
            Some(identifiers) => self.commit(SectionData {
                vertical_index: index,
                identifiers: &identifiers,
            }),
            None => {
                self.pending_index = Some(index);
                Ok(())
            }
        }
    }

    fn identifiers(&mut self, identifiers: &[u8]) -> Result<()> {
        if self.pending_identifiers.is_some() {
            return Err(StrataError::IncompleteSection(
                "identifiers superseded before a vertical index arrived".to_owned(),
            ));
        }
        match self.pending_index.take() {
            Some(vertical_index) => self.commit(SectionData {
                vertical_index,
                identifiers,
            }),
            None => {
                self.pending_identifiers = Some(identifiers.to_vec());
                Ok(())
            }
        }
    }
}

/// Walks one inflated cell payload and assembles its grid.
pub fn assemble_cell(payload: &[u8], geometry: RegionGeometry) -> Result<Option<AssembledCell>> {
    geometry.validate()?;
    let mut assembler = CellAssembler::new(geometry);
    walk(payload, &mut assembler)?;
    assembler.finish()
}
