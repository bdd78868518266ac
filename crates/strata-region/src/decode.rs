use crate::assembler::{assemble_cell, AssembledCell};
use crate::container::{CellPayload, RegionFile};
use crate::grid::VoxelGrid;
use std::collections::BTreeMap;
use std::path::Path;
use strata_common::{CellSlot, RegionGeometry, Result, StrataError};
use strata_logger::{log, LogSeverity::Error};

/// A cell that could not be decoded, by index in the region header.
#[derive(Debug)]
pub struct CellFailure {
    pub index: usize,
    pub error: StrataError,
}

/// Grids of every decoded cell keyed by slot, plus the cells that failed.
#[derive(Debug, Default)]
pub struct RegionDecode {
    pub grids: BTreeMap<CellSlot, VoxelGrid>,
    pub failures: Vec<CellFailure>,
    /// Cells with no payload or with no sections.
    pub absent: usize,
    owners: BTreeMap<CellSlot, usize>,
}

impl RegionDecode {
    /// Files the outcome of decoding cell `index`. A slot that is already
    /// taken keeps its grid and the newcomer is reported as a collision.
    pub fn record(&mut self, index: usize, outcome: Result<Option<AssembledCell>>) {
        match outcome {
            Ok(Some(cell)) => {
                if let Some(&first) = self.owners.get(&cell.slot) {
                    self.fail(
                        index,
                        StrataError::SlotCollision {
                            slot: cell.slot,
                            first,
                        },
                    );
                } else {
                    self.owners.insert(cell.slot, index);
                    self.grids.insert(cell.slot, cell.grid);
                }
            }
            Ok(None) => self.absent += 1,
            Err(error) => self.fail(index, error),
        }
    }

    /// Header index of the cell that filled `slot`.
    pub fn owner(&self, slot: CellSlot) -> Option<usize> {
        self.owners.get(&slot).copied()
    }

    fn fail(&mut self, index: usize, error: StrataError) {
        log(format!("Cell {} failed: {}", index, error), Error);
        self.failures.push(CellFailure { index, error });
    }
}

/// Reads, inflates and assembles cell `index` of `region`.
pub fn decode_cell(region: &RegionFile<'_>, index: usize) -> Result<Option<AssembledCell>> {
    match region.cell_payload(index)? {
        CellPayload::Absent => Ok(None),
        CellPayload::Inflated(payload) => assemble_cell(&payload, *region.geometry()),
    }
}

/// Decodes every cell of an in-memory region file. Only a malformed header
/// fails the call; per-cell problems end up in [`RegionDecode::failures`].
pub fn decode_container(bytes: &[u8], geometry: RegionGeometry) -> Result<RegionDecode> {
    let region = RegionFile::parse(bytes, geometry)?;
    let mut decode = RegionDecode::default();
    for index in 0..geometry.cell_count() {
        decode.record(index, decode_cell(&region, index));
    }
    Ok(decode)
}

pub fn decode_region_file<P: AsRef<Path>>(path: P, geometry: RegionGeometry) -> Result<RegionDecode> {
    let bytes = std::fs::read(path)?;
    decode_container(&bytes, geometry)
}
