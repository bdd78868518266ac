use crate::config::ConverterConfig;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use strata_common::{CellSlot, RegionGeometry, Result, StrataError};
use strata_logger::{log, LogSeverity::*};
use strata_region::{
    decode_cell, serialize_grid, AssembledCell, CellFailure, RegionDecode, RegionFile,
};
use tokio_util::sync::CancellationToken;

/// Batches handed to each worker, per worker. More batches than workers
/// keeps the pool busy when some cells are much larger than others.
const BATCHES_PER_WORKER: usize = 4;

/// Outcome of converting one region file.
#[derive(Debug)]
pub struct ConversionReport {
    pub region: PathBuf,
    pub output_dir: PathBuf,
    pub written: usize,
    pub absent: usize,
    pub failures: Vec<CellFailure>,
}

pub fn is_region_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|extension| extension.to_str()),
        Some("mca") | Some("mcr")
    )
}

/// `<parent>/<output_dir_name>/<region file stem>`
pub fn output_directory(region_path: &Path, config: &ConverterConfig) -> PathBuf {
    let parent = region_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = region_path.file_stem().unwrap_or_default();
    parent.join(&config.output_dir_name).join(stem)
}

pub fn cell_file_name(slot: CellSlot, config: &ConverterConfig) -> String {
    format!("{}.{}.{}", slot.0, slot.1, config.extension)
}

type CellOutcome = (usize, Result<Option<AssembledCell>>);

fn decode_batch(
    bytes: &[u8],
    geometry: RegionGeometry,
    cells: Range<usize>,
    cancel: &CancellationToken,
) -> Result<Vec<CellOutcome>> {
    let region = RegionFile::parse(bytes, geometry)?;
    let mut outcomes = Vec::with_capacity(cells.len());
    for index in cells {
        if cancel.is_cancelled() {
            return Err(StrataError::Cancelled);
        }
        outcomes.push((index, decode_cell(&region, index)));
    }
    Ok(outcomes)
}

fn batches(cell_count: usize, workers: usize) -> Vec<Range<usize>> {
    let size = cell_count
        .div_ceil(workers.saturating_mul(BATCHES_PER_WORKER).max(1))
        .max(1);
    (0..cell_count)
        .step_by(size)
        .map(|start| start..(start + size).min(cell_count))
        .collect()
}

/// Decodes every cell of the region file at `path` on the blocking pool and
/// writes each grid to its own file under [`output_directory`].
///
/// Cell failures are collected in the report; the call itself fails only
/// for unreadable input, a malformed header, a failed write or cancellation.
/// A cancelled run writes nothing.
pub async fn convert_region(
    path: &Path,
    config: &ConverterConfig,
    cancel: CancellationToken,
) -> Result<ConversionReport> {
    config.validate()?;
    let geometry = config.geometry;
    let bytes = Bytes::from(tokio::fs::read(path).await?);
    RegionFile::parse(&bytes, geometry)?;
    log(
        format!("Decoding {} ({} bytes)", path.display(), bytes.len()),
        Info,
    );

    let mut pending = stream::iter(batches(geometry.cell_count(), config.workers))
        .map(|cells| {
            let bytes = bytes.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || decode_batch(&bytes, geometry, cells, &cancel))
        })
        .buffered(config.workers);

    // Batches come back in cell order, so collisions resolve the same way
    // regardless of scheduling.
    let mut decode = RegionDecode::default();
    while let Some(joined) = pending.next().await {
        let outcomes = joined.map_err(io::Error::other)??;
        for (index, outcome) in outcomes {
            decode.record(index, outcome);
        }
    }

    let output_dir = output_directory(path, config);
    if !decode.grids.is_empty() {
        tokio::fs::create_dir_all(&output_dir).await?;
    }
    // Cancellation stops decoding only; once every cell is decoded the
    // output is written in full.
    for (slot, grid) in &decode.grids {
        let file = output_dir.join(cell_file_name(*slot, config));
        tokio::fs::write(&file, serialize_grid(grid)).await?;
        log(format!("Wrote {}", file.display()), Debug);
    }

    let report = ConversionReport {
        region: path.to_path_buf(),
        output_dir,
        written: decode.grids.len(),
        absent: decode.absent,
        failures: decode.failures,
    };
    log(
        format!(
            "Converted {}: {} written, {} absent, {} failed",
            report.region.display(),
            report.written,
            report.absent,
            report.failures.len()
        ),
        Info,
    );
    Ok(report)
}

/// Converts each region file in `paths` in turn, skipping anything that is
/// not one. Returns the number of files that failed outright.
pub async fn convert_paths(
    paths: &[PathBuf],
    config: &ConverterConfig,
    cancel: CancellationToken,
) -> usize {
    let mut failed = 0;
    for path in paths {
        if cancel.is_cancelled() {
            log("Conversion cancelled".to_owned(), Warning);
            break;
        }
        if !is_region_file(path) {
            log(
                format!("Skipping {}: not a region file", path.display()),
                Warning,
            );
            continue;
        }
        if let Err(e) = convert_region(path, config, cancel.clone()).await {
            log(format!("Failed to convert {}: {}", path.display(), e), Error);
            failed += 1;
        }
    }
    failed
}
