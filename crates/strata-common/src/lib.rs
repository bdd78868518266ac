pub mod error;
pub mod types;

pub use error::{Axis, StrataError};
pub use types::{CellSlot, RegionGeometry, Result, MAX_ARRAY_LEN, MAX_SECTOR_OFFSET};
