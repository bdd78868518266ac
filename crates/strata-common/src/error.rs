use std::error::Error;
use std::fmt;

/// Coordinate axis of a cell, used when one of the position tags is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[derive(Debug)]
pub enum StrataError {
    IoError(std::io::Error),
    /// File is shorter than the fixed region header.
    MalformedHeader { expected: usize, found: usize },
    /// A read of `length` bytes at `offset` would run past `available`.
    OutOfBounds {
        offset: usize,
        length: usize,
        available: usize,
    },
    UnsupportedCompression(u8),
    DecompressionFailure(std::io::Error),
    UnknownTagType(u8),
    /// Lists of variable-width elements cannot be sized without walking them.
    UnsupportedListElement(u8),
    InvalidUtf8 { offset: usize },
    NegativeLength { offset: usize, length: i32 },
    InvalidBlockArray { expected: usize, found: usize },
    VerticalIndexOutOfRange { index: u8, limit: usize },
    IncompleteSection(String),
    DuplicateSection(u8),
    MissingCoordinate(Axis),
    /// Two cells normalized to the same slot; `first` keeps it.
    SlotCollision { slot: (u8, u8), first: usize },
    GridSizeMismatch { expected: usize, found: usize },
    InvalidGeometry(String),
    ConfigError(String),
    Cancelled,
}

impl fmt::Display for StrataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrataError::IoError(err) => write!(f, "IO error: {}", err),
            StrataError::MalformedHeader { expected, found } => write!(
                f,
                "Malformed header: expected at least {} bytes, found {}",
                expected, found
            ),
            StrataError::OutOfBounds {
                offset,
                length,
                available,
            } => write!(
                f,
                "Out of bounds: {} bytes at offset {} exceeds {} available",
                length, offset, available
            ),
            StrataError::UnsupportedCompression(method) => {
                write!(f, "Unsupported compression method: {}", method)
            }
            StrataError::DecompressionFailure(err) => {
                write!(f, "Decompression failure: {}", err)
            }
            StrataError::UnknownTagType(type_id) => write!(f, "Unknown tag type: {}", type_id),
            StrataError::UnsupportedListElement(type_id) => write!(
                f,
                "Unsupported list element type: {} is not fixed-width",
                type_id
            ),
            StrataError::InvalidUtf8 { offset } => {
                write!(f, "Invalid UTF-8 string at offset {}", offset)
            }
            StrataError::NegativeLength { offset, length } => {
                write!(f, "Negative length prefix {} at offset {}", length, offset)
            }
            StrataError::InvalidBlockArray { expected, found } => write!(
                f,
                "Invalid block array: expected {} identifiers, found {}",
                expected, found
            ),
            StrataError::VerticalIndexOutOfRange { index, limit } => write!(
                f,
                "Vertical index {} out of range (limit {})",
                index, limit
            ),
            StrataError::IncompleteSection(msg) => write!(f, "Incomplete section: {}", msg),
            StrataError::DuplicateSection(index) => {
                write!(f, "Section {} appears more than once", index)
            }
            StrataError::MissingCoordinate(axis) => {
                write!(f, "Missing {} coordinate for assembled cell", axis)
            }
            StrataError::SlotCollision { slot, first } => write!(
                f,
                "Slot collision: ({}, {}) already holds cell {}",
                slot.0, slot.1, first
            ),
            StrataError::GridSizeMismatch { expected, found } => write!(
                f,
                "Grid size mismatch: expected {} bytes, found {}",
                expected, found
            ),
            StrataError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            StrataError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            StrataError::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl Error for StrataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StrataError::IoError(err) => Some(err),
            StrataError::DecompressionFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        StrataError::IoError(err)
    }
}
