pub mod config;
pub mod converter;

pub use config::{ConverterConfig, MAX_WORKERS};
pub use converter::{convert_paths, convert_region, ConversionReport};
