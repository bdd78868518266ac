use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_common::{RegionGeometry, Result, StrataError};

/// Most blocking tasks a run keeps in flight.
pub const MAX_WORKERS: usize = 1024;

/// Settings for a conversion run, loaded from a JSON file. Every field is
/// optional in the file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub geometry: RegionGeometry,
    /// Directory created next to each region file to hold its cells.
    pub output_dir_name: String,
    pub extension: String,
    /// Cells decoded concurrently.
    pub workers: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            geometry: RegionGeometry::default(),
            output_dir_name: "decompressed".to_owned(),
            extension: "vdat".to_owned(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl ConverterConfig {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: ConverterConfig = serde_json::from_str(text)
            .map_err(|e| StrataError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(StrataError::ConfigError(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.output_dir_name.is_empty() || self.extension.is_empty() {
            return Err(StrataError::ConfigError(
                "output directory name and extension must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.output_dir_name, "decompressed");
        assert_eq!(config.extension, "vdat");
        assert!(config.workers >= 1);
        assert_eq!(config.geometry, RegionGeometry::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ConverterConfig::from_json(r#"{ "workers": 3, "geometry": { "region_dim": 16 } }"#)
                .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.geometry.region_dim, 16);
        assert_eq!(config.geometry.sector_size, 4096);
        assert_eq!(config.extension, "vdat");
    }

    #[test]
    fn test_invalid_json() {
        assert_matches!(
            ConverterConfig::from_json("{ workers: }"),
            Err(StrataError::ConfigError(_))
        );
        assert_matches!(
            ConverterConfig::from_json(r#"{ "workers": 0 }"#),
            Err(StrataError::ConfigError(_))
        );
        assert_matches!(
            ConverterConfig::from_json(r#"{ "geometry": { "section_dim": 0 } }"#),
            Err(StrataError::InvalidGeometry(_))
        );
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert_matches!(
            ConverterConfig::from_json(r#"{ "workers": 1099511627776 }"#),
            Err(StrataError::ConfigError(_))
        );
        assert!(ConverterConfig::from_json(r#"{ "workers": 1024 }"#).is_ok());
        assert_matches!(
            ConverterConfig::from_json(r#"{ "geometry": { "sector_size": 1152921504606846976 } }"#),
            Err(StrataError::InvalidGeometry(_))
        );
        assert_matches!(
            ConverterConfig::from_json(
                r#"{ "geometry": { "section_dim": 4194304, "column_height": 4194304 } }"#
            ),
            Err(StrataError::InvalidGeometry(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strata.json");
        std::fs::write(&path, r#"{ "extension": "bin" }"#).unwrap();

        let config = tokio_test::block_on(ConverterConfig::load(&path)).unwrap();
        assert_eq!(config.extension, "bin");
        assert_eq!(config.output_dir_name, "decompressed");
    }
}
