use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;

use gridflow_core::{GridError, DEFAULT_ROW_HEIGHT};
use gridflow_formula::DEFAULT_CACHE_CAPACITY;

/// Largest supported grid height; the materialized-row bitmap is sized to it
pub const MAX_ROWS: u32 = 16_777_216;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Number of rows in the grid
    pub total_rows: u32,
    /// Number of columns in the grid
    pub total_cols: u32,
    /// Row height in pixels
    pub row_height: f64,
    /// Rows materialized above the first visible row
    pub leading_buffer: u32,
    /// Rows materialized below the last visible row
    pub trailing_buffer: u32,
    /// Rows the bulk populator writes per tick
    pub populate_batch_size: u32,
    /// Dependents a stepped edit cascade recomputes per batch
    pub cascade_batch_size: u32,
    /// Maximum number of memoised formula results
    pub cache_capacity: NonZeroUsize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_rows: 1_000_000,
            total_cols: 26,
            row_height: DEFAULT_ROW_HEIGHT,
            leading_buffer: 5,
            trailing_buffer: 5,
            populate_batch_size: 1_000,
            cascade_batch_size: 10_000,
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, GridError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GridError> {
        let defaults = Self::default();

        let config = Self {
            total_rows: parse_var(&lookup, "GRIDFLOW_TOTAL_ROWS", defaults.total_rows)?,
            total_cols: parse_var(&lookup, "GRIDFLOW_TOTAL_COLS", defaults.total_cols)?,
            row_height: parse_var(&lookup, "GRIDFLOW_ROW_HEIGHT", defaults.row_height)?,
            leading_buffer: parse_var(&lookup, "GRIDFLOW_LEADING_BUFFER", defaults.leading_buffer)?,
            trailing_buffer: parse_var(
                &lookup,
                "GRIDFLOW_TRAILING_BUFFER",
                defaults.trailing_buffer,
            )?,
            populate_batch_size: parse_var(
                &lookup,
                "GRIDFLOW_BATCH_SIZE",
                defaults.populate_batch_size,
            )?,
            cascade_batch_size: parse_var(
                &lookup,
                "GRIDFLOW_CASCADE_BATCH_SIZE",
                defaults.cascade_batch_size,
            )?,
            cache_capacity: parse_var(&lookup, "GRIDFLOW_CACHE_CAPACITY", defaults.cache_capacity)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), GridError> {
        if self.total_rows == 0 || self.total_rows > MAX_ROWS {
            return Err(invalid("GRIDFLOW_TOTAL_ROWS", self.total_rows));
        }
        if self.total_cols == 0 {
            return Err(invalid("GRIDFLOW_TOTAL_COLS", self.total_cols));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(invalid("GRIDFLOW_ROW_HEIGHT", self.row_height));
        }
        if self.populate_batch_size == 0 {
            return Err(invalid("GRIDFLOW_BATCH_SIZE", self.populate_batch_size));
        }
        if self.cascade_batch_size == 0 {
            return Err(invalid("GRIDFLOW_CASCADE_BATCH_SIZE", self.cascade_batch_size));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, value: impl ToString) -> GridError {
    GridError::InvalidConfig {
        key,
        value: value.to_string(),
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, GridError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| GridError::InvalidConfig { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<EngineConfig, GridError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.total_rows, 1_000_000);
        assert_eq!(config.cache_capacity.get(), 65_536);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GRIDFLOW_TOTAL_ROWS", "500"),
            ("GRIDFLOW_ROW_HEIGHT", " 30.5 "),
            ("GRIDFLOW_BATCH_SIZE", "50"),
        ])
        .unwrap();
        assert_eq!(config.total_rows, 500);
        assert_eq!(config.row_height, 30.5);
        assert_eq!(config.populate_batch_size, 50);
        assert_eq!(config.total_cols, 26);
    }

    #[test]
    fn test_unparseable_value() {
        let err = load(&[("GRIDFLOW_TOTAL_COLS", "many")]).unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidConfig {
                key: "GRIDFLOW_TOTAL_COLS",
                value: "many".to_string()
            }
        );
        assert_eq!(err.code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(load(&[("GRIDFLOW_TOTAL_ROWS", "0")]).is_err());
        assert!(load(&[("GRIDFLOW_TOTAL_ROWS", "4294967295")]).is_err());
        assert!(load(&[("GRIDFLOW_TOTAL_ROWS", "16777216")]).is_ok());
        assert!(load(&[("GRIDFLOW_CASCADE_BATCH_SIZE", "0")]).is_err());
        assert!(load(&[("GRIDFLOW_ROW_HEIGHT", "-1")]).is_err());
        assert!(load(&[("GRIDFLOW_ROW_HEIGHT", "NaN")]).is_err());
        assert!(load(&[("GRIDFLOW_BATCH_SIZE", "0")]).is_err());
        assert!(load(&[("GRIDFLOW_CACHE_CAPACITY", "0")]).is_err());
    }
}
