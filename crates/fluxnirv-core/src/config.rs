use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use fluxnirv_parser::{EpicSchema, SiteSchema};

/// Every knob the pipeline reads: input/output locations, positional column
/// schemas, and the site filter constants. The defaults reproduce the
/// reference deployment for the US-Var tower, so running without a
/// configuration file behaves exactly like the original processing job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PipelinePaths,
    pub site: SiteCleanerConfig,
    pub epic: EpicCleanerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelinePaths {
    pub site_raw: PathBuf,
    pub epic_raw: PathBuf,
    pub clean_site: PathBuf,
    pub clean_epic: PathBuf,
    pub dataset: PathBuf,
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self {
            site_raw: PathBuf::from("AMF_US-Var_BASE_HH_13-5.csv"),
            epic_raw: PathBuf::from("US_VAR_EPIC_data.csv"),
            clean_site: PathBuf::from("Clean_Site_Data.csv"),
            clean_epic: PathBuf::from("Clean_EPIC_Data.csv"),
            dataset: PathBuf::from("dataset.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteCleanerConfig {
    pub schema: SiteSchema,
    /// Numeric literal the tower logger writes for a missing measurement.
    pub sentinel: f64,
    /// Records whose interval starts before this 12-digit timestamp are
    /// discarded.
    pub cutoff: i64,
    /// Fixed timezone correction applied to both interval bounds.
    pub utc_offset_hours: i64,
}

impl Default for SiteCleanerConfig {
    fn default() -> Self {
        Self {
            schema: SiteSchema::default(),
            sentinel: -9999.0,
            cutoff: 201501010000,
            utc_offset_hours: 8,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EpicCleanerConfig {
    pub schema: EpicSchema,
}

pub fn parse_config(toml_str: &str) -> Result<PipelineConfig> {
    toml::from_str::<PipelineConfig>(toml_str)
        .context("failed to parse pipeline configuration TOML")
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        parse_config(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = PipelineConfig::default();

        assert_eq!(
            config.paths.site_raw,
            PathBuf::from("AMF_US-Var_BASE_HH_13-5.csv")
        );
        assert_eq!(config.paths.dataset, PathBuf::from("dataset.csv"));
        assert_eq!(config.site.sentinel, -9999.0);
        assert_eq!(config.site.cutoff, 201501010000);
        assert_eq!(config.site.utc_offset_hours, 8);
        assert_eq!(config.site.schema.field_cols, [17, 18, 34, 43]);
        assert_eq!(config.epic.schema.band_a_col, 7);
        assert_eq!(config.epic.schema.band_b_col, 8);
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let toml = r#"
            [paths]
            site_raw = "tower.csv"
            dataset = "out/merged.csv"

            [site]
            cutoff = 201601010000
            utc_offset_hours = 0

            [site.schema]
            field_cols = [2, 3, 4, 5]

            [epic.schema]
            band_a_col = 5
            band_b_col = 6
        "#;

        let config = parse_config(toml).expect("parse config");

        assert_eq!(config.paths.site_raw, PathBuf::from("tower.csv"));
        assert_eq!(config.paths.dataset, PathBuf::from("out/merged.csv"));
        // untouched fields keep their defaults
        assert_eq!(config.paths.epic_raw, PathBuf::from("US_VAR_EPIC_data.csv"));
        assert_eq!(config.site.cutoff, 201601010000);
        assert_eq!(config.site.utc_offset_hours, 0);
        assert_eq!(config.site.schema.field_cols, [2, 3, 4, 5]);
        assert_eq!(config.site.schema.start_col, 0);
        assert_eq!(config.epic.schema.band_a_col, 5);
        assert_eq!(config.site.sentinel, -9999.0);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(parse_config("paths = 3").is_err());
    }
}
