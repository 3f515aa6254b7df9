//! Evidence pipeline configuration management.
//!
//! Every tunable constant of fusion, ambiguity scoring, claim extraction,
//! verification and authority aggregation, stored at `.isa/evidence.yaml`.

use crate::authority::AggregateThresholds;
use crate::clarity::AmbiguityWeights;
use crate::fusion::FusionConfig;
use crate::verify::{ExtractionConfig, VerificationConfig};
use isa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub fusion: FusionConfig,
    pub ambiguity: AmbiguityWeights,
    pub extraction: ExtractionConfig,
    pub verification: VerificationConfig,
    pub authority: AggregateThresholds,
}

impl EvidenceConfig {
    pub fn validate(&self) -> AppResult<()> {
        self.fusion.validate()?;

        if !self.authority.is_ordered() {
            return Err(AppError::Config(format!(
                "authority thresholds must be strictly descending, got {:?}",
                self.authority
            )));
        }

        let ambiguity = &self.ambiguity;
        if ambiguity.ambiguous_threshold > ambiguity.skip_retrieval_threshold {
            return Err(AppError::Config(format!(
                "ambiguity.ambiguous_threshold ({}) must not exceed skip_retrieval_threshold ({})",
                ambiguity.ambiguous_threshold, ambiguity.skip_retrieval_threshold
            )));
        }

        let extraction = &self.extraction;
        if extraction.min_confidence > extraction.max_confidence {
            return Err(AppError::Config(format!(
                "extraction.min_confidence ({}) must not exceed max_confidence ({})",
                extraction.min_confidence, extraction.max_confidence
            )));
        }

        if self.verification.nearby_window == 0 {
            return Err(AppError::Config(
                "verification.nearby_window must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load evidence configuration.
///
/// Loads from `.isa/evidence.yaml` if it exists, otherwise returns defaults.
/// Missing sections and fields fall back to their defaults.
pub fn load_config(workspace: &Path) -> AppResult<EvidenceConfig> {
    let config_path = get_config_path(workspace);

    if !config_path.exists() {
        tracing::debug!("Using default evidence config (no config file found)");
        return Ok(EvidenceConfig::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let config: EvidenceConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;

    config.validate()?;

    tracing::debug!("Loaded evidence config from {:?}", config_path);
    Ok(config)
}

/// Save evidence configuration.
pub fn save_config(workspace: &Path, config: &EvidenceConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let yaml = serde_yaml::to_string(config)?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved evidence config to {:?}", config_path);
    Ok(())
}

pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".isa").join("evidence.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path()).unwrap();

        assert_eq!(config, EvidenceConfig::default());
        assert_eq!(config.fusion.limit, 10);
        assert_eq!(config.verification.nearby_window, 200);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let mut config = EvidenceConfig::default();
        config.fusion.limit = 25;
        config.fusion.sector = Some("healthcare".to_string());
        config.verification.verified_threshold = 0.5;

        save_config(temp.path(), &config).unwrap();

        let loaded = load_config(temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = get_config_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "fusion:\n  limit: 3\n").unwrap();

        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.fusion.limit, 3);
        assert_eq!(config.fusion.rrf_k, 60.0);
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp = TempDir::new().unwrap();
        let path = get_config_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "fusion:\n  vector_weight: 0\n").unwrap();

        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let mut config = EvidenceConfig::default();
        config.authority.verified = 0.99;
        assert!(config.validate().is_err());

        let mut config = EvidenceConfig::default();
        config.fusion.rrf_k = -1.0;
        assert!(config.validate().is_err());

        let mut config = EvidenceConfig::default();
        config.fusion.limit = 0;
        assert!(config.validate().is_err());

        assert!(EvidenceConfig::default().validate().is_ok());
    }
}
