//! Fusion configuration and sector keyword tables.

use isa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Sector name to boost keywords (English and Dutch terms).
pub const SECTOR_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "fmcg",
        &["fmcg", "food", "beverage", "levensmiddelen", "drogisterij", "nutrition", "voeding", "grocery"],
    ),
    (
        "diy",
        &["diy", "doe-het-zelf", "garden", "tuin", "pet", "dier", "bouwmarkt", "hardware"],
    ),
    (
        "healthcare",
        &["healthcare", "gezondheidszorg", "medical", "medisch", "pharma", "zorg", "hospital"],
    ),
    (
        "fashion",
        &["fashion", "mode", "textile", "textiel", "apparel", "kleding", "footwear", "schoenen"],
    ),
    (
        "sustainability",
        &["sustainability", "duurzaamheid", "eco", "carbon", "co2", "dpp", "circular", "environment"],
    ),
    (
        "retail",
        &["retail", "store", "winkel", "pos", "checkout", "inventory", "voorraad"],
    ),
    (
        "agriculture",
        &["agriculture", "agri", "farm", "landbouw", "crop", "livestock", "fresh", "vers"],
    ),
    (
        "construction",
        &["construction", "bouw", "building", "material", "cement", "steel", "installatie"],
    ),
];

/// Keywords for a sector name, case-insensitive. `None` for unknown sectors.
pub fn sector_keywords(sector: &str) -> Option<&'static [&'static str]> {
    SECTOR_KEYWORDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sector.trim()))
        .map(|(_, keywords)| *keywords)
}

/// Names of all known sectors.
pub fn sector_names() -> Vec<&'static str> {
    SECTOR_KEYWORDS.iter().map(|(name, _)| *name).collect()
}

/// Rank fusion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Weight of the vector list; divides the rank inside the RRF term
    pub vector_weight: f64,

    /// Weight of the lexical list
    pub bm25_weight: f64,

    /// Maximum number of fused results
    pub limit: usize,

    /// RRF smoothing constant
    pub rrf_k: f64,

    /// Minimum vector similarity kept before ranking
    pub vector_threshold: f64,

    /// Minimum lexical score kept before ranking
    pub bm25_threshold: f64,

    /// Sector whose keyword table boosts matching results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Extra boost keywords on top of the sector table
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sector_keywords: Vec<String>,

    /// Boost per matching keyword
    pub sector_boost_per_match: f64,

    /// Cap on the total boost
    pub max_sector_boost: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            vector_weight: 0.7,
            bm25_weight: 0.3,
            limit: 10,
            rrf_k: 60.0,
            vector_threshold: 0.3,
            bm25_threshold: 0.0,
            sector: None,
            sector_keywords: Vec::new(),
            sector_boost_per_match: 0.2,
            max_sector_boost: 0.6,
        }
    }
}

impl FusionConfig {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Boost results matching the keyword table of `sector`.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_sector_keywords(mut self, keywords: Vec<String>) -> Self {
        self.sector_keywords = keywords;
        self
    }

    /// Number of candidates requested from each retriever.
    pub fn candidate_limit(&self) -> usize {
        self.limit.saturating_mul(2)
    }

    /// Lowercased boost keywords: sector table plus explicit keywords.
    pub fn boost_keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = self
            .sector
            .as_deref()
            .and_then(sector_keywords)
            .unwrap_or(&[])
            .iter()
            .map(|kw| kw.to_string())
            .collect();

        for kw in &self.sector_keywords {
            let kw = kw.trim().to_lowercase();
            if !kw.is_empty() && !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }
        keywords
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(self.vector_weight.is_finite() && self.vector_weight > 0.0) {
            return Err(AppError::Config(format!(
                "fusion.vector_weight must be positive, got {}",
                self.vector_weight
            )));
        }
        if !(self.bm25_weight.is_finite() && self.bm25_weight > 0.0) {
            return Err(AppError::Config(format!(
                "fusion.bm25_weight must be positive, got {}",
                self.bm25_weight
            )));
        }
        if self.limit == 0 {
            return Err(AppError::Config("fusion.limit must be at least 1".to_string()));
        }
        if !(self.rrf_k.is_finite() && self.rrf_k >= 0.0) {
            return Err(AppError::Config(format!(
                "fusion.rrf_k must be non-negative, got {}",
                self.rrf_k
            )));
        }
        if !self.vector_threshold.is_finite() || !self.bm25_threshold.is_finite() {
            return Err(AppError::Config("fusion thresholds must be finite".to_string()));
        }
        if self.sector_boost_per_match < 0.0 || self.max_sector_boost < 0.0 {
            return Err(AppError::Config("fusion sector boosts must not be negative".to_string()));
        }
        if let Some(sector) = &self.sector {
            if sector_keywords(sector).is_none() {
                return Err(AppError::Config(format!(
                    "Unknown sector '{}'. Known sectors: {}",
                    sector,
                    sector_names().join(", ")
                )));
            }
        }
        Ok(())
    }
}
