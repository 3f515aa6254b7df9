//! Authority levels and their fixed scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-tier trust classification of a source, most authoritative first.
///
/// The derived ordering follows declaration order, so sorting ascending puts
/// `Official` first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AuthorityLevel {
    /// Official legislation and regulatory texts
    Official,
    /// Standards bodies and official guidance
    Verified,
    /// Implementation guides and technical specifications
    Guidance,
    /// Industry reports, whitepapers, best practices.
    /// Sources with no resolved authority default here.
    #[default]
    Industry,
    /// Community contributions
    Community,
}

impl AuthorityLevel {
    /// All levels, most authoritative first.
    pub const ALL: [AuthorityLevel; 5] = [
        AuthorityLevel::Official,
        AuthorityLevel::Verified,
        AuthorityLevel::Guidance,
        AuthorityLevel::Industry,
        AuthorityLevel::Community,
    ];

    /// Fixed trust score of the level.
    pub fn score(&self) -> f64 {
        match self {
            AuthorityLevel::Official => 1.0,
            AuthorityLevel::Verified => 0.9,
            AuthorityLevel::Guidance => 0.7,
            AuthorityLevel::Industry => 0.5,
            AuthorityLevel::Community => 0.3,
        }
    }

    /// Short badge label.
    pub fn label(&self) -> &'static str {
        match self {
            AuthorityLevel::Official => "Official",
            AuthorityLevel::Verified => "Verified",
            AuthorityLevel::Guidance => "Guidance",
            AuthorityLevel::Industry => "Industry",
            AuthorityLevel::Community => "Community",
        }
    }

    /// Badge tooltip text.
    pub fn description(&self) -> &'static str {
        match self {
            AuthorityLevel::Official => "Official EU legislation and regulatory texts",
            AuthorityLevel::Verified => "GS1 standards and EFRAG official guidance",
            AuthorityLevel::Guidance => "Implementation guides and technical specifications",
            AuthorityLevel::Industry => "Industry reports, whitepapers, and best practices",
            AuthorityLevel::Community => "Community contributions and user-generated content",
        }
    }

    /// Official or verified.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, AuthorityLevel::Official | AuthorityLevel::Verified)
    }

    /// Industry or community.
    pub fn is_low_authority(&self) -> bool {
        matches!(self, AuthorityLevel::Industry | AuthorityLevel::Community)
    }
}

impl fmt::Display for AuthorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthorityLevel::Official => "official",
            AuthorityLevel::Verified => "verified",
            AuthorityLevel::Guidance => "guidance",
            AuthorityLevel::Industry => "industry",
            AuthorityLevel::Community => "community",
        })
    }
}

/// Resolved authority of one source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuthorityInfo {
    pub level: AuthorityLevel,
    pub score: f64,
}

impl From<AuthorityLevel> for AuthorityInfo {
    fn from(level: AuthorityLevel) -> Self {
        Self {
            level,
            score: level.score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_strictly_descending() {
        let scores: Vec<f64> = AuthorityLevel::ALL.iter().map(|l| l.score()).collect();
        assert_eq!(scores, vec![1.0, 0.9, 0.7, 0.5, 0.3]);
        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_info_score_is_function_of_level() {
        for level in AuthorityLevel::ALL {
            let info = AuthorityInfo::from(level);
            assert_eq!(info.score, level.score());
        }
    }

    #[test]
    fn test_default_is_industry() {
        assert_eq!(AuthorityLevel::default(), AuthorityLevel::Industry);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&AuthorityLevel::Verified).unwrap();
        assert_eq!(json, "\"verified\"");
        let parsed: AuthorityLevel = serde_json::from_str("\"community\"").unwrap();
        assert_eq!(parsed, AuthorityLevel::Community);
    }

    #[test]
    fn test_badges_for_all_levels() {
        for level in AuthorityLevel::ALL {
            assert!(!level.label().is_empty());
            assert!(!level.description().is_empty());
        }
        assert_eq!(AuthorityLevel::Official.label(), "Official");
    }
}
