//! Source authority classification.
//!
//! Rates how trustworthy a source is from its metadata alone, and rolls a set
//! of rated sources up into one answer-level authority.

pub mod level;
pub mod rules;

pub use level::{AuthorityInfo, AuthorityLevel};

use crate::types::{Source, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean-score cut-offs used to map an aggregate score back to a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateThresholds {
    pub official: f64,
    pub verified: f64,
    pub guidance: f64,
    pub industry: f64,
}

impl Default for AggregateThresholds {
    fn default() -> Self {
        Self {
            official: 0.95,
            verified: 0.85,
            guidance: 0.65,
            industry: 0.4,
        }
    }
}

impl AggregateThresholds {
    /// Map a mean authority score to a level.
    pub fn level_for(&self, score: f64) -> AuthorityLevel {
        if score >= self.official {
            AuthorityLevel::Official
        } else if score >= self.verified {
            AuthorityLevel::Verified
        } else if score >= self.guidance {
            AuthorityLevel::Guidance
        } else if score >= self.industry {
            AuthorityLevel::Industry
        } else {
            AuthorityLevel::Community
        }
    }

    /// Thresholds must be strictly descending.
    pub fn is_ordered(&self) -> bool {
        self.official > self.verified && self.verified > self.guidance && self.guidance > self.industry
    }
}

/// One rated source fed to `aggregate`, optionally weighted by relevance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedAuthority {
    pub level: AuthorityLevel,
    pub weight: Option<f64>,
}

impl WeightedAuthority {
    pub fn new(level: AuthorityLevel) -> Self {
        Self {
            level,
            weight: None,
        }
    }

    pub fn weighted(level: AuthorityLevel, weight: f64) -> Self {
        Self {
            level,
            weight: Some(weight),
        }
    }
}

/// Answer-level authority roll-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityAggregate {
    /// Weighted mean authority score, rounded to two decimals
    pub score: f64,
    pub level: AuthorityLevel,
    /// Number of sources per level
    pub breakdown: BTreeMap<AuthorityLevel, u32>,
}

/// Classifies sources into authority levels.
#[derive(Debug, Clone, Default)]
pub struct AuthorityClassifier {
    thresholds: AggregateThresholds,
}

impl AuthorityClassifier {
    pub fn new(thresholds: AggregateThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify one source. First matching rule wins:
    /// 1. regulation with a regulation code: code table
    /// 2. standard: standards-body keyword in title/category, else guidance
    /// 3. URL then title against the ordered pattern groups
    /// 4. industry
    pub fn classify(&self, source: &Source) -> AuthorityInfo {
        AuthorityInfo::from(classify_level(source))
    }

    /// Weighted mean of per-source scores mapped back to a level.
    /// An empty input yields score 0 and `Community`.
    pub fn aggregate(&self, sources: &[WeightedAuthority]) -> AuthorityAggregate {
        let mut breakdown: BTreeMap<AuthorityLevel, u32> =
            AuthorityLevel::ALL.iter().map(|level| (*level, 0)).collect();

        if sources.is_empty() {
            return AuthorityAggregate {
                score: 0.0,
                level: AuthorityLevel::Community,
                breakdown,
            };
        }

        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;

        for source in sources {
            *breakdown.entry(source.level).or_default() += 1;

            let weight = source.weight.unwrap_or(1.0);
            total_weighted += source.level.score() * weight;
            total_weight += weight;
        }

        let mean = if total_weight > 0.0 {
            total_weighted / total_weight
        } else {
            0.0
        };

        AuthorityAggregate {
            score: (mean * 100.0).round() / 100.0,
            level: self.thresholds.level_for(mean),
            breakdown,
        }
    }
}

fn classify_level(source: &Source) -> AuthorityLevel {
    if source.kind == SourceKind::Regulation {
        if let Some(code) = source.regulation_type.as_deref().filter(|c| !c.trim().is_empty()) {
            return rules::regulation_code_level(code);
        }
    }

    if source.kind == SourceKind::Standard {
        let title = source.title.to_lowercase();
        let category = source.category.as_deref().unwrap_or("").to_lowercase();
        let names_body = rules::STANDARDS_BODY_KEYWORDS
            .iter()
            .any(|kw| title.contains(kw) || category.contains(kw));

        return if names_body {
            AuthorityLevel::Verified
        } else {
            AuthorityLevel::Guidance
        };
    }

    for group in rules::COMPILED_GROUPS.iter() {
        if let Some(url) = source.url.as_deref() {
            if group.url.iter().any(|re| re.is_match(url)) {
                return group.level;
            }
        }
        if !source.title.is_empty() && group.title.iter().any(|re| re.is_match(&source.title)) {
            return group.level;
        }
    }

    tracing::debug!(
        "Unclassified source {:?}, defaulting to industry",
        source.title.chars().take(50).collect::<String>()
    );
    AuthorityLevel::Industry
}

/// A source line for LLM context: title, optional relevance, authority.
#[derive(Debug, Clone)]
pub struct ContextSource<'a> {
    pub title: &'a str,
    pub level: AuthorityLevel,
    pub similarity: Option<f64>,
}

/// Render numbered source lines with authority labels, e.g.
/// `[1] CSRD Regulation (90% relevant) - Authority: Official`.
pub fn format_authority_for_context(sources: &[ContextSource<'_>]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let relevance = s
                .similarity
                .filter(|sim| *sim > 0.0)
                .map(|sim| format!(" ({}% relevant)", (sim * 100.0).round() as i64))
                .unwrap_or_default();
            format!(
                "[{}] {}{} - Authority: {}",
                i + 1,
                s.title,
                relevance,
                s.level.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(source: Source) -> AuthorityLevel {
        AuthorityClassifier::default().classify(&source).level
    }

    #[test]
    fn test_regulation_code_wins() {
        let source = Source::new(1, SourceKind::Regulation, "CSRD - Corporate Sustainability Reporting Directive")
            .with_regulation_type("CSRD");
        let info = AuthorityClassifier::default().classify(&source);
        assert_eq!(info.level, AuthorityLevel::Official);
        assert_eq!(info.score, 1.0);
    }

    #[test]
    fn test_esrs_code_is_official() {
        let source = Source::new(2, SourceKind::Regulation, "ESRS 1 General Requirements")
            .with_regulation_type("ESRS");
        assert_eq!(classify(source), AuthorityLevel::Official);
    }

    #[test]
    fn test_unknown_regulation_code_is_guidance() {
        let source = Source::new(3, SourceKind::Regulation, "EU Regulation 2023/1115")
            .with_regulation_type("NFRD");
        assert_eq!(classify(source), AuthorityLevel::Guidance);
    }

    #[test]
    fn test_gs1_standard_is_verified() {
        let source = Source::new(4, SourceKind::Standard, "GTIN Allocation Rules")
            .with_category("GS1 Identification");
        let info = AuthorityClassifier::default().classify(&source);
        assert_eq!(info.level, AuthorityLevel::Verified);
        assert_eq!(info.score, 0.9);
    }

    #[test]
    fn test_other_standard_is_guidance() {
        let source = Source::new(5, SourceKind::Standard, "CSRD Implementation Guide for SMEs");
        assert_eq!(classify(source), AuthorityLevel::Guidance);
    }

    #[test]
    fn test_eur_lex_url_is_official() {
        let source = Source::new(6, SourceKind::Regulation, "Some Regulation")
            .with_url("https://eur-lex.europa.eu/legal-content/EN/TXT/?uri=CELEX:32022L2464");
        assert_eq!(classify(source), AuthorityLevel::Official);
    }

    #[test]
    fn test_url_checked_before_title_within_group_order() {
        // Title would match the guidance group, URL matches verified first.
        let source = Source::new(7, SourceKind::Regulation, "How to register products")
            .with_url("https://www.gs1.nl/kennisbank");
        assert_eq!(classify(source), AuthorityLevel::Verified);
    }

    #[test]
    fn test_title_patterns() {
        let reg = Source::new(8, SourceKind::Regulation, "Regulation 2023/1115 on deforestation");
        assert_eq!(classify(reg), AuthorityLevel::Official);

        let guide = Source::new(9, SourceKind::Regulation, "Guidance on value chain mapping");
        assert_eq!(classify(guide), AuthorityLevel::Guidance);

        let paper = Source::new(10, SourceKind::Regulation, "Packaging Whitepaper 2024");
        assert_eq!(classify(paper), AuthorityLevel::Industry);
    }

    #[test]
    fn test_unclassified_defaults_to_industry() {
        let source = Source::new(11, SourceKind::Regulation, "Some Random Document");
        let info = AuthorityClassifier::default().classify(&source);
        assert_eq!(info.level, AuthorityLevel::Industry);
        assert_eq!(info.score, 0.5);
    }

    #[test]
    fn test_missing_metadata_defaults_to_industry() {
        let source = Source::new(12, SourceKind::Regulation, "");
        assert_eq!(classify(source), AuthorityLevel::Industry);
    }

    #[test]
    fn test_aggregate_empty() {
        let agg = AuthorityClassifier::default().aggregate(&[]);
        assert_eq!(agg.score, 0.0);
        assert_eq!(agg.level, AuthorityLevel::Community);
        assert!(agg.breakdown.values().all(|count| *count == 0));
    }

    #[test]
    fn test_aggregate_all_official() {
        let sources = vec![WeightedAuthority::new(AuthorityLevel::Official); 3];
        let agg = AuthorityClassifier::default().aggregate(&sources);
        assert_eq!(agg.score, 1.0);
        assert_eq!(agg.level, AuthorityLevel::Official);
        assert_eq!(agg.breakdown[&AuthorityLevel::Official], 3);
    }

    #[test]
    fn test_aggregate_mixed() {
        let sources = vec![
            WeightedAuthority::new(AuthorityLevel::Official),
            WeightedAuthority::new(AuthorityLevel::Industry),
        ];
        let agg = AuthorityClassifier::default().aggregate(&sources);
        assert_eq!(agg.score, 0.75);
        assert_eq!(agg.level, AuthorityLevel::Guidance);
    }

    #[test]
    fn test_aggregate_weighted_by_similarity() {
        let sources = vec![
            WeightedAuthority::weighted(AuthorityLevel::Official, 0.9),
            WeightedAuthority::weighted(AuthorityLevel::Community, 0.1),
        ];
        let agg = AuthorityClassifier::default().aggregate(&sources);
        // (1.0 * 0.9 + 0.3 * 0.1) / 1.0 = 0.93
        assert_eq!(agg.score, 0.93);
        assert_eq!(agg.level, AuthorityLevel::Verified);
    }

    #[test]
    fn test_format_authority_for_context() {
        let sources = vec![
            ContextSource {
                title: "CSRD Regulation",
                level: AuthorityLevel::Official,
                similarity: Some(0.9),
            },
            ContextSource {
                title: "Packaging Whitepaper",
                level: AuthorityLevel::Industry,
                similarity: None,
            },
        ];
        let text = format_authority_for_context(&sources);
        assert_eq!(
            text,
            "[1] CSRD Regulation (90% relevant) - Authority: Official\n[2] Packaging Whitepaper - Authority: Industry"
        );
    }
}
