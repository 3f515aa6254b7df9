//! Citation marker and title-mention detection.

use crate::authority::{AuthorityClassifier, AuthorityLevel};
use crate::fusion::HybridResult;
use crate::patterns::lazy_regex;
use crate::types::{Source, SourceKey, SourceKind};
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_regex!(BRACKET_MARKER, r"\[(\d+)\]");
lazy_regex!(LABELLED_MARKER, r"(?i)\((?:Source|Ref|Citation):\s*(\d+)\)");
lazy_regex!(SEE_MARKER, r"(?i)\(see\s+(?:source\s+)?(\d+)\)");
lazy_regex!(SUPERSCRIPT_MARKER, r"[¹²³⁴⁵⁶⁷⁸⁹]");

/// Characters of a title used to look for inline mentions.
pub const TITLE_PREFIX_CHARS: usize = 30;

/// A mention within this many bytes of an existing citation of the same
/// source is not recorded again.
pub const MENTION_PROXIMITY: usize = 50;

/// A source the answer may cite, in citation-number order.
///
/// Accepts the same JSON shape as [`Source`]. An explicit
/// `authority_level` overrides classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationSource {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_level: Option<AuthorityLevel>,
}

impl CitationSource {
    pub fn new(id: u64, kind: SourceKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            url: None,
            regulation_type: None,
            category: None,
            authority_level: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_authority_level(mut self, level: AuthorityLevel) -> Self {
        self.authority_level = Some(level);
        self
    }

    pub fn key(&self) -> SourceKey {
        SourceKey {
            kind: self.kind,
            id: self.id,
        }
    }

    /// The explicit level, else whatever `classifier` assigns.
    pub fn resolve_level(&self, classifier: &AuthorityClassifier) -> AuthorityLevel {
        if let Some(level) = self.authority_level {
            return level;
        }
        let mut source = Source::new(self.id, self.kind, self.title.clone());
        source.url = self.url.clone();
        source.regulation_type = self.regulation_type.clone();
        source.category = self.category.clone();
        classifier.classify(&source).level
    }
}

impl From<&Source> for CitationSource {
    fn from(source: &Source) -> Self {
        Self {
            id: source.id,
            kind: source.kind,
            title: source.title.clone(),
            url: source.url.clone(),
            regulation_type: source.regulation_type.clone(),
            category: source.category.clone(),
            authority_level: None,
        }
    }
}

impl From<&HybridResult> for CitationSource {
    fn from(result: &HybridResult) -> Self {
        Self {
            id: result.source.id,
            kind: result.source.kind,
            title: result.source.title.clone(),
            url: result.source.url.clone(),
            regulation_type: result.source.regulation_type.clone(),
            category: result.source.category.clone(),
            authority_level: Some(result.authority.level),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationOrigin {
    /// `[n]`, `(Source: n)`, `(see n)` or a superscript digit
    Marker,
    /// The source's title appears in the text
    TitleMention,
}

/// A citation resolved to a source, at a byte position in the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationReference {
    /// 1-based citation number
    pub id: usize,
    pub source_id: u64,
    pub source_kind: SourceKind,
    pub source_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub authority_level: AuthorityLevel,
    pub position: usize,
    pub origin: CitationOrigin,
}

impl CitationReference {
    pub fn source_key(&self) -> SourceKey {
        SourceKey {
            kind: self.source_kind,
            id: self.source_id,
        }
    }

    fn resolve(
        number: usize,
        source: &CitationSource,
        authority_level: AuthorityLevel,
        position: usize,
        origin: CitationOrigin,
    ) -> Self {
        Self {
            id: number,
            source_id: source.id,
            source_kind: source.kind,
            source_title: source.title.clone(),
            source_url: source.url.clone(),
            authority_level,
            position,
            origin,
        }
    }
}

fn superscript_digit(c: char) -> Option<usize> {
    let digit = match c {
        '¹' => 1,
        '²' => 2,
        '³' => 3,
        '⁴' => 4,
        '⁵' => 5,
        '⁶' => 6,
        '⁷' => 7,
        '⁸' => 8,
        '⁹' => 9,
        _ => return None,
    };
    Some(digit)
}

#[derive(Debug, Clone, Default)]
pub struct CitationExtractor {
    classifier: AuthorityClassifier,
}

impl CitationExtractor {
    pub fn new(classifier: AuthorityClassifier) -> Self {
        Self { classifier }
    }

    /// Find citation markers and title mentions that resolve to `sources`.
    ///
    /// Marker number `n` refers to `sources[n - 1]`; numbers outside
    /// `1..=sources.len()` are ignored. Sources without an explicit level
    /// are classified.
    pub fn extract(&self, text: &str, sources: &[CitationSource]) -> Vec<CitationReference> {
        let resolved: Vec<(&CitationSource, AuthorityLevel)> = sources
            .iter()
            .map(|source| (source, source.resolve_level(&self.classifier)))
            .collect();
        let mut citations = Vec::new();

        for marker in [&BRACKET_MARKER, &LABELLED_MARKER, &SEE_MARKER] {
            let Some(re) = marker.as_ref() else {
                continue;
            };
            for caps in re.captures_iter(text) {
                let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let Ok(n) = number.as_str().parse::<usize>() else {
                    continue;
                };
                push_resolved(&mut citations, &resolved, n, whole.start());
            }
        }

        if let Some(re) = SUPERSCRIPT_MARKER.as_ref() {
            for m in re.find_iter(text) {
                if let Some(n) = m.as_str().chars().next().and_then(superscript_digit) {
                    push_resolved(&mut citations, &resolved, n, m.start());
                }
            }
        }

        for (index, (source, level)) in resolved.iter().enumerate() {
            let Some(re) = title_pattern(&source.title) else {
                continue;
            };
            for m in re.find_iter(text) {
                let already_cited = citations.iter().any(|c: &CitationReference| {
                    c.source_key() == source.key() && c.position.abs_diff(m.start()) < MENTION_PROXIMITY
                });
                if !already_cited {
                    citations.push(CitationReference::resolve(
                        index + 1,
                        source,
                        *level,
                        m.start(),
                        CitationOrigin::TitleMention,
                    ));
                }
            }
        }

        tracing::debug!("Extracted {} citations from answer", citations.len());
        citations
    }
}

fn push_resolved(
    citations: &mut Vec<CitationReference>,
    sources: &[(&CitationSource, AuthorityLevel)],
    n: usize,
    position: usize,
) {
    if n == 0 {
        return;
    }
    if let Some((source, level)) = sources.get(n - 1) {
        citations.push(CitationReference::resolve(
            n,
            source,
            *level,
            position,
            CitationOrigin::Marker,
        ));
    }
}

/// Case-insensitive literal match on the title prefix.
fn title_pattern(title: &str) -> Option<Regex> {
    let prefix: String = title.chars().take(TITLE_PREFIX_CHARS).collect();
    if prefix.trim().is_empty() {
        return None;
    }
    match Regex::new(&format!("(?i){}", regex::escape(&prefix))) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Skipping title mention pattern for {:?}: {}", title, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<CitationSource> {
        vec![
            CitationSource::new(
                10,
                SourceKind::Regulation,
                "Corporate Sustainability Reporting Directive",
            )
            .with_url("https://eur-lex.europa.eu/eli/dir/2022/2464")
            .with_authority_level(AuthorityLevel::Official),
            CitationSource::new(20, SourceKind::Standard, "GS1 General Specifications"),
        ]
    }

    fn extract(text: &str, sources: &[CitationSource]) -> Vec<CitationReference> {
        CitationExtractor::default().extract(text, sources)
    }

    #[test]
    fn test_bracket_markers_resolve() {
        let text = "The CSRD [1] requires X. GS1 [2] helps.";
        let citations = extract(text, &sources());

        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].source_id, 10);
        assert_eq!(citations[0].position, 9);
        assert_eq!(citations[0].authority_level, AuthorityLevel::Official);
        assert_eq!(citations[1].source_id, 20);
        assert_eq!(citations[1].position, 29);
        // No explicit level: the classifier sees a GS1 standard
        assert_eq!(citations[1].authority_level, AuthorityLevel::Verified);
    }

    #[test]
    fn test_out_of_range_markers_ignored() {
        let text = "See [0] and [3] and [99].";
        assert!(extract(text, &sources()).is_empty());
    }

    #[test]
    fn test_alternate_marker_forms() {
        let text = "Reporting is mandatory (Source: 1). Barcodes differ (see source 2). Also².";
        let citations = extract(text, &sources());
        let ids: Vec<u64> = citations.iter().map(|c| c.source_id).collect();
        assert_eq!(ids, vec![10, 20, 20]);
        assert!(citations.iter().all(|c| c.origin == CitationOrigin::Marker));
    }

    #[test]
    fn test_superscript_maps_to_digit() {
        let text = "Applies from 2025³ onwards¹.";
        let citations = extract(text, &sources());
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].id, 1);
    }

    #[test]
    fn test_title_mention_recorded() {
        let text = "Under the corporate sustainability reporting directive, firms report.";
        let citations = extract(text, &sources());
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].origin, CitationOrigin::TitleMention);
        assert_eq!(citations[0].position, 10);
    }

    #[test]
    fn test_title_mention_near_marker_not_duplicated() {
        let text = "[2] GS1 General Specifications define keys.";
        let citations = extract(text, &sources());
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].origin, CitationOrigin::Marker);
    }

    #[test]
    fn test_citation_source_from_hybrid_result() {
        use crate::authority::AuthorityInfo;
        use crate::types::Source;

        let result = HybridResult {
            source: Source::new(5, SourceKind::Standard, "GS1 GTIN").with_url("https://gs1.org"),
            fused_score: 0.5,
            vector_rank: Some(1),
            bm25_rank: None,
            vector_score: Some(0.5),
            bm25_score: None,
            authority: AuthorityInfo::from(AuthorityLevel::Verified),
        };
        let source = CitationSource::from(&result);
        assert_eq!(source.key(), result.key());
        assert_eq!(source.authority_level, Some(AuthorityLevel::Verified));
        assert_eq!(source.url.as_deref(), Some("https://gs1.org"));
    }

    #[test]
    fn test_missing_level_is_classified() {
        let sources = vec![
            CitationSource::new(1, SourceKind::Regulation, "Directive (EU) 2022/2464")
                .with_url("https://eur-lex.europa.eu/eli/dir/2022/2464/oj"),
            CitationSource::new(2, SourceKind::Regulation, "Retail Sustainability Whitepaper"),
            CitationSource::new(3, SourceKind::Regulation, "Misc notes"),
        ];
        let citations = extract("A [1]. B [2]. C [3].", &sources);
        let levels: Vec<AuthorityLevel> = citations.iter().map(|c| c.authority_level).collect();
        assert_eq!(
            levels,
            vec![AuthorityLevel::Official, AuthorityLevel::Industry, AuthorityLevel::Industry]
        );
    }

    #[test]
    fn test_explicit_level_overrides_classifier() {
        let source = CitationSource::new(1, SourceKind::Regulation, "Directive (EU) 2022/2464")
            .with_url("https://eur-lex.europa.eu/eli/dir/2022/2464/oj")
            .with_authority_level(AuthorityLevel::Community);
        let citations = extract("See [1].", &[source]);
        assert_eq!(citations[0].authority_level, AuthorityLevel::Community);
    }

    #[test]
    fn test_source_shaped_json_keeps_classification_fields() {
        let json = r#"[{"id": 7, "type": "regulation", "title": "Deforestation rules", "regulationType": "EUDR"}]"#;
        let sources: Vec<CitationSource> = serde_json::from_str(json).unwrap();
        assert_eq!(sources[0].regulation_type.as_deref(), Some("EUDR"));
        assert_eq!(
            sources[0].resolve_level(&AuthorityClassifier::default()),
            AuthorityLevel::Official
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        // "é" is two bytes, so the marker sits one byte past its char index
        let text = "Café rules [2] apply.";
        let citations = extract(text, &sources());
        assert_eq!(citations[0].position, 12);
        assert_eq!(&text[citations[0].position..], "[2] apply.");
    }
}
