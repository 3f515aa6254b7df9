//! Ordered rule tables for authority classification.
//!
//! Priority is the order of the tables: the first matching group wins.

use super::level::AuthorityLevel;
use crate::patterns::compile_all;
use regex::Regex;
use std::sync::LazyLock;

/// Known regulation codes and their level.
pub const REGULATION_CODES: &[(&str, AuthorityLevel)] = &[
    ("CSRD", AuthorityLevel::Official),
    ("ESRS", AuthorityLevel::Official),
    ("DPP", AuthorityLevel::Official),
    ("EUDR", AuthorityLevel::Official),
    ("ESPR", AuthorityLevel::Official),
    ("PPWR", AuthorityLevel::Official),
    ("EU_TAXONOMY", AuthorityLevel::Official),
    ("OTHER", AuthorityLevel::Guidance),
];

/// Level assigned to regulation codes missing from `REGULATION_CODES`.
pub const UNKNOWN_REGULATION_CODE_LEVEL: AuthorityLevel = AuthorityLevel::Guidance;

/// Standards-body keywords that lift a standard to `Verified`.
pub const STANDARDS_BODY_KEYWORDS: &[&str] = &["gs1"];

/// One pattern group: URL patterns and title patterns sharing a level.
pub struct PatternGroup {
    pub level: AuthorityLevel,
    pub url_patterns: &'static [&'static str],
    pub title_patterns: &'static [&'static str],
}

/// Pattern groups in priority order.
pub const PATTERN_GROUPS: &[PatternGroup] = &[
    PatternGroup {
        level: AuthorityLevel::Official,
        url_patterns: &[
            r"(?i)eur-lex\.europa\.eu",
            r"(?i)europa\.eu/legal",
            r"(?i)ec\.europa\.eu",
            r"(?i)efrag\.org.*official",
        ],
        title_patterns: &[
            r"(?i)^(EU\s+)?Regulation\s+\d+/\d+",
            r"(?i)^(EU\s+)?Directive\s+\d+/\d+",
            r"(?i)^CSRD\b",
            r"(?i)^ESRS\s+\d",
            r"(?i)^EUDR\b",
            r"(?i)^ESPR\b",
            r"(?i)^CSDDD\b",
            r"(?i)^PPWR\b",
            r"(?i)^EU\s+Taxonomy",
            r"(?i)Delegated\s+(Act|Regulation)",
            r"(?i)Implementing\s+(Act|Regulation)",
        ],
    },
    PatternGroup {
        level: AuthorityLevel::Verified,
        url_patterns: &[
            r"(?i)gs1\.org",
            r"(?i)gs1\.nl",
            r"(?i)gs1\.eu",
            r"(?i)efrag\.org",
            r"(?i)iso\.org",
        ],
        title_patterns: &[
            r"(?i)^GS1\s+",
            r"(?i)^GTIN\b",
            r"(?i)^GLN\b",
            r"(?i)^SSCC\b",
            r"(?i)^EPCIS\b",
            r"(?i)^CBV\b",
            r"(?i)^Digital\s+Link",
            r"(?i)^EFRAG\s+",
            r"(?i)^ISO\s+\d+",
        ],
    },
    PatternGroup {
        level: AuthorityLevel::Guidance,
        url_patterns: &[
            r"(?i)implementation.*guide",
            r"(?i)technical.*specification",
            r"(?i)guidance.*document",
        ],
        title_patterns: &[
            r"(?i)Implementation\s+Guide",
            r"(?i)Technical\s+Specification",
            r"(?i)User\s+Guide",
            r"(?i)How\s+to",
            r"(?i)Best\s+Practice",
            r"(?i)Guidance\s+(on|for)",
        ],
    },
    PatternGroup {
        level: AuthorityLevel::Industry,
        url_patterns: &[r"(?i)whitepaper", r"(?i)report", r"(?i)research"],
        title_patterns: &[
            r"(?i)Whitepaper",
            r"(?i)Industry\s+Report",
            r"(?i)Market\s+Analysis",
            r"(?i)Research\s+Paper",
        ],
    },
];

/// A pattern group with its regexes compiled.
pub struct CompiledGroup {
    pub level: AuthorityLevel,
    pub url: Vec<Regex>,
    pub title: Vec<Regex>,
}

/// Compiled form of `PATTERN_GROUPS`, built once.
pub static COMPILED_GROUPS: LazyLock<Vec<CompiledGroup>> = LazyLock::new(|| {
    PATTERN_GROUPS
        .iter()
        .map(|group| CompiledGroup {
            level: group.level,
            url: compile_all(group.url_patterns),
            title: compile_all(group.title_patterns),
        })
        .collect()
});

/// Look up a regulation code. Codes are compared case-insensitively.
pub fn regulation_code_level(code: &str) -> AuthorityLevel {
    let code = code.trim();
    REGULATION_CODES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, level)| *level)
        .unwrap_or(UNKNOWN_REGULATION_CODE_LEVEL)
}
