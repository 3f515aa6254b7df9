//! Term tables driving query analysis.

use crate::patterns::lazy_regex;
use regex::Regex;
use std::sync::LazyLock;

pub struct VagueTerm {
    pub term: &'static str,
    pub message: &'static str,
    pub suggestions: &'static [&'static str],
}

/// Bare topic labels, checked in order; only the first hit counts.
pub const VAGUE_TERMS: &[VagueTerm] = &[
    VagueTerm {
        term: "esg",
        message: "ESG is a broad topic. Which aspect are you interested in?",
        suggestions: &[
            "What are the ESG reporting requirements under CSRD?",
            "How do GS1 standards support ESG compliance?",
            "What ESG regulations affect my industry?",
        ],
    },
    VagueTerm {
        term: "sustainability",
        message: "Sustainability covers many areas. Could you be more specific?",
        suggestions: &[
            "What are the sustainability reporting requirements?",
            "How can I measure my company's sustainability performance?",
            "What sustainability regulations apply to my products?",
        ],
    },
    VagueTerm {
        term: "compliance",
        message: "Which regulation's compliance are you asking about?",
        suggestions: &[
            "How do I comply with CSRD requirements?",
            "What are the compliance deadlines for EUDR?",
            "What compliance steps are needed for DPP?",
        ],
    },
    VagueTerm {
        term: "reporting",
        message: "What type of reporting are you interested in?",
        suggestions: &[
            "What are the CSRD sustainability reporting requirements?",
            "How do I report Scope 3 emissions?",
            "What data do I need for ESRS reporting?",
        ],
    },
    VagueTerm {
        term: "regulation",
        message: "Which regulation would you like to know about?",
        suggestions: &[
            "What is the CSRD regulation?",
            "What does EUDR require?",
            "How does ESPR affect my products?",
        ],
    },
    VagueTerm {
        term: "standard",
        message: "Which standard are you asking about?",
        suggestions: &[
            "What are the ESRS reporting standards?",
            "How do GS1 standards work?",
            "What is the EPCIS standard for traceability?",
        ],
    },
    VagueTerm {
        term: "help",
        message: "I'd be happy to help! What specific topic can I assist with?",
        suggestions: &[
            "What regulations apply to my company?",
            "How do I start with sustainability reporting?",
            "What are the key ESG deadlines I should know?",
        ],
    },
    VagueTerm {
        term: "requirements",
        message: "Requirements for which regulation or standard?",
        suggestions: &[
            "What are the CSRD reporting requirements?",
            "What are the EUDR traceability requirements?",
            "What are the DPP data requirements?",
        ],
    },
];

pub struct AmbiguousAcronym {
    pub acronym: &'static str,
    pub meanings: &'static [&'static str],
    pub questions: &'static [&'static str],
}

/// Acronyms with more than one meaning in this domain.
pub const AMBIGUOUS_ACRONYMS: &[AmbiguousAcronym] = &[
    AmbiguousAcronym {
        acronym: "dpp",
        meanings: &["Digital Product Passport", "Data Protection Policy"],
        questions: &[
            "Are you asking about Digital Product Passports under ESPR?",
            "What product categories are you interested in for DPP?",
        ],
    },
    AmbiguousAcronym {
        acronym: "zes",
        meanings: &[
            "Zero Emission Shipping",
            "Zero Emission Zones",
            "Zero Emission Solutions",
        ],
        questions: &[
            "Are you asking about Zero Emission Zones for logistics?",
            "Are you interested in Zero Emission Shipping initiatives?",
        ],
    },
];

/// First-person business phrases that need an industry to answer well.
pub const BUSINESS_CONTEXT_PHRASES: &[&str] = &[
    "my company",
    "my business",
    "my industry",
    "we need",
    "our products",
    "our supply chain",
];

pub const INDUSTRY_KEYWORDS: &[&str] = &[
    "retail",
    "manufacturing",
    "logistics",
    "food",
    "agriculture",
    "automotive",
    "textile",
    "electronics",
    "pharmaceutical",
    "chemical",
    "construction",
    "energy",
    "finance",
    "banking",
    "insurance",
];

/// Nouns that make a query depend on jurisdiction.
pub const SCOPE_NOUNS: &[&str] = &["regulation", "law", "requirement", "standard"];

pub const MISSING_CONTEXT_SUGGESTIONS: &[&str] = &[
    "What regulations apply to retail companies?",
    "What are the requirements for manufacturing?",
    "How does EUDR affect food and agriculture?",
];

pub const UNCLEAR_SCOPE_SUGGESTIONS: &[&str] = &[
    "What EU sustainability regulations should I know?",
    "What Dutch ESG initiatives exist?",
    "How do EU regulations compare to international standards?",
];

pub const TIME_SUGGESTIONS: &[&str] = &[
    "What are the current CSRD requirements?",
    "When do EUDR requirements come into force?",
    "What are the upcoming ESG deadlines for 2025?",
];

pub const COMPARISON_SUGGESTIONS: &[&str] = &[
    "What is the difference in scope between CSRD and NFRD?",
    "How do ESRS and GRI standards compare?",
    "What are the key differences between EUDR and CSDDD?",
];

/// Query term to related topics, in output order.
pub const TOPIC_MAPPINGS: &[(&str, &[&str])] = &[
    ("csrd", &["ESRS", "Double Materiality", "Sustainability Reporting"]),
    ("esrs", &["CSRD", "EFRAG", "Disclosure Requirements"]),
    ("eudr", &["Deforestation", "Due Diligence", "Traceability"]),
    ("espr", &["Digital Product Passport", "Ecodesign", "Circular Economy"]),
    ("dpp", &["ESPR", "Product Information", "QR Codes"]),
    ("csddd", &["Due Diligence", "Human Rights", "Supply Chain"]),
    ("gs1", &["GTIN", "EPCIS", "Digital Link", "Traceability"]),
    ("gtin", &["Product Identification", "Barcode", "GS1"]),
    ("epcis", &["Supply Chain Visibility", "Events", "Traceability"]),
    ("taxonomy", &["EU Taxonomy", "Sustainable Activities", "CSRD"]),
    ("scope 3", &["Emissions", "Value Chain", "ESRS E1"]),
    ("materiality", &["Double Materiality", "CSRD", "Stakeholders"]),
];

pub const MAX_RELATED_TOPICS: usize = 5;

/// Title keywords in the top results to a suggested follow-up query.
pub const DID_YOU_MEAN: &[(&[&str], &str)] = &[
    (&["csrd"], "What are the CSRD reporting requirements?"),
    (&["eudr"], "What does EUDR require for traceability?"),
    (&["esrs"], "What are the ESRS disclosure standards?"),
    (&["gs1", "gtin"], "How do GS1 standards support compliance?"),
];

pub const MAX_DID_YOU_MEAN: usize = 3;

lazy_regex!(
    pub JURISDICTION,
    r"(?i)\b(eu|european|dutch|netherlands|nl|global|international)\b"
);

lazy_regex!(
    /// Explicit time or date tokens. A bare "deadline" is not a time reference,
    /// and "may" is left out as it is usually the modal verb.
    pub TIME_REFERENCE,
    r"(?i)\b(current|currently|now|today|future|upcoming|(19|20)\d{2}|january|february|march|april|june|july|august|september|october|november|december)\b"
);

lazy_regex!(
    pub DEADLINE_QUESTION,
    r"(?i)\b(when|deadline|deadlines|date|timeline|start|begin)\b"
);

lazy_regex!(
    pub COMPARISON,
    r"(?i)\b(vs|versus|compared to|difference|between|or)\b"
);

lazy_regex!(pub ENHANCE_SCOPE, r"(?i)\b(eu|european|dutch|netherlands)\b");

/// `\bacronym\b` for each ambiguous acronym, in table order.
pub static ACRONYM_PATTERNS: LazyLock<Vec<(&'static AmbiguousAcronym, Regex)>> =
    LazyLock::new(|| {
        AMBIGUOUS_ACRONYMS
            .iter()
            .filter_map(|entry| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(entry.acronym)))
                    .ok()
                    .map(|re| (entry, re))
            })
            .collect()
    });

pub fn mentions_industry(lower_query: &str) -> bool {
    INDUSTRY_KEYWORDS.iter().any(|kw| lower_query.contains(kw))
}
