//! Crate-level scenarios across retrieval, fusion and verification.
