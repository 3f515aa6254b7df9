//! Render fused results as numbered context blocks for answer generation.
//!
//! The block numbers are the citation numbers an answer refers back to.

use super::HybridResult;

const SEPARATOR: &str = "\n\n---\n\n";

pub fn build_context(results: &[HybridResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| render_block(i + 1, result))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn render_block(number: usize, result: &HybridResult) -> String {
    let mut relevance = Vec::new();
    if let Some(similarity) = result.vector_score {
        relevance.push(format!("semantic: {}%", (similarity * 100.0).round() as i64));
    }
    if let Some(score) = result.bm25_score {
        relevance.push(format!("keyword: {:.2}", score));
    }
    let relevance = if relevance.is_empty() {
        String::new()
    } else {
        format!(" ({})", relevance.join(", "))
    };

    let mut lines = vec![
        format!("[Source {}: {}{}]", number, result.source.title, relevance),
        format!("Type: {}", result.source.kind),
        format!("Authority: {}", result.authority.level.label()),
        result
            .source
            .description
            .clone()
            .unwrap_or_else(|| "No description available.".to_string()),
    ];
    if let Some(url) = &result.source.url {
        lines.push(format!("URL: {}", url));
    }
    lines.join("\n")
}
