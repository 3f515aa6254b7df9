//! JSONL corpus loading: one `Source` object per line.

use crate::types::Source;
use isa_core::{AppError, AppResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub fn load_corpus(path: &Path) -> AppResult<Vec<Source>> {
    let file = File::open(path)
        .map_err(|e| AppError::Retrieval(format!("Failed to open corpus {:?}: {}", path, e)))?;

    let reader = BufReader::new(file);
    let mut sources = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            AppError::Retrieval(format!("Failed to read line {}: {}", line_num + 1, e))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let source: Source = serde_json::from_str(&line).map_err(|e| {
            AppError::Serialization(format!(
                "Failed to parse line {} in {:?}: {}",
                line_num + 1,
                path,
                e
            ))
        })?;

        sources.push(source);
    }

    tracing::debug!("Loaded {} sources from {:?}", sources.len(), path);
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_corpus_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": 1, "type": "regulation", "title": "CSRD", "regulationType": "CSRD"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"id": 2, "type": "standard", "title": "GS1 GTIN"}}"#).unwrap();

        let sources = load_corpus(file.path()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].regulation_type.as_deref(), Some("CSRD"));
        assert_eq!(sources[1].kind, SourceKind::Standard);
    }

    #[test]
    fn test_load_corpus_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": 1, "type": "regulation", "title": "CSRD"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let err = load_corpus(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_missing_corpus_is_error() {
        let result = load_corpus(Path::new("/nonexistent/corpus.jsonl"));
        assert!(result.is_err());
    }
}
