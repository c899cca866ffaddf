use std::path::Path;

use anyhow::{bail, Result};

/// Reads one search term per line, blank lines are ignored.
pub fn load_keywords<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let keywords = parse_keywords(&fs_err::read_to_string(path)?);
    if keywords.is_empty() {
        bail!("No keywords found in {}", path.display());
    }
    log::info!("Loaded {} keywords from {}", keywords.len(), path.display());
    Ok(keywords)
}

pub fn parse_keywords(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_skips_blanks() {
        let keywords = parse_keywords("alpha\n\n  beta gamma \r\n\t\nalpha\n");
        assert_eq!(keywords, ["alpha", "beta gamma", "alpha"]);
    }

    #[test]
    fn empty_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.txt");
        std::fs::write(&path, "\n  \n").unwrap();
        let err = load_keywords(&path).unwrap_err();
        assert!(err.to_string().starts_with("No keywords found"));
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(load_keywords("/nonexistent/keywords.txt").is_err());
    }
}
