//! In-memory word list for the local dictionary tier.

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::text::normalize_word;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to read word list {path}: {message}")]
    Io { path: String, message: String },
}

/// Exact-membership word set for one language.
#[derive(Debug, Clone, Default)]
pub struct LocalDictionary {
    language: String,
    words: HashSet<String>,
}

impl LocalDictionary {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            words: HashSet::new(),
        }
    }

    pub fn from_words<I, S>(language: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new(language);
        dict.extend(words);
        dict
    }

    /// Parse a word list: one entry per line, blank lines and `#` comments skipped.
    pub fn parse(language: impl Into<String>, content: &str) -> Self {
        Self::from_words(
            language,
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load a word list from disk.
    pub fn load(language: impl Into<String>, path: &Path) -> Result<Self, DictionaryError> {
        let content = std::fs::read_to_string(path).map_err(|e| DictionaryError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let dict = Self::parse(language, &content);
        info!(
            path = %path.display(),
            language = %dict.language,
            words = dict.len(),
            "Loaded local dictionary"
        );
        Ok(dict)
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|w| normalize_word(w.as_ref()))
                .filter(|w| !w.is_empty()),
        );
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&normalize_word(word))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_contains_is_case_insensitive() {
        let dict = LocalDictionary::from_words("en", ["cat", "Dog"]);
        assert!(dict.contains("CAT"));
        assert!(dict.contains("dog"));
        assert!(!dict.contains("cats"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let dict = LocalDictionary::parse("en", "# header\ncat\n\n  dog  \n#cow\n");
        assert_eq!(dict.len(), 2);
        assert!(!dict.contains("cow"));
    }

    #[test]
    fn test_diacritics_match_across_forms() {
        let dict = LocalDictionary::from_words("sk", ["c\u{30c}aj"]);
        assert!(dict.contains("ČAJ"));
        assert!(dict.contains("čaj"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nbeta\n# gamma").unwrap();

        let dict = LocalDictionary::load("en", file.path()).unwrap();
        assert_eq!(dict.language(), "en");
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("BETA"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = LocalDictionary::load("en", Path::new("/nonexistent/words.txt"));
        assert!(matches!(result, Err(DictionaryError::Io { .. })));
    }
}
