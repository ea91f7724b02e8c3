//! Stopword sets.
//!
//! The default set is the English list shipped with the NLTK stopwords
//! corpus, compiled in so start-up never depends on a download.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::Lazy;

const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

static ENGLISH_SET: Lazy<StopwordSet> = Lazy::new(|| StopwordSet::new(ENGLISH.iter().copied()));

/// An immutable, lowercase set of words excluded from feature extraction.
///
/// Cloning is cheap; clones share the same underlying set.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: Arc<HashSet<String>>,
}

impl StopwordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            words: Arc::new(words),
        }
    }

    /// The built-in English list.
    pub fn english() -> Self {
        ENGLISH_SET.clone()
    }

    /// Loads one word per line. Blank lines and `#` comments are skipped.
    /// An unreadable or empty file is an error.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stopword file {path:?}"))?;
        let set = Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.starts_with('#')),
        );
        if set.is_empty() {
            anyhow::bail!("Stopword file {path:?} contains no words");
        }
        tracing::info!(path = %path.display(), words = set.len(), "loaded stopwords");
        Ok(set)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn english_list_is_complete() {
        let set = StopwordSet::english();
        assert_eq!(set.len(), 179);
        assert!(set.contains("this"));
        assert!(set.contains("not"));
        assert!(set.contains("wouldn't"));
        assert!(!set.contains("love"));
    }

    #[test]
    fn custom_words_are_lowercased() {
        let set = StopwordSet::new(["Foo", " BAR "]);
        assert!(set.contains("foo"));
        assert!(set.contains("bar"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn from_file_skips_comments_and_blanks() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "# reviews")?;
        writeln!(file, "the")?;
        writeln!(file)?;
        writeln!(file, "product")?;
        let set = StopwordSet::from_file(file.path())?;
        assert_eq!(set.len(), 2);
        assert!(set.contains("product"));
        Ok(())
    }

    #[test]
    fn from_file_rejects_empty_and_missing() -> anyhow::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        assert!(StopwordSet::from_file(file.path()).is_err());
        assert!(StopwordSet::from_file("/nonexistent/stopwords.txt").is_err());
        Ok(())
    }
}
