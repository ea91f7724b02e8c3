use super::stem::PorterStemmer;
use super::stopwords::StopwordSet;

/// Turns raw review text into the token string the vectorizer was fit on.
///
/// Non-letters become spaces, the text is lowercased and split on
/// whitespace, stopwords are dropped and the survivors are Porter-stemmed
/// and re-joined with single spaces in their original order.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    stopwords: StopwordSet,
    stemmer: PorterStemmer,
}

impl TextNormalizer {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self {
            stopwords,
            stemmer: PorterStemmer::new(),
        }
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    pub fn normalize(&self, raw: &str) -> String {
        let cleaned: String = raw
            .chars()
            .map(|c| {
                if c.is_ascii_alphabetic() {
                    c.to_ascii_lowercase()
                } else {
                    ' '
                }
            })
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(token))
            .map(|token| self.stemmer.stem(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn normalize_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        texts.iter().map(|t| self.normalize(t.as_ref())).collect()
    }
}

/// Normalizes `raw` with the given stopword set.
pub fn normalize(raw: &str, stopwords: &StopwordSet) -> String {
    TextNormalizer::new(stopwords.clone()).normalize(raw)
}
