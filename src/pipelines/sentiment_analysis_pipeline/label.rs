use serde::{Deserialize, Serialize};

/// Binary sentiment label. Declaration order is also the tie-break order
/// used when sorting by count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 2] = [SentimentLabel::Positive, SentimentLabel::Negative];

    /// Class index 1 is positive; every other index is negative.
    pub fn from_class_index(index: usize) -> Self {
        if index == 1 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_index_mapping() {
        assert_eq!(SentimentLabel::from_class_index(1), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_class_index(0), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_class_index(7), SentimentLabel::Negative);
    }

    #[test]
    fn serializes_as_display_name() {
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Positive).unwrap(),
            "\"Positive\""
        );
        assert_eq!(SentimentLabel::Negative.to_string(), "Negative");
    }
}
