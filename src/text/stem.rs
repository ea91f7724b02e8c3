//! Porter suffix-stripping stemmer.
//!
//! An implementation of the algorithm published in Porter, M.F. (1980),
//! "An algorithm for suffix stripping", following the reference version
//! distributed by its author (including the `bli`/`logi` step 2 rules).
//! A final `y` becomes `i` once the stem holds a vowel (`play` -> `plai`), so
//! vocabularies built with NLTK's default extended mode must be re-stemmed.
//!
//! ```
//! use sentiment_service::text::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("happiness"), "happi");
//! assert_eq!(stemmer.stem("absolutely"), "absolut");
//! ```

#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        Self
    }

    /// Stems one lowercase ASCII word.
    ///
    /// Words of two letters or fewer, and words with anything other than
    /// lowercase ASCII letters, are returned unchanged.
    pub fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return word.to_string();
        }

        let mut w = Word {
            b: word.as_bytes().to_vec(),
            j: 0,
        };
        w.step1ab();
        w.step1c();
        w.step2();
        w.step3();
        w.step4();
        w.step5();

        // Only ASCII letters are ever written into the buffer.
        w.b.into_iter().map(char::from).collect()
    }

    pub fn stem_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens.iter().map(|t| self.stem(t.as_ref())).collect()
    }
}

/// Working buffer. `b.len()` is the current word end and `j` the length of
/// the stem left by the last successful `ends` match.
struct Word {
    b: Vec<u8>,
    j: usize,
}

impl Word {
    fn k(&self) -> usize {
        self.b.len()
    }

    fn last(&self) -> u8 {
        self.b[self.b.len() - 1]
    }

    fn penultimate(&self) -> u8 {
        self.b[self.b.len() - 2]
    }

    /// True when `b[i]` is a consonant. `y` is a consonant at the start of
    /// the word or after a vowel.
    fn cons(&self, i: usize) -> bool {
        match self.b[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Number of vowel-consonant sequences in `b[..j]`.
    fn m(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        while i < self.j && self.cons(i) {
            i += 1;
        }
        loop {
            while i < self.j && !self.cons(i) {
                i += 1;
            }
            if i >= self.j {
                return n;
            }
            while i < self.j && self.cons(i) {
                i += 1;
            }
            n += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..self.j).any(|i| !self.cons(i))
    }

    /// True when `b[..end]` ends in a double consonant.
    fn double_c(&self, end: usize) -> bool {
        end >= 2 && self.b[end - 1] == self.b[end - 2] && self.cons(end - 1)
    }

    /// True when `b[..end]` ends consonant-vowel-consonant and the final
    /// consonant is not `w`, `x` or `y`.
    fn cvc(&self, end: usize) -> bool {
        if end < 3 || !self.cons(end - 1) || self.cons(end - 2) || !self.cons(end - 3) {
            return false;
        }
        !matches!(self.b[end - 1], b'w' | b'x' | b'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        let s = suffix.as_bytes();
        if s.len() > self.k() || !self.b.ends_with(s) {
            return false;
        }
        self.j = self.k() - s.len();
        true
    }

    fn set_to(&mut self, replacement: &str) {
        self.b.truncate(self.j);
        self.b.extend_from_slice(replacement.as_bytes());
    }

    fn r(&mut self, replacement: &str) {
        if self.m() > 0 {
            self.set_to(replacement);
        }
    }

    /// Tries each `(suffix, replacement)` in order; the first suffix that
    /// matches decides, whether or not its measure condition holds.
    fn replace_first(&mut self, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if self.ends(suffix) {
                self.r(replacement);
                return;
            }
        }
    }

    /// Plurals, `-ed` and `-ing`.
    fn step1ab(&mut self) {
        if self.last() == b's' {
            if self.ends("sses") {
                self.b.truncate(self.k() - 2);
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.penultimate() != b's' {
                self.b.pop();
            }
        }

        if self.ends("eed") {
            if self.m() > 0 {
                self.b.pop();
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.b.truncate(self.j);
            self.j = self.k();
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_c(self.k()) {
                if !matches!(self.last(), b'l' | b's' | b'z') {
                    self.b.pop();
                }
            } else if self.m() == 1 && self.cvc(self.k()) {
                self.b.push(b'e');
            }
        }
    }

    /// Terminal `y` to `i` when there is another vowel in the stem.
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let end = self.k() - 1;
            self.b[end] = b'i';
        }
    }

    /// Double suffixes to single ones, e.g. `-ization` to `-ize`.
    fn step2(&mut self) {
        if self.k() < 2 {
            return;
        }
        let rules: &[(&str, &str)] = match self.penultimate() {
            b'a' => &[("ational", "ate"), ("tional", "tion")],
            b'c' => &[("enci", "ence"), ("anci", "ance")],
            b'e' => &[("izer", "ize")],
            b'l' => &[
                ("bli", "ble"),
                ("alli", "al"),
                ("entli", "ent"),
                ("eli", "e"),
                ("ousli", "ous"),
            ],
            b'o' => &[("ization", "ize"), ("ation", "ate"), ("ator", "ate")],
            b's' => &[
                ("alism", "al"),
                ("iveness", "ive"),
                ("fulness", "ful"),
                ("ousness", "ous"),
            ],
            b't' => &[("aliti", "al"), ("iviti", "ive"), ("biliti", "ble")],
            b'g' => &[("logi", "log")],
            _ => return,
        };
        self.replace_first(rules);
    }

    /// `-ic-`, `-full`, `-ness` and friends.
    fn step3(&mut self) {
        let rules: &[(&str, &str)] = match self.last() {
            b'e' => &[("icate", "ic"), ("ative", ""), ("alize", "al")],
            b'i' => &[("iciti", "ic")],
            b'l' => &[("ical", "ic"), ("ful", "")],
            b's' => &[("ness", "")],
            _ => return,
        };
        self.replace_first(rules);
    }

    /// Drops `-ant`, `-ence` and similar when the stem measure exceeds one.
    fn step4(&mut self) {
        if self.k() < 2 {
            return;
        }
        let suffixes: &[&str] = match self.penultimate() {
            b'a' => &["al"],
            b'c' => &["ance", "ence"],
            b'e' => &["er"],
            b'i' => &["ic"],
            b'l' => &["able", "ible"],
            b'n' => &["ant", "ement", "ment", "ent"],
            b'o' => {
                let ion = self.ends("ion") && self.j >= 1 && matches!(self.b[self.j - 1], b's' | b't');
                if !ion && !self.ends("ou") {
                    return;
                }
                &[]
            }
            b's' => &["ism"],
            b't' => &["ate", "iti"],
            b'u' => &["ous"],
            b'v' => &["ive"],
            b'z' => &["ize"],
            _ => return,
        };
        if !suffixes.is_empty() && !suffixes.iter().any(|s| self.ends(s)) {
            return;
        }
        if self.m() > 1 {
            self.b.truncate(self.j);
        }
    }

    /// Final `-e` and `-ll`.
    fn step5(&mut self) {
        // Both halves measure the word as it stood before 5a.
        self.j = self.k();
        let a = self.m();
        if self.last() == b'e' && (a > 1 || (a == 1 && !self.cvc(self.k() - 1))) {
            self.b.pop();
        }
        if self.last() == b'l' && self.double_c(self.k()) && a > 1 {
            self.b.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer::new().stem(word)
    }

    #[test]
    fn plurals_and_participles() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("caress"), "caress");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("conflated"), "conflat");
        assert_eq!(stem("troubled"), "troubl");
        assert_eq!(stem("sized"), "size");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("falling"), "fall");
        assert_eq!(stem("hissing"), "hiss");
        assert_eq!(stem("filing"), "file");
        assert_eq!(stem("failing"), "fail");
    }

    #[test]
    fn terminal_y() {
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn double_suffixes() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("valenci"), "valenc");
        assert_eq!(stem("digitizer"), "digit");
        assert_eq!(stem("vietnamization"), "vietnam");
        assert_eq!(stem("predication"), "predic");
        assert_eq!(stem("hopefulness"), "hope");
        assert_eq!(stem("formaliti"), "formal");
        assert_eq!(stem("sensibiliti"), "sensibl");
    }

    #[test]
    fn step3_and_step4_suffixes() {
        assert_eq!(stem("triplicate"), "triplic");
        assert_eq!(stem("formative"), "form");
        assert_eq!(stem("electrical"), "electr");
        assert_eq!(stem("goodness"), "good");
        assert_eq!(stem("revival"), "reviv");
        assert_eq!(stem("allowance"), "allow");
        assert_eq!(stem("adjustment"), "adjust");
        assert_eq!(stem("adoption"), "adopt");
        assert_eq!(stem("homologou"), "homolog");
        assert_eq!(stem("effective"), "effect");
    }

    #[test]
    fn final_e_and_double_l() {
        assert_eq!(stem("probate"), "probat");
        assert_eq!(stem("rate"), "rate");
        assert_eq!(stem("cease"), "ceas");
        assert_eq!(stem("controll"), "control");
        assert_eq!(stem("roll"), "roll");
        assert_eq!(stem("gazelle"), "gazel");
    }

    #[test]
    fn review_vocabulary() {
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("happiness"), "happi");
        assert_eq!(stem("absolutely"), "absolut");
        assert_eq!(stem("loved"), "love");
        assert_eq!(stem("terrible"), "terribl");
        assert_eq!(stem("product"), "product");
    }

    #[test]
    fn final_y_after_vowel_becomes_i() {
        assert_eq!(stem("play"), "plai");
        assert_eq!(stem("enjoy"), "enjoi");
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn short_and_foreign_words_untouched() {
        assert_eq!(stem(""), "");
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("Running"), "Running");
    }

    #[test]
    fn stem_tokens_preserves_order() {
        let stemmed = PorterStemmer::new().stem_tokens(&["cats", "running", "easily"]);
        assert_eq!(stemmed, vec!["cat", "run", "easili"]);
    }
}
