use crate::pipeline::traits::LanguageModel;

/// Lookup key used for words the language model has never seen.
pub const UNKNOWN_TOKEN: &str = "[UNKNOWN]";

/// Drop a single trailing decimal digit. Glosses such as `GO1`/`GO2` mark
/// distinct signs that share one language-model entry.
pub fn strip_sense_suffix(word: &str) -> &str {
    match word.chars().last() {
        Some(last) if last.is_ascii_digit() => &word[..word.len() - last.len_utf8()],
        _ => word,
    }
}

/// Map a recognized word to the key used for language-model lookups.
pub fn normalize<'a>(lm: &dyn LanguageModel, word: &'a str) -> &'a str {
    let gloss = strip_sense_suffix(word);
    if lm.log_unigram(gloss).is_some() {
        gloss
    } else {
        UNKNOWN_TOKEN
    }
}

/// Weighted bigram transition score between recognized words.
#[derive(Clone, Copy)]
pub struct BigramScorer<'a> {
    lm: &'a dyn LanguageModel,
    ratio: f64,
}

impl<'a> BigramScorer<'a> {
    pub fn new(lm: &'a dyn LanguageModel, ratio: f64) -> Self {
        Self { lm, ratio }
    }

    pub fn log_lm(&self, previous: &str, current: &str) -> f64 {
        let previous = normalize(self.lm, previous);
        let current = normalize(self.lm, current);
        self.ratio * self.lm.log_bigram(previous, current)
    }
}
