use crate::error::RecognizerError;
use crate::lm::normalize::BigramScorer;
use crate::types::WordLikelihoods;

/// A pre-trained per-word model that scores a feature window.
pub trait WordModel: Send + Sync {
    fn score(&self, features: &[Vec<f32>], lengths: &[usize]) -> Result<f64, RecognizerError>;
}

pub trait LanguageModel: Send + Sync {
    /// Log unigram probability, or `None` when the word is outside the vocabulary.
    fn log_unigram(&self, word: &str) -> Option<f64>;

    /// Log probability of `current` following `previous`, with the model's own backoff.
    fn log_bigram(&self, previous: &str, current: &str) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPath {
    pub words: Vec<String>,
    pub score: f64,
}

pub trait SentenceDecoder: Send + Sync {
    /// Decode one sentence whose positions are given by `rows`, in order.
    fn decode(
        &self,
        rows: &[&WordLikelihoods],
        transitions: &BigramScorer<'_>,
    ) -> Result<DecodedPath, RecognizerError>;
}
