pub mod config;
pub mod error;
pub mod lm;
pub mod model;
pub mod pipeline;
pub mod recognition;
pub mod types;

pub use config::DecoderConfig;
pub use error::RecognizerError;
pub use lm::{ArpaLanguageModel, BigramScorer, UNKNOWN_TOKEN};
pub use model::{GaussianHmm, WordModelSet};
pub use pipeline::builder::SentenceRecognizerBuilder;
pub use pipeline::defaults::{BeamSentenceDecoder, GreedySentenceDecoder};
pub use pipeline::runtime::SentenceRecognizer;
pub use pipeline::traits::{DecodedPath, LanguageModel, SentenceDecoder, WordModel};
pub use recognition::report::{
    compare_sentence, format_sentence_line, format_summary, summarize, summarize_guesses,
    DecodeRun, ErrorSummary, Meta, Report, SentenceReport,
};
pub use recognition::scoring::{recognize, score_item, score_test_set};
pub use types::{
    DecodedSentence, TestItem, TestSet, WordLikelihoodTable, WordLikelihoods, SENTENCE_END,
    SENTENCE_START,
};
