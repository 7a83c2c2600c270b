pub mod arpa;
pub mod normalize;

pub use arpa::ArpaLanguageModel;
pub use normalize::{normalize, strip_sense_suffix, BigramScorer, UNKNOWN_TOKEN};
