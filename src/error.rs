use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("ARPA parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("scoring failed for word '{word}': {message}")]
    Scoring { word: String, message: String },
    #[error("no word likelihoods for test item {item_id}")]
    MissingLikelihoods { item_id: usize },
    #[error("sentence position {position} has no surviving hypotheses")]
    EmptyBeam { position: usize },
    #[error("back-pointer {index} at position {position} does not name an entry of the previous beam")]
    BrokenBackPointer { position: usize, index: usize },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RecognizerError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn scoring(word: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Scoring {
            word: word.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
