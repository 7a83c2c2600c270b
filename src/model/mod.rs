pub mod gaussian_hmm;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::RecognizerError;
use crate::pipeline::traits::WordModel;

pub use gaussian_hmm::GaussianHmm;

/// Word models keyed by word; iteration is ascending by word.
#[derive(Default)]
pub struct WordModelSet {
    models: BTreeMap<String, Box<dyn WordModel>>,
}

impl WordModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: impl Into<String>, model: Box<dyn WordModel>) {
        self.models.insert(word.into(), model);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn WordModel)> {
        self.models
            .iter()
            .map(|(word, model)| (word.as_str(), model.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Load `{ "WORD": { start_prob, trans_mat, means, variances }, ... }`.
    ///
    /// Structurally invalid models are kept; they fail at scoring time and
    /// score `-inf` like any other numerical failure.
    pub fn load_gaussian_hmms(path: &Path) -> Result<Self, RecognizerError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| RecognizerError::io("read word models", e))?;
        let raw: BTreeMap<String, GaussianHmm> =
            serde_json::from_str(&data).map_err(|e| RecognizerError::json("parse word models", e))?;
        if raw.is_empty() {
            return Err(RecognizerError::invalid_input("word model file is empty"));
        }

        let mut set = Self::new();
        for (word, hmm) in raw {
            if let Err(message) = hmm.validate() {
                tracing::warn!(word = %word, %message, "word model will fail to score");
            }
            set.insert(word.clone(), Box::new(hmm.with_word(word)));
        }
        Ok(set)
    }
}
