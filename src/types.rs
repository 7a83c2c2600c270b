use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RecognizerError;

pub const SENTENCE_START: &str = "<s>";
pub const SENTENCE_END: &str = "</s>";

/// One test window: a feature sequence split into sub-sequences by `lengths`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestItem {
    pub id: usize,
    pub features: Vec<Vec<f32>>,
    pub lengths: Vec<usize>,
}

/// Validated test set. Items are always ordered by id.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawTestSet")]
pub struct TestSet {
    items: Vec<TestItem>,
    /// Video id -> item ids forming that video's sentence, in order.
    sentences: BTreeMap<u32, Vec<usize>>,
    /// Ground-truth word per item id.
    wordlist: Vec<String>,
}

#[derive(Deserialize)]
struct RawTestSet {
    items: Vec<TestItem>,
    sentences: BTreeMap<u32, Vec<usize>>,
    wordlist: Vec<String>,
}

impl TryFrom<RawTestSet> for TestSet {
    type Error = RecognizerError;

    fn try_from(raw: RawTestSet) -> Result<Self, Self::Error> {
        Self::new(raw.items, raw.sentences, raw.wordlist)
    }
}

impl TestSet {
    pub fn new(
        mut items: Vec<TestItem>,
        sentences: BTreeMap<u32, Vec<usize>>,
        wordlist: Vec<String>,
    ) -> Result<Self, RecognizerError> {
        items.sort_by_key(|item| item.id);
        let test_set = Self {
            items,
            sentences,
            wordlist,
        };
        test_set.validate()?;
        Ok(test_set)
    }

    pub fn load(path: &Path) -> Result<Self, RecognizerError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| RecognizerError::io("read test set", e))?;
        serde_json::from_str(&data).map_err(|e| RecognizerError::json("parse test set", e))
    }

    pub fn items(&self) -> &[TestItem] {
        &self.items
    }

    pub fn sentences(&self) -> &BTreeMap<u32, Vec<usize>> {
        &self.sentences
    }

    pub fn wordlist(&self) -> &[String] {
        &self.wordlist
    }

    fn validate(&self) -> Result<(), RecognizerError> {
        if let Some(pair) = self.items.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(RecognizerError::invalid_input(format!(
                "duplicate test item id {}",
                pair[0].id
            )));
        }
        for (video, item_ids) in &self.sentences {
            for &item_id in item_ids {
                if self.item(item_id).is_none() {
                    return Err(RecognizerError::invalid_input(format!(
                        "video {video} references unknown test item {item_id}"
                    )));
                }
                if item_id >= self.wordlist.len() {
                    return Err(RecognizerError::invalid_input(format!(
                        "video {video} references item {item_id} beyond the {}-word ground truth",
                        self.wordlist.len()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn item(&self, item_id: usize) -> Option<&TestItem> {
        self.items
            .binary_search_by_key(&item_id, |item| item.id)
            .ok()
            .map(|idx| &self.items[idx])
    }

    pub fn reference_sentence(&self, video: u32) -> Vec<String> {
        self.sentences
            .get(&video)
            .map(|ids| ids.iter().map(|&id| self.wordlist[id].clone()).collect())
            .unwrap_or_default()
    }
}

/// Word -> log-likelihood for one test item, in word-model iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordLikelihoods {
    entries: Vec<(String, f64)>,
}

impl WordLikelihoods {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, word: impl Into<String>, log_likelihood: f64) {
        self.entries.push((word.into(), log_likelihood));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(w, s)| (w.as_str(), *s))
    }

    pub fn get(&self, word: &str) -> Option<f64> {
        self.entries.iter().find(|(w, _)| w == word).map(|(_, s)| *s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest-scoring word; the first one wins ties, so a row where every
    /// word failed still yields its first word.
    pub fn best_guess(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (word, score) in self.iter() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((word, score)),
            }
        }
        best.map(|(word, _)| word)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for WordLikelihoods {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(w, s)| (w.into(), s)).collect())
    }
}

/// Per-item likelihood rows, ordered by item id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordLikelihoodTable {
    item_ids: Vec<usize>,
    rows: Vec<WordLikelihoods>,
}

impl WordLikelihoodTable {
    /// Rows whose ids are simply their positions `0..n`.
    pub fn from_rows(rows: Vec<WordLikelihoods>) -> Self {
        Self {
            item_ids: (0..rows.len()).collect(),
            rows,
        }
    }

    /// Insert at the row's id position; a repeated id replaces the old row.
    pub(crate) fn insert(&mut self, item_id: usize, row: WordLikelihoods) {
        match self.item_ids.binary_search(&item_id) {
            Ok(idx) => self.rows[idx] = row,
            Err(idx) => {
                self.item_ids.insert(idx, item_id);
                self.rows.insert(idx, row);
            }
        }
    }

    pub fn get(&self, item_id: usize) -> Option<&WordLikelihoods> {
        self.item_ids
            .binary_search(&item_id)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn rows(&self) -> &[WordLikelihoods] {
        &self.rows
    }

    pub fn item_ids(&self) -> &[usize] {
        &self.item_ids
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Best single-word guess per row, without any language model.
    pub fn best_guesses(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.best_guess().unwrap_or_default().to_string())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedSentence {
    pub video: u32,
    pub words: Vec<String>,
    /// Cumulative score of the `</s>` entry.
    pub score: f64,
}
