use crate::error::RecognizerError;
use crate::model::WordModelSet;
use crate::pipeline::traits::WordModel;
use crate::types::{TestItem, TestSet, WordLikelihoodTable, WordLikelihoods};

/// Score every word model against every test item.
///
/// A model that fails on an item is recorded as `-inf` for that item only;
/// the rest of the pass is unaffected.
pub fn score_test_set(models: &WordModelSet, test_set: &TestSet) -> WordLikelihoodTable {
    let mut table = WordLikelihoodTable::default();
    let mut failures = 0usize;
    for item in test_set.items() {
        let mut row = WordLikelihoods::default();
        for (word, model) in models.iter() {
            let log_likelihood = match score_item(word, model, item) {
                Ok(score) => score,
                Err(err) => {
                    failures += 1;
                    tracing::warn!(word, item_id = item.id, error = %err, "word model failed to score item");
                    f64::NEG_INFINITY
                }
            };
            row.push(word, log_likelihood);
        }
        table.insert(item.id, row);
    }
    tracing::debug!(
        items = table.len(),
        words = models.len(),
        failures,
        "scored test set"
    );
    table
}

/// Score one item, reporting any model failure as a `Scoring` error for `word`.
pub fn score_item(
    word: &str,
    model: &dyn WordModel,
    item: &TestItem,
) -> Result<f64, RecognizerError> {
    model
        .score(&item.features, &item.lengths)
        .map_err(|err| match err {
            RecognizerError::Scoring { .. } => err,
            other => RecognizerError::scoring(word, other),
        })
}

/// Likelihood table plus the best single-word guess per item.
pub fn recognize(models: &WordModelSet, test_set: &TestSet) -> (WordLikelihoodTable, Vec<String>) {
    let table = score_test_set(models, test_set);
    let guesses = table.best_guesses();
    (table, guesses)
}
