use crate::error::RecognizerError;
use crate::types::{WordLikelihoods, SENTENCE_END, SENTENCE_START};

/// Keep only the single best word per position, chained from the previous choice.
pub fn decode_greedy<F>(
    rows: &[&WordLikelihoods],
    log_lm: F,
) -> Result<(Vec<String>, f64), RecognizerError>
where
    F: Fn(&str, &str) -> f64,
{
    let mut words = Vec::with_capacity(rows.len());
    let mut previous = SENTENCE_START;
    let mut total = 0.0;

    for (idx, row) in rows.iter().enumerate() {
        let mut best: Option<(&str, f64)> = None;
        for (word, word_score) in row.iter() {
            let score = total + log_lm(previous, word) + word_score;
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((word, score)),
            }
        }
        let (word, score) = best.ok_or(RecognizerError::EmptyBeam { position: idx + 1 })?;
        words.push(word.to_string());
        previous = word;
        total = score;
    }

    total += log_lm(previous, SENTENCE_END);
    Ok((words, total))
}
