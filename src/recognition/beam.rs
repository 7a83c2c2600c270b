use crate::types::WordLikelihoods;

/// A partial sentence ending in `word`.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamEntry {
    pub word: String,
    /// Index of the predecessor in the previous beam.
    pub back_pointer: usize,
    pub score: f64,
}

/// Bounded top-K set of partial sentences, kept ascending by score.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    width: usize,
    entries: Vec<BeamEntry>,
}

impl Beam {
    pub fn with_width(width: usize) -> Self {
        let width = width.max(1);
        Self {
            width,
            entries: Vec::with_capacity(width + 1),
        }
    }

    /// Single-entry beam holding `word` at `score`, used for `<s>`.
    pub fn seed(word: &str, score: f64) -> Self {
        let mut beam = Self::with_width(1);
        beam.entries.push(BeamEntry {
            word: word.to_string(),
            back_pointer: 0,
            score,
        });
        beam
    }

    /// Insert keeping the K best. A full beam only admits entries strictly
    /// better than its minimum; equal scores keep insertion order.
    pub fn insert(&mut self, entry: BeamEntry) -> bool {
        if self.entries.len() == self.width {
            match self.entries.first() {
                Some(lowest) if entry.score > lowest.score => {
                    self.entries.remove(0);
                }
                _ => return false,
            }
        }
        let at = self.entries.partition_point(|e| e.score <= entry.score);
        self.entries.insert(at, entry);
        true
    }

    pub fn entries(&self) -> &[BeamEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&BeamEntry> {
        self.entries.get(index)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&BeamEntry> {
        self.entries.last()
    }
}

/// Best predecessor in `previous` for `word`, with its combined score.
/// The first predecessor wins ties.
pub(crate) fn best_predecessor<F>(
    previous: &Beam,
    word: &str,
    word_score: f64,
    log_lm: &F,
) -> Option<(usize, f64)>
where
    F: Fn(&str, &str) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, entry) in previous.entries().iter().enumerate() {
        let score = entry.score + log_lm(&entry.word, word) + word_score;
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

/// One step of the beam-pruned Viterbi recurrence.
pub fn advance<F>(previous: &Beam, candidates: &WordLikelihoods, width: usize, log_lm: F) -> Beam
where
    F: Fn(&str, &str) -> f64,
{
    let mut beam = Beam::with_width(width);
    for (word, word_score) in candidates.iter() {
        if let Some((back_pointer, score)) = best_predecessor(previous, word, word_score, &log_lm) {
            beam.insert(BeamEntry {
                word: word.to_string(),
                back_pointer,
                score,
            });
        }
    }
    beam
}
