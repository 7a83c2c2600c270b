use crate::error::RecognizerError;
use crate::recognition::beam::{advance, best_predecessor, Beam, BeamEntry};
use crate::types::{WordLikelihoods, SENTENCE_END, SENTENCE_START};

/// Append-only sequence of beams for one sentence, `<s>` at position 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Trellis {
    beams: Vec<Beam>,
    finalized: bool,
}

impl Default for Trellis {
    fn default() -> Self {
        Self::new()
    }
}

impl Trellis {
    pub fn new() -> Self {
        Self {
            beams: vec![Beam::seed(SENTENCE_START, 0.0)],
            finalized: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_beams(beams: Vec<Beam>, finalized: bool) -> Self {
        Self { beams, finalized }
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn last(&self) -> &Beam {
        // `new` always seeds position 0.
        &self.beams[self.beams.len() - 1]
    }

    /// Extend by one sentence position.
    pub fn extend<F>(
        &mut self,
        candidates: &WordLikelihoods,
        width: usize,
        log_lm: F,
    ) -> Result<(), RecognizerError>
    where
        F: Fn(&str, &str) -> f64,
    {
        if self.finalized {
            return Err(RecognizerError::invalid_input(
                "cannot extend a trellis after </s>",
            ));
        }
        let beam = advance(self.last(), candidates, width, log_lm);
        if beam.is_empty() {
            return Err(RecognizerError::EmptyBeam {
                position: self.beams.len(),
            });
        }
        tracing::debug!(
            position = self.beams.len(),
            entries = beam.len(),
            best = beam.best().map_or(f64::NEG_INFINITY, |entry| entry.score),
            "advanced beam"
        );
        self.beams.push(beam);
        Ok(())
    }

    /// Close the sentence with a single `</s>` entry.
    pub fn finalize<F>(&mut self, log_lm: F) -> Result<(), RecognizerError>
    where
        F: Fn(&str, &str) -> f64,
    {
        if self.finalized {
            return Ok(());
        }
        let (back_pointer, score) = best_predecessor(self.last(), SENTENCE_END, 0.0, &log_lm)
            .ok_or(RecognizerError::EmptyBeam {
                position: self.beams.len(),
            })?;
        let mut end = Beam::with_width(1);
        end.insert(BeamEntry {
            word: SENTENCE_END.to_string(),
            back_pointer,
            score,
        });
        self.beams.push(end);
        self.finalized = true;
        Ok(())
    }

    /// Follow back-pointers from `</s>` to `<s>`; returns the words in order
    /// and the final score.
    pub fn backtrack(&self) -> Result<(Vec<String>, f64), RecognizerError> {
        if !self.finalized {
            return Err(RecognizerError::invalid_input(
                "trellis must be finalized before backtracking",
            ));
        }
        let end_position = self.beams.len() - 1;
        let end = self.beams[end_position]
            .best()
            .ok_or(RecognizerError::EmptyBeam {
                position: end_position,
            })?;

        let mut words = Vec::with_capacity(end_position.saturating_sub(1));
        let mut index = end.back_pointer;
        for position in (1..end_position).rev() {
            let entry = self.beams[position]
                .get(index)
                .ok_or(RecognizerError::BrokenBackPointer { position, index })?;
            words.push(entry.word.clone());
            index = entry.back_pointer;
        }
        if self.beams[0].get(index).is_none() {
            return Err(RecognizerError::BrokenBackPointer { position: 0, index });
        }
        words.reverse();
        Ok((words, end.score))
    }
}
