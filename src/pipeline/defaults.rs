use crate::error::RecognizerError;
use crate::lm::normalize::BigramScorer;
use crate::pipeline::traits::{DecodedPath, SentenceDecoder};
use crate::recognition::greedy::decode_greedy;
use crate::recognition::trellis::Trellis;
use crate::types::WordLikelihoods;

pub struct BeamSentenceDecoder {
    beam_width: usize,
}

impl BeamSentenceDecoder {
    pub fn new(beam_width: usize) -> Self {
        Self {
            beam_width: beam_width.max(1),
        }
    }

    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    /// Build the full trellis, including the `</s>` position.
    pub fn build_trellis(
        &self,
        rows: &[&WordLikelihoods],
        transitions: &BigramScorer<'_>,
    ) -> Result<Trellis, RecognizerError> {
        let log_lm = |previous: &str, current: &str| transitions.log_lm(previous, current);
        let mut trellis = Trellis::new();
        for row in rows {
            trellis.extend(row, self.beam_width, log_lm)?;
        }
        trellis.finalize(log_lm)?;
        Ok(trellis)
    }
}

impl SentenceDecoder for BeamSentenceDecoder {
    fn decode(
        &self,
        rows: &[&WordLikelihoods],
        transitions: &BigramScorer<'_>,
    ) -> Result<DecodedPath, RecognizerError> {
        let (words, score) = self.build_trellis(rows, transitions)?.backtrack()?;
        Ok(DecodedPath { words, score })
    }
}

pub struct GreedySentenceDecoder;

impl SentenceDecoder for GreedySentenceDecoder {
    fn decode(
        &self,
        rows: &[&WordLikelihoods],
        transitions: &BigramScorer<'_>,
    ) -> Result<DecodedPath, RecognizerError> {
        let (words, score) = decode_greedy(rows, |previous, current| {
            transitions.log_lm(previous, current)
        })?;
        Ok(DecodedPath { words, score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::traits::LanguageModel;

    struct FlatLm;

    impl LanguageModel for FlatLm {
        fn log_unigram(&self, _word: &str) -> Option<f64> {
            Some(-1.0)
        }

        fn log_bigram(&self, _previous: &str, _current: &str) -> f64 {
            -1.0
        }
    }

    #[test]
    fn beam_decoder_clamps_width() {
        assert_eq!(BeamSentenceDecoder::new(0).beam_width(), 1);
        assert_eq!(BeamSentenceDecoder::new(5).beam_width(), 5);
    }

    #[test]
    fn flat_lm_reduces_to_argmax() {
        let lm = FlatLm;
        let scorer = BigramScorer::new(&lm, 1.0);
        let first: WordLikelihoods = [("A", -2.0), ("B", -1.0)].into_iter().collect();
        let second: WordLikelihoods = [("C", -1.0), ("D", -4.0)].into_iter().collect();
        let rows = [&first, &second];

        let beam = BeamSentenceDecoder::new(3).decode(&rows, &scorer).unwrap();
        assert_eq!(beam.words, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(beam.score, -5.0);

        let greedy = GreedySentenceDecoder.decode(&rows, &scorer).unwrap();
        assert_eq!(greedy, beam);
    }

    #[test]
    fn trellis_has_start_positions_and_end() {
        let lm = FlatLm;
        let scorer = BigramScorer::new(&lm, 1.0);
        let row: WordLikelihoods = [("A", -2.0), ("B", -1.0)].into_iter().collect();
        let trellis = BeamSentenceDecoder::new(3)
            .build_trellis(&[&row, &row, &row], &scorer)
            .unwrap();
        assert_eq!(trellis.beams().len(), 5);
        assert_eq!(trellis.beams()[4].len(), 1);
    }
}
