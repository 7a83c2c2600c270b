use std::sync::Arc;

use crate::config::DecoderConfig;
use crate::error::RecognizerError;
use crate::lm::normalize::BigramScorer;
use crate::pipeline::traits::{DecodedPath, LanguageModel, SentenceDecoder};
use crate::recognition::report::{compare_sentence, summarize, DecodeRun, SentenceReport};
use crate::types::{DecodedSentence, TestSet, WordLikelihoodTable, WordLikelihoods};

pub struct SentenceRecognizer {
    config: DecoderConfig,
    language_model: Arc<dyn LanguageModel>,
    decoder: Box<dyn SentenceDecoder>,
}

pub(crate) struct SentenceRecognizerParts {
    pub config: DecoderConfig,
    pub language_model: Arc<dyn LanguageModel>,
    pub decoder: Box<dyn SentenceDecoder>,
}

impl SentenceRecognizer {
    pub(crate) fn from_parts(parts: SentenceRecognizerParts) -> Self {
        Self {
            config: parts.config,
            language_model: parts.language_model,
            decoder: parts.decoder,
        }
    }

    pub fn lm_ratio(&self) -> f64 {
        self.config.lm_ratio
    }

    pub fn beam_width(&self) -> usize {
        self.config.beam_width
    }

    /// Decode a sentence given its per-position likelihood rows.
    pub fn decode_rows(&self, rows: &[&WordLikelihoods]) -> Result<DecodedPath, RecognizerError> {
        let transitions = BigramScorer::new(self.language_model.as_ref(), self.config.lm_ratio);
        self.decoder.decode(rows, &transitions)
    }

    pub fn decode_video(
        &self,
        video: u32,
        item_ids: &[usize],
        table: &WordLikelihoodTable,
    ) -> Result<DecodedSentence, RecognizerError> {
        let rows = item_ids
            .iter()
            .map(|&item_id| {
                table
                    .get(item_id)
                    .ok_or(RecognizerError::MissingLikelihoods { item_id })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let path = self.decode_rows(&rows)?;
        tracing::debug!(
            video,
            positions = rows.len(),
            score = path.score,
            "decoded sentence"
        );
        Ok(DecodedSentence {
            video,
            words: path.words,
            score: path.score,
        })
    }

    /// Decode every video of the test set, in ascending video order.
    pub fn decode_test_set(
        &self,
        table: &WordLikelihoodTable,
        test_set: &TestSet,
    ) -> Result<Vec<DecodedSentence>, RecognizerError> {
        test_set
            .sentences()
            .iter()
            .map(|(&video, item_ids)| self.decode_video(video, item_ids, table))
            .collect()
    }

    /// Decode and score every video against the ground truth.
    pub fn evaluate(
        &self,
        table: &WordLikelihoodTable,
        test_set: &TestSet,
    ) -> Result<DecodeRun, RecognizerError> {
        self.evaluate_with(table, test_set, |_| {})
    }

    /// Like `evaluate`, calling `on_video` after each video is scored.
    pub fn evaluate_with<F>(
        &self,
        table: &WordLikelihoodTable,
        test_set: &TestSet,
        mut on_video: F,
    ) -> Result<DecodeRun, RecognizerError>
    where
        F: FnMut(&SentenceReport),
    {
        let mut sentences = Vec::with_capacity(test_set.sentences().len());
        for (&video, item_ids) in test_set.sentences() {
            let decoded = self.decode_video(video, item_ids, table)?;
            let sentence = compare_sentence(&decoded, &test_set.reference_sentence(video));
            on_video(&sentence);
            sentences.push(sentence);
        }
        let summary = summarize(&sentences);
        tracing::info!(
            lm_ratio = self.config.lm_ratio,
            beam_width = self.config.beam_width,
            wer = summary.wer,
            "decode run complete"
        );
        Ok(DecodeRun {
            lm_ratio: self.config.lm_ratio,
            beam_width: self.config.beam_width,
            sentences,
            summary,
        })
    }
}
