use serde::Serialize;

use crate::types::DecodedSentence;

const MISMATCH_MARKER: char = '*';

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<ErrorSummary>,
    pub runs: Vec<DecodeRun>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub models_path: String,
    pub lm_path: String,
    pub item_count: usize,
    pub video_count: usize,
}

/// Decoder output for one `lm_ratio` setting.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeRun {
    pub lm_ratio: f64,
    pub beam_width: usize,
    pub sentences: Vec<SentenceReport>,
    pub summary: ErrorSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceReport {
    pub video: u32,
    /// Decoded words, mismatches prefixed with `*`.
    pub marked: Vec<String>,
    pub reference: Vec<String>,
    pub substitutions: u32,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub substitutions: u32,
    pub total_words: u32,
    pub correct: u32,
    pub wer: f64,
}

impl ErrorSummary {
    pub fn new(substitutions: u32, total_words: u32) -> Self {
        let wer = if total_words == 0 {
            0.0
        } else {
            substitutions as f64 / total_words as f64
        };
        Self {
            substitutions,
            total_words,
            correct: total_words.saturating_sub(substitutions),
            wer,
        }
    }
}

/// Compare position by position. Missing or extra decoded words count as errors.
pub fn compare_sentence(decoded: &DecodedSentence, reference: &[String]) -> SentenceReport {
    let mut marked = Vec::with_capacity(decoded.words.len());
    let mut substitutions = 0u32;
    for (idx, word) in decoded.words.iter().enumerate() {
        if reference.get(idx) == Some(word) {
            marked.push(word.clone());
        } else {
            marked.push(format!("{MISMATCH_MARKER}{word}"));
            substitutions += 1;
        }
    }
    substitutions += to_u32(reference.len().saturating_sub(decoded.words.len()));

    SentenceReport {
        video: decoded.video,
        marked,
        reference: reference.to_vec(),
        substitutions,
        score: decoded.score,
    }
}

pub fn summarize(sentences: &[SentenceReport]) -> ErrorSummary {
    let substitutions = sentences.iter().map(|s| s.substitutions).sum();
    let total_words = sentences.iter().map(|s| to_u32(s.reference.len())).sum();
    ErrorSummary::new(substitutions, total_words)
}

/// WER of per-item guesses against the ground-truth word list.
pub fn summarize_guesses(guesses: &[String], wordlist: &[String]) -> ErrorSummary {
    let substitutions = guesses
        .iter()
        .zip(wordlist)
        .filter(|(guess, truth)| guess != truth)
        .count()
        + wordlist.len().saturating_sub(guesses.len());
    ErrorSummary::new(to_u32(substitutions), to_u32(wordlist.len()))
}

pub fn format_sentence_line(sentence: &SentenceReport) -> String {
    format!(
        "{:5}: {:60}  {}",
        sentence.video,
        sentence.marked.join(" "),
        sentence.reference.join(" ")
    )
}

pub fn format_summary(summary: &ErrorSummary) -> String {
    format!(
        "\n**** WER = {}\nTotal correct: {} out of {}",
        summary.wer, summary.correct, summary.total_words
    )
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
