use std::collections::HashMap;
use std::path::Path;

use crate::error::RecognizerError;
use crate::pipeline::traits::LanguageModel;

/// Log10 probability ARPA files use in place of zero.
pub const ARPA_FLOOR_LOG_PROB: f64 = -99.0;
const ARPA_UNK: &str = "<unk>";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Unigram {
    log_prob: f64,
    backoff: f64,
}

/// Back-off bigram model read from an ARPA file. Scores are log10, as stored.
#[derive(Debug, Clone, Default)]
pub struct ArpaLanguageModel {
    unigrams: HashMap<String, Unigram>,
    bigrams: HashMap<String, HashMap<String, f64>>,
    bigram_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Data,
    Grams(usize),
    End,
}

impl ArpaLanguageModel {
    pub fn load(path: &Path) -> Result<Self, RecognizerError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| RecognizerError::io("read ARPA model", e))?;
        let model = Self::parse(&data)?;
        tracing::debug!(
            path = %path.display(),
            unigrams = model.unigrams.len(),
            bigrams = model.bigram_count,
            "loaded ARPA language model"
        );
        Ok(model)
    }

    pub fn parse(text: &str) -> Result<Self, RecognizerError> {
        let mut model = Self::default();
        let mut declared: HashMap<usize, usize> = HashMap::new();
        let mut section = Section::Preamble;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if line == "\\data\\" {
                section = Section::Data;
                continue;
            }
            if line == "\\end\\" {
                section = Section::End;
                break;
            }
            if let Some(order) = parse_section_header(line) {
                if section == Section::Preamble {
                    return Err(RecognizerError::parse(line_no, "n-gram section before \\data\\"));
                }
                section = Section::Grams(order);
                continue;
            }

            match section {
                Section::Preamble | Section::End => {}
                Section::Data => {
                    let (order, count) = parse_count_line(line)
                        .ok_or_else(|| RecognizerError::parse(line_no, "malformed ngram count"))?;
                    declared.insert(order, count);
                }
                Section::Grams(1) => {
                    let (log_prob, words, backoff) = parse_entry(line, 1, line_no)?;
                    model.unigrams.insert(
                        words[0].to_string(),
                        Unigram {
                            log_prob,
                            backoff: backoff.unwrap_or(0.0),
                        },
                    );
                }
                Section::Grams(2) => {
                    let (log_prob, words, _) = parse_entry(line, 2, line_no)?;
                    let inserted = model
                        .bigrams
                        .entry(words[0].to_string())
                        .or_default()
                        .insert(words[1].to_string(), log_prob);
                    if inserted.is_none() {
                        model.bigram_count += 1;
                    }
                }
                // Higher orders are not used by a bigram decoder.
                Section::Grams(_) => {}
            }
        }

        if section == Section::Preamble {
            return Err(RecognizerError::parse(0, "missing \\data\\ header"));
        }
        if model.unigrams.is_empty() {
            return Err(RecognizerError::parse(0, "model has no unigrams"));
        }
        for (order, actual) in [(1, model.unigrams.len()), (2, model.bigram_count)] {
            if let Some(&expected) = declared.get(&order) {
                if expected != actual {
                    return Err(RecognizerError::parse(
                        0,
                        format!("declared {expected} {order}-grams but read {actual}"),
                    ));
                }
            }
        }
        Ok(model)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.unigrams.len()
    }

    pub fn bigram_count(&self) -> usize {
        self.bigram_count
    }

    fn unigram_or_unk(&self, word: &str) -> f64 {
        if let Some(unigram) = self.unigrams.get(word) {
            return unigram.log_prob;
        }
        match self.unigrams.get(ARPA_UNK) {
            Some(unk) => unk.log_prob,
            None => {
                tracing::debug!(word, "word outside ARPA vocabulary; using floor probability");
                ARPA_FLOOR_LOG_PROB
            }
        }
    }
}

impl LanguageModel for ArpaLanguageModel {
    fn log_unigram(&self, word: &str) -> Option<f64> {
        self.unigrams.get(word).map(|u| u.log_prob)
    }

    fn log_bigram(&self, previous: &str, current: &str) -> f64 {
        if let Some(log_prob) = self
            .bigrams
            .get(previous)
            .and_then(|followers| followers.get(current))
        {
            return *log_prob;
        }
        let backoff = self.unigrams.get(previous).map_or(0.0, |u| u.backoff);
        backoff + self.unigram_or_unk(current)
    }
}

fn parse_section_header(line: &str) -> Option<usize> {
    line.strip_prefix('\\')?
        .strip_suffix("-grams:")?
        .parse()
        .ok()
}

fn parse_count_line(line: &str) -> Option<(usize, usize)> {
    let (order, count) = line.strip_prefix("ngram ")?.split_once('=')?;
    Some((order.trim().parse().ok()?, count.trim().parse().ok()?))
}

fn parse_entry(
    line: &str,
    order: usize,
    line_no: usize,
) -> Result<(f64, Vec<&str>, Option<f64>), RecognizerError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != order + 1 && fields.len() != order + 2 {
        return Err(RecognizerError::parse(
            line_no,
            format!("expected {} or {} fields, found {}", order + 1, order + 2, fields.len()),
        ));
    }
    let log_prob = parse_number(fields[0], line_no)?;
    let backoff = fields
        .get(order + 1)
        .map(|value| parse_number(value, line_no))
        .transpose()?;
    Ok((log_prob, fields[1..=order].to_vec(), backoff))
}

/// `-inf` (zero probability) becomes the floor; NaN and `+inf` are rejected.
fn parse_number(value: &str, line_no: usize) -> Result<f64, RecognizerError> {
    let number = value
        .parse::<f64>()
        .map_err(|_| RecognizerError::parse(line_no, format!("invalid number '{value}'")))?;
    if number == f64::NEG_INFINITY {
        return Ok(ARPA_FLOOR_LOG_PROB);
    }
    if !number.is_finite() {
        return Err(RecognizerError::parse(
            line_no,
            format!("non-finite number '{value}'"),
        ));
    }
    Ok(number)
}
