use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::greedy::decode_greedy;
use super::trellis::Trellis;
use crate::config::DecoderConfig;
use crate::lm::normalize::BigramScorer;
use crate::pipeline::builder::SentenceRecognizerBuilder;
use crate::pipeline::defaults::{BeamSentenceDecoder, GreedySentenceDecoder};
use crate::pipeline::traits::{LanguageModel, SentenceDecoder};
use crate::types::{
    TestItem, TestSet, WordLikelihoodTable, WordLikelihoods, SENTENCE_END, SENTENCE_START,
};

const SEED: u64 = 42;

struct PairLm {
    vocabulary: Vec<&'static str>,
    pairs: HashMap<(&'static str, &'static str), f64>,
    default: f64,
}

impl LanguageModel for PairLm {
    fn log_unigram(&self, word: &str) -> Option<f64> {
        self.vocabulary
            .iter()
            .any(|known| *known == word)
            .then_some(-1.0)
    }

    fn log_bigram(&self, previous: &str, current: &str) -> f64 {
        self.pairs
            .iter()
            .find(|((p, c), _)| *p == previous && *c == current)
            .map_or(self.default, |(_, score)| *score)
    }
}

fn cat_run_lm() -> PairLm {
    PairLm {
        vocabulary: vec![SENTENCE_START, SENTENCE_END, "CAT", "DOG", "RUN", "JUMP"],
        pairs: HashMap::from([
            ((SENTENCE_START, "CAT"), -0.1),
            (("CAT", "RUN"), -0.2),
            (("RUN", SENTENCE_END), -0.1),
        ]),
        default: -5.0,
    }
}

fn cat_run_rows() -> Vec<WordLikelihoods> {
    vec![
        [("CAT", -1.0), ("DOG", -2.0)].into_iter().collect(),
        [("RUN", -0.5), ("JUMP", -1.5)].into_iter().collect(),
    ]
}

/// Random rows over `W0..Wn` plus a dense random transition table.
struct RandomCase {
    rows: Vec<WordLikelihoods>,
    transitions: HashMap<(String, String), f64>,
}

impl RandomCase {
    fn generate(rng: &mut StdRng) -> Self {
        let vocab_size = rng.gen_range(2..7);
        let positions = rng.gen_range(1..6);
        let words: Vec<String> = (0..vocab_size).map(|i| format!("W{i}")).collect();

        let rows = (0..positions)
            .map(|_| {
                words
                    .iter()
                    .map(|w| (w.clone(), rng.gen_range(-20.0..0.0)))
                    .collect()
            })
            .collect();

        let mut from = words.clone();
        from.push(SENTENCE_START.to_string());
        let mut to = words;
        to.push(SENTENCE_END.to_string());
        let mut transitions = HashMap::new();
        for p in &from {
            for c in &to {
                transitions.insert((p.clone(), c.clone()), rng.gen_range(-8.0..0.0));
            }
        }
        Self { rows, transitions }
    }

    fn log_lm(&self) -> impl Fn(&str, &str) -> f64 + Copy + '_ {
        move |p: &str, c: &str| self.transitions[&(p.to_string(), c.to_string())]
    }

    fn trellis(&self, width: usize) -> Trellis {
        let mut trellis = Trellis::new();
        for row in &self.rows {
            trellis.extend(row, width, self.log_lm()).unwrap();
        }
        trellis.finalize(self.log_lm()).unwrap();
        trellis
    }

    /// Exhaustive search over every word sequence.
    fn brute_force_best(&self) -> (Vec<String>, f64) {
        let log_lm = self.log_lm();
        let mut best: (Vec<String>, f64) = (Vec::new(), f64::NEG_INFINITY);
        let mut stack: Vec<(Vec<String>, f64)> = vec![(Vec::new(), 0.0)];
        while let Some((path, score)) = stack.pop() {
            let previous = path.last().map_or(SENTENCE_START, String::as_str);
            if path.len() == self.rows.len() {
                let total = score + log_lm(previous, SENTENCE_END);
                if total > best.1 {
                    best = (path, total);
                }
                continue;
            }
            for (word, word_score) in self.rows[path.len()].iter() {
                let mut next = path.clone();
                next.push(word.to_string());
                stack.push((next, score + log_lm(previous, word) + word_score));
            }
        }
        best
    }
}

#[test]
fn end_to_end_cat_run() {
    let rows = cat_run_rows();
    let table = WordLikelihoodTable::from_rows(rows);
    let items = (0..2)
        .map(|id| TestItem {
            id,
            features: vec![vec![0.0]],
            lengths: vec![1],
        })
        .collect();
    let test_set = TestSet::new(
        items,
        BTreeMap::from([(7u32, vec![0usize, 1])]),
        vec!["CAT".into(), "RUN".into()],
    )
    .unwrap();

    for beam_width in [1, DecoderConfig::SIMPLE_BEAM_WIDTH, DecoderConfig::DEFAULT_BEAM_WIDTH] {
        let recognizer = SentenceRecognizerBuilder::new(DecoderConfig {
            lm_ratio: 1.0,
            beam_width,
        })
        .with_language_model(Arc::new(cat_run_lm()))
        .build()
        .unwrap();

        let decoded = recognizer.decode_test_set(&table, &test_set).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].video, 7);
        assert_eq!(decoded[0].words, vec!["CAT".to_string(), "RUN".to_string()]);
        assert!((decoded[0].score - (-1.9)).abs() < 1e-12);

        let run = recognizer.evaluate(&table, &test_set).unwrap();
        assert_eq!(run.summary.substitutions, 0);
        assert_eq!(run.summary.correct, 2);

        let mut seen = Vec::new();
        let observed = recognizer
            .evaluate_with(&table, &test_set, |sentence| seen.push(sentence.video))
            .unwrap();
        assert_eq!(seen, vec![7]);
        assert_eq!(observed.sentences, run.sentences);
        assert_eq!(observed.summary, run.summary);
    }
}

#[test]
fn missing_item_likelihoods_are_reported() {
    let recognizer = SentenceRecognizerBuilder::new(DecoderConfig::default())
        .with_language_model(Arc::new(cat_run_lm()))
        .build()
        .unwrap();
    let table = WordLikelihoodTable::from_rows(cat_run_rows());
    let result = recognizer.decode_video(1, &[0, 5], &table);
    assert!(matches!(
        result,
        Err(crate::error::RecognizerError::MissingLikelihoods { item_id: 5 })
    ));
}

#[test]
fn strong_language_model_overrides_word_scores() {
    // DOG is acoustically better, but the bigram strongly prefers CAT.
    let rows: Vec<WordLikelihoods> = vec![[("CAT", -2.0), ("DOG", -1.0)].into_iter().collect()];
    let lm = cat_run_lm();
    let row_refs: Vec<&WordLikelihoods> = rows.iter().collect();

    let weak = BigramScorer::new(&lm, 0.0);
    let decoded = BeamSentenceDecoder::new(3).decode(&row_refs, &weak).unwrap();
    assert_eq!(decoded.words, vec!["DOG".to_string()]);

    let strong = BigramScorer::new(&lm, 1.0);
    let decoded = BeamSentenceDecoder::new(3).decode(&row_refs, &strong).unwrap();
    assert_eq!(decoded.words, vec!["CAT".to_string()]);
}

#[test]
fn failed_words_are_not_decoded_when_alternatives_exist() {
    let rows: Vec<WordLikelihoods> = vec![
        [("CAT", f64::NEG_INFINITY), ("DOG", -30.0)].into_iter().collect(),
        [("RUN", f64::NEG_INFINITY), ("JUMP", -30.0)].into_iter().collect(),
    ];
    let lm = cat_run_lm();
    let scorer = BigramScorer::new(&lm, 1.0);
    let row_refs: Vec<&WordLikelihoods> = rows.iter().collect();
    let decoded = BeamSentenceDecoder::new(3).decode(&row_refs, &scorer).unwrap();
    assert_eq!(decoded.words, vec!["DOG".to_string(), "JUMP".to_string()]);
}

#[test]
fn beams_stay_bounded_and_ascending() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..200 {
        let case = RandomCase::generate(&mut rng);
        let width = rng.gen_range(1..6);
        let trellis = case.trellis(width);
        for beam in &trellis.beams()[1..] {
            assert!(!beam.is_empty());
            assert!(beam.len() <= width);
            assert!(beam
                .entries()
                .windows(2)
                .all(|pair| pair[0].score <= pair[1].score));
        }
    }
}

#[test]
fn back_pointers_are_exact_given_survivors() {
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    for _ in 0..200 {
        let case = RandomCase::generate(&mut rng);
        let width = rng.gen_range(1..6);
        let trellis = case.trellis(width);
        let log_lm = case.log_lm();
        let beams = trellis.beams();

        for position in 1..beams.len() {
            let previous = &beams[position - 1];
            let word_scores = case.rows.get(position - 1);
            for entry in beams[position].entries() {
                let word_score = word_scores.map_or(0.0, |row| row.get(&entry.word).unwrap());
                let recomputed = previous
                    .entries()
                    .iter()
                    .map(|p| p.score + log_lm(&p.word, &entry.word) + word_score)
                    .fold(f64::NEG_INFINITY, f64::max);
                assert_eq!(entry.score, recomputed);

                let chosen = &previous.entries()[entry.back_pointer];
                assert_eq!(
                    chosen.score + log_lm(&chosen.word, &entry.word) + word_score,
                    recomputed
                );
            }
        }
    }
}

#[test]
fn surviving_words_are_the_top_candidates() {
    let mut rng = StdRng::seed_from_u64(SEED + 2);
    for _ in 0..200 {
        let case = RandomCase::generate(&mut rng);
        let width = rng.gen_range(1..4);
        let trellis = case.trellis(width);
        let log_lm = case.log_lm();
        let beams = trellis.beams();

        for (position, row) in case.rows.iter().enumerate() {
            let previous = &beams[position];
            let current = &beams[position + 1];
            let Some(lowest) = current.entries().first() else {
                panic!("empty beam at position {}", position + 1);
            };
            for (word, word_score) in row.iter() {
                if current.entries().iter().any(|e| e.word == word) {
                    continue;
                }
                let best = previous
                    .entries()
                    .iter()
                    .map(|p| p.score + log_lm(&p.word, word) + word_score)
                    .fold(f64::NEG_INFINITY, f64::max);
                assert!(best <= lowest.score);
            }
        }
    }
}

#[test]
fn wide_beam_recovers_exhaustive_best_path() {
    let mut rng = StdRng::seed_from_u64(SEED + 3);
    for _ in 0..100 {
        let case = RandomCase::generate(&mut rng);
        // A beam as wide as the vocabulary never prunes.
        let width = case.rows[0].len();
        let (words, score) = case.trellis(width).backtrack().unwrap();
        let (expected_words, expected_score) = case.brute_force_best();
        assert_eq!(words, expected_words);
        assert!((score - expected_score).abs() < 1e-9);
    }
}

#[test]
fn beam_width_one_matches_greedy() {
    let mut rng = StdRng::seed_from_u64(SEED + 4);
    for _ in 0..200 {
        let case = RandomCase::generate(&mut rng);
        let row_refs: Vec<&WordLikelihoods> = case.rows.iter().collect();
        let beam = case.trellis(1).backtrack().unwrap();
        let greedy = decode_greedy(&row_refs, case.log_lm()).unwrap();
        assert_eq!(beam, greedy);
    }
}

#[test]
fn beam_width_one_decoder_matches_greedy_decoder() {
    let lm = cat_run_lm();
    let scorer = BigramScorer::new(&lm, 0.7);
    let rows = [
        [("CAT", -1.0), ("DOG", -0.9), ("JUMP", -3.0)]
            .into_iter()
            .collect::<WordLikelihoods>(),
        [("RUN", -2.0), ("JUMP", -1.0), ("DOG", -1.2)]
            .into_iter()
            .collect(),
    ];
    let row_refs: Vec<&WordLikelihoods> = rows.iter().collect();
    let beam = BeamSentenceDecoder::new(1).decode(&row_refs, &scorer).unwrap();
    let greedy = GreedySentenceDecoder.decode(&row_refs, &scorer).unwrap();
    assert_eq!(beam, greedy);
}

#[test]
fn trellis_is_seeded_with_sentence_start() {
    let trellis = Trellis::new();
    assert_eq!(trellis.beams().len(), 1);
    assert_eq!(trellis.beams()[0].entries()[0].word, SENTENCE_START);
    assert_eq!(trellis.beams()[0].entries()[0].score, 0.0);
}
