use std::path::{Path, PathBuf};
use std::sync::Arc;

use asl_recognizer::{
    format_sentence_line, format_summary, recognize, summarize_guesses, ArpaLanguageModel,
    DecodeRun, DecoderConfig, LanguageModel, Meta, Report, SentenceRecognizerBuilder, TestSet,
    WordLikelihoodTable, WordModelSet,
};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[path = "recognition_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "recognition_report")]
#[command(about = "Decode ASL test sentences and report word error rates")]
struct Args {
    #[arg(long, env = "ASL_REPORT_MODELS", default_value = "data/models.json")]
    models: PathBuf,
    #[arg(long, env = "ASL_REPORT_TEST_SET", default_value = "data/test_set.json")]
    test_set: PathBuf,
    #[arg(long, env = "ASL_REPORT_LM", default_value = "data/ukn.2.lm")]
    lm: PathBuf,
    #[arg(long, env = "ASL_REPORT_CONFIG")]
    config: Option<PathBuf>,
    /// Language-model weight. Repeat the flag to sweep several values.
    #[arg(long, env = "ASL_REPORT_LM_RATIO", value_delimiter = ',')]
    lm_ratio: Vec<f64>,
    #[arg(long, env = "ASL_REPORT_BEAM_WIDTH")]
    beam_width: Option<usize>,
    #[arg(long, env = "ASL_REPORT_OUT")]
    out: Option<PathBuf>,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let models_path = resolve_path(&repo_root, &args.models);
    let test_set_path = resolve_path(&repo_root, &args.test_set);
    let lm_path = resolve_path(&repo_root, &args.lm);

    let mut base_config = match args.config.as_ref() {
        Some(path) => DecoderConfig::load(&resolve_path(&repo_root, path))
            .map_err(|err| err.to_string())?,
        None => DecoderConfig::default(),
    };
    if let Some(beam_width) = args.beam_width {
        base_config.beam_width = beam_width;
    }
    let lm_ratios = if args.lm_ratio.is_empty() {
        vec![base_config.lm_ratio]
    } else {
        args.lm_ratio.clone()
    };

    let models = WordModelSet::load_gaussian_hmms(&models_path).map_err(|err| err.to_string())?;
    let test_set = TestSet::load(&test_set_path).map_err(|err| err.to_string())?;
    let language_model: Arc<dyn LanguageModel> =
        Arc::new(ArpaLanguageModel::load(&lm_path).map_err(|err| err.to_string())?);
    if test_set.sentences().is_empty() {
        return Err(format!(
            "Test set '{}' contains no sentences.",
            test_set_path.display()
        ));
    }

    let (table, guesses) = recognize(&models, &test_set);
    let truth = table
        .item_ids()
        .iter()
        .map(|&item_id| test_set.wordlist().get(item_id).cloned().unwrap_or_default())
        .collect::<Vec<_>>();
    let baseline = summarize_guesses(&guesses, &truth);
    println!("Baseline (best guess, no language model):{}", format_summary(&baseline));

    let mut runs = Vec::with_capacity(lm_ratios.len());
    for lm_ratio in lm_ratios {
        let config = DecoderConfig {
            lm_ratio,
            ..base_config.clone()
        };
        runs.push(decode_run(config, Arc::clone(&language_model), &table, &test_set)?);
    }

    if let Some(out) = args.out.as_ref() {
        let out_path = resolve_path(&repo_root, out);
        let report = Report {
            schema_version: 1,
            meta: Meta {
                generated_at: Utc::now().to_rfc3339(),
                models_path: models_path.to_string_lossy().into_owned(),
                lm_path: lm_path.to_string_lossy().into_owned(),
                item_count: test_set.items().len(),
                video_count: test_set.sentences().len(),
            },
            baseline: Some(baseline),
            runs,
        };
        json_report_formatter::write_report(&out_path, &report)?;
        println!("{}", out_path.display());
    }
    Ok(())
}

fn decode_run(
    config: DecoderConfig,
    language_model: Arc<dyn LanguageModel>,
    table: &WordLikelihoodTable,
    test_set: &TestSet,
) -> Result<DecodeRun, String> {
    let recognizer = SentenceRecognizerBuilder::new(config)
        .with_language_model(language_model)
        .build()
        .map_err(|err| err.to_string())?;

    let progress = ProgressBar::new(test_set.sentences().len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message(format!("lm_ratio={}", recognizer.lm_ratio()));

    let run = recognizer
        .evaluate_with(table, test_set, |_| progress.inc(1))
        .map_err(|err| err.to_string())?;
    progress.finish_and_clear();

    println!(
        "\nlm_ratio = {}, beam_width = {}",
        recognizer.lm_ratio(),
        recognizer.beam_width()
    );
    for sentence in &run.sentences {
        println!("{}", format_sentence_line(sentence));
    }
    println!("{}", format_summary(&run.summary));
    Ok(run)
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}
