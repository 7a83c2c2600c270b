use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DecoderConfig;
use crate::error::RecognizerError;
use crate::lm::arpa::ArpaLanguageModel;
use crate::pipeline::defaults::{BeamSentenceDecoder, GreedySentenceDecoder};
use crate::pipeline::runtime::{SentenceRecognizer, SentenceRecognizerParts};
use crate::pipeline::traits::{LanguageModel, SentenceDecoder};

pub struct SentenceRecognizerBuilder {
    config: DecoderConfig,
    lm_path: Option<PathBuf>,
    language_model: Option<Arc<dyn LanguageModel>>,
    decoder: Option<Box<dyn SentenceDecoder>>,
}

impl SentenceRecognizerBuilder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            lm_path: None,
            language_model: None,
            decoder: None,
        }
    }

    /// ARPA file to load when no language model instance is supplied.
    pub fn with_lm_path(mut self, path: impl AsRef<Path>) -> Self {
        self.lm_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_language_model(mut self, language_model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(language_model);
        self
    }

    pub fn with_decoder(mut self, decoder: Box<dyn SentenceDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn build(self) -> Result<SentenceRecognizer, RecognizerError> {
        self.config.validate()?;

        let language_model: Arc<dyn LanguageModel> = match (self.language_model, self.lm_path) {
            (Some(language_model), _) => language_model,
            (None, Some(path)) => Arc::new(ArpaLanguageModel::load(&path)?),
            (None, None) => {
                return Err(RecognizerError::invalid_input(
                    "a language model or an ARPA path is required",
                ))
            }
        };

        let decoder: Box<dyn SentenceDecoder> = match self.decoder {
            Some(decoder) => decoder,
            None if self.config.beam_width <= 1 => Box::new(GreedySentenceDecoder),
            None => Box::new(BeamSentenceDecoder::new(self.config.beam_width)),
        };

        Ok(SentenceRecognizer::from_parts(SentenceRecognizerParts {
            config: self.config,
            language_model,
            decoder,
        }))
    }
}
