use std::path::Path;

use crate::error::RecognizerError;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct DecoderConfig {
    /// Weight of the language-model term relative to the word-model score.
    #[serde(default = "default_lm_ratio")]
    pub lm_ratio: f64,
    /// Maximum number of partial sentences kept per position.
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,
}

impl DecoderConfig {
    pub const SIMPLE_BEAM_WIDTH: usize = 3;
    pub const DEFAULT_BEAM_WIDTH: usize = 5;
    pub const DEFAULT_LM_RATIO: f64 = 1.0;

    pub fn load(path: &Path) -> Result<Self, RecognizerError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| RecognizerError::io("read decoder config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| RecognizerError::json("parse decoder config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RecognizerError> {
        if !self.lm_ratio.is_finite() || self.lm_ratio < 0.0 {
            return Err(RecognizerError::invalid_input(format!(
                "lm_ratio must be a non-negative finite number, got {}",
                self.lm_ratio
            )));
        }
        if self.beam_width == 0 {
            return Err(RecognizerError::invalid_input("beam_width must be >= 1"));
        }
        Ok(())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            lm_ratio: Self::DEFAULT_LM_RATIO,
            beam_width: Self::DEFAULT_BEAM_WIDTH,
        }
    }
}

fn default_lm_ratio() -> f64 {
    DecoderConfig::DEFAULT_LM_RATIO
}
fn default_beam_width() -> usize {
    DecoderConfig::DEFAULT_BEAM_WIDTH
}
