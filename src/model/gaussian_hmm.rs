use serde::Deserialize;

use crate::error::RecognizerError;
use crate::pipeline::traits::WordModel;

const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Pre-trained HMM with diagonal-covariance Gaussian emissions.
#[derive(Debug, Clone, Deserialize)]
pub struct GaussianHmm {
    pub start_prob: Vec<f64>,
    pub trans_mat: Vec<Vec<f64>>,
    pub means: Vec<Vec<f64>>,
    pub variances: Vec<Vec<f64>>,
    /// Word this model recognizes; set by the loader and used in errors.
    #[serde(skip)]
    word: String,
}

impl GaussianHmm {
    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.word = word.into();
        self
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn n_states(&self) -> usize {
        self.start_prob.len()
    }

    pub fn n_features(&self) -> usize {
        self.means.first().map_or(0, Vec::len)
    }

    pub fn validate(&self) -> Result<(), String> {
        let n = self.n_states();
        if n == 0 {
            return Err("model has no states".to_string());
        }
        if self.trans_mat.len() != n || self.trans_mat.iter().any(|row| row.len() != n) {
            return Err(format!("transition matrix is not {n}x{n}"));
        }
        let d = self.n_features();
        if self.means.len() != n || self.means.iter().any(|row| row.len() != d) {
            return Err(format!("means are not {n}x{d}"));
        }
        if self.variances.len() != n || self.variances.iter().any(|row| row.len() != d) {
            return Err(format!("variances are not {n}x{d}"));
        }
        if self
            .variances
            .iter()
            .flatten()
            .any(|&v| !(v.is_finite() && v > 0.0))
        {
            return Err("variances must be positive and finite".to_string());
        }
        Ok(())
    }

    fn log_emission(&self, state: usize, frame: &[f32]) -> f64 {
        let mut quad = 0.0;
        let mut log_det = 0.0;
        for ((&x, &mean), &var) in frame
            .iter()
            .zip(&self.means[state])
            .zip(&self.variances[state])
        {
            let diff = x as f64 - mean;
            quad += diff * diff / var;
            log_det += var.ln();
        }
        -0.5 * (frame.len() as f64 * LN_2PI + log_det + quad)
    }

    /// Forward algorithm in log space over one contiguous sequence.
    fn log_forward(&self, frames: &[Vec<f32>]) -> f64 {
        let n = self.n_states();
        let log_trans: Vec<Vec<f64>> = self
            .trans_mat
            .iter()
            .map(|row| row.iter().map(|p| p.ln()).collect())
            .collect();

        let mut alpha: Vec<f64> = (0..n)
            .map(|j| self.start_prob[j].ln() + self.log_emission(j, &frames[0]))
            .collect();
        let mut next = vec![f64::NEG_INFINITY; n];
        let mut terms = vec![0.0; n];
        for frame in &frames[1..] {
            for (j, slot) in next.iter_mut().enumerate() {
                for (i, term) in terms.iter_mut().enumerate() {
                    *term = alpha[i] + log_trans[i][j];
                }
                *slot = log_sum_exp(&terms) + self.log_emission(j, frame);
            }
            std::mem::swap(&mut alpha, &mut next);
        }
        log_sum_exp(&alpha)
    }
}

impl WordModel for GaussianHmm {
    fn score(&self, features: &[Vec<f32>], lengths: &[usize]) -> Result<f64, RecognizerError> {
        let fail = |message: String| RecognizerError::scoring(&self.word, message);
        self.validate().map_err(fail)?;
        if features.is_empty() {
            return Err(fail("empty feature window".to_string()));
        }
        let total: usize = lengths.iter().sum();
        if total != features.len() || lengths.contains(&0) {
            return Err(fail(format!(
                "lengths {lengths:?} do not partition {} frames",
                features.len()
            )));
        }
        let d = self.n_features();
        if let Some(frame) = features.iter().find(|frame| frame.len() != d) {
            return Err(fail(format!(
                "frame has {} features, model expects {d}",
                frame.len()
            )));
        }

        let mut log_likelihood = 0.0;
        let mut offset = 0;
        for &len in lengths {
            log_likelihood += self.log_forward(&features[offset..offset + len]);
            offset += len;
        }
        if !log_likelihood.is_finite() {
            return Err(fail(format!("degenerate log-likelihood {log_likelihood}")));
        }
        Ok(log_likelihood)
    }
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}
