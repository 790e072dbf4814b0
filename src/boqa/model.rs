use crate::boqa::Counts;
use crate::{BoqaError, BoqaResult};

/// Default false positive rate, one wrong term out of all HPO terms
pub const DEFAULT_ALPHA: f64 = 1.0 / 19077.0;

/// Default false negative rate
pub const DEFAULT_BETA: f64 = 0.9;

/// Default temperature, scores are normalized to probabilities
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

const UNIT_TEMPERATURE_EPSILON: f64 = 1e-9;

/// The noise model of the scoring engine
///
/// - `alpha`: false positive rate, in `(0, 1)`
/// - `beta`: false negative rate, in `(0, 1)`
/// - `temperature`: smoothing exponent, `>= 1`
///
/// The logarithms of `alpha`, `beta` and their complements are
/// calculated once during construction.
///
/// # Examples
///
/// ```
/// use boqa::{AlgorithmParameters, Counts};
///
/// let params = AlgorithmParameters::new(0.01, 0.1, 1.0).unwrap();
/// let counts = Counts::new(1, 1, 0, 0);
/// let expected = 0.01f64.ln() + 0.9f64.ln();
/// assert!((params.log_score(&counts) - expected).abs() < 1e-12);
///
/// assert!(AlgorithmParameters::new(0.0, 0.1, 1.0).is_err());
/// assert!(AlgorithmParameters::new(0.01, 0.1, 0.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmParameters {
    alpha: f64,
    beta: f64,
    temperature: f64,
    log_alpha: f64,
    log_beta: f64,
    log_one_minus_alpha: f64,
    log_one_minus_beta: f64,
}

impl Default for AlgorithmParameters {
    fn default() -> Self {
        Self::precompute(DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_TEMPERATURE)
    }
}

impl AlgorithmParameters {
    /// Constructs validated parameters
    ///
    /// # Errors
    ///
    /// [`BoqaError::InvalidParameter`] if `alpha` or `beta` are not inside the open
    /// interval `(0, 1)` or `temperature` is smaller than 1 or not finite
    pub fn new(alpha: f64, beta: f64, temperature: f64) -> BoqaResult<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(BoqaError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {alpha}"
            )));
        }
        if !(beta > 0.0 && beta < 1.0) {
            return Err(BoqaError::InvalidParameter(format!(
                "beta must be in (0, 1), got {beta}"
            )));
        }
        if !(temperature >= 1.0 && temperature.is_finite()) {
            return Err(BoqaError::InvalidParameter(format!(
                "temperature must be at least 1, got {temperature}"
            )));
        }
        Ok(Self::precompute(alpha, beta, temperature))
    }

    fn precompute(alpha: f64, beta: f64, temperature: f64) -> Self {
        Self {
            alpha,
            beta,
            temperature,
            log_alpha: alpha.ln(),
            log_beta: beta.ln(),
            log_one_minus_alpha: (1.0 - alpha).ln(),
            log_one_minus_beta: (1.0 - beta).ln(),
        }
    }

    /// Returns the false positive rate
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the false negative rate
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Returns the temperature
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Returns `true` if the temperature is 1, within a small epsilon
    pub fn is_unit_temperature(&self) -> bool {
        (self.temperature - 1.0).abs() < UNIT_TEMPERATURE_EPSILON
    }

    /// Returns the unnormalized log-likelihood of the [`Counts`]
    ///
    /// `(fp·ln(α) + fn·ln(β) + tn·ln(1-α) + tp·ln(1-β)) / temperature`
    pub fn log_score(&self, counts: &Counts) -> f64 {
        (f64::from(counts.false_positives()) * self.log_alpha
            + f64::from(counts.false_negatives()) * self.log_beta
            + f64::from(counts.true_negatives()) * self.log_one_minus_alpha
            + f64::from(counts.true_positives()) * self.log_one_minus_beta)
            / self.temperature
    }

    /// Normalizes the log-scores of all diseases of one patient
    ///
    /// All scores are shifted by the largest score and exponentiated.
    /// With a temperature of 1 the result is divided by its sum and forms a
    /// probability distribution. With a temperature above 1 the shifted
    /// weights are returned as they are: a relative confidence in `(0, 1]`,
    /// with the best disease at exactly 1 and no guarantee on the sum.
    ///
    /// `NaN` scores stay `NaN` and are ignored for the maximum and the sum.
    /// If the sum is 0 or not finite, the weights are not divided.
    ///
    /// # Examples
    ///
    /// ```
    /// use boqa::AlgorithmParameters;
    ///
    /// let params = AlgorithmParameters::default();
    /// let scores = params.normalize(&[-1.0, -2.0, f64::NAN]);
    /// assert!((scores[0] + scores[1] - 1.0).abs() < 1e-9);
    /// assert!(scores[0] > scores[1]);
    /// assert!(scores[2].is_nan());
    ///
    /// let smoothed = AlgorithmParameters::new(0.01, 0.1, 2.0).unwrap();
    /// let scores = smoothed.normalize(&[-1.0, -2.0]);
    /// assert_eq!(scores[0], 1.0);
    /// ```
    pub fn normalize(&self, log_scores: &[f64]) -> Vec<f64> {
        let max_log = log_scores
            .iter()
            .copied()
            .filter(|score| !score.is_nan())
            .fold(f64::NEG_INFINITY, f64::max);
        let shift = if max_log.is_finite() { max_log } else { 0.0 };

        let weights: Vec<f64> = log_scores
            .iter()
            .map(|score| (score - shift).exp())
            .collect();

        if !self.is_unit_temperature() {
            return weights;
        }

        let total: f64 = weights.iter().filter(|weight| !weight.is_nan()).sum();
        if total > 0.0 && total.is_finite() {
            weights.iter().map(|weight| weight / total).collect()
        } else {
            weights
        }
    }
}
