//! Product-limit (Kaplan-Meier) estimator with Greenwood standard errors.
//!
//! # Algorithm
//!
//! Observations are sorted by time and tied times are processed as a single
//! risk-set update. With `r` subjects at risk and `d` events at time `t`:
//!
//! ```text
//! S(t) = S(t-) * (1 - d / r)
//! V   += d / (r * (r - d))
//! SE   = S(t) * sqrt(V)
//! ```
//!
//! Censor-only times keep `S` unchanged but still remove their subjects
//! from the risk set. When every subject at risk fails (`r = d`) the curve
//! drops to zero and the variance term is treated as zero.

use km_model::{CiMethod, EstimatorOptions, SurvivalFunction, SurvivalPoint};

use crate::confidence::{confidence_bounds, critical_value};
use crate::error::{KmError, Result};

/// Estimates one survival curve from `(time, event_occurred)` pairs.
///
/// The estimator holds only configuration; each call allocates its own
/// working state.
#[derive(Debug, Clone, Copy)]
pub struct KaplanMeierEstimator {
    options: EstimatorOptions,
    z: f64,
}

impl Default for KaplanMeierEstimator {
    fn default() -> Self {
        let options = EstimatorOptions::default();
        Self {
            options,
            z: critical_value(options.confidence_level),
        }
    }
}

impl KaplanMeierEstimator {
    /// # Errors
    ///
    /// Fails when the confidence level is not strictly between 0 and 1.
    pub fn new(options: EstimatorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            z: critical_value(options.confidence_level),
        })
    }

    pub fn options(&self) -> &EstimatorOptions {
        &self.options
    }

    /// Two-sided critical value used for the bounds.
    pub fn critical_value(&self) -> f64 {
        self.z
    }

    /// # Errors
    ///
    /// [`KmError::InvalidTime`] when any time is negative or not finite.
    pub fn estimate(&self, pairs: &[(f64, bool)]) -> Result<SurvivalFunction> {
        if let Some(&(value, _)) = pairs
            .iter()
            .find(|(time, _)| !time.is_finite() || *time < 0.0)
        {
            return Err(KmError::InvalidTime { value });
        }

        let mut sorted = pairs.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = sorted.len();
        let mut points = vec![SurvivalPoint {
            time: 0.0,
            at_risk: n,
            events: 0,
            censored: 0,
            survival: 1.0,
            std_error: 0.0,
            lower: 1.0,
            upper: 1.0,
        }];
        let mut at_risk = n;
        let mut survival = 1.0_f64;
        let mut variance_sum = 0.0_f64;
        let mut exhausted = false;
        let mut n_events = 0;

        for group in sorted.chunk_by(|a, b| a.0 == b.0) {
            let time = group[0].0;
            let events = group.iter().filter(|(_, event)| *event).count();
            let censored = group.len() - events;

            if events > 0 {
                let remaining = at_risk - events;
                survival = (survival * (1.0 - events as f64 / at_risk as f64)).clamp(0.0, 1.0);
                if remaining == 0 {
                    exhausted = true;
                } else {
                    variance_sum += events as f64 / (at_risk as f64 * remaining as f64);
                }
            }
            if exhausted {
                survival = 0.0;
                variance_sum = 0.0;
            }

            let (lower, upper) =
                confidence_bounds(survival, variance_sum, self.z, self.options.ci_method);
            let point = SurvivalPoint {
                time,
                at_risk,
                events,
                censored,
                survival,
                std_error: survival * variance_sum.sqrt(),
                lower,
                upper,
            };
            if time == 0.0 {
                points[0] = point;
            } else {
                points.push(point);
            }

            n_events += events;
            at_risk -= group.len();
        }

        Ok(SurvivalFunction {
            points,
            n_subjects: n,
            n_events,
            n_censored: n - n_events,
            confidence_level: self.options.confidence_level,
            ci_method: self.options.ci_method,
        })
    }
}

/// Estimate with default options (95% log-log bounds).
pub fn estimate(pairs: &[(f64, bool)]) -> Result<SurvivalFunction> {
    KaplanMeierEstimator::default().estimate(pairs)
}

/// Estimate with an explicit interval method at the default level.
pub fn estimate_with_method(pairs: &[(f64, bool)], method: CiMethod) -> Result<SurvivalFunction> {
    KaplanMeierEstimator::new(EstimatorOptions::default().with_ci_method(method))?.estimate(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_group_has_only_origin() {
        let function = estimate(&[]).expect("estimate");
        assert_eq!(function.points.len(), 1);
        assert_eq!(function.points[0].at_risk, 0);
        assert_eq!(function.points[0].survival, 1.0);
        assert_eq!(function.n_subjects, 0);
    }

    #[test]
    fn greenwood_matches_hand_calculation() {
        // Events at 1 and 3, censoring at 2 and 4.
        let pairs = [(1.0, true), (2.0, false), (3.0, true), (4.0, false)];
        let function = estimate(&pairs).expect("estimate");
        let times: Vec<f64> = function.points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        let at_one = function.points[1];
        assert_eq!((at_one.at_risk, at_one.events), (4, 1));
        assert_relative_eq!(at_one.survival, 0.75);
        assert_relative_eq!(at_one.std_error, 0.75 * (1.0f64 / 12.0).sqrt(), epsilon = 1e-12);

        let at_three = function.points[3];
        assert_eq!((at_three.at_risk, at_three.events), (2, 1));
        assert_relative_eq!(at_three.survival, 0.375);
        let variance = 1.0 / 12.0 + 1.0 / 2.0;
        assert_relative_eq!(at_three.std_error, 0.375 * f64::sqrt(variance), epsilon = 1e-12);

        let at_four = function.points[4];
        assert_eq!((at_four.at_risk, at_four.censored), (1, 1));
        assert_relative_eq!(at_four.survival, 0.375);
        assert_eq!(function.n_events, 2);
        assert_eq!(function.n_censored, 2);
    }

    #[test]
    fn observations_at_zero_merge_into_origin() {
        let pairs = [(0.0, true), (0.0, false), (5.0, true), (6.0, false)];
        let function = estimate(&pairs).expect("estimate");
        assert_eq!(function.points.len(), 3);
        let origin = function.points[0];
        assert_eq!(origin.time, 0.0);
        assert_eq!((origin.at_risk, origin.events, origin.censored), (4, 1, 1));
        assert_relative_eq!(origin.survival, 0.75);
        assert_eq!(function.points[1].at_risk, 2);
        assert_relative_eq!(function.points[1].survival, 0.375);
    }

    #[test]
    fn exhausted_risk_set_drops_to_zero() {
        let pairs = [(2.0, false), (4.0, true), (4.0, true)];
        let function = estimate(&pairs).expect("estimate");
        let last = function.points.last().copied().expect("points");
        assert_eq!((last.at_risk, last.events), (2, 2));
        assert_eq!(last.survival, 0.0);
        assert_eq!(last.std_error, 0.0);
        assert_eq!((last.lower, last.upper), (0.0, 0.0));
    }

    #[test]
    fn rejects_invalid_times() {
        for value in [-1.0, f64::INFINITY, f64::NAN] {
            let result = estimate(&[(1.0, true), (value, false)]);
            assert!(
                matches!(result, Err(KmError::InvalidTime { .. })),
                "{value} accepted"
            );
        }
    }

    #[test]
    fn rejects_invalid_confidence_level() {
        let options = EstimatorOptions::default().with_confidence_level(1.0);
        assert!(matches!(
            KaplanMeierEstimator::new(options),
            Err(KmError::Model(_))
        ));
    }

    #[test]
    fn plain_method_is_recorded() {
        let function =
            estimate_with_method(&[(1.0, true), (2.0, false)], CiMethod::Plain).expect("estimate");
        assert_eq!(function.ci_method, CiMethod::Plain);
        assert_relative_eq!(function.confidence_level, 0.95);
    }
}
