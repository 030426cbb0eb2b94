// core/src/config.rs
use serde::{Deserialize, Serialize};

use crate::error::{AltimeterError, Result};

/// Hvordan leave-one-out-feilen summeres ved valg av grad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMetric {
    #[default]
    Squared,
    Absolute,
}

impl ErrorMetric {
    #[inline]
    pub fn of(self, residual: f64) -> f64 {
        match self {
            ErrorMetric::Squared => residual * residual,
            ErrorMetric::Absolute => residual.abs(),
        }
    }
}

/// Justerbare parametre for kurvetilpasningen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Kandidatgrader er `0 .. ceil(n * num / den)`.
    pub degree_ceiling_num: usize,
    pub degree_ceiling_den: usize,
    pub error_metric: ErrorMetric,
    /// Advar når valgt grad >= n * ratio.
    pub high_degree_ratio: f64,
    /// Standard for `ForecastStore::add` i pipelinen.
    pub allow_overwrite: bool,
    /// LOO-feil innen `min * tie_relative + tie_absolute` fra minimum
    /// regnes som likhet; laveste grad vinner.
    pub tie_relative: f64,
    pub tie_absolute: f64,
    /// Største |x| (timer fra referansetimen) kurven samples over.
    pub max_horizon_hours: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            degree_ceiling_num: 4,
            degree_ceiling_den: 7,
            error_metric: ErrorMetric::Squared,
            high_degree_ratio: 0.5,
            allow_overwrite: true,
            tie_relative: 1e-9,
            tie_absolute: 1e-12,
            // 31 døgn
            max_horizon_hours: 744.0,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.degree_ceiling_num == 0 || self.degree_ceiling_den == 0 {
            return Err(AltimeterError::InvalidParameter(
                "degree ceiling fraction must be positive".into(),
            ));
        }
        if !(self.high_degree_ratio.is_finite() && self.high_degree_ratio > 0.0) {
            return Err(AltimeterError::InvalidParameter(format!(
                "high_degree_ratio must be > 0, got {}",
                self.high_degree_ratio
            )));
        }
        if !(self.tie_relative.is_finite() && self.tie_relative >= 0.0)
            || !(self.tie_absolute.is_finite() && self.tie_absolute >= 0.0)
        {
            return Err(AltimeterError::InvalidParameter(format!(
                "tie tolerances must be >= 0, got {} / {}",
                self.tie_relative, self.tie_absolute
            )));
        }
        if !(self.max_horizon_hours.is_finite() && self.max_horizon_hours > 0.0) {
            return Err(AltimeterError::InvalidParameter(format!(
                "max_horizon_hours must be > 0, got {}",
                self.max_horizon_hours
            )));
        }
        Ok(())
    }

    /// Toleransen rundt minste LOO-feil.
    #[inline]
    pub fn tie_tolerance(&self, min_err: f64) -> f64 {
        min_err.abs() * self.tie_relative + self.tie_absolute
    }

    /// Antall kandidatgrader for `n` punkter.
    pub fn candidate_count(&self, n: usize) -> usize {
        (n * self.degree_ceiling_num).div_ceil(self.degree_ceiling_den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_sevenths_ceiling() {
        let cfg = FitConfig::default();
        assert_eq!(cfg.candidate_count(3), 2);
        assert_eq!(cfg.candidate_count(7), 4);
        assert_eq!(cfg.candidate_count(8), 5);
        assert_eq!(cfg.candidate_count(24), 14);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: FitConfig = serde_json::from_str(r#"{"error_metric":"absolute"}"#).unwrap();
        assert_eq!(cfg.error_metric, ErrorMetric::Absolute);
        assert_eq!(cfg.degree_ceiling_num, 4);
        assert!(cfg.allow_overwrite);
    }

    #[test]
    fn zero_denominator_rejected() {
        let cfg = FitConfig { degree_ceiling_den: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_tie_tolerance_and_bad_horizon_rejected() {
        let cfg = FitConfig { tie_absolute: -1.0, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = FitConfig { max_horizon_hours: f64::INFINITY, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tie_tolerance_scales_with_minimum() {
        let cfg = FitConfig::default();
        assert_eq!(cfg.tie_tolerance(0.0), 1e-12);
        assert!((cfg.tie_tolerance(1000.0) - (1e-6 + 1e-12)).abs() < 1e-18);
    }
}
