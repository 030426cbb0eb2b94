// core/src/curvefit.rs
//! Polynomtilpasning av høyde mot tid, med grad valgt ved leave-one-out
//! kryssvalidering, kumulativ feilkonvolutt og "trinn" slik en barometrisk
//! klokke viser dem (avrundet til hele meter, minutt for minutt).

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::config::FitConfig;
use crate::error::{AltimeterError, Result};
use crate::metrics::METRICS;
use crate::polyfit::{polyfit, polyval};
use crate::timeline::{decimal_hours, from_decimal_hours, truncate_to_minute};

/// Resultatet av tilpasningen. Uforanderlig etter konstruksjon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolynomialModel {
    degree: usize,
    /// Høyeste grad først.
    coefficients: Vec<f64>,
    /// Kumulativ positiv residual (målt over kurven), per punkt.
    error_up: Vec<f64>,
    /// Kumulativ negativ residual (absoluttverdi), per punkt.
    error_down: Vec<f64>,
}

impl PolynomialModel {
    #[inline] pub fn degree(&self) -> usize { self.degree }
    #[inline] pub fn coefficients(&self) -> &[f64] { &self.coefficients }
    #[inline] pub fn error_up(&self) -> &[f64] { &self.error_up }
    #[inline] pub fn error_down(&self) -> &[f64] { &self.error_down }

    /// altitude(t), t i desimaltimer fra referansetimen.
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        polyval(&self.coefficients, t)
    }
}

impl fmt::Display for PolynomialModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "altitude(t) =")?;
        for (i, &c) in self.coefficients.iter().enumerate() {
            let power = self.degree - i;
            if i == 0 {
                write!(f, " {c:.4}")?;
            } else if c < 0.0 {
                write!(f, " - {:.4}", -c)?;
            } else {
                write!(f, " + {c:.4}")?;
            }
            match power {
                0 => {}
                1 => write!(f, "·t")?,
                p => write!(f, "·t^{p}")?,
            }
        }
        Ok(())
    }
}

/// Et trinn på tidslinjen: ny avrundet høyde, eller fix-markøren.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    pub timestamp: NaiveDateTime,
    pub integer_altitude: i64,
    pub is_fix: bool,
}

impl StepEvent {
    /// "HH:MM[alt]" eller "HH:MM[fix]".
    pub fn token(&self) -> String {
        let hm = self.timestamp.format("%H:%M");
        if self.is_fix {
            format!("{hm}[fix]")
        } else {
            format!("{hm}[{}]", self.integer_altitude)
        }
    }
}

/// Kurven samplet hvert minutt.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Curve {
    pub times: Vec<NaiveDateTime>,
    pub fitted: Vec<f64>,
    pub steps: Vec<i64>,
}

/// Ett inngangspunkt med feilstolper, for plotting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub timestamp: NaiveDateTime,
    pub altitude: f64,
    pub error_up: f64,
    pub error_down: f64,
}

#[derive(Debug, Clone)]
pub struct CurveFitEngine {
    x: Vec<f64>,
    y: Vec<f64>,
    loo_errors: Vec<f64>,
    model: PolynomialModel,
    max_horizon_hours: f64,
    steps: Option<Vec<StepEvent>>,
}

impl CurveFitEngine {
    pub const MIN_POINTS: usize = 3;

    /// Velger grad, tilpasser og beregner feilkonvolutten (default-parametre).
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        Self::with_config(x, y, &FitConfig::default())
    }

    pub fn with_config(x: Vec<f64>, y: Vec<f64>, cfg: &FitConfig) -> Result<Self> {
        cfg.validate()?;
        if x.len() != y.len() {
            return Err(AltimeterError::LengthMismatch { x: x.len(), y: y.len() });
        }
        if x.len() < Self::MIN_POINTS {
            return Err(AltimeterError::InsufficientData { required: Self::MIN_POINTS, actual: x.len() });
        }
        if let Some(bad) = x.iter().chain(y.iter()).find(|v| !v.is_finite()) {
            return Err(AltimeterError::InvalidParameter(format!("non-finite series value {bad}")));
        }
        if let Some(far) = x.iter().find(|t| t.abs() > cfg.max_horizon_hours) {
            return Err(AltimeterError::InvalidParameter(format!(
                "x = {far} h is beyond the {} h horizon",
                cfg.max_horizon_hours
            )));
        }

        let (degree, loo_errors) = best_degree(&x, &y, cfg)?;
        let coefficients = polyfit(&x, &y, degree)?;
        let (error_up, error_down) = error_envelope(&x, &y, &coefficients);

        METRICS.curve_fits_total.inc();
        METRICS.last_selected_degree.set(degree as i64);
        log::debug!("curve fit: n={} degree={} coefficients={:?}", x.len(), degree, coefficients);

        Ok(Self {
            x,
            y,
            loo_errors,
            model: PolynomialModel { degree, coefficients, error_up, error_down },
            max_horizon_hours: cfg.max_horizon_hours,
            steps: None,
        })
    }

    #[inline] pub fn x(&self) -> &[f64] { &self.x }
    #[inline] pub fn y(&self) -> &[f64] { &self.y }
    #[inline] pub fn degree(&self) -> usize { self.model.degree }
    #[inline] pub fn model(&self) -> &PolynomialModel { &self.model }

    /// Leave-one-out-feil per kandidatgrad (indeks = grad).
    #[inline] pub fn loo_errors(&self) -> &[f64] { &self.loo_errors }

    /// `Some` etter [`compute_steps`](Self::compute_steps).
    pub fn steps(&self) -> Option<&[StepEvent]> {
        self.steps.as_deref()
    }

    fn first_x(&self) -> f64 {
        self.x.first().copied().unwrap_or(0.0)
    }

    fn last_x(&self) -> f64 {
        self.x.last().copied().unwrap_or(0.0)
    }

    /// Sampler polynomet hvert minutt.
    ///
    /// Uten margin: fra `start` (avkortet til minutt) til og med siste x.
    /// Med margin: fra første x minus `margin` minutter til siste x pluss
    /// `margin` minutter; `start` ignoreres da.
    ///
    /// `start` og margin må ligge innenfor horisonten, ellers `InvalidParameter`.
    pub fn curve(&self, ref_hour: NaiveDateTime, start: NaiveDateTime, margin_minutes: Option<u32>) -> Result<Curve> {
        let (begin, end) = match margin_minutes {
            None => {
                let offset = decimal_hours(ref_hour, start);
                if offset.abs() > self.max_horizon_hours {
                    return Err(AltimeterError::InvalidParameter(format!(
                        "start {start} is {offset} h from {ref_hour}, beyond the {} h horizon",
                        self.max_horizon_hours
                    )));
                }
                (truncate_to_minute(start), from_decimal_hours(ref_hour, self.last_x())?)
            }
            Some(m) => {
                let margin_h = f64::from(m) / 60.0;
                if margin_h > self.max_horizon_hours {
                    return Err(AltimeterError::InvalidParameter(format!(
                        "margin of {m} min is beyond the {} h horizon",
                        self.max_horizon_hours
                    )));
                }
                (
                    truncate_to_minute(from_decimal_hours(ref_hour, self.first_x() - margin_h)?),
                    from_decimal_hours(ref_hour, self.last_x() + margin_h)?,
                )
            }
        };

        let mut curve = Curve::default();
        let mut t = begin;
        while t <= end {
            let v = self.model.evaluate(decimal_hours(ref_hour, t));
            curve.times.push(t);
            curve.fitted.push(v);
            curve.steps.push(v.round() as i64);
            match t.checked_add_signed(Duration::minutes(1)) {
                Some(next) => t = next,
                None => break,
            }
        }
        Ok(curve)
    }

    /// Trinn minutt for minutt fra `start` til siste prognosepunkt.
    ///
    /// Et trinn registreres når avrundet høyde endrer seg fra forrige minutt.
    /// I minuttet `fix_hour` (avkortet) legges alltid en fix-markør til,
    /// etter et eventuelt trinn i samme minutt.
    pub fn compute_steps(
        &mut self,
        ref_hour: NaiveDateTime,
        start: NaiveDateTime,
        fix_hour: NaiveDateTime,
    ) -> Result<&[StepEvent]> {
        let curve = self.curve(ref_hour, start, None)?;
        let fix = truncate_to_minute(fix_hour);

        let mut events = Vec::new();
        if let Some(&first) = curve.steps.first() {
            let mut previous = first;
            for (&t, &step) in curve.times.iter().zip(curve.steps.iter()) {
                if step != previous {
                    events.push(StepEvent { timestamp: t, integer_altitude: step, is_fix: false });
                }
                previous = step;
                if t == fix {
                    events.push(StepEvent { timestamp: t, integer_altitude: step, is_fix: true });
                }
            }
        }

        if !events.iter().any(|e| e.is_fix) {
            log::debug!("fix {} outside step timeline, no fix marker", fix);
        }
        METRICS.step_events_total.inc_by(events.len() as u64);

        Ok(self.steps.insert(events).as_slice())
    }

    /// Inngangspunktene som tidspunkt + høyde + kumulativ feil.
    pub fn prediction(&self, ref_hour: NaiveDateTime) -> Result<Vec<PredictionPoint>> {
        self.x
            .iter()
            .zip(self.y.iter())
            .enumerate()
            .map(|(i, (&t, &alt))| {
                Ok(PredictionPoint {
                    timestamp: from_decimal_hours(ref_hour, t)?,
                    altitude: alt,
                    error_up: self.model.error_up[i],
                    error_down: self.model.error_down[i],
                })
            })
            .collect()
    }
}

/// Leave-one-out: for hver kandidatgrad, tilpass uten punkt i og mål feilen
/// i x[i]. Laveste grad vinner ved likhet.
fn best_degree(x: &[f64], y: &[f64], cfg: &FitConfig) -> Result<(usize, Vec<f64>)> {
    let n = x.len();
    // n - 1 punkter bærer høyst grad n - 2
    let candidates = cfg.candidate_count(n).min(n - 1);

    let mut tx = Vec::with_capacity(n - 1);
    let mut ty = Vec::with_capacity(n - 1);
    let mut errors = Vec::with_capacity(candidates);

    for degree in 0..candidates {
        let mut err = 0.0;
        for i in 0..n {
            tx.clear();
            ty.clear();
            for j in (0..n).filter(|&j| j != i) {
                tx.push(x[j]);
                ty.push(y[j]);
            }
            let c = polyfit(&tx, &ty, degree)?;
            err += cfg.error_metric.of(y[i] - polyval(&c, x[i]));
        }
        errors.push(err);
    }

    // Avrundingsstøy teller som likhet; laveste grad vinner
    let min_err = errors.iter().copied().map(OrderedFloat).min().map_or(0.0, |e| e.0);
    let tol = cfg.tie_tolerance(min_err);
    let best = errors.iter().position(|&e| e <= min_err + tol).unwrap_or(0);

    log::debug!("loo errors by degree: {:?} -> {}", errors, best);

    if best as f64 >= n as f64 * cfg.high_degree_ratio {
        log::warn!(
            "degree abnormally high ({} for {} points), predictions may be unreliable",
            best, n
        );
        METRICS.high_degree_total.inc();
    }

    Ok((best, errors))
}

/// Kumulativ, asymmetrisk feil: løpende sum av positive og negative residualer.
fn error_envelope(x: &[f64], y: &[f64], coefficients: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut up = 0.0;
    let mut down = 0.0;
    let mut error_up = Vec::with_capacity(x.len());
    let mut error_down = Vec::with_capacity(x.len());

    for (&t, &alt) in x.iter().zip(y.iter()) {
        let residual = alt - polyval(coefficients, t);
        if residual > 0.0 {
            up += residual;
        } else {
            down -= residual;
        }
        error_up.push(up);
        error_down.push(down);
    }
    (error_up, error_down)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_is_cumulative() {
        // linje y = t, punktene over/under annenhver
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.5, 0.5, 2.5, 2.5];
        let (up, down) = error_envelope(&x, &y, &[1.0, 0.0]);
        assert_eq!(up, vec![0.5, 0.5, 1.0, 1.0]);
        assert_eq!(down, vec![0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn tie_picks_lowest_degree() {
        let x: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let y = vec![2.0; 6];
        let (d, errs) = best_degree(&x, &y, &FitConfig::default()).unwrap();
        assert_eq!(d, 0);
        assert_eq!(errs.len(), 4); // ceil(24/7)
    }

    #[test]
    fn display_formula() {
        let m = PolynomialModel {
            degree: 2,
            coefficients: vec![0.5, -2.0, 3.0],
            error_up: vec![],
            error_down: vec![],
        };
        assert_eq!(m.to_string(), "altitude(t) = 0.5000·t^2 - 2.0000·t + 3.0000");
    }
}
