use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::curvefit::{PolynomialModel, PredictionPoint, StepEvent};
use crate::narrator::NarratedRow;

/// Ett prognosepunkt slik skraperen leverer det.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationIn {
    #[serde(alias = "timestamp", alias = "date")]
    pub time: NaiveDateTime,
    #[serde(alias = "pressure_hpa", alias = "hpa")]
    pub pressure: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMeta {
    /// Trykket ved stasjonen når prognosevinduet starter (hPa).
    pub p_ref: f64,
    /// Når prognosen vises ("nå"); gir fix-markøren.
    pub fix_hour: NaiveDateTime,
    /// Start på trinn-tidslinjen. Default: første prognosepunkt.
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub reference_hour: NaiveDateTime,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub p_ref: f64,
    /// Desimaltimer siden `reference_hour`.
    pub x: Vec<f64>,
    /// Høydeendring (m) mot `p_ref`.
    pub y: Vec<f64>,
    /// Trykk (hPa).
    pub z: Vec<f64>,
    pub model: PolynomialModel,
    pub formula: String,
    pub loo_errors: Vec<f64>,
    pub prediction: Vec<PredictionPoint>,
    pub steps: Vec<StepEvent>,
    pub rows: Vec<NarratedRow>,
}
