//! DR-Altimeter kjerne: ISA-konvertering trykk/høyde, prognoselager,
//! polynomtilpasning med leave-one-out gradvalg og høydetrinn per minutt.

pub mod analyze_forecast;
pub mod config;
pub mod curvefit;
pub mod error;
pub mod forecast;
pub mod isa;
pub mod metrics;
pub mod narrator;
pub mod polyfit;
pub mod storage;
pub mod timeline;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use analyze_forecast::{analyze_forecast, analyze_forecast_json};
pub use config::{ErrorMetric, FitConfig};
pub use curvefit::{Curve, CurveFitEngine, PolynomialModel, PredictionPoint, StepEvent};
pub use error::{AltimeterError, Result};
pub use forecast::{ForecastStore, Observation};
pub use isa::{
    altitude, average_correction, correction, correction_from_msl, correction_table, delta_altitude, pressure,
    AtmosphericPressure, RoundTo,
};
pub use narrator::{render_rows, NarratedRow, StepNarrator};
pub use storage::{load_config, save_config};
pub use types::{ForecastMeta, ForecastReport, ObservationIn};
