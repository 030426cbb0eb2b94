// core/src/analyze_forecast.rs
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_path_to_error as spte;

use crate::config::FitConfig;
use crate::curvefit::CurveFitEngine;
use crate::error::{AltimeterError, Result};
use crate::forecast::ForecastStore;
use crate::narrator::StepNarrator;
use crate::timeline::{decimal_hours, full_hour};
use crate::types::{ForecastMeta, ForecastReport, ObservationIn};

/// Hele kjeden: lager -> serier -> tilpasning -> trinn -> timerader.
///
/// `start` er begynnelsen på trinn-tidslinjen (default: første punkt);
/// x regnes i desimaltimer fra hel time for `start`.
pub fn analyze_forecast(
    store: &mut ForecastStore,
    p_ref: f64,
    fix_hour: NaiveDateTime,
    start: Option<NaiveDateTime>,
    cfg: &FitConfig,
) -> Result<ForecastReport> {
    store.reorder_chronologically();

    let (first, end) = match (store.start(), store.end()) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            return Err(AltimeterError::InsufficientData {
                required: CurveFitEngine::MIN_POINTS,
                actual: 0,
            })
        }
    };
    let start = start.unwrap_or(first);
    let reference_hour = full_hour(start);

    let x: Vec<f64> = store.times().into_iter().map(|t| decimal_hours(reference_hour, t)).collect();
    let y = store.delta_altitudes(p_ref)?;
    let z = store.pressures();

    let mut engine = CurveFitEngine::with_config(x.clone(), y.clone(), cfg)?;
    let steps = engine.compute_steps(reference_hour, start, fix_hour)?.to_vec();
    let rows = StepNarrator::new(store, p_ref).narrate(&steps, start, end)?;

    let prediction = engine.prediction(reference_hour)?;

    log::info!(
        "forecast {} -> {}: {} points, degree {}, {} step events",
        start,
        end,
        x.len(),
        engine.degree(),
        steps.len()
    );

    Ok(ForecastReport {
        reference_hour,
        start,
        end,
        p_ref,
        x,
        y,
        z,
        formula: engine.model().to_string(),
        model: engine.model().clone(),
        loo_errors: engine.loo_errors().to_vec(),
        prediction,
        steps,
        rows,
    })
}

fn parse<T: DeserializeOwned>(what: &str, json_in: &str) -> Result<T> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    spte::deserialize(&mut de)
        .map_err(|e| AltimeterError::Parse(format!("{} parse at {}: {}", what, e.path(), e.inner())))
}

/// JSON inn / JSON ut, for Python-bindingen og andre verter.
///
/// `observations_json`: `[{"time": "2020-02-05T06:00:00", "pressure": 1012.3}, ...]`
/// `meta_json`: `{"p_ref": 1012.3, "fix_hour": "...", "start": null}`
pub fn analyze_forecast_json(observations_json: &str, meta_json: &str, cfg_json: Option<&str>) -> Result<String> {
    let observations: Vec<ObservationIn> = parse("observations", observations_json)?;
    let meta: ForecastMeta = parse("meta", meta_json)?;
    let cfg: FitConfig = match cfg_json {
        Some(s) => parse("cfg", s)?,
        None => FitConfig::default(),
    };

    let mut store = ForecastStore::new();
    for o in &observations {
        store.add(o.time, o.pressure, cfg.allow_overwrite)?;
    }

    let report = analyze_forecast(&mut store, meta.p_ref, meta.fix_hour, meta.start, &cfg)?;
    serde_json::to_string(&report).map_err(|e| AltimeterError::Parse(e.to_string()))
}
