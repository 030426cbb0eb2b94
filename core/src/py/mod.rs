// core/src/py/mod.rs
// PyO3-binding (feature "python"). Tynt lag: JSON inn, JSON ut, slik at
// skraper/plotting på Python-siden kan bruke kjernen direkte.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::error::AltimeterError;

fn to_py_err(e: AltimeterError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ──────────────────────────────────────────────────────────────────────────────
// ISA
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
fn isa_altitude(pressure_hpa: f64) -> PyResult<f64> {
    crate::isa::altitude(pressure_hpa).map_err(to_py_err)
}

#[pyfunction]
fn isa_pressure(altitude_m: f64) -> PyResult<f64> {
    crate::isa::pressure(altitude_m).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (p_start, p_end=None, delta_p=None))]
fn isa_correction(p_start: f64, p_end: Option<f64>, delta_p: Option<f64>) -> PyResult<f64> {
    crate::isa::correction(p_start, p_end, delta_p).map_err(to_py_err)
}

// ──────────────────────────────────────────────────────────────────────────────
// Prognose-pipeline
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
#[pyo3(signature = (observations_json, meta_json, cfg_json=None))]
fn analyze_forecast_json(observations_json: &str, meta_json: &str, cfg_json: Option<&str>) -> PyResult<String> {
    crate::analyze_forecast::analyze_forecast_json(observations_json, meta_json, cfg_json).map_err(to_py_err)
}

#[pyfunction]
fn metrics_text() -> PyResult<String> {
    crate::metrics::METRICS
        .gather_text()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn dr_altimeter_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(isa_altitude, m)?)?;
    m.add_function(wrap_pyfunction!(isa_pressure, m)?)?;
    m.add_function(wrap_pyfunction!(isa_correction, m)?)?;
    m.add_function(wrap_pyfunction!(analyze_forecast_json, m)?)?;
    m.add_function(wrap_pyfunction!(metrics_text, m)?)?;
    Ok(())
}
