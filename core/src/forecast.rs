// core/src/forecast.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AltimeterError, Result};
use crate::isa::{self, AtmosphericPressure};
use crate::metrics::METRICS;

/// Ett prognosepunkt: tidspunkt (lokal veggklokke for stedet) og trykk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub pressure: AtmosphericPressure,
}

/// Trykkprognose. Rekkefølgen er innsettingsrekkefølge inntil
/// [`ForecastStore::reorder_chronologically`] kalles.
#[derive(Debug, Clone, Default)]
pub struct ForecastStore {
    observations: Vec<Observation>,
}

impl ForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Legger til et punkt. Returnerer `true` hvis et eksisterende punkt med
    /// nøyaktig samme tidspunkt ble overskrevet.
    pub fn add(&mut self, timestamp: NaiveDateTime, pressure_hpa: f64, allow_overwrite: bool) -> Result<bool> {
        // Valider før vi rører lageret
        let pressure = AtmosphericPressure::new(pressure_hpa)?;

        if let Some(existing) = self.observations.iter_mut().find(|o| o.timestamp == timestamp) {
            if !allow_overwrite {
                return Err(AltimeterError::DuplicateTimestamp(timestamp));
            }
            log::debug!(
                "overwriting {} : {:.2} hPa -> {:.2} hPa",
                timestamp,
                existing.pressure.value(),
                pressure_hpa
            );
            existing.pressure = pressure;
            METRICS.observations_overwritten_total.inc();
            return Ok(true);
        }

        self.observations.push(Observation { timestamp, pressure });
        METRICS.observations_added_total.inc();
        Ok(false)
    }

    /// Som [`add`](Self::add), men holder lageret kronologisk etterpå.
    pub fn add_chronological(&mut self, timestamp: NaiveDateTime, pressure_hpa: f64, allow_overwrite: bool) -> Result<bool> {
        let overwritten = self.add(timestamp, pressure_hpa, allow_overwrite)?;
        self.reorder_chronologically();
        Ok(overwritten)
    }

    /// Stabil sortering, stigende tid.
    pub fn reorder_chronologically(&mut self) {
        self.observations.sort_by_key(|o| o.timestamp);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Tidligste tidspunkt, uavhengig av nåværende rekkefølge.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.observations.iter().map(|o| o.timestamp).min()
    }

    /// Seneste tidspunkt, uavhengig av nåværende rekkefølge.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.observations.iter().map(|o| o.timestamp).max()
    }

    pub fn times(&self) -> Vec<NaiveDateTime> {
        self.observations.iter().map(|o| o.timestamp).collect()
    }

    pub fn pressures(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.pressure.value()).collect()
    }

    pub fn altitudes(&self) -> Result<Vec<f64>> {
        self.observations.iter().map(|o| isa::altitude(o.pressure.value())).collect()
    }

    pub fn delta_altitudes(&self, p_ref: f64) -> Result<Vec<f64>> {
        self.observations
            .iter()
            .map(|o| isa::delta_altitude(p_ref, Some(o.pressure.value()), None))
            .collect()
    }

    fn find(&self, timestamp: NaiveDateTime) -> Result<&Observation> {
        self.observations
            .iter()
            .find(|o| o.timestamp == timestamp)
            .ok_or(AltimeterError::NotFound(timestamp))
    }

    pub fn get_pressure(&self, timestamp: NaiveDateTime) -> Result<f64> {
        Ok(self.find(timestamp)?.pressure.value())
    }

    pub fn get_delta_altitude(&self, timestamp: NaiveDateTime, p_ref: f64) -> Result<f64> {
        let p = self.get_pressure(timestamp)?;
        isa::delta_altitude(p_ref, Some(p), None)
    }

    /// Første tidspunkt (i nåværende rekkefølge) med nøyaktig dette trykket.
    pub fn time_of_pressure(&self, pressure_hpa: f64) -> Option<NaiveDateTime> {
        self.observations
            .iter()
            .find(|o| o.pressure.value() == pressure_hpa)
            .map(|o| o.timestamp)
    }
}
