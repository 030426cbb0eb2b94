// core/src/narrator.rs
use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::curvefit::StepEvent;
use crate::error::{AltimeterError, Result};
use crate::forecast::ForecastStore;
use crate::timeline::{hours_between, share_same_hour};

/// Én tekstrad per hel time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarratedRow {
    pub hour: NaiveDateTime,
    pub label: String,
    pub pressure_hpa: Option<f64>,
    /// Høydeendring siden referansetrykket.
    pub altitude_m: Option<f64>,
    /// Endring siden forrige rad (kun når begge rader har høyde).
    pub delta_m: Option<f64>,
    pub steps: Vec<String>,
}

impl NarratedRow {
    pub fn steps_text(&self) -> String {
        self.steps.join(", ")
    }
}

fn opt(v: Option<f64>, f: impl Fn(f64) -> String) -> String {
    v.map(f).unwrap_or_default()
}

impl fmt::Display for NarratedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6}|{:>11} |{:>8} |{:>7} | {}",
            self.label,
            opt(self.pressure_hpa, |p| format!("{p:.2} hPa")),
            opt(self.altitude_m, |a| format!("{a:.1}m")),
            opt(self.delta_m, |d| format!("{d:.1}m")),
            self.steps_text()
        )
    }
}

pub fn header() -> String {
    format!("{:<6}|{:>11} |{:>8} |{:>7} | {}", "H", "PRESSURE", "ALT", "ALT/hr", "")
}

/// Header + rader, én per linje.
pub fn render_rows(rows: &[NarratedRow]) -> String {
    let mut out = header();
    out.push('\n');
    out.push_str(&"-".repeat(60));
    for row in rows {
        out.push('\n');
        out.push_str(&row.to_string());
    }
    out
}

/// Bygger timetabellen fra trinnene og prognoselageret.
pub struct StepNarrator<'a> {
    store: &'a ForecastStore,
    p_ref: f64,
}

impl<'a> StepNarrator<'a> {
    pub fn new(store: &'a ForecastStore, p_ref: f64) -> Self {
        Self { store, p_ref }
    }

    /// Tokens for alle trinn i samme time som `hour`, kommaseparert.
    pub fn step_text(steps: &[StepEvent], hour: NaiveDateTime) -> String {
        tokens_in_hour(steps, hour).join(", ")
    }

    /// Én rad per hel time fra `start` til og med `end`. Første rad merkes
    /// med starttidspunktet (`6h40`), resten med timen (`7h`).
    pub fn narrate(&self, steps: &[StepEvent], start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<NarratedRow>> {
        let hours = hours_between(start, end);
        let mut rows: Vec<NarratedRow> = Vec::with_capacity(hours.len());

        for (i, &hour) in hours.iter().enumerate() {
            let label = if i == 0 {
                format!("{}h{:02}", start.hour(), start.minute())
            } else {
                format!("{}h", hour.hour())
            };

            let pressure_hpa = found(self.store.get_pressure(hour))?;
            let altitude_m = found(self.store.get_delta_altitude(hour, self.p_ref))?;
            let delta_m = match (altitude_m, rows.last().and_then(|r| r.altitude_m)) {
                (Some(a), Some(prev)) => Some(a - prev),
                _ => None,
            };

            rows.push(NarratedRow {
                hour,
                label,
                pressure_hpa,
                altitude_m,
                delta_m,
                steps: tokens_in_hour(steps, hour),
            });
        }

        Ok(rows)
    }
}

fn tokens_in_hour(steps: &[StepEvent], hour: NaiveDateTime) -> Vec<String> {
    steps
        .iter()
        .filter(|e| share_same_hour(e.timestamp, hour))
        .map(StepEvent::token)
        .collect()
}

/// Manglende observasjon -> tomt felt; andre feil propageres.
fn found(r: Result<f64>) -> Result<Option<f64>> {
    match r {
        Ok(v) => Ok(Some(v)),
        Err(AltimeterError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
