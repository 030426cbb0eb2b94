// core/src/isa.rs
//! International Standard Atmosphere (ISA).
//!
//! Forutsetninger: høyde under 11 km, barometrisk høydemåler ved konstant
//! temperatur og fuktighet. Alle funksjoner er rene (ingen klokke, ingen state).

use serde::{Deserialize, Serialize};

use crate::error::{AltimeterError, Result};

pub const TEMP_MSL: f64 = 288.15;       // K, temperatur ved havnivå
pub const PRESSURE_MSL: f64 = 1013.25;  // hPa, trykk ved havnivå
pub const TEMP_GRADIENT: f64 = 0.0065;  // K/m, temperaturfall med høyde
pub const PERFECT_GAS: f64 = 5.255;     // dimensjonsløs, tørr luft som ideell gass

pub const MIN_PRESSURE_HPA: f64 = 260.0;
pub const MAX_PRESSURE_HPA: f64 = 1100.0;
pub const MIN_ALTITUDE_M: f64 = -700.0;
pub const MAX_ALTITUDE_M: f64 = 10_000.0;

// --- RoundTo trait (offentlig, brukt av korreksjonstabellen) ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/// Atmosfærisk trykk i hektopascal, 260 hPa < trykk < 1100 hPa.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AtmosphericPressure(f64);

impl AtmosphericPressure {
    pub fn new(hectopascal: f64) -> Result<Self> {
        if hectopascal > MIN_PRESSURE_HPA && hectopascal < MAX_PRESSURE_HPA {
            Ok(Self(hectopascal))
        } else {
            Err(AltimeterError::PressureOutOfRange(hectopascal))
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for AtmosphericPressure {
    type Error = AltimeterError;

    fn try_from(hectopascal: f64) -> Result<Self> {
        Self::new(hectopascal)
    }
}

impl From<AtmosphericPressure> for f64 {
    fn from(p: AtmosphericPressure) -> f64 {
        p.0
    }
}

/// T0/L: høyden (m) der ISA-temperaturen ville nådd 0 K.
#[inline]
fn scale_height() -> f64 {
    TEMP_MSL / TEMP_GRADIENT
}

/// Trykk (hPa) ved en høyde over havnivå, -700 m < høyde < 10000 m.
pub fn pressure(altitude_m: f64) -> Result<f64> {
    if altitude_m > MIN_ALTITUDE_M && altitude_m < MAX_ALTITUDE_M {
        Ok(PRESSURE_MSL * (1.0 - altitude_m / scale_height()).powf(PERFECT_GAS))
    } else {
        Err(AltimeterError::AltitudeOutOfRange(altitude_m))
    }
}

/// Høyde (m) over havnivå for et gitt trykk. Invers av [`pressure`].
pub fn altitude(pressure_hpa: f64) -> Result<f64> {
    let p = AtmosphericPressure::new(pressure_hpa)?.value();
    Ok(scale_height() * (1.0 - (p / PRESSURE_MSL).powf(1.0 / PERFECT_GAS)))
}

/// Stigning/fall (m) fra et referansetrykk.
///
/// Enten `current_p` eller `delta_p` må oppgis. Oppgis begge, må
/// `p_ref - current_p == delta_p`, og `current_p` brukes.
pub fn delta_altitude(p_ref: f64, current_p: Option<f64>, delta_p: Option<f64>) -> Result<f64> {
    let effective = match (current_p, delta_p) {
        (None, None) => return Err(AltimeterError::MissingInput),
        (Some(cp), Some(dp)) if p_ref - cp != dp => {
            return Err(AltimeterError::InconsistentInput { p_ref, current_p: cp, delta_p: dp });
        }
        (Some(cp), _) => cp,
        (None, Some(dp)) => p_ref + dp,
    };

    Ok(altitude(effective)? - altitude(p_ref)?)
}

/// Hvor mye en høydemåler i ro må korrigeres etter at trykket har endret seg
/// pga. været (sann høyde uendret).
pub fn correction(p_start: f64, p_end: Option<f64>, delta_p: Option<f64>) -> Result<f64> {
    Ok(-delta_altitude(p_start, p_end, delta_p)?)
}

/// [`correction`] med havnivåtrykk som start.
pub fn correction_from_msl(p_end: Option<f64>, delta_p: Option<f64>) -> Result<f64> {
    correction(PRESSURE_MSL, p_end, delta_p)
}

/// Snittkorreksjon for en trykkvariasjon på ±`delta_p` rundt `p_start`.
pub fn average_correction(p_start: f64, delta_p: f64) -> Result<f64> {
    let plus = correction(p_start, None, Some(delta_p))?;
    let minus = correction(p_start, None, Some(-delta_p))?;
    Ok((plus - minus) / 2.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionRow {
    pub altitude_m: f64,
    pub pressure_hpa: f64,
    /// Én verdi per `delta_p`, avrundet til 2 desimaler.
    pub corrections_m: Vec<f64>,
}

/// Tabell over snittkorreksjoner: én rad per referansehøyde.
pub fn correction_table(altitudes_m: &[f64], deltas_hpa: &[f64]) -> Result<Vec<CorrectionRow>> {
    let mut rows = Vec::with_capacity(altitudes_m.len());
    for &alt in altitudes_m {
        let p_ref = pressure(alt)?;
        let corrections_m = deltas_hpa
            .iter()
            .map(|&dp| average_correction(p_ref, dp).map(|c| c.round_to(2)))
            .collect::<Result<Vec<f64>>>()?;
        rows.push(CorrectionRow { altitude_m: alt, pressure_hpa: p_ref, corrections_m });
    }
    Ok(rows)
}
