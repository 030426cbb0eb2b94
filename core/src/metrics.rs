// core/src/metrics.rs
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

/// Prosess-globale tellere for kjernen. Eget register, så vertsprogrammet
/// selv velger om de skal eksponeres.
pub struct Metrics {
    registry: Registry,
    pub observations_added_total: IntCounter,
    pub observations_overwritten_total: IntCounter,
    pub curve_fits_total: IntCounter,
    pub high_degree_total: IntCounter,
    pub step_events_total: IntCounter,
    pub last_selected_degree: IntGauge,
}

pub static METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let c = IntCounter::new(name, help).expect("static metric definition");
    registry.register(Box::new(c.clone())).expect("metric registered once");
    c
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new_custom(Some("dr_altimeter".into()), None)
            .expect("static registry prefix");

        let observations_added_total =
            counter(&registry, "observations_added_total", "Forecast observations inserted");
        let observations_overwritten_total = counter(
            &registry,
            "observations_overwritten_total",
            "Forecast observations replaced at an existing timestamp",
        );
        let curve_fits_total = counter(&registry, "curve_fits_total", "Polynomial curve fits performed");
        let high_degree_total = counter(
            &registry,
            "high_degree_total",
            "Fits whose selected degree was abnormally high for the sample size",
        );
        let step_events_total = counter(&registry, "step_events_total", "Step events emitted, fix markers included");

        let last_selected_degree = IntGauge::new("last_selected_degree", "Degree selected by the latest fit")
            .expect("static metric definition");
        registry
            .register(Box::new(last_selected_degree.clone()))
            .expect("metric registered once");

        Self {
            registry,
            observations_added_total,
            observations_overwritten_total,
            curve_fits_total,
            high_degree_total,
            step_events_total,
            last_selected_degree,
        }
    }

    /// Prometheus tekstformat.
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_export_contains_prefixed_names() {
        METRICS.curve_fits_total.inc();
        let txt = METRICS.gather_text().unwrap();
        assert!(txt.contains("dr_altimeter_curve_fits_total"));
        assert!(txt.contains("dr_altimeter_high_degree_total"));
        assert!(txt.contains("dr_altimeter_step_events_total"));
    }
}
