use crate::config::FitConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Leser inn tilpasningsparametre fra disk (JSON).
/// Hvis filen ikke finnes, returneres default-konfigurasjonen.
pub fn load_config(path: &str) -> Result<FitConfig> {
    if Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading fit config {path}"))?;
        let cfg: FitConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing fit config {path}"))?;
        cfg.validate().with_context(|| format!("validating fit config {path}"))?;
        log::info!(
            "fit config loaded from {} (ceiling={}/{}, metric={:?})",
            path, cfg.degree_ceiling_num, cfg.degree_ceiling_den, cfg.error_metric
        );
        Ok(cfg)
    } else {
        log::warn!("no fit config at {}, using defaults", path);
        Ok(FitConfig::default())
    }
}

/// Lagrer parametre til disk som JSON (pretty-print).
pub fn save_config(cfg: &FitConfig, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    std::fs::write(path, json).with_context(|| format!("writing fit config {path}"))?;
    log::info!("fit config saved to {}", path);
    Ok(())
}
