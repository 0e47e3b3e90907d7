use crate::config::OutputConfig;
use crate::pipeline::Classification;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only record of classified URLs: a CSV of aligned feature rows and a
/// plain-text line per prediction. Either file is optional.
#[derive(Debug, Clone, Default)]
pub struct PredictionLog {
    features_csv: Option<PathBuf>,
    predictions: Option<PathBuf>,
}

impl PredictionLog {
    pub fn new(features_csv: Option<PathBuf>, predictions: Option<PathBuf>) -> Self {
        Self {
            features_csv,
            predictions,
        }
    }

    /// `None` when the config asks for neither file.
    pub fn from_config(output: &OutputConfig) -> Option<Self> {
        if output.features_csv.is_none() && output.predictions_log.is_none() {
            return None;
        }
        Some(Self::new(
            output.features_csv.as_ref().map(PathBuf::from),
            output.predictions_log.as_ref().map(PathBuf::from),
        ))
    }

    /// Append one classification. Failures are logged and swallowed so a
    /// batch keeps going.
    pub fn record(&self, classification: &Classification) {
        if let Some(path) = &self.features_csv {
            if let Err(e) = append_features(path, classification) {
                log::warn!("Could not append features for {}: {e:#}", classification.url);
            }
        }
        if let Some(path) = &self.predictions {
            if let Err(e) = append_prediction(path, classification) {
                log::warn!("Could not log prediction for {}: {e:#}", classification.url);
            }
        }
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

fn append_features(path: &Path, classification: &Classification) -> Result<()> {
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let mut file = open_append(path)?;
    let features = &classification.features;

    if needs_header {
        let header: Vec<&str> = features.names().collect();
        writeln!(file, "{}", header.join(","))?;
    }
    let row: Vec<String> = features.values().iter().map(|v| v.to_string()).collect();
    writeln!(file, "{}", row.join(","))?;
    Ok(())
}

fn append_prediction(path: &Path, classification: &Classification) -> Result<()> {
    let mut file = open_append(path)?;
    writeln!(
        file,
        "URL: {} --> Prediction: {}",
        classification.url,
        classification.verdict.prediction_label()
    )?;
    Ok(())
}
