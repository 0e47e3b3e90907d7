//! Persisted classifiers and the adapter trait the pipeline calls.
//!
//! Artifacts are YAML or JSON documents tagged with `type`. Every artifact
//! names its input columns in `feature_names`; that order is the order the
//! aligner produces.

pub mod linear;
pub mod trees;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use linear::{LinearSvm, LogisticModel};
pub use trees::GradientBoostedTrees;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid YAML model: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent model shape: {0}")]
    Shape(String),

    #[error("invalid tree: {0}")]
    Tree(String),
}

/// A pre-trained binary classifier over one aligned row.
///
/// Rows always have `feature_names().len()` values.
pub trait Classifier: Send + Sync {
    fn kind(&self) -> &'static str;

    fn feature_names(&self) -> &[String];

    /// Hard label: 1 for phishing, 0 for legitimate.
    fn predict(&self, row: &[f64]) -> u8;

    /// Probability of the phishing class, when the model exposes one.
    fn predict_proba(&self, row: &[f64]) -> Option<f64>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    Logistic(LogisticModel),
    GradientBoostedTrees(GradientBoostedTrees),
    LinearSvm(LinearSvm),
}

impl ModelArtifact {
    pub fn from_yaml(content: &str) -> Result<Self, ModelError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate the artifact and turn it into a ready classifier.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ModelError> {
        match self {
            ModelArtifact::Logistic(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            ModelArtifact::GradientBoostedTrees(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            ModelArtifact::LinearSvm(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

/// Load a classifier artifact. `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn load_model(path: &Path) -> Result<Box<dyn Classifier>, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let artifact = if is_json {
        ModelArtifact::from_json(&content)?
    } else {
        ModelArtifact::from_yaml(&content)?
    };

    let classifier = artifact.into_classifier()?;
    log::info!(
        "Loaded {} model from {} ({} features)",
        classifier.kind(),
        path.display(),
        classifier.feature_names().len()
    );
    Ok(classifier)
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Shared checks for weight vectors paired with feature names.
pub(crate) fn validate_linear(
    feature_names: &[String],
    coefficients: &[f64],
    intercept: f64,
) -> Result<(), ModelError> {
    if feature_names.is_empty() {
        return Err(ModelError::Shape("feature_names is empty".to_string()));
    }
    if coefficients.len() != feature_names.len() {
        return Err(ModelError::Shape(format!(
            "{} coefficients for {} features",
            coefficients.len(),
            feature_names.len()
        )));
    }
    if let Some((i, w)) = coefficients.iter().enumerate().find(|(_, w)| !w.is_finite()) {
        return Err(ModelError::Shape(format!(
            "coefficient {i} ({}) is not finite",
            w
        )));
    }
    if !intercept.is_finite() {
        return Err(ModelError::Shape(format!("intercept {intercept} is not finite")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LOGISTIC_YAML: &str = r#"
type: logistic
feature_names: [a, b]
intercept: -1.0
coefficients: [2.0, 0.5]
"#;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_artifact_tags() {
        assert!(matches!(
            ModelArtifact::from_yaml(LOGISTIC_YAML).unwrap(),
            ModelArtifact::Logistic(_)
        ));
        let svm = r#"{"type": "linear_svm", "feature_names": ["a"], "intercept": 0.0, "coefficients": [1.0]}"#;
        assert!(matches!(
            ModelArtifact::from_json(svm).unwrap(),
            ModelArtifact::LinearSvm(_)
        ));
        assert!(ModelArtifact::from_yaml("type: random_forest\nfeature_names: [a]\n").is_err());
    }

    #[test]
    fn test_load_model_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("model.yaml");
        std::fs::File::create(&yaml_path)
            .unwrap()
            .write_all(LOGISTIC_YAML.as_bytes())
            .unwrap();
        let model = load_model(&yaml_path).unwrap();
        assert_eq!(model.kind(), "logistic");
        assert_eq!(model.feature_names(), ["a".to_string(), "b".to_string()]);

        let json_path = dir.path().join("model.json");
        std::fs::write(
            &json_path,
            r#"{"type": "logistic", "feature_names": ["a"], "intercept": 0.0, "coefficients": [1.0]}"#,
        )
        .unwrap();
        assert_eq!(load_model(&json_path).unwrap().feature_names().len(), 1);
    }

    #[test]
    fn test_load_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.yaml");
        assert!(matches!(load_model(&missing), Err(ModelError::Io { .. })));

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(matches!(load_model(&corrupt), Err(ModelError::Json(_))));

        let mismatched = dir.path().join("mismatched.yaml");
        std::fs::write(
            &mismatched,
            "type: logistic\nfeature_names: [a, b]\nintercept: 0.0\ncoefficients: [1.0]\n",
        )
        .unwrap();
        assert!(matches!(load_model(&mismatched), Err(ModelError::Shape(_))));
    }
}
