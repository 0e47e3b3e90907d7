use super::{sigmoid, validate_linear, Classifier, ModelError};
use serde::{Deserialize, Serialize};

fn default_threshold() -> f64 {
    0.5
}

/// Logistic regression: `p = sigmoid(intercept + coefficients · row)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// Probability at or above which the hard label is 1.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_linear(&self.feature_names, &self.coefficients, self.intercept)?;
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ModelError::Shape(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }

    fn probability(&self, row: &[f64]) -> f64 {
        sigmoid(decision(self.intercept, &self.coefficients, row))
    }
}

impl Classifier for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.probability(row) >= self.threshold)
    }

    fn predict_proba(&self, row: &[f64]) -> Option<f64> {
        Some(self.probability(row))
    }
}

/// Linear SVM: the sign of the decision function, no probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearSvm {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_linear(&self.feature_names, &self.coefficients, self.intercept)
    }
}

impl Classifier for LinearSvm {
    fn kind(&self) -> &'static str {
        "linear_svm"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> u8 {
        u8::from(decision(self.intercept, &self.coefficients, row) > 0.0)
    }

    fn predict_proba(&self, _row: &[f64]) -> Option<f64> {
        None
    }
}

fn decision(intercept: f64, coefficients: &[f64], row: &[f64]) -> f64 {
    intercept
        + coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic() -> LogisticModel {
        LogisticModel {
            feature_names: vec!["a".to_string(), "b".to_string()],
            intercept: -1.0,
            coefficients: vec![2.0, 0.5],
            threshold: 0.5,
        }
    }

    #[test]
    fn test_logistic_probability() {
        let model = logistic();
        assert_eq!(model.predict_proba(&[0.5, 0.0]), Some(0.5));
        assert_eq!(model.predict(&[0.5, 0.0]), 1);
        let low = model.predict_proba(&[-1.0, -1.0]).unwrap();
        assert!(low < 0.05);
        assert_eq!(model.predict(&[-1.0, -1.0]), 0);
    }

    #[test]
    fn test_logistic_validation() {
        let mut model = logistic();
        assert!(model.validate().is_ok());

        model.threshold = 1.5;
        assert!(model.validate().is_err());

        let mut model = logistic();
        model.coefficients.push(f64::NAN);
        assert!(matches!(model.validate(), Err(ModelError::Shape(_))));

        let mut model = logistic();
        model.coefficients[1] = f64::INFINITY;
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_svm_is_label_only() {
        let model = LinearSvm {
            feature_names: vec!["a".to_string()],
            intercept: -0.5,
            coefficients: vec![1.0],
        };
        assert!(model.validate().is_ok());
        assert_eq!(model.predict(&[1.0]), 1);
        assert_eq!(model.predict(&[0.0]), 0);
        assert_eq!(model.predict_proba(&[1.0]), None);
    }
}
