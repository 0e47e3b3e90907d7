use serde::Serialize;
use std::fmt;

/// Phishing probability at which a URL stops being treated as legitimate.
pub const SUSPICIOUS_THRESHOLD: f64 = 0.20;
pub const CAUTION_THRESHOLD: f64 = 0.35;
pub const DANGER_THRESHOLD: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Legitimate,
    Suspicious,
    /// Only produced from a hard label, when no probability is available.
    Phishing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    ExerciseCaution,
    HighlyDangerous,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    /// Probability of the phishing class.
    pub probability: Option<f64>,
    pub label: u8,
    pub category: Category,
    pub severity: Option<Severity>,
}

impl Verdict {
    pub fn from_probability(probability: f64, label: u8) -> Self {
        let (category, severity) = if probability >= DANGER_THRESHOLD {
            (Category::Suspicious, Some(Severity::HighlyDangerous))
        } else if probability >= CAUTION_THRESHOLD {
            (Category::Suspicious, Some(Severity::ExerciseCaution))
        } else if probability >= SUSPICIOUS_THRESHOLD {
            (Category::Suspicious, None)
        } else {
            (Category::Legitimate, None)
        };

        Self {
            probability: Some(probability),
            label,
            category,
            severity,
        }
    }

    pub fn from_label(label: u8) -> Self {
        Self {
            probability: None,
            label,
            category: if label == 1 {
                Category::Phishing
            } else {
                Category::Legitimate
            },
            severity: None,
        }
    }

    pub fn legitimate_confidence(&self) -> Option<f64> {
        self.probability.map(|p| 1.0 - p)
    }

    /// Short label written to the prediction log.
    pub fn prediction_label(&self) -> &'static str {
        match (self.probability, self.category) {
            (None, Category::Phishing) => "Phishing",
            (None, _) => "Legitimate",
            (Some(_), Category::Legitimate) => "LEGITIMATE",
            (Some(_), _) => "SUSPICIOUS",
        }
    }

    pub fn warning(&self) -> &'static str {
        match (self.category, self.severity) {
            (Category::Legitimate, _) => "Safe to proceed",
            (Category::Phishing, _) => "This website is classified as phishing",
            (Category::Suspicious, Some(Severity::HighlyDangerous)) => {
                "This website looks suspicious - HIGHLY DANGEROUS!"
            }
            (Category::Suspicious, Some(Severity::ExerciseCaution)) => {
                "This website looks suspicious - Exercise extreme caution!"
            }
            (Category::Suspicious, None) => "This website looks suspicious",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Legitimate => "LEGITIMATE",
            Category::Suspicious => "SUSPICIOUS",
            Category::Phishing => "PHISHING",
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::ExerciseCaution => "exercise caution",
            Severity::HighlyDangerous => "HIGHLY DANGEROUS",
        })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)?;
        if let Some(severity) = self.severity {
            write!(f, " ({severity})")?;
        }
        if let Some(p) = self.probability {
            write!(f, " p={p:.4}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bands() {
        let v = Verdict::from_probability(0.20, 1);
        assert_eq!(v.category, Category::Suspicious);
        assert_eq!(v.severity, None);

        let v = Verdict::from_probability(0.35, 1);
        assert_eq!(v.severity, Some(Severity::ExerciseCaution));

        let v = Verdict::from_probability(0.55, 1);
        assert_eq!(v.severity, Some(Severity::HighlyDangerous));

        let v = Verdict::from_probability(0.80, 1);
        assert_eq!(v.category, Category::Suspicious);
        assert_eq!(v.severity, Some(Severity::HighlyDangerous));
    }

    #[test]
    fn test_below_threshold_is_legitimate() {
        let v = Verdict::from_probability(0.1999, 0);
        assert_eq!(v.category, Category::Legitimate);
        assert_eq!(v.severity, None);
        assert_eq!(v.warning(), "Safe to proceed");
        assert_eq!(v.prediction_label(), "LEGITIMATE");
        assert!((v.legitimate_confidence().unwrap() - 0.8001).abs() < 1e-9);
    }

    #[test]
    fn test_label_only() {
        let v = Verdict::from_label(1);
        assert_eq!(v.category, Category::Phishing);
        assert_eq!(v.prediction_label(), "Phishing");
        assert_eq!(v.legitimate_confidence(), None);

        let v = Verdict::from_label(0);
        assert_eq!(v.category, Category::Legitimate);
        assert_eq!(v.prediction_label(), "Legitimate");
        assert_eq!(v.severity, None);
    }

    #[test]
    fn test_warning_text() {
        assert_eq!(
            Verdict::from_probability(0.6, 1).warning(),
            "This website looks suspicious - HIGHLY DANGEROUS!"
        );
        assert_eq!(
            Verdict::from_probability(0.4, 0).warning(),
            "This website looks suspicious - Exercise extreme caution!"
        );
        assert_eq!(
            Verdict::from_probability(0.25, 0).warning(),
            "This website looks suspicious"
        );
    }

    #[test]
    fn test_display_and_json() {
        let v = Verdict::from_probability(0.6, 1);
        assert_eq!(v.to_string(), "SUSPICIOUS (HIGHLY DANGEROUS) p=0.6000");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["category"], "SUSPICIOUS");
        assert_eq!(json["severity"], "highly_dangerous");
    }
}
