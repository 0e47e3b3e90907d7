pub mod count_rate;
pub mod extractor;
pub mod risk_polarity;

pub use extractor::FeatureExtractor;

use crate::config::{HeuristicsConfig, SchemaKind};
use crate::normalizer::NormalizedUrl;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Ordered mapping from feature name to value.
///
/// Built once per URL and never mutated afterwards; the only constructors are
/// `FromIterator` and the aligner.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// How a schema encodes yes/no signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// 1 = suspicious or present, -1 = benign or absent.
    RiskPolarity,
    /// 1 = present, 0 = absent; counts and fractions elsewhere.
    CountRate,
}

impl Encoding {
    pub fn flag(self, value: bool) -> f64 {
        match (self, value) {
            (_, true) => 1.0,
            (Encoding::RiskPolarity, false) => -1.0,
            (Encoding::CountRate, false) => 0.0,
        }
    }

    /// The "unavailable" value of the encoding.
    pub fn sentinel(self) -> f64 {
        match self {
            Encoding::RiskPolarity => -1.0,
            Encoding::CountRate => 0.0,
        }
    }
}

/// Signals that need a network collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkSignal {
    /// Host resolves.
    DnsRecord,
    /// WHOIS registration span is longer than one year.
    RegistrationOverYear,
    /// Fetched page declares a favicon.
    Favicon,
    /// Fetched page has more external anchors than the threshold.
    ExternalAnchors,
    /// The configured port accepts TCP connections.
    PortOpen,
}

pub type LexicalFn = fn(&NormalizedUrl, &HeuristicsConfig) -> f64;

#[derive(Clone, Copy)]
pub enum FeatureRule {
    Lexical(LexicalFn),
    /// Placeholder the trained model expects verbatim.
    Constant(f64),
    Network(NetworkSignal),
}

impl std::fmt::Debug for FeatureRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureRule::Lexical(_) => f.write_str("Lexical"),
            FeatureRule::Constant(v) => write!(f, "Constant({v})"),
            FeatureRule::Network(signal) => write!(f, "Network({signal:?})"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureDescriptor {
    pub name: &'static str,
    pub rule: FeatureRule,
    /// Value used when the rule cannot be evaluated.
    pub sentinel: f64,
}

/// A named, ordered set of feature descriptors with one encoding.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    pub name: &'static str,
    pub encoding: Encoding,
    pub descriptors: Vec<FeatureDescriptor>,
}

impl FeatureSchema {
    pub fn for_kind(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::RiskPolarity => risk_polarity::schema(),
            SchemaKind::CountRate => count_rate::schema(),
        }
    }

    pub fn sentinel(&self) -> f64 {
        self.encoding.sentinel()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.descriptors.iter().map(|d| d.name.to_string()).collect()
    }

    pub fn uses_network(&self) -> bool {
        self.descriptors
            .iter()
            .any(|d| matches!(d.rule, FeatureRule::Network(_)))
    }

    pub(crate) fn lexical(
        encoding: Encoding,
        name: &'static str,
        rule: LexicalFn,
    ) -> FeatureDescriptor {
        FeatureDescriptor {
            name,
            rule: FeatureRule::Lexical(rule),
            sentinel: encoding.sentinel(),
        }
    }

    pub(crate) fn constant(encoding: Encoding, name: &'static str, value: f64) -> FeatureDescriptor {
        FeatureDescriptor {
            name,
            rule: FeatureRule::Constant(value),
            sentinel: encoding.sentinel(),
        }
    }

    pub(crate) fn network(
        encoding: Encoding,
        name: &'static str,
        signal: NetworkSignal,
    ) -> FeatureDescriptor {
        FeatureDescriptor {
            name,
            rule: FeatureRule::Network(signal),
            sentinel: encoding.sentinel(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_encoding_flags() {
        assert_eq!(Encoding::RiskPolarity.flag(true), 1.0);
        assert_eq!(Encoding::RiskPolarity.flag(false), -1.0);
        assert_eq!(Encoding::CountRate.flag(true), 1.0);
        assert_eq!(Encoding::CountRate.flag(false), 0.0);
        assert_eq!(Encoding::RiskPolarity.sentinel(), -1.0);
        assert_eq!(Encoding::CountRate.sentinel(), 0.0);
    }

    #[test]
    fn test_feature_vector_keeps_order() {
        let vector: FeatureVector = [("b", 2.0), ("a", 1.0), ("c", 3.0)].into_iter().collect();
        assert_eq!(vector.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(vector.values(), vec![2.0, 1.0, 3.0]);
        assert_eq!(vector.get("a"), Some(1.0));
        assert_eq!(vector.get("z"), None);
        assert_eq!(
            serde_json::to_string(&vector).unwrap(),
            r#"{"b":2.0,"a":1.0,"c":3.0}"#
        );
    }

    #[test]
    fn test_schemas_have_unique_names_and_own_sentinel() {
        for kind in [SchemaKind::RiskPolarity, SchemaKind::CountRate] {
            let schema = FeatureSchema::for_kind(kind);
            let names: HashSet<_> = schema.descriptors.iter().map(|d| d.name).collect();
            assert_eq!(names.len(), schema.descriptors.len(), "{}", schema.name);
            assert!(schema
                .descriptors
                .iter()
                .all(|d| d.sentinel == schema.sentinel()));
        }
    }

    #[test]
    fn test_schema_sizes() {
        let risk = FeatureSchema::for_kind(SchemaKind::RiskPolarity);
        assert_eq!(risk.descriptors.len(), 30);
        assert!(risk.uses_network());

        let count = FeatureSchema::for_kind(SchemaKind::CountRate);
        assert_eq!(count.descriptors.len(), 48);
        assert!(!count.uses_network());
    }
}
