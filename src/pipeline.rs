use crate::aligner::align;
use crate::config::Config;
use crate::features::{FeatureExtractor, FeatureSchema, FeatureVector};
use crate::lookup::NetworkLookups;
use crate::model::{load_model, Classifier};
use crate::prediction_log::PredictionLog;
use crate::verdict::Verdict;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Result of classifying one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub url: String,
    /// Aligned to the classifier's columns.
    pub features: FeatureVector,
    pub verdict: Verdict,
}

/// Extractor, classifier and output log bound together at startup.
pub struct Pipeline<L> {
    extractor: FeatureExtractor<L>,
    classifier: Box<dyn Classifier>,
    expected: Vec<String>,
    log: Option<PredictionLog>,
}

impl<L: NetworkLookups> Pipeline<L> {
    pub fn new(extractor: FeatureExtractor<L>, classifier: Box<dyn Classifier>) -> Self {
        let expected = classifier.feature_names().to_vec();

        let computed = extractor.schema().feature_names();
        let unknown: Vec<&String> = expected.iter().filter(|n| !computed.contains(n)).collect();
        if !unknown.is_empty() {
            log::warn!(
                "Model expects {} column(s) the {} schema does not compute, they will hold {}: {unknown:?}",
                unknown.len(),
                extractor.schema().name,
                extractor.schema().sentinel()
            );
        }

        Self {
            extractor,
            classifier,
            expected,
            log: None,
        }
    }

    pub fn from_config(config: &Config, lookups: L) -> Result<Self> {
        let classifier = load_model(Path::new(&config.model_path))
            .with_context(|| format!("Failed to load model: {}", config.model_path))?;
        let extractor = FeatureExtractor::new(
            FeatureSchema::for_kind(config.schema),
            lookups,
            config.heuristics.clone(),
            config.network.probe_port,
        );

        let mut pipeline = Self::new(extractor, classifier);
        pipeline.log = PredictionLog::from_config(&config.output);
        Ok(pipeline)
    }

    pub fn with_prediction_log(mut self, log: PredictionLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Column names, in order, that every classified vector carries.
    pub fn expected_features(&self) -> &[String] {
        &self.expected
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.extractor.schema()
    }

    pub async fn classify(&self, url: &str) -> Classification {
        let extracted = self.extractor.extract(url).await;
        let alignment = align(&extracted, &self.expected, self.schema().sentinel());
        let row = alignment.vector.values();

        let label = self.classifier.predict(&row);
        let verdict = match self.classifier.predict_proba(&row) {
            Some(probability) => Verdict::from_probability(probability, label),
            None => Verdict::from_label(label),
        };
        log::info!("URL: {url} --> Prediction: {}", verdict.prediction_label());

        let classification = Classification {
            url: url.to_string(),
            features: alignment.vector,
            verdict,
        };
        if let Some(log) = &self.log {
            log.record(&classification);
        }
        classification
    }

    /// Classify each URL in turn. Every URL yields a classification.
    pub async fn classify_batch(&self, urls: &[String]) -> Vec<Classification> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            results.push(self.classify(url).await);
        }
        results
    }
}

/// URLs from a batch file: one per line, blank lines and `#` comments skipped.
pub fn read_batch_file(path: &str) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {path}"))?;
    Ok(parse_batch(&content))
}

fn parse_batch(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
