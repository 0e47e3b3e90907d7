use crate::features::FeatureVector;

/// Outcome of reconciling extracted features with a model's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Exactly the expected names, in the expected order.
    pub vector: FeatureVector,
    /// Expected names the extractor did not produce.
    pub filled: Vec<String>,
    /// Extracted names the model does not know.
    pub dropped: Vec<String>,
}

/// Reindex `features` onto `expected`, filling absent names with `sentinel`
/// and discarding the rest. Values that are present are carried unchanged.
pub fn align(features: &FeatureVector, expected: &[String], sentinel: f64) -> Alignment {
    let mut filled = Vec::new();
    let vector: FeatureVector = expected
        .iter()
        .map(|name| {
            let value = features.get(name).unwrap_or_else(|| {
                filled.push(name.clone());
                sentinel
            });
            (name.as_str(), value)
        })
        .collect();

    let dropped: Vec<String> = features
        .names()
        .filter(|name| !expected.iter().any(|e| e.as_str() == *name))
        .map(str::to_string)
        .collect();

    if !filled.is_empty() {
        log::debug!("Filled {} missing feature(s) with {sentinel}: {filled:?}", filled.len());
    }
    if !dropped.is_empty() {
        log::debug!("Dropped {} unexpected feature(s): {dropped:?}", dropped.len());
    }

    Alignment {
        vector,
        filled,
        dropped,
    }
}
