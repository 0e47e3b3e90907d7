pub mod aligner;
pub mod config;
pub mod features;
pub mod lookup;
pub mod model;
pub mod normalizer;
pub mod page;
pub mod pipeline;
pub mod prediction_log;
pub mod verdict;

pub use config::{Config, SchemaKind};
pub use features::{FeatureExtractor, FeatureSchema, FeatureVector};
pub use lookup::{AnyLookups, LiveLookups, MockLookups, NetworkLookups, OfflineLookups};
pub use model::{load_model, Classifier};
pub use pipeline::{read_batch_file, Classification, Pipeline};
pub use prediction_log::PredictionLog;
pub use verdict::{Category, Severity, Verdict};
