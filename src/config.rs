use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which feature schema feeds the model.
    pub schema: SchemaKind,
    /// Persisted classifier artifact (YAML or JSON).
    pub model_path: String,
    pub network: NetworkConfig,
    pub heuristics: HeuristicsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Values in {-1, 1}, sentinel -1, network-derived signals.
    RiskPolarity,
    /// Counts, {0, 1} flags and fractions, sentinel 0, lexical only.
    CountRate,
}

impl std::str::FromStr for SchemaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "risk_polarity" => Ok(SchemaKind::RiskPolarity),
            "count_rate" => Ok(SchemaKind::CountRate),
            other => anyhow::bail!("unknown schema '{other}' (expected risk-polarity or count-rate)"),
        }
    }
}

impl SchemaKind {
    /// Shipped model artifact trained on this schema.
    pub fn default_model_path(self) -> &'static str {
        match self {
            SchemaKind::RiskPolarity => "models/risk_polarity.yaml",
            SchemaKind::CountRate => "models/count_rate.yaml",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    Live,
    /// Every lookup fails, so network features take their sentinel.
    Offline,
    /// Deterministic healthy answers, no traffic.
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub mode: NetworkMode,
    pub http_timeout_seconds: u64,
    pub dns_timeout_seconds: u64,
    pub whois_timeout_seconds: u64,
    pub port_timeout_seconds: u64,
    pub probe_port: u16,
    pub user_agent: String,
    /// Fetched pages larger than this are cut off.
    pub max_page_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub shorteners: Vec<String>,
    pub sensitive_words: Vec<String>,
    pub brand_names: Vec<String>,
    /// More external anchors than this flags the page.
    pub external_link_threshold: usize,
    /// Registration spans longer than this are "over one year".
    pub min_registration_days: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Append-only CSV of aligned feature rows.
    pub features_csv: Option<String>,
    /// Append-only `URL: ... --> Prediction: ...` log.
    pub predictions_log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema: SchemaKind::RiskPolarity,
            model_path: SchemaKind::RiskPolarity.default_model_path().to_string(),
            network: NetworkConfig::default(),
            heuristics: HeuristicsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            mode: NetworkMode::Live,
            http_timeout_seconds: 3,
            dns_timeout_seconds: 3,
            whois_timeout_seconds: 3,
            port_timeout_seconds: 2,
            probe_port: 443,
            user_agent: format!("phishscan/{}", env!("CARGO_PKG_VERSION")),
            max_page_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        HeuristicsConfig {
            shorteners: ["bit.ly", "goo.gl", "tinyurl"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sensitive_words: ["login", "bank", "verify", "secure"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            brand_names: vec!["paypal".to_string()],
            external_link_threshold: 5,
            min_registration_days: 365,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {path}"))?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {path}"))?;
        Ok(())
    }

    /// Load `path`, or the defaults when it does not exist.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            log::warn!("Configuration file '{path}' not found, using default configuration");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schema, SchemaKind::RiskPolarity);
        assert_eq!(config.network.mode, NetworkMode::Live);
        assert_eq!(config.network.http_timeout_seconds, 3);
        assert_eq!(config.network.port_timeout_seconds, 2);
        assert_eq!(config.network.probe_port, 443);
        assert_eq!(config.network.max_page_bytes, 2 * 1024 * 1024);
        assert_eq!(config.heuristics.external_link_threshold, 5);
        assert_eq!(config.heuristics.sensitive_words.len(), 4);
        assert!(config.output.features_csv.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "schema: count_rate\nmodel_path: models/count_rate.yaml\nnetwork:\n  mode: offline\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.schema, SchemaKind::CountRate);
        assert_eq!(config.network.mode, NetworkMode::Offline);
        assert_eq!(config.network.dns_timeout_seconds, 3);
        assert_eq!(config.heuristics.brand_names, vec!["paypal".to_string()]);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishscan.yaml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.output.predictions_log = Some("predictions_log.txt".to_string());
        config.to_file(path).unwrap();

        let loaded = Config::from_file(path).unwrap();
        assert_eq!(loaded.output.predictions_log.as_deref(), Some("predictions_log.txt"));
        assert_eq!(loaded.model_path, config.model_path);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_or_default("/nonexistent/phishscan.yaml").unwrap();
        assert_eq!(config.schema, SchemaKind::RiskPolarity);
    }

    #[test]
    fn test_schema_kind_from_str() {
        assert_eq!("risk-polarity".parse::<SchemaKind>().unwrap(), SchemaKind::RiskPolarity);
        assert_eq!("count_rate".parse::<SchemaKind>().unwrap(), SchemaKind::CountRate);
        assert!("xgboost".parse::<SchemaKind>().is_err());
    }
}
