//! Network collaborators used by the network-derived features.
//!
//! Every lookup returns a [`LookupResult`]. Callers never see a panic or a
//! propagated error from here: the feature extractor turns any `Err` into the
//! feature's sentinel value.

pub mod live;
pub mod mock;
pub mod whois;

use crate::config::{NetworkConfig, NetworkMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use thiserror::Error;

pub use live::LiveLookups;
pub use mock::{Collaborator, MockLookups};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("DNS lookup failed: {0}")]
    Dns(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("WHOIS lookup failed: {0}")]
    Whois(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("network lookups are disabled")]
    Offline,

    #[error("injected failure for {0:?}")]
    Injected(Collaborator),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Registration window reported by WHOIS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl Registration {
    /// Whole days between creation and expiration. Negative when the record
    /// is inconsistent.
    pub fn span_days(&self) -> i64 {
        (self.expires - self.created).num_days()
    }
}

/// The best-effort lookup capability consumed by the feature extractor.
#[allow(async_fn_in_trait)]
pub trait NetworkLookups {
    /// Resolve a hostname to its addresses.
    async fn resolve(&self, host: &str) -> LookupResult<Vec<IpAddr>>;

    /// WHOIS creation and expiration dates for a registrable domain.
    async fn registration(&self, domain: &str) -> LookupResult<Registration>;

    /// Body of the page at `url`.
    async fn fetch_page(&self, url: &str) -> LookupResult<String>;

    /// `Ok(())` when a TCP connection to `host:port` succeeds.
    async fn probe_port(&self, host: &str, port: u16) -> LookupResult<()>;
}

/// Collaborator that fails every call, for runs without network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookups;

impl NetworkLookups for OfflineLookups {
    async fn resolve(&self, _host: &str) -> LookupResult<Vec<IpAddr>> {
        Err(LookupError::Offline)
    }

    async fn registration(&self, _domain: &str) -> LookupResult<Registration> {
        Err(LookupError::Offline)
    }

    async fn fetch_page(&self, _url: &str) -> LookupResult<String> {
        Err(LookupError::Offline)
    }

    async fn probe_port(&self, _host: &str, _port: u16) -> LookupResult<()> {
        Err(LookupError::Offline)
    }
}

/// Runtime choice between the collaborator implementations, selected by
/// `network.mode` in the config.
#[derive(Debug, Clone)]
pub enum AnyLookups {
    Live(LiveLookups),
    Offline(OfflineLookups),
    Mock(MockLookups),
}

impl AnyLookups {
    pub fn from_config(config: &NetworkConfig) -> Result<Self, reqwest::Error> {
        Ok(match config.mode {
            NetworkMode::Live => AnyLookups::Live(LiveLookups::new(config)?),
            NetworkMode::Offline => AnyLookups::Offline(OfflineLookups),
            NetworkMode::Mock => AnyLookups::Mock(MockLookups::healthy()),
        })
    }
}

impl NetworkLookups for AnyLookups {
    async fn resolve(&self, host: &str) -> LookupResult<Vec<IpAddr>> {
        match self {
            AnyLookups::Live(l) => l.resolve(host).await,
            AnyLookups::Offline(l) => l.resolve(host).await,
            AnyLookups::Mock(l) => l.resolve(host).await,
        }
    }

    async fn registration(&self, domain: &str) -> LookupResult<Registration> {
        match self {
            AnyLookups::Live(l) => l.registration(domain).await,
            AnyLookups::Offline(l) => l.registration(domain).await,
            AnyLookups::Mock(l) => l.registration(domain).await,
        }
    }

    async fn fetch_page(&self, url: &str) -> LookupResult<String> {
        match self {
            AnyLookups::Live(l) => l.fetch_page(url).await,
            AnyLookups::Offline(l) => l.fetch_page(url).await,
            AnyLookups::Mock(l) => l.fetch_page(url).await,
        }
    }

    async fn probe_port(&self, host: &str, port: u16) -> LookupResult<()> {
        match self {
            AnyLookups::Live(l) => l.probe_port(host, port).await,
            AnyLookups::Offline(l) => l.probe_port(host, port).await,
            AnyLookups::Mock(l) => l.probe_port(host, port).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_registration_span() {
        let reg = Registration {
            created: Utc.with_ymd_and_hms(1997, 9, 15, 4, 0, 0).unwrap(),
            expires: Utc.with_ymd_and_hms(2028, 9, 14, 4, 0, 0).unwrap(),
        };
        assert!(reg.span_days() > 365 * 30);

        let inverted = Registration {
            created: reg.expires,
            expires: reg.created,
        };
        assert!(inverted.span_days() < 0);
    }

    #[test]
    fn test_mode_selects_collaborator() {
        let mut config = NetworkConfig::default();
        config.mode = NetworkMode::Offline;
        assert!(matches!(
            AnyLookups::from_config(&config).unwrap(),
            AnyLookups::Offline(_)
        ));
        config.mode = NetworkMode::Mock;
        assert!(matches!(
            AnyLookups::from_config(&config).unwrap(),
            AnyLookups::Mock(_)
        ));
    }

    #[tokio::test]
    async fn test_offline_fails_everything() {
        let lookups = OfflineLookups;
        assert_eq!(lookups.resolve("google.com").await, Err(LookupError::Offline));
        assert!(lookups.registration("google.com").await.is_err());
        assert!(lookups.fetch_page("https://google.com").await.is_err());
        assert!(lookups.probe_port("google.com", 443).await.is_err());
    }
}
