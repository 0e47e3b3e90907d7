use super::{FeatureRule, FeatureSchema, FeatureVector, NetworkSignal};
use crate::config::HeuristicsConfig;
use crate::lookup::{LookupResult, NetworkLookups};
use crate::normalizer::{normalize, NormalizedUrl};
use crate::page::PageAnalyzer;
use tokio::sync::OnceCell;

/// Computes a schema's feature vector for one URL at a time.
///
/// Each descriptor is evaluated on its own; a failed lookup only affects the
/// descriptors that depend on it, which fall back to their sentinel.
pub struct FeatureExtractor<L> {
    schema: FeatureSchema,
    lookups: L,
    heuristics: HeuristicsConfig,
    probe_port: u16,
    page: PageAnalyzer,
}

/// Lookup results shared by the descriptors of a single extraction.
struct CallState<'a> {
    url: &'a NormalizedUrl,
    page: OnceCell<LookupResult<String>>,
}

impl<L: NetworkLookups> FeatureExtractor<L> {
    pub fn new(
        schema: FeatureSchema,
        lookups: L,
        heuristics: HeuristicsConfig,
        probe_port: u16,
    ) -> Self {
        Self {
            schema,
            lookups,
            heuristics,
            probe_port,
            page: PageAnalyzer::new(),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn lookups(&self) -> &L {
        &self.lookups
    }

    /// Feature vector for `raw` in schema order. Never fails.
    pub async fn extract(&self, raw: &str) -> FeatureVector {
        let url = normalize(raw);
        let state = CallState {
            url: &url,
            page: OnceCell::new(),
        };

        let mut entries = Vec::with_capacity(self.schema.descriptors.len());
        for descriptor in &self.schema.descriptors {
            let value = match descriptor.rule {
                FeatureRule::Lexical(rule) => rule(&url, &self.heuristics),
                FeatureRule::Constant(value) => value,
                FeatureRule::Network(signal) => {
                    match self.network_signal(signal, &state).await {
                        Ok(present) => self.schema.encoding.flag(present),
                        Err(reason) => {
                            log::debug!(
                                "{} for {}: {reason}, using sentinel {}",
                                descriptor.name,
                                url.url,
                                descriptor.sentinel
                            );
                            descriptor.sentinel
                        }
                    }
                }
            };
            entries.push((descriptor.name, value));
        }

        entries.into_iter().collect()
    }

    async fn network_signal(
        &self,
        signal: NetworkSignal,
        state: &CallState<'_>,
    ) -> Result<bool, String> {
        let url = state.url;
        match signal {
            NetworkSignal::DnsRecord => {
                let addresses = self
                    .lookups
                    .resolve(&url.host)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(!addresses.is_empty())
            }
            NetworkSignal::RegistrationOverYear => {
                let registration = self
                    .lookups
                    .registration(&url.registrable_domain)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(registration.span_days() > self.heuristics.min_registration_days)
            }
            NetworkSignal::Favicon => {
                let body = self.page_body(state).await?;
                Ok(self.page.has_favicon(body))
            }
            NetworkSignal::ExternalAnchors => {
                let body = self.page_body(state).await?;
                let external = self
                    .page
                    .external_link_count(body, &url.registrable_domain);
                Ok(external > self.heuristics.external_link_threshold)
            }
            NetworkSignal::PortOpen => {
                self.lookups
                    .probe_port(&url.host, self.probe_port)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(true)
            }
        }
    }

    /// The page body, fetched at most once per extraction.
    async fn page_body<'s>(&self, state: &'s CallState<'_>) -> Result<&'s str, String> {
        let fetched = state
            .page
            .get_or_init(|| async {
                log::debug!("Fetching {}", state.url.url);
                self.lookups.fetch_page(&state.url.url).await
            })
            .await;
        fetched.as_deref().map_err(|e| e.to_string())
    }
}
