//! Risk-polarity schema: every value is 1 (signal present) or -1 (absent),
//! except the subdomain depth, and -1 stands in for anything unavailable.

use super::{Encoding, FeatureDescriptor, FeatureSchema, NetworkSignal};
use crate::config::HeuristicsConfig;
use crate::normalizer::NormalizedUrl;

const ENCODING: Encoding = Encoding::RiskPolarity;

fn flag(value: bool) -> f64 {
    ENCODING.flag(value)
}

fn lexical(
    name: &'static str,
    rule: fn(&NormalizedUrl, &HeuristicsConfig) -> f64,
) -> FeatureDescriptor {
    FeatureSchema::lexical(ENCODING, name, rule)
}

fn constant(name: &'static str, value: f64) -> FeatureDescriptor {
    FeatureSchema::constant(ENCODING, name, value)
}

fn network(name: &'static str, signal: NetworkSignal) -> FeatureDescriptor {
    FeatureSchema::network(ENCODING, name, signal)
}

pub fn schema() -> FeatureSchema {
    FeatureSchema {
        name: "risk_polarity",
        encoding: ENCODING,
        descriptors: vec![
            lexical("having_IPhaving_IP_Address", |u, _| flag(u.host_is_ip())),
            lexical("URLURL_Length", |u, _| flag(u.url.len() > 75)),
            lexical("Shortining_Service", |u, h| {
                flag(h.shorteners.iter().any(|s| u.url.contains(s.as_str())))
            }),
            lexical("having_At_Symbol", |u, _| flag(u.url.contains('@'))),
            lexical("double_slash_redirecting", |u, _| {
                flag(after_scheme(&u.url).contains("//"))
            }),
            lexical("Prefix_Suffix", |u, _| flag(u.domain_label.contains('-'))),
            lexical("having_Sub_Domain", |u, _| subdomain_depth(u)),
            lexical("SSLfinal_State", |u, _| flag(u.is_https())),
            network("Domain_registeration_length", NetworkSignal::RegistrationOverYear),
            network("Favicon", NetworkSignal::Favicon),
            network("port", NetworkSignal::PortOpen),
            lexical("HTTPS_token", |u, _| flag(u.domain_label.contains("https"))),
            lexical("Request_URL", |u, _| {
                flag(u.url.to_lowercase().contains("external"))
            }),
            network("URL_of_Anchor", NetworkSignal::ExternalAnchors),
            network("Links_in_tags", NetworkSignal::ExternalAnchors),
            constant("SFH", -1.0),
            lexical("Submitting_to_email", |u, _| flag(u.url.contains("mailto:"))),
            lexical("Abnormal_URL", |u, _| {
                flag(!u.url.to_lowercase().contains(u.domain_label.as_str()))
            }),
            lexical("Redirect", |u, _| flag(u.url.matches("//").count() > 2)),
            constant("on_mouseover", 1.0),
            constant("RightClick", 1.0),
            constant("popUpWidnow", 1.0),
            constant("Iframe", 1.0),
            network("age_of_domain", NetworkSignal::RegistrationOverYear),
            network("DNSRecord", NetworkSignal::DnsRecord),
            constant("web_traffic", -1.0),
            constant("Page_Rank", -1.0),
            constant("Google_Index", -1.0),
            constant("Links_pointing_to_page", 1.0),
            constant("Statistical_report", -1.0),
        ],
    }
}

/// Everything after the `scheme://` separator.
fn after_scheme(url: &str) -> &str {
    url.split_once("://").map(|(_, rest)| rest).unwrap_or(url)
}

/// Labels in front of the registrable domain, or -1 when there are none.
fn subdomain_depth(url: &NormalizedUrl) -> f64 {
    if url.subdomain.is_empty() {
        -1.0
    } else {
        url.subdomain.split('.').count() as f64
    }
}
