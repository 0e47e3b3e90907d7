//! Count-rate schema: raw counts, lengths, {0, 1} flags and a few fixed
//! fractions. Missing columns are filled with 0.

use super::{Encoding, FeatureDescriptor, FeatureSchema};
use crate::config::HeuristicsConfig;
use crate::normalizer::NormalizedUrl;

const ENCODING: Encoding = Encoding::CountRate;

/// TLD tokens that betray a domain embedded in a subdomain or path.
const EMBEDDED_TLDS: &[&str] = &["com", "net", "org", "info", "biz", "co"];

fn flag(value: bool) -> f64 {
    ENCODING.flag(value)
}

fn count(haystack: &str, c: char) -> f64 {
    haystack.matches(c).count() as f64
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

pub fn schema() -> FeatureSchema {
    FeatureSchema {
        name: "count_rate",
        encoding: ENCODING,
        descriptors: vec![
            lexical("NumDots", |u, _| count(&u.url, '.')),
            lexical("SubdomainLevel", |u, _| subdomain_level(u)),
            lexical("PathLevel", |u, _| count(&u.path, '/')),
            lexical("NumDash", |u, _| count(&u.host, '-')),
            lexical("NumDashInHostname", |u, _| count(&u.host, '-')),
            lexical("HostnameLength", |u, _| u.host.len() as f64),
            lexical("PathLength", |u, _| u.path.len() as f64),
            lexical("UrlLength", |u, _| u.url.len() as f64),
            lexical("AtSymbol", |u, _| flag(u.url.contains('@'))),
            lexical("TildeSymbol", |u, _| flag(u.url.contains('~'))),
            lexical("NumUnderscore", |u, _| count(&u.url, '_')),
            lexical("NumPercent", |u, _| count(&u.url, '%')),
            lexical("NumQueryComponents", |u, _| count(&u.url, '?')),
            lexical("NumAmpersand", |u, _| count(&u.url, '&')),
            lexical("NumHash", |u, _| count(&u.url, '#')),
            lexical("NumNumericChars", |u, _| {
                u.url.chars().filter(|c| c.is_ascii_digit()).count() as f64
            }),
            lexical("NoHttps", |u, _| flag(!u.is_https())),
            lexical("RandomString", |u, _| {
                flag(
                    u.url.chars().any(|c| c.is_ascii_digit())
                        && u.url.chars().any(|c| c.is_alphabetic()),
                )
            }),
            lexical("IpAddress", |u, _| flag(u.host_is_ip())),
            lexical("DomainInSubdomains", |u, _| {
                flag(u.subdomain.split('.').any(|l| EMBEDDED_TLDS.contains(&l)))
            }),
            lexical("DomainInPaths", |u, _| {
                let path = u.path.to_lowercase();
                flag(EMBEDDED_TLDS.iter().any(|tld| {
                    path.contains(&format!(".{tld}/")) || path.ends_with(&format!(".{tld}"))
                }))
            }),
            lexical("HttpsInHostname", |u, _| flag(u.host.contains("https"))),
            lexical("QueryLength", |u, _| {
                u.query.as_deref().map(str::len).unwrap_or(0) as f64
            }),
            lexical("DoubleSlashInPath", |u, _| flag(u.path.contains("//"))),
            lexical("NumSensitiveWords", |u, h| {
                let url = u.url.to_lowercase();
                h.sensitive_words
                    .iter()
                    .filter(|w| url.contains(w.as_str()))
                    .count() as f64
            }),
            lexical("EmbeddedBrandName", |u, h| {
                let url = u.url.to_lowercase();
                flag(h.brand_names.iter().any(|b| url.contains(b.as_str())))
            }),
            constant("PctExtHyperlinks", 0.5),
            constant("PctExtResourceUrls", 0.3),
            lexical("ExtFavicon", |u, _| flag(u.url.contains("favicon.ico"))),
            lexical("InsecureForms", |u, _| {
                flag(u.url.contains("http") && u.url.to_lowercase().contains("form"))
            }),
            constant("RelativeFormAction", 0.0),
            constant("ExtFormAction", 0.0),
            constant("AbnormalFormAction", 0.0),
            constant("PctNullSelfRedirectHyperlinks", 0.2),
            constant("FrequentDomainNameMismatch", 0.0),
            constant("FakeLinkInStatusBar", 0.0),
            constant("RightClickDisabled", 0.0),
            constant("PopUpWindow", 0.0),
            constant("SubmitInfoToEmail", 0.0),
            constant("IframeOrFrame", 0.0),
            constant("MissingTitle", 0.0),
            constant("ImagesOnlyInForm", 0.0),
            lexical("SubdomainLevelRT", |u, _| subdomain_level(u)),
            lexical("UrlLengthRT", |u, _| u.url.len() as f64),
            constant("PctExtResourceUrlsRT", 0.3),
            constant("AbnormalExtFormActionR", 0.0),
            constant("ExtMetaScriptLinkRT", 0.0),
            constant("PctExtNullSelfRedirectHyperlinksRT", 0.2),
        ],
    }
}

/// Dots in the host beyond the one separating the TLD.
fn subdomain_level(url: &NormalizedUrl) -> f64 {
    url.host.matches('.').count().saturating_sub(1) as f64
}
