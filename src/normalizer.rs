use serde::Serialize;
use std::net::IpAddr;
use url::Url;

/// Suffixes where the registrable domain spans three labels.
const TWO_PART_SUFFIXES: &[&str] = &[
    "co.uk", "com.au", "co.jp", "co.kr", "com.br", "co.za", "com.mx", "co.in", "com.sg", "co.nz",
    "com.ar", "co.il", "org.uk", "net.au", "gov.uk", "ac.uk", "edu.au", "co.id",
];

/// A URL with a guaranteed scheme and its derived host components.
///
/// Built by [`normalize`], which never fails: malformed input produces
/// best-effort (possibly empty) components instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedUrl {
    /// The input exactly as given.
    pub raw: String,
    /// The input with a scheme, used for every lexical count.
    pub url: String,
    pub scheme: String,
    /// Lowercased host without port or brackets.
    pub host: String,
    pub path: String,
    pub query: Option<String>,
    /// e.g. `google.com` for `www.google.com`.
    pub registrable_domain: String,
    /// e.g. `google` for `www.google.com`.
    pub domain_label: String,
    /// e.g. `www` for `www.google.com`, empty when absent.
    pub subdomain: String,
}

impl NormalizedUrl {
    pub fn is_https(&self) -> bool {
        self.scheme == "https"
    }

    pub fn host_is_ip(&self) -> bool {
        self.host.parse::<IpAddr>().is_ok()
    }
}

/// Ensure the URL carries a scheme and derive its domain components.
pub fn normalize(raw: &str) -> NormalizedUrl {
    let trimmed = raw.trim();
    let url = with_scheme(trimmed);

    let (scheme, host, path, query) = match Url::parse(&url) {
        Ok(parsed) => {
            let host = parsed
                .host_str()
                .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_lowercase())
                .unwrap_or_default();
            (
                parsed.scheme().to_string(),
                host,
                parsed.path().to_string(),
                parsed.query().map(str::to_string),
            )
        }
        Err(e) => {
            log::debug!("URL parser rejected '{url}' ({e}), splitting manually");
            split_manually(&url)
        }
    };

    let registrable_domain = registrable_domain(&host);
    let domain_label = if host.parse::<IpAddr>().is_ok() {
        registrable_domain.clone()
    } else {
        registrable_domain
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string()
    };
    let subdomain = host
        .strip_suffix(registrable_domain.as_str())
        .map(|s| s.trim_end_matches('.').to_string())
        .unwrap_or_default();

    NormalizedUrl {
        raw: raw.to_string(),
        url,
        scheme,
        host,
        path,
        query,
        registrable_domain,
        domain_label,
        subdomain,
    }
}

fn with_scheme(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    for scheme in ["http://", "https://"] {
        if lower.starts_with(scheme) {
            return format!("{scheme}{}", &url[scheme.len()..]);
        }
    }
    format!("http://{url}")
}

fn split_manually(url: &str) -> (String, String, String, Option<String>) {
    let (scheme, rest) = url.split_once("://").unwrap_or(("http", url));

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    let remainder = &rest[authority_end..];

    // Drop userinfo and port.
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host).to_lowercase();

    let without_fragment = remainder.split('#').next().unwrap_or_default();
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (without_fragment.to_string(), None),
    };

    (scheme.to_lowercase(), host, path, query)
}

/// Registrable domain of a host, ignoring public-suffix subtleties beyond a
/// short list of two-part suffixes.
pub fn registrable_domain(host: &str) -> String {
    if host.parse::<IpAddr>().is_ok() {
        return host.to_string();
    }

    let parts: Vec<&str> = host.split('.').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return parts.first().copied().unwrap_or_default().to_string();
    }

    let last_two = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
    if parts.len() >= 3 && TWO_PART_SUFFIXES.contains(&last_two.as_str()) {
        return format!("{}.{last_two}", parts[parts.len() - 3]);
    }
    last_two
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_is_prepended() {
        let n = normalize("www.customs.ie-charge.info");
        assert_eq!(n.url, "http://www.customs.ie-charge.info");
        assert_eq!(n.scheme, "http");
        assert_eq!(n.host, "www.customs.ie-charge.info");
        assert_eq!(n.registrable_domain, "ie-charge.info");
        assert_eq!(n.domain_label, "ie-charge");
        assert_eq!(n.subdomain, "www.customs");
    }

    #[test]
    fn test_existing_scheme_kept() {
        let n = normalize("https://www.google.com");
        assert_eq!(n.url, "https://www.google.com");
        assert!(n.is_https());
        assert_eq!(n.host, "www.google.com");
        assert_eq!(n.registrable_domain, "google.com");
        assert_eq!(n.domain_label, "google");
        assert_eq!(n.subdomain, "www");
        assert_eq!(n.path, "/");
    }

    #[test]
    fn test_uppercase_scheme_and_host() {
        let n = normalize("HTTPS://Anpost-parcelredirect.com");
        assert_eq!(n.url, "https://Anpost-parcelredirect.com");
        assert_eq!(n.scheme, "https");
        assert_eq!(n.host, "anpost-parcelredirect.com");
        assert_eq!(n.domain_label, "anpost-parcelredirect");
        assert_eq!(n.subdomain, "");
    }

    #[test]
    fn test_path_and_query() {
        let n = normalize("https://customs-ie.com/ie/schedule?id=4&x=1");
        assert_eq!(n.path, "/ie/schedule");
        assert_eq!(n.query.as_deref(), Some("id=4&x=1"));
    }

    #[test]
    fn test_two_part_suffix() {
        assert_eq!(registrable_domain("mail.example.co.uk"), "example.co.uk");
        assert_eq!(registrable_domain("ptkgb.co.id"), "ptkgb.co.id");
        assert_eq!(registrable_domain("a.b"), "a.b");
        assert_eq!(registrable_domain("single"), "single");
    }

    #[test]
    fn test_ip_host() {
        let n = normalize("http://192.168.10.4/login");
        assert!(n.host_is_ip());
        assert_eq!(n.registrable_domain, "192.168.10.4");
        assert_eq!(n.domain_label, "192.168.10.4");
    }

    #[test]
    fn test_malformed_input_is_total() {
        let n = normalize("   ");
        assert_eq!(n.url, "http://");
        assert_eq!(n.host, "");
        assert_eq!(n.subdomain, "");

        let n = normalize("http://exa mple.com/a b");
        assert_eq!(n.scheme, "http");
        assert_eq!(n.host, "exa mple.com");
        assert_eq!(n.path, "/a b");
    }
}
