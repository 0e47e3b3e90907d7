use super::{LookupError, LookupResult, NetworkLookups, Registration};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};

/// One of the network collaborators, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    Dns,
    Whois,
    Http,
    Port,
}

const HEALTHY_PAGE: &str = r#"<html>
<head>
<title>Welcome</title>
<link rel="icon" href="/favicon.ico">
</head>
<body>
<a href="/about">About</a>
<a href="/contact">Contact</a>
<a href="https://partner.example.org/">Partner</a>
</body>
</html>"#;

/// Deterministic collaborators answering with "healthy" responses unless
/// told otherwise. Nothing here depends on the clock or the network.
#[derive(Debug, Clone)]
pub struct MockLookups {
    address: IpAddr,
    default_registration: Registration,
    registrations: HashMap<String, Registration>,
    page: String,
    pages: HashMap<String, String>,
    failing: HashSet<Collaborator>,
}

impl Default for MockLookups {
    fn default() -> Self {
        Self::healthy()
    }
}

impl MockLookups {
    /// Resolvable DNS, a ten year registration, a page with a favicon and
    /// one external link, port open.
    pub fn healthy() -> Self {
        let default_registration = Registration {
            created: utc_date(2010, 1, 1),
            expires: utc_date(2030, 1, 1),
        };

        Self {
            address: IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            default_registration,
            registrations: HashMap::new(),
            page: HEALTHY_PAGE.to_string(),
            pages: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    /// Make every call to `collaborator` fail.
    pub fn failing(mut self, collaborator: Collaborator) -> Self {
        self.failing.insert(collaborator);
        self
    }

    /// Registration answer for a specific domain.
    pub fn with_registration(mut self, domain: &str, registration: Registration) -> Self {
        self.registrations
            .insert(domain.to_lowercase(), registration);
        self
    }

    /// Page body returned for every URL without a specific page.
    pub fn with_default_page(mut self, body: &str) -> Self {
        self.page = body.to_string();
        self
    }

    /// Page body for one URL.
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    fn check(&self, collaborator: Collaborator) -> LookupResult<()> {
        if self.failing.contains(&collaborator) {
            Err(LookupError::Injected(collaborator))
        } else {
            Ok(())
        }
    }
}

fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl NetworkLookups for MockLookups {
    async fn resolve(&self, host: &str) -> LookupResult<Vec<IpAddr>> {
        self.check(Collaborator::Dns)?;
        if host.is_empty() {
            return Err(LookupError::Dns("empty host".to_string()));
        }
        Ok(vec![self.address])
    }

    async fn registration(&self, domain: &str) -> LookupResult<Registration> {
        self.check(Collaborator::Whois)?;
        Ok(self
            .registrations
            .get(&domain.to_lowercase())
            .copied()
            .unwrap_or(self.default_registration))
    }

    async fn fetch_page(&self, url: &str) -> LookupResult<String> {
        self.check(Collaborator::Http)?;
        Ok(self.pages.get(url).unwrap_or(&self.page).clone())
    }

    async fn probe_port(&self, _host: &str, _port: u16) -> LookupResult<()> {
        self.check(Collaborator::Port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_healthy_defaults() {
        let mock = MockLookups::healthy();
        assert!(mock.resolve("www.google.com").await.is_ok());
        assert!(mock.registration("google.com").await.unwrap().span_days() > 365);
        assert!(mock.fetch_page("https://www.google.com").await.unwrap().contains("icon"));
        assert!(mock.probe_port("www.google.com", 443).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_injection_is_per_collaborator() {
        let mock = MockLookups::healthy().failing(Collaborator::Whois);
        assert_eq!(
            mock.registration("google.com").await,
            Err(LookupError::Injected(Collaborator::Whois))
        );
        assert!(mock.resolve("google.com").await.is_ok());
        assert!(mock.fetch_page("https://google.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_specific_registration_and_page() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let expires = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let mock = MockLookups::healthy()
            .with_registration("auth22-user.com", Registration { created, expires })
            .with_page("https://auth22-user.com", "<html></html>");

        assert_eq!(mock.registration("auth22-user.com").await.unwrap().span_days(), 365);
        assert_eq!(
            mock.fetch_page("https://auth22-user.com").await.unwrap(),
            "<html></html>"
        );
    }
}
