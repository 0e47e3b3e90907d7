use super::{LookupError, LookupResult, Registration};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const IANA_SERVER: &str = "whois.iana.org";

const CREATION_PATTERNS: &[&str] = &[
    r"(?im)^\s*creation\s*date[:\s]+([^\r\n]+)",
    r"(?im)^\s*created(?:\s*on)?[:\s]+([^\r\n]+)",
    r"(?im)^\s*registered(?:\s*on)?[:\s]+([^\r\n]+)",
    r"(?im)^\s*registration\s*(?:date|time)[:\s]+([^\r\n]+)",
    r"(?im)^\s*domain_date_created[:\s]+([^\r\n]+)",
];

const EXPIRATION_PATTERNS: &[&str] = &[
    r"(?im)^\s*registry\s*expiry\s*date[:\s]+([^\r\n]+)",
    r"(?im)^\s*registrar\s*registration\s*expiration\s*date[:\s]+([^\r\n]+)",
    r"(?im)^\s*expir(?:y|ation|es)(?:\s*date|\s*on)?[:\s]+([^\r\n]+)",
    r"(?im)^\s*paid-till[:\s]+([^\r\n]+)",
    r"(?im)^\s*renewal\s*date[:\s]+([^\r\n]+)",
];

/// WHOIS client speaking the plain-text protocol on TCP port 43.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Creation and expiration dates of `domain`.
    pub async fn registration(&self, domain: &str) -> LookupResult<Registration> {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() || !domain.contains('.') || domain.contains(' ') {
            return Err(LookupError::Whois(format!("invalid domain '{domain}'")));
        }

        let server = server_for(&domain);
        log::debug!("Using WHOIS server: {server} for domain: {domain}");

        let mut text = self.query(&server, &domain).await?;

        // IANA only names the authoritative server; ask that one.
        if server == IANA_SERVER {
            if let Some(referral) = referral(&text) {
                log::debug!("IANA referred {domain} to {referral}");
                text = self.query(&referral, &domain).await?;
            }
        }

        parse_registration(&text)
            .ok_or_else(|| LookupError::Whois(format!("no registration dates for {domain}")))
    }

    async fn query(&self, server: &str, domain: &str) -> LookupResult<String> {
        log::debug!("Connecting to WHOIS server: {server}:43");

        let mut stream = timeout(self.timeout, TcpStream::connect(format!("{server}:43")))
            .await
            .map_err(|_| LookupError::Timeout("WHOIS connect"))?
            .map_err(|e| LookupError::Connect(format!("{server}: {e}")))?;

        stream
            .write_all(format!("{domain}\r\n").as_bytes())
            .await
            .map_err(|e| LookupError::Whois(e.to_string()))?;

        let mut response = Vec::new();
        timeout(self.timeout, stream.read_to_end(&mut response))
            .await
            .map_err(|_| LookupError::Timeout("WHOIS read"))?
            .map_err(|e| LookupError::Whois(e.to_string()))?;

        if response.is_empty() {
            return Err(LookupError::Whois(format!("empty response from {server}")));
        }

        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

fn server_for(domain: &str) -> String {
    let tld = domain.rsplit('.').next().unwrap_or(domain);
    let server = match tld {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "info" => "whois.afilias.net",
        "biz" => "whois.neulevel.biz",
        "us" => "whois.nic.us",
        "uk" => "whois.nic.uk",
        "ie" => "whois.weare.ie",
        "de" => "whois.denic.de",
        "fr" => "whois.afnic.fr",
        "it" => "whois.nic.it",
        "nl" => "whois.domain-registry.nl",
        "au" => "whois.auda.org.au",
        "ca" => "whois.cira.ca",
        "jp" => "whois.jprs.jp",
        "cn" => "whois.cnnic.cn",
        "ru" => "whois.tcinet.ru",
        "br" => "whois.registro.br",
        "id" => "whois.id",
        _ => IANA_SERVER,
    };
    server.to_string()
}

fn referral(text: &str) -> Option<String> {
    let re = Regex::new(r"(?im)^\s*(?:refer|whois):\s*(\S+)").ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
}

/// Extract the registration window from a WHOIS text response.
pub fn parse_registration(text: &str) -> Option<Registration> {
    let created = first_date(text, CREATION_PATTERNS)?;
    let expires = first_date(text, EXPIRATION_PATTERNS)?;
    Some(Registration { created, expires })
}

fn first_date(text: &str, patterns: &[&str]) -> Option<DateTime<Utc>> {
    for pattern in patterns {
        let Ok(regex) = Regex::new(pattern) else {
            continue;
        };
        for captures in regex.captures_iter(text) {
            let Some(value) = captures.get(1) else {
                continue;
            };
            let value = value.as_str().trim();
            match parse_date(value) {
                Some(date) => return Some(date),
                None => log::debug!("Could not parse WHOIS date: '{value}'"),
            }
        }
    }
    None
}

/// Parse the date formats registries commonly emit.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y.%m.%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&date));
        }
    }

    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d", "%d-%b-%Y", "%d.%m.%Y", "%Y.%m.%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d",
    ];
    // Trailing timezone names or registry notes follow the date on some servers.
    let head = value.split_whitespace().next().unwrap_or(value);
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(head, format) {
            return date.and_hms_opt(0, 0, 0).map(|d| Utc.from_utc_datetime(&d));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN_GOOGLE: &str = "   Domain Name: GOOGLE.COM\r
   Registry Domain ID: 2138514_DOMAIN_COM-VRSN\r
   Registrar WHOIS Server: whois.markmonitor.com\r
   Updated Date: 2019-09-09T15:39:04Z\r
   Creation Date: 1997-09-15T04:00:00Z\r
   Registry Expiry Date: 2028-09-14T04:00:00Z\r
   Registrar: MarkMonitor Inc.\r
";

    #[test]
    fn test_parse_verisign_response() {
        let reg = parse_registration(VERISIGN_GOOGLE).unwrap();
        assert_eq!(reg.created.date_naive().to_string(), "1997-09-15");
        assert_eq!(reg.expires.date_naive().to_string(), "2028-09-14");
        assert!(reg.span_days() > 365);
    }

    #[test]
    fn test_parse_ru_style_response() {
        let text = "domain:        EXAMPLE.RU\ncreated:       2023-05-01T10:00:00Z\npaid-till:     2024-05-01T10:00:00Z\n";
        let reg = parse_registration(text).unwrap();
        assert_eq!(reg.span_days(), 366);
    }

    #[test]
    fn test_missing_expiration_is_none() {
        let text = "Creation Date: 2020-01-01T00:00:00Z\nRegistrar: Somebody\n";
        assert!(parse_registration(text).is_none());
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-10-10").is_some());
        assert!(parse_date("2024-10-10T12:00:00Z").is_some());
        assert!(parse_date("2024-10-10 12:00:00").is_some());
        assert!(parse_date("10-Oct-2024").is_some());
        assert!(parse_date("10.10.2024").is_some());
        assert!(parse_date("2024-10-10 (registry time)").is_some());
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn test_referral() {
        let text = "% IANA WHOIS server\n\nrefer:        whois.nic.xyz\n\ndomain:       XYZ\n";
        assert_eq!(referral(text).as_deref(), Some("whois.nic.xyz"));
        assert_eq!(referral("nothing here"), None);
    }

    #[test]
    fn test_server_for() {
        assert_eq!(server_for("google.com"), "whois.verisign-grs.com");
        assert_eq!(server_for("ie-charge.info"), "whois.afilias.net");
        assert_eq!(server_for("example.xyz"), IANA_SERVER);
    }

    #[tokio::test]
    async fn test_invalid_domain_rejected_without_network() {
        let client = WhoisClient::new(Duration::from_secs(1));
        assert!(matches!(
            client.registration("google").await,
            Err(LookupError::Whois(_))
        ));
    }
}
