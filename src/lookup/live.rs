use super::whois::WhoisClient;
use super::{LookupError, LookupResult, NetworkLookups, Registration};
use crate::config::NetworkConfig;
use hickory_resolver::TokioAsyncResolver;
use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Collaborators backed by the real network.
#[derive(Debug, Clone)]
pub struct LiveLookups {
    client: Client,
    whois: WhoisClient,
    dns_timeout: Duration,
    port_timeout: Duration,
    max_page_bytes: usize,
}

impl LiveLookups {
    pub fn new(config: &NetworkConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            whois: WhoisClient::new(Duration::from_secs(config.whois_timeout_seconds)),
            dns_timeout: Duration::from_secs(config.dns_timeout_seconds),
            port_timeout: Duration::from_secs(config.port_timeout_seconds),
            max_page_bytes: config.max_page_bytes,
        })
    }
}

impl NetworkLookups for LiveLookups {
    async fn resolve(&self, host: &str) -> LookupResult<Vec<IpAddr>> {
        log::debug!("Checking DNS for host: {host} (timeout: {:?})", self.dns_timeout);

        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| LookupError::Dns(format!("resolver setup: {e}")))?;

        let response = tokio::time::timeout(self.dns_timeout, resolver.lookup_ip(host))
            .await
            .map_err(|_| LookupError::Timeout("DNS lookup"))?
            .map_err(|e| LookupError::Dns(e.to_string()))?;

        let addresses: Vec<IpAddr> = response.iter().collect();
        if addresses.is_empty() {
            return Err(LookupError::Dns(format!("no addresses for {host}")));
        }
        log::debug!("DNS found {} address(es) for {host}", addresses.len());
        Ok(addresses)
    }

    async fn registration(&self, domain: &str) -> LookupResult<Registration> {
        self.whois.registration(domain).await
    }

    async fn fetch_page(&self, url: &str) -> LookupResult<String> {
        log::debug!("Fetching page: {url}");

        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout("HTTP fetch")
            } else {
                LookupError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if let Some(length) = response.content_length() {
            if length > self.max_page_bytes as u64 {
                return Err(LookupError::Http(format!(
                    "{url}: body of {length} bytes exceeds {} byte limit",
                    self.max_page_bytes
                )));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout("HTTP fetch")
            } else {
                LookupError::Http(e.to_string())
            }
        })? {
            let room = self.max_page_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                log::debug!("Truncated {url} at {} bytes", self.max_page_bytes);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        log::debug!("Fetched {url}: {status} ({} bytes)", body.len());
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn probe_port(&self, host: &str, port: u16) -> LookupResult<()> {
        tokio::time::timeout(self.port_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| LookupError::Timeout("port probe"))?
            .map_err(|e| LookupError::Connect(format!("{host}:{port}: {e}")))?;
        log::debug!("Port {port} open on {host}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/")
    }

    fn lookups(max_page_bytes: usize) -> LiveLookups {
        let config = NetworkConfig {
            max_page_bytes,
            ..NetworkConfig::default()
        };
        LiveLookups::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_within_limit() {
        let url = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello".to_vec()).await;
        assert_eq!(lookups(16).fetch_page(&url).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_rejected() {
        let mut response = b"HTTP/1.1 200 OK\r\nContent-Length: 64\r\nConnection: close\r\n\r\n".to_vec();
        response.extend(std::iter::repeat(b'a').take(64));
        let url = serve_once(response).await;
        assert!(matches!(
            lookups(16).fetch_page(&url).await,
            Err(LookupError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_undeclared_length_is_truncated() {
        let mut response = b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n".to_vec();
        response.extend(std::iter::repeat(b'a').take(64));
        let url = serve_once(response).await;
        let body = lookups(16).fetch_page(&url).await.unwrap();
        assert_eq!(body, "a".repeat(16));
    }
}
