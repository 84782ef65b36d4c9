use std::time::Duration;

use crate::error::NetError;

/// Configuration for [`NetClient::new`], mirroring the fields the original
/// C API's `McPkgNetClientCfg` exposed: a base URL every request is
/// resolved against, a user agent string, and separate connect/operation
/// timeouts.
#[derive(Debug, Clone)]
pub struct NetClientCfg {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub operation_timeout: Duration,
}

impl Default for NetClientCfg {
    fn default() -> Self {
        NetClientCfg {
            base_url: String::new(),
            user_agent: concat!("mcpkg/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            operation_timeout: Duration::from_secs(60),
        }
    }
}

impl NetClientCfg {
    pub fn new(base_url: impl Into<String>) -> Self {
        NetClientCfg {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    pub fn operation_timeout(mut self, d: Duration) -> Self {
        self.operation_timeout = d;
        self
    }
}

/// Thin wrapper around a [`reqwest::Client`] bound to one base URL. This is
/// the concrete HTTP collaborator the downloader drives; nothing about the
/// downloader's pool or cancellation logic depends on `reqwest` directly.
#[derive(Debug, Clone)]
pub struct NetClient {
    http: reqwest::Client,
    base_url: String,
    operation_timeout: Duration,
}

impl NetClient {
    pub fn new(cfg: &NetClientCfg) -> Result<Self, NetError> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout)
            .build()
            .map_err(NetError::ClientBuild)?;

        Ok(NetClient {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            operation_timeout: cfg.operation_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Resolve `path` (and optional raw query string) against the base URL.
    pub fn resolve_url(&self, path: &str, query: Option<&str>) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        match query {
            Some(q) if !q.is_empty() => format!("{}{path}?{q}", self.base_url),
            _ => format!("{}{path}", self.base_url),
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_url_joins_base_and_path() {
        let client = NetClient::new(&NetClientCfg::new("https://example.com")).unwrap();
        assert_eq!(
            client.resolve_url("/rfc/rfc9110.txt", None),
            "https://example.com/rfc/rfc9110.txt"
        );
        assert_eq!(
            client.resolve_url("rfc/rfc9110.txt", Some("x=1")),
            "https://example.com/rfc/rfc9110.txt?x=1"
        );
    }

    #[test]
    fn trailing_slash_on_base_url_is_trimmed() {
        let client = NetClient::new(&NetClientCfg::new("https://example.com/")).unwrap();
        assert_eq!(client.base_url(), "https://example.com");
    }
}
