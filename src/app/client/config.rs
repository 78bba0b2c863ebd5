//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! shared by catalog requests and asset downloads.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Headers sent with every request
    pub request_headers: BTreeMap<String, String>,
    /// Whole-request timeout, body included
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_headers: http::DEFAULT_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            tcp_nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Set the catalog API key header
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.request_headers
            .insert(http::API_KEY_HEADER.to_string(), api_key.into());
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Convert configured headers into a reqwest header map
    pub fn header_map(&self) -> ConfigResult<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.request_headers.len());
        for (name, value) in &self.request_headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidValue {
                    field: "client.request_headers".to_string(),
                    value: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidValue {
                    field: format!("client.request_headers.{}", name),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ConfigResult<Client> {
        let mut client_builder = Client::builder()
            .default_headers(self.header_map()?)
            .user_agent(http::USER_AGENT)
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::limited(http::MAX_REDIRECTS))
            .tcp_nodelay(self.tcp_nodelay);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        Ok(client_builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(config.request_timeout, http::DEFAULT_TIMEOUT);
        assert_eq!(
            config.request_headers.get("accept").map(String::as_str),
            Some("application/json, text/plain, */*")
        );
    }

    #[test]
    fn test_with_api_key() {
        let config = ClientConfig::default().with_api_key("secret");
        assert_eq!(
            config.request_headers.get(http::API_KEY_HEADER).map(String::as_str),
            Some("secret")
        );
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig::default();
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let mut config = ClientConfig::default();
        config
            .request_headers
            .insert("bad header".to_string(), "value".to_string());

        match config.build_http_client() {
            Err(ConfigError::InvalidValue { value, .. }) => assert_eq!(value, "bad header"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }
}
