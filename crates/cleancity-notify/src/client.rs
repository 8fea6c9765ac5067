use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cleancity_core::config::NotifyConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::error::DeliveryError;
use crate::payload::NtfyMessage;

/// Anything that can put a push on the wire.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, message: &NtfyMessage) -> Result<(), DeliveryError>;
}

/// HTTP client for the push relay.
pub struct NtfyClient {
    server_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl NtfyClient {
    pub fn new(config: &NotifyConfig) -> Result<Self, DeliveryError> {
        if config.server_url.trim().is_empty() {
            return Err(DeliveryError::Config(
                "relay server url cannot be empty".to_string(),
            ));
        }
        if config.timeout_ms == 0 {
            return Err(DeliveryError::Config(
                "relay timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            server_url: config.server_url.trim().trim_end_matches('/').to_string(),
            token: config
                .token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|error| DeliveryError::Config(error.to_string()))?,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Plain-text publish to `/{topic}`.
    pub async fn publish_text(&self, topic: &str, body: &str) -> Result<(), DeliveryError> {
        let endpoint = format!("{}/{}", self.server_url, topic);
        let request = self
            .client
            .post(&endpoint)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body.to_string());
        self.send(request, topic).await
    }

    /// Plain-text body with the message metadata carried in headers.
    pub async fn publish_with_headers(&self, message: &NtfyMessage) -> Result<(), DeliveryError> {
        let mut headers = HeaderMap::new();
        for (name, value) in message.header_pairs() {
            let encoded = encode_header_value(&value);
            let value = HeaderValue::from_str(&encoded).map_err(|error| {
                DeliveryError::InvalidPayload(format!("header {} not encodable: {}", name, error))
            })?;
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|error| {
                DeliveryError::InvalidPayload(format!("bad header name {}: {}", name, error))
            })?;
            headers.insert(name, value);
        }

        let endpoint = format!("{}/{}", self.server_url, message.topic);
        let request = self
            .client
            .post(&endpoint)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .headers(headers)
            .body(message.message.clone());
        self.send(request, &message.topic).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        topic: &str,
    ) -> Result<(), DeliveryError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        debug!(topic, status = status.as_u16(), "Push accepted by relay");
        Ok(())
    }
}

/// Header values must be visible ASCII; anything else is sent as an
/// RFC 2047 encoded word, which the relay decodes.
fn encode_header_value(value: &str) -> String {
    let plain = value
        .bytes()
        .all(|b| b == b'\t' || (0x20..0x7f).contains(&b));
    if plain {
        return value.to_string();
    }
    format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
}

#[async_trait]
impl NotificationSink for NtfyClient {
    /// JSON publish to the relay root; the topic travels in the body.
    async fn publish(&self, message: &NtfyMessage) -> Result<(), DeliveryError> {
        let request = self.client.post(&self.server_url).json(message);
        self.send(request, &message.topic).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_server_url() {
        let config = NotifyConfig {
            server_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            NtfyClient::new(&config),
            Err(DeliveryError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = NotifyConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(NtfyClient::new(&config).is_err());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = NotifyConfig {
            server_url: "https://ntfy.example.org/".to_string(),
            ..Default::default()
        };
        let client = NtfyClient::new(&config).unwrap();
        assert_eq!(client.server_url(), "https://ntfy.example.org");
    }

    #[test]
    fn test_ascii_header_values_pass_through() {
        assert_eq!(encode_header_value("Report resolved"), "Report resolved");
        assert_eq!(encode_header_value("a,b\tc"), "a,b\tc");
    }

    #[test]
    fn test_non_ascii_header_values_are_encoded() {
        assert_eq!(
            encode_header_value("Prijava riješena"),
            "=?UTF-8?B?UHJpamF2YSByaWplxaFlbmE=?="
        );
        assert!(HeaderValue::from_str(&encode_header_value("line\nbreak")).is_ok());
    }
}
