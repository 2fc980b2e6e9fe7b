//! Language detection and translation over the provider HTTP API.
//!
//! Both capabilities are best-effort by contract: any provider failure is
//! reported as `None` and the caller applies its documented fallback
//! (detect: stored preference then English; translate: skip the recipient).
//! Errors never propagate out of this module.
//!
//! The provider is the free Google Translate endpoint
//! (`/translate_a/single?client=gtx`). Its response is a JSON array whose
//! first element holds the translated segments and whose third element is
//! the detected source language, which is how `detect` is implemented
//! without a separate detection service.

use crate::config::Config;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Texts shorter than this (after trimming) are never sent to detection;
/// there is not enough signal to classify them.
pub const MIN_DETECT_LEN: usize = 5;

#[derive(Clone)]
pub struct Translator {
    client: reqwest::Client,
    base_url: String,
}

/// Parsed provider result: the translated text plus what the provider
/// thinks the source language was.
struct ProviderResult {
    translated: String,
    detected_lang: Option<String>,
}

impl Translator {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client for translation provider")?;

        Ok(Self {
            client,
            base_url: config.translate_api_url.clone(),
        })
    }

    /// Detect the language of `text`.
    ///
    /// Returns `None` for texts too short to classify, and for any provider
    /// or network failure.
    pub async fn detect(&self, text: &str) -> Option<String> {
        if text.trim().chars().count() < MIN_DETECT_LEN {
            debug!("Text too short for detection, skipping provider call");
            return None;
        }

        match self.request(text, "auto", "en").await {
            Ok(result) => result.detected_lang,
            Err(e) => {
                warn!("Language detection failed: {}", e);
                None
            }
        }
    }

    /// Translate `text` into `target_lang`. `source_lang = None` lets the
    /// provider auto-detect.
    ///
    /// Returns `None` on failure, and also when the result is
    /// case-insensitively identical to the input: such a "translation"
    /// carries no information and must not be relayed.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Option<String> {
        let source = source_lang.unwrap_or("auto");

        let result = match self.request(text, source, target_lang).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Translation to {} failed: {}", target_lang, e);
                return None;
            }
        };

        let translated = result.translated;
        if translated.trim().is_empty() {
            warn!("Provider returned empty translation to {}", target_lang);
            return None;
        }
        if translated.to_lowercase() == text.to_lowercase() {
            debug!("Translation to {} is identical to source, suppressing", target_lang);
            return None;
        }

        Some(translated)
    }

    async fn request(&self, text: &str, source: &str, target: &str) -> Result<ProviderResult> {
        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("Failed to send request to translation provider")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Translation provider error ({})", status);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse translation provider response")?;

        parse_provider_response(&body)
    }
}

/// Pull the translated text and detected language out of the provider's
/// positional JSON array. Shape: `[[["<seg>", "<orig>", ...], ...], _, "<lang>", ...]`.
fn parse_provider_response(body: &serde_json::Value) -> Result<ProviderResult> {
    let segments = body
        .get(0)
        .and_then(|v| v.as_array())
        .context("Provider response missing translation segments")?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(|v| v.as_str()) {
            translated.push_str(text);
        }
    }

    let detected_lang = body
        .get(2)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(ProviderResult {
        translated,
        detected_lang,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_translator(base_url: &str) -> Translator {
        let config = Config {
            telegram_bot_token: "test-token".to_string(),
            telegram_api_url: "http://unused.test".to_string(),
            translate_api_url: base_url.to_string(),
            database_url: None,
            poll_timeout_secs: 1,
            request_timeout_secs: 5,
            port: 8080,
        };
        Translator::new(&config).expect("Should build translator")
    }

    fn provider_body(translated: &str, original: &str, detected: &str) -> serde_json::Value {
        serde_json::json!([[[translated, original, null, null, 10]], null, detected])
    }

    // ==================== Response Parsing Tests ====================

    #[test]
    fn test_parse_provider_response_single_segment() {
        let body = provider_body("Hola amigo", "Hello friend", "en");
        let result = parse_provider_response(&body).expect("Should parse");
        assert_eq!(result.translated, "Hola amigo");
        assert_eq!(result.detected_lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_parse_provider_response_concatenates_segments() {
        let body = serde_json::json!([
            [["Hola. ", "Hello. ", null], ["¿Qué tal?", "How are you?", null]],
            null,
            "en"
        ]);
        let result = parse_provider_response(&body).expect("Should parse");
        assert_eq!(result.translated, "Hola. ¿Qué tal?");
    }

    #[test]
    fn test_parse_provider_response_missing_segments() {
        let body = serde_json::json!({"unexpected": "shape"});
        assert!(parse_provider_response(&body).is_err());
    }

    #[test]
    fn test_parse_provider_response_missing_detected_lang() {
        let body = serde_json::json!([[["Hola", "Hello", null]]]);
        let result = parse_provider_response(&body).expect("Should parse");
        assert_eq!(result.translated, "Hola");
        assert_eq!(result.detected_lang, None);
    }

    // ==================== Detection Tests ====================

    #[tokio::test]
    async fn test_detect_short_text_skips_provider() {
        // Point at an unroutable URL: if detect tries the network, the test
        // fails on the assertion rather than hanging
        let translator = test_translator("http://invalid-url-should-not-be-called.test");
        assert_eq!(translator.detect("hi!").await, None);
        assert_eq!(translator.detect("   a    ").await, None);
        assert_eq!(translator.detect("").await, None);
    }

    #[tokio::test]
    async fn test_detect_returns_provider_language() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "en"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(provider_body("Hello friend", "Hola amigo", "es")),
            )
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        assert_eq!(
            translator.detect("Hola amigo").await,
            Some("es".to_string())
        );
    }

    #[tokio::test]
    async fn test_detect_provider_error_yields_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        assert_eq!(translator.detect("Hello there, friend").await, None);
    }

    // ==================== Translation Tests ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "en"))
            .and(query_param("tl", "es"))
            .and(query_param("q", "Hello there, friend"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(provider_body("Hola, amigo", "Hello there, friend", "en")),
            )
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        let result = translator
            .translate("Hello there, friend", Some("en"), "es")
            .await;
        assert_eq!(result, Some("Hola, amigo".to_string()));
    }

    #[tokio::test]
    async fn test_translate_without_source_uses_auto() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "auto"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(provider_body("Hallo", "Hello", "en")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        let result = translator.translate("Hello", None, "de").await;
        assert_eq!(result, Some("Hallo".to_string()));
    }

    #[tokio::test]
    async fn test_translate_identity_result_suppressed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(provider_body("OK", "ok", "en")),
            )
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        // Case-insensitive compare: "OK" vs "ok" is still an identity
        assert_eq!(translator.translate("ok", Some("en"), "es").await, None);
    }

    #[tokio::test]
    async fn test_translate_provider_error_yields_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        assert_eq!(translator.translate("Hello", Some("en"), "es").await, None);
    }

    #[tokio::test]
    async fn test_translate_empty_result_yields_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(provider_body("  ", "Hello", "en")),
            )
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        assert_eq!(translator.translate("Hello", Some("en"), "es").await, None);
    }

    #[tokio::test]
    async fn test_translate_malformed_response_yields_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let translator = test_translator(&mock_server.uri());
        assert_eq!(translator.translate("Hello", Some("en"), "es").await, None);
    }
}
