use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;

use crate::config::ProviderConfig;
use crate::llm::config::{MessagesRequest, MessagesResponse, PromptMessage};
use crate::llm::{build_http_client, check_response, read_json, LlmError, Result, Translator};

const PROVIDER: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";

const TRANSLATION_PROMPT: &str = "Please translate this mathematical solution to Georgian, maintaining the following:
1. Keep all mathematical formulas, symbols, and numbers exactly as they are
2. Keep all vector notations (→) unchanged
3. Preserve line breaks, especially for equations
4. Keep step numbers and formatting intact
5. Translate only the explanatory text
6. Preserve all mathematical notation exactly as shown

Text to translate:";

/// Translates finished solutions into Georgian through the messages endpoint.
pub struct TranslationClient {
    client: Client,
    config: ProviderConfig,
}

impl TranslationClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&config.api_key).map_err(|e| LlmError::Client {
                provider: PROVIDER,
                message: format!("invalid API key format: {e}"),
            })?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));

        let client = build_http_client(PROVIDER, headers, config.timeout)?;
        Ok(Self { client, config })
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, text: &str) -> Result<String> {
        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: format!("{TRANSLATION_PROMPT}\n{text}"),
            }],
        };
        log::debug!(
            "📤 Sending {} chars to {} model {} for translation",
            text.chars().count(),
            PROVIDER,
            request.model
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(PROVIDER, self.timeout(), e))?;

        let response = check_response(PROVIDER, response).await?;
        let body: MessagesResponse = read_json(PROVIDER, self.timeout(), response).await?;

        body.content
            .into_iter()
            .next()
            .filter(|block| block.type_ == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| LlmError::upstream(PROVIDER, None, "response has no text content block"))
    }
}
