use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;

use crate::config::ProviderConfig;
use crate::llm::config::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl,
};
use crate::llm::{build_http_client, check_response, read_json, LlmError, Result, VisionReasoner};

const PROVIDER: &str = "OpenAI";

const SOLVER_PROMPT: &str = "You are a professional student helper. Here I am sending a photo of the topic/problem. \
Please analyze the topic/problem and answer the question. It can be any topic (math, logics, biology, any topic) \
Be as informative as possible and follow this guidelines:
1. Start with a clear statement of what we're solving
2. Break down the solution into numbered steps
3. If it's math, Put each mathematical equation on a new line. If it's not - place paragraphs on new lines.
4. If it's math problem, use simple mathematical notation without escape characters
5. If it's math, for vectors, use arrow notation (→) directly without latex commands
6. If it's math, Write vector names simply (like M₁ instead of M_1)
7. Explain each step clearly
8. Show all explanations, calculations if it's math
9. End with a clear conclusion
10. Provide detailed theoretical material so that students can learn the topic. Be as useful as possible. \
Your descriptions must be simple and understandable.";

/// Solves the pictured problem through the chat completions endpoint.
pub struct VisionClient {
    client: Client,
    config: ProviderConfig,
}

impl VisionClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|e| {
                LlmError::Client {
                    provider: PROVIDER,
                    message: format!("invalid API key format: {e}"),
                }
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = build_http_client(PROVIDER, headers, config.timeout)?;
        Ok(Self { client, config })
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    fn build_request(&self, image: &[u8], question: &str) -> ChatCompletionRequest {
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(image));

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: format!("{SOLVER_PROMPT}\n\nQuestion: {question}"),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl VisionReasoner for VisionClient {
    async fn analyze(&self, image: &[u8], question: &str) -> Result<String> {
        let request = self.build_request(image, question);
        log::debug!(
            "📤 Sending {} byte image to {} model {}",
            image.len(),
            PROVIDER,
            request.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(PROVIDER, self.timeout(), e))?;

        let response = check_response(PROVIDER, response).await?;
        let body: ChatCompletionResponse = read_json(PROVIDER, self.timeout(), response).await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::upstream(PROVIDER, None, "response has no completion text"))
    }
}
