use super::{ApiClient, ApiConfig, ApiConfigTrait, LlmApiConfigTrait};
use crate::{
    llms::{LlmBackend, SessionSlot},
    requests::{ChatMessage, CompletionError, RequestConfig, RequestConfigTrait},
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// A server speaking the OpenAI chat completions API. llama.cpp server, vLLM and OpenAI
/// itself all qualify.
pub struct OpenAiCompatibleBackend {
    pub(crate) client: ApiClient<OpenAiCompatibleConfig>,
    pub(crate) session_slot: SessionSlot,
}

impl OpenAiCompatibleBackend {
    pub fn new(mut config: OpenAiCompatibleConfig) -> crate::Result<Self> {
        config.api_config.validate_host()?;
        config.api_config.load_api_key()?;
        Ok(Self {
            client: ApiClient::new(config)?,
            session_slot: SessionSlot::default(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.client.config.request_config.model
    }

    pub(crate) async fn chat_request(
        &self,
        messages: &[ChatMessage],
    ) -> crate::Result<String, CompletionError> {
        let request_config = &self.client.config.request_config;
        let request = OpenAiChatRequest {
            model: &request_config.model,
            messages,
            temperature: request_config.temperature,
            max_tokens: request_config.max_tokens,
        };
        let response: OpenAiChatResponse = self
            .client
            .post(&self.client.config.completion_path, request)
            .await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::ReponseContentEmpty)
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiCompatibleConfig {
    pub api_config: ApiConfig,
    pub request_config: RequestConfig,
    pub completion_path: String,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            api_config: ApiConfig::new("http://localhost:8080/v1"),
            request_config: RequestConfig::new("default"),
            completion_path: "/chat/completions".to_string(),
        }
    }
}

impl OpenAiCompatibleConfig {
    pub fn completion_path<S: Into<String>>(mut self, path: S) -> Self {
        self.completion_path = path.into();
        self
    }
}

impl ApiConfigTrait for OpenAiCompatibleConfig {
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_config.api_key {
            if let Ok(header_value) =
                HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            {
                headers.insert(AUTHORIZATION, header_value);
            } else {
                crate::error!("Failed to create header value from authorization value");
            }
        }
        headers
    }

    fn url(&self, path: &str) -> String {
        self.api_config.url(path)
    }

    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.api_config.timeout_secs)
    }
}

#[derive(Serialize, Debug)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize, Debug)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Default)]
pub struct OpenAiCompatibleBackendBuilder {
    pub config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleBackendBuilder {
    pub fn init(self) -> crate::Result<std::sync::Arc<LlmBackend>> {
        Ok(std::sync::Arc::new(LlmBackend::OpenAiCompatible(
            OpenAiCompatibleBackend::new(self.config)?,
        )))
    }
}

impl LlmApiConfigTrait for OpenAiCompatibleBackendBuilder {
    fn api_base_config_mut(&mut self) -> &mut ApiConfig {
        &mut self.config.api_config
    }

    fn api_config(&self) -> &ApiConfig {
        &self.config.api_config
    }
}

impl RequestConfigTrait for OpenAiCompatibleBackendBuilder {
    fn request_config_mut(&mut self) -> &mut RequestConfig {
        &mut self.config.request_config
    }
}
