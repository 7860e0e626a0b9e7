use super::{ApiClient, ApiConfig, ApiConfigTrait, LlmApiConfigTrait};
use crate::{
    llms::{LlmBackend, SessionSlot},
    requests::{ChatMessage, CompletionError, RequestConfig, RequestConfigTrait},
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

pub struct OllamaBackend {
    pub(crate) client: ApiClient<OllamaConfig>,
    pub(crate) session_slot: SessionSlot,
}

impl OllamaBackend {
    pub fn new(mut config: OllamaConfig) -> crate::Result<Self> {
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
        let request = OllamaChatRequest {
            model: &request_config.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: request_config.temperature,
                num_predict: request_config.max_tokens,
            },
        };
        let response: OllamaChatResponse = self.client.post("/api/chat", request).await?;
        response
            .message
            .map(|message| message.content)
            .ok_or(CompletionError::ReponseContentEmpty)
    }
}

#[derive(Clone, Debug)]
pub struct OllamaConfig {
    pub api_config: ApiConfig,
    pub request_config: RequestConfig,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            api_config: ApiConfig::new("http://localhost:11434"),
            request_config: RequestConfig::new("llama3.1"),
        }
    }
}

impl ApiConfigTrait for OllamaConfig {
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        // Plain Ollama ignores it; authenticating proxies in front of it do not.
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
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize, Debug)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: Option<OllamaResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Default)]
pub struct OllamaBackendBuilder {
    pub config: OllamaConfig,
}

impl OllamaBackendBuilder {
    pub fn init(self) -> crate::Result<std::sync::Arc<LlmBackend>> {
        Ok(std::sync::Arc::new(LlmBackend::Ollama(OllamaBackend::new(
            self.config,
        )?)))
    }
}

impl LlmApiConfigTrait for OllamaBackendBuilder {
    fn api_base_config_mut(&mut self) -> &mut ApiConfig {
        &mut self.config.api_config
    }

    fn api_config(&self) -> &ApiConfig {
        &self.config.api_config
    }
}

impl RequestConfigTrait for OllamaBackendBuilder {
    fn request_config_mut(&mut self) -> &mut RequestConfig {
        &mut self.config.request_config
    }
}
