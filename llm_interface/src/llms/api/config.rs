use reqwest::header::HeaderMap;
use secrecy::Secret;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL of the server, e.g. `http://localhost:8080/v1`. Request paths are appended.
    pub host: String,
    pub api_key: Option<Secret<String>>,
    /// Environment variable (or `.env` entry) holding the API key. Local servers need none.
    pub api_key_env_var: Option<String>,
    /// Per-request timeout. Local models can take minutes on a long conversation.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub(crate) fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            api_key_env_var: None,
            timeout_secs: 300,
        }
    }

    pub(crate) fn validate_host(&self) -> crate::Result<()> {
        let url = url::Url::parse(&self.host)
            .map_err(|e| crate::anyhow!("Invalid api host {:?}: {e}", self.host))?;
        if !matches!(url.scheme(), "http" | "https") {
            crate::bail!("Invalid api host {:?}: scheme must be http or https", self.host);
        }
        Ok(())
    }

    pub(crate) fn load_api_key(&mut self) -> crate::Result<()> {
        if self.api_key.is_some() {
            crate::trace!("Using api_key from parameter");
            return Ok(());
        }
        let Some(api_key_env_var) = &self.api_key_env_var else {
            crate::trace!("No api_key or api_key_env_var set. Sending requests without a key");
            return Ok(());
        };
        crate::trace!("api_key not set. Attempting to load from .env");
        dotenvy::dotenv().ok();

        match dotenvy::var(api_key_env_var) {
            Ok(api_key) => {
                crate::trace!("Successfully loaded api_key from .env");
                self.api_key = Some(api_key.into());
                Ok(())
            }
            Err(_) => {
                crate::trace!(
                    "{} not found in dotenv, nor was it set manually",
                    api_key_env_var
                );
                crate::bail!("Failed to load api_key from parameter or {api_key_env_var}")
            }
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), path)
    }
}

pub trait LlmApiConfigTrait {
    fn api_base_config_mut(&mut self) -> &mut ApiConfig;

    fn api_config(&self) -> &ApiConfig;

    fn with_api_host<S: AsRef<str>>(mut self, host: S) -> Self
    where
        Self: Sized,
    {
        self.api_base_config_mut().host = host.as_ref().to_string();
        self
    }

    fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self
    where
        Self: Sized,
    {
        self.api_base_config_mut().api_key = Some(Secret::from(api_key.into()));
        self
    }

    /// Set the environment variable name for the API key. Default is none.
    fn with_api_key_env_var<S: Into<String>>(mut self, api_key_env_var: S) -> Self
    where
        Self: Sized,
    {
        self.api_base_config_mut().api_key_env_var = Some(api_key_env_var.into());
        self
    }

    fn with_timeout_secs(mut self, timeout_secs: u64) -> Self
    where
        Self: Sized,
    {
        self.api_base_config_mut().timeout_secs = timeout_secs;
        self
    }
}

pub(crate) trait ApiConfigTrait {
    fn headers(&self) -> HeaderMap;

    fn url(&self, path: &str) -> String;

    fn timeout(&self) -> std::time::Duration;
}
