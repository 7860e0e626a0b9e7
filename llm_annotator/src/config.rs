//! The YAML run configuration.
//!
//! Every key has a default, so a file only needs the values that differ. Unknown keys and
//! unknown enum values are rejected when the file is parsed. Relative dataset paths are
//! resolved against the directory holding the config file.

use crate::{
    dataset::FieldKeys,
    workflows::annotate::{AnnotationConfig, NonConvergencePolicy},
};
use llm_interface::{
    llms::{LlmApiConfigTrait, LlmBackend},
    requests::RequestConfigTrait,
    LlmInterface, LoggingConfig,
};
use llm_prompt::PromptConfig;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("configuration error: the value of section \"{section}\" and option \"{option}\" is not valid: {reason}")]
    Invalid {
        section: &'static str,
        option: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatorConfig {
    pub general: GeneralSection,
    pub dataset: DatasetSection,
    pub prompt: PromptSection,
    pub backend: BackendSection,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralSection {
    /// Log prompts and replies. Never changes what is annotated.
    pub debug: bool,
    pub log_dir: PathBuf,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            debug: false,
            log_dir: PathBuf::from("llm_logs"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetSection {
    pub metadata_json: PathBuf,
    pub targets_json: PathBuf,
    pub annotated_json: PathBuf,
    pub document_index: String,
    pub annotation_index: String,
    pub has_evaluation_data: bool,
    pub evaluation_data_index: String,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            metadata_json: PathBuf::from("data/metadata.json"),
            targets_json: PathBuf::from("data/targets.json"),
            annotated_json: PathBuf::from("data/annotated_metadata.json"),
            document_index: "abstract".to_owned(),
            annotation_index: "annotated_subjects".to_owned(),
            has_evaluation_data: false,
            evaluation_data_index: "subjects".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromptSection {
    pub document_name: String,
    pub target_name: String,
    pub num_targets: usize,
    pub targets_per_prompt: usize,
    pub prompts_per_chat: usize,
    pub max_iterations: usize,
    pub non_convergence: NonConvergencePolicy,
    pub detect_cycles: bool,
}

impl Default for PromptSection {
    fn default() -> Self {
        let prompt = PromptConfig::default();
        let annotation = AnnotationConfig::default();
        Self {
            document_name: prompt.document_name,
            target_name: prompt.target_name,
            num_targets: prompt.num_targets,
            targets_per_prompt: prompt.targets_per_prompt,
            prompts_per_chat: prompt.prompts_per_chat,
            max_iterations: annotation.max_iterations,
            non_convergence: annotation.non_convergence,
            detect_cycles: annotation.detect_cycles,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    OpenaiCompatible,
    Ollama,
    /// Canned `replies`, one per chat. For dry runs of a configuration.
    Scripted,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendSection {
    pub kind: BackendKind,
    /// Server base URL. The backend's default when unset.
    pub host: Option<String>,
    pub model: Option<String>,
    pub api_key_env_var: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub replies: Vec<String>,
}

impl BackendSection {
    pub fn init(&self) -> crate::Result<Arc<LlmBackend>> {
        match self.kind {
            BackendKind::OpenaiCompatible => self.configure(LlmInterface::openai_compatible()).init(),
            BackendKind::Ollama => self.configure(LlmInterface::ollama()).init(),
            BackendKind::Scripted => LlmInterface::scripted()
                .replies(self.replies.iter().cloned())
                .init(),
        }
    }

    fn configure<B: LlmApiConfigTrait + RequestConfigTrait>(&self, mut builder: B) -> B {
        if let Some(host) = &self.host {
            builder = builder.with_api_host(host);
        }
        if let Some(api_key_env_var) = &self.api_key_env_var {
            builder = builder.with_api_key_env_var(api_key_env_var);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            builder = builder.with_timeout_secs(timeout_secs);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model.as_str());
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        builder
    }
}

impl AnnotatorConfig {
    /// Reads, parses and validates `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let config = Self::parse(&yaml, base_dir)?;
        crate::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse<P: Into<PathBuf>>(yaml: &str, base_dir: P) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    /// Positive-integer checks for every bounding value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (option, value) in [
            ("num_targets", self.prompt.num_targets),
            ("targets_per_prompt", self.prompt.targets_per_prompt),
            ("prompts_per_chat", self.prompt.prompts_per_chat),
            ("max_iterations", self.prompt.max_iterations),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    section: "prompt",
                    option,
                    reason: "possible values are an integer > 0".to_owned(),
                });
            }
        }
        if self.backend.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                section: "backend",
                option: "timeout_secs",
                reason: "possible values are an integer > 0".to_owned(),
            });
        }
        if self.backend.kind == BackendKind::Scripted && self.backend.replies.is_empty() {
            return Err(ConfigError::Invalid {
                section: "backend",
                option: "replies",
                reason: "the scripted backend needs at least one reply".to_owned(),
            });
        }
        Ok(())
    }

    pub fn resolve_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.resolve_path(&self.dataset.metadata_json)
    }

    pub fn targets_path(&self) -> PathBuf {
        self.resolve_path(&self.dataset.targets_json)
    }

    pub fn annotated_path(&self) -> PathBuf {
        self.resolve_path(&self.dataset.annotated_json)
    }

    pub fn field_keys(&self) -> FieldKeys {
        FieldKeys {
            document: self.dataset.document_index.clone(),
            annotation: self.dataset.annotation_index.clone(),
            evaluation_data: self
                .dataset
                .has_evaluation_data
                .then(|| self.dataset.evaluation_data_index.clone()),
        }
    }

    pub fn annotation_config(&self) -> AnnotationConfig {
        let prompt = &self.prompt;
        AnnotationConfig {
            prompt: PromptConfig {
                document_name: prompt.document_name.clone(),
                target_name: prompt.target_name.clone(),
                num_targets: prompt.num_targets,
                targets_per_prompt: prompt.targets_per_prompt,
                prompts_per_chat: prompt.prompts_per_chat,
            },
            max_iterations: prompt.max_iterations,
            non_convergence: prompt.non_convergence,
            detect_cycles: prompt.detect_cycles,
        }
    }

    /// `debug` overrides `general.debug`.
    pub fn logging_config(&self, debug: bool) -> LoggingConfig {
        let level = if debug || self.general.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        LoggingConfig::new()
            .log_level(level)
            .log_dir(self.resolve_path(&self.general.log_dir))
    }
}
