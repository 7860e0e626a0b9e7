use crate::{
    templates, ChatPromptList, PromptChunk, PromptConfig, PromptError,
};
use llm_utils::chunk;
use minijinja::{context, Environment};

/// Turns a document and a target sub-vocabulary into the conversations that ask the model
/// to annotate it. The templates are compiled once on construction.
pub struct PromptBuilder {
    config: PromptConfig,
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Result<Self, PromptError> {
        config.validate()?;
        Ok(Self {
            config,
            env: templates::environment()?,
        })
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    /// Splits `targets` into groups of `targets_per_prompt * prompts_per_chat` and builds one
    /// [`ChatPromptList`] per group. Together the lists cover every target exactly once.
    /// No targets means no conversations.
    pub fn build_chat_prompt_lists(
        &self,
        document: &str,
        targets: &[String],
    ) -> Result<Vec<ChatPromptList>, PromptError> {
        let groups = chunk(targets, self.config.targets_per_chat())?;
        crate::trace!(
            "Building {} chat prompt lists for {} targets",
            groups.len(),
            targets.len()
        );
        groups
            .into_iter()
            .map(|group| self.build_chat_prompt_list(document, &group))
            .collect()
    }

    /// Builds the prompts for a single conversation. `targets` should fit in one chat; it is
    /// chunked by `targets_per_prompt` but not capped.
    pub fn build_chat_prompt_list(
        &self,
        document: &str,
        targets: &[String],
    ) -> Result<ChatPromptList, PromptError> {
        if targets.is_empty() {
            return Err(PromptError::EmptyTargets);
        }
        let chunks: Vec<PromptChunk> = chunk(targets, self.config.targets_per_prompt)?
            .into_iter()
            .map(PromptChunk::new)
            .collect();

        let mut prompts = Vec::with_capacity(chunks.len() + 2);
        prompts.push(self.render(
            templates::SCENE,
            context! { target_name => &self.config.target_name },
        )?);
        for (i, prompt_chunk) in chunks.iter().enumerate() {
            let template = if i == 0 {
                templates::FIRST_CHUNK
            } else {
                templates::ADDITIONAL_CHUNK
            };
            prompts.push(self.render(
                template,
                context! {
                    target_name => &self.config.target_name,
                    labels => prompt_chunk.labels(),
                },
            )?);
        }
        prompts.push(self.render(
            templates::ANNOTATE,
            context! {
                document_name => &self.config.document_name,
                target_name => &self.config.target_name,
                num_targets => self.config.num_targets,
                document => document,
            },
        )?);

        Ok(ChatPromptList {
            targets: targets.to_vec(),
            chunks,
            prompts,
        })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, PromptError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}
