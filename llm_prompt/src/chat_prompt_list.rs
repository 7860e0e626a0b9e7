use llm_utils::join_targets;

/// An ordered group of at most `targets_per_prompt` targets, delivered in one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptChunk {
    pub targets: Vec<String>,
}

impl PromptChunk {
    pub fn new(targets: Vec<String>) -> Self {
        Self { targets }
    }

    /// The comma separated line embedded in the prompt.
    pub fn labels(&self) -> String {
        join_targets(&self.targets)
    }
}

/// The prompts of one conversation with the model.
///
/// `prompts[0]` sets the scene, `prompts[1..=chunks.len()]` add one chunk each, and the
/// last prompt asks for the annotation. Only the reply to the last prompt is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPromptList {
    /// Every target referenced by this conversation, in order.
    pub targets: Vec<String>,
    pub chunks: Vec<PromptChunk>,
    pub prompts: Vec<String>,
}

impl ChatPromptList {
    pub fn scene_prompt(&self) -> &str {
        &self.prompts[0]
    }

    pub fn chunk_prompts(&self) -> &[String] {
        &self.prompts[1..self.prompts.len() - 1]
    }

    pub fn final_prompt(&self) -> &str {
        &self.prompts[self.prompts.len() - 1]
    }
}

impl std::fmt::Display for ChatPromptList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "ChatPromptList: {} targets in {} chunks",
            self.targets.len(),
            self.chunks.len()
        )?;
        for (i, prompt) in self.prompts.iter().enumerate() {
            writeln!(f, "    \x1b[1mPrompt {}\x1b[0m: {:?}", i + 1, prompt)?;
        }
        Ok(())
    }
}
