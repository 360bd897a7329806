use serde::{Deserialize, Serialize};

/// Placeholder replaced with the retrieved context
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Placeholder replaced with the user's prompt
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Template the retrieved context and the user prompt are rendered into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new("Context:\n{context}\n\nUser Prompt: {prompt}")
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render the final prompt
    ///
    /// An empty context still renders the surrounding frame.
    pub fn render(&self, context: &str, prompt: &str) -> String {
        // Substituted text is never rescanned for placeholders
        self.template
            .split(CONTEXT_PLACEHOLDER)
            .map(|segment| segment.replace(PROMPT_PLACEHOLDER, prompt))
            .collect::<Vec<_>>()
            .join(context)
    }
}
