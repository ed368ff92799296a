//! Answer generation capability and its OpenAI implementation.

use crate::error::{Result, SpolError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// System prompt demanding grounded, cited answers.
const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions \
based on video content. Always cite timestamps from the video to support your \
answers, as seconds followed by 's' (for example 12.5s).";

/// Trait for free-text answer generation.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer to `question` using only `context`.
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}

/// OpenAI chat-completion answer generator.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIGenerator {
    /// Create a generator for the given chat model.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }

    fn user_prompt(question: &str, context: &str) -> String {
        format!(
            "Based on the following video content, answer the question \
             comprehensively. Always cite the specific timestamps where the \
             information comes from.\n\nVideo Content:\n{}\n\nQuestion: {}\n\nAnswer:",
            context, question
        )
    }
}

#[async_trait]
impl AnswerGenerator for OpenAIGenerator {
    #[instrument(skip(self, context), fields(question = %question))]
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| SpolError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::user_prompt(question, context))
                .build()
                .map_err(|e| SpolError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.1)
            .build()
            .map_err(|e| SpolError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SpolError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SpolError::Generation("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated answer of {} chars", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_carries_context_and_question() {
        let prompt = OpenAIGenerator::user_prompt("What is covered?", "[Segment 1]: intro");
        assert!(prompt.contains("[Segment 1]: intro"));
        assert!(prompt.contains("Question: What is covered?"));
    }
}
