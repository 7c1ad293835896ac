//! Question/answer sessions over one chat.
//!
//! A [`Conversation`] is plain data owned by the caller: nothing is global,
//! and two conversations over the same chat never share state.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts::{SYSTEM_RAG_REFINED, build_request};
use super::{ChatMessage, DEFAULT_TEMPERATURE, Generator};
use crate::error::Result;
use crate::retrieval::Retriever;

/// One entry of the conversation history.
pub type Turn = ChatMessage;

/// How generation of an answer ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The backend finished the answer.
    Completed,
    /// The fragment callback asked to stop.
    Cancelled,
    /// The stream broke after producing some text.
    Failed(String),
}

/// The text produced for one question. On cancellation or failure `text`
/// holds what was received up to that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub outcome: Outcome,
}

impl Answer {
    /// Returns `true` if the backend finished the answer.
    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

/// Ordered history of questions and answers for one chat.
#[derive(Debug, Clone)]
pub struct Conversation {
    model: String,
    temperature: f32,
    system_prompt: String,
    history: Vec<Turn>,
}

impl Conversation {
    /// Starts an empty conversation answered by `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: SYSTEM_RAG_REFINED.to_string(),
            history: Vec::new(),
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replaces the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Model answering the questions.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switches the model for later questions. History is kept.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Questions and answers so far, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Forgets every turn.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Answers `question` from the `k` most relevant chunks.
    ///
    /// Each fragment is passed to `on_fragment` as it arrives; returning
    /// [`ControlFlow::Break`] stops generation. The question and whatever
    /// answer text was produced are appended to the history.
    ///
    /// # Errors
    ///
    /// Retrieval errors, and generation errors that happen before any text
    /// was produced, are returned as `Err` and leave the history unchanged.
    pub fn ask<F>(
        &mut self,
        retriever: &mut Retriever,
        generator: &dyn Generator,
        question: &str,
        k: usize,
        mut on_fragment: F,
    ) -> Result<Answer>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let context = retriever.retrieve_context(question, k)?;
        let request = build_request(
            &self.model,
            self.temperature,
            &self.system_prompt,
            &context,
            question,
        );
        debug!(model = %self.model, context_len = context.len(), "generating answer");

        let mut text = String::new();
        let mut outcome = Outcome::Completed;

        for fragment in generator.generate(&request)? {
            match fragment {
                Ok(fragment) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    text.push_str(&fragment);
                    if on_fragment(&fragment).is_break() {
                        debug!("generation cancelled");
                        outcome = Outcome::Cancelled;
                        break;
                    }
                }
                Err(err) if text.is_empty() => return Err(err),
                Err(err) => {
                    warn!(error = %err, "generation failed mid-answer");
                    outcome = Outcome::Failed(err.to_string());
                    break;
                }
            }
        }

        self.history.push(Turn::user(question));
        self.history.push(Turn::assistant(text.clone()));
        Ok(Answer { text, outcome })
    }
}
