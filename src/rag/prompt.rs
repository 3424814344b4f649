//! Generation prompt assembly.
//!
//! A prompt is the intent's instruction block, a framing sentence naming the
//! assistant's persona, the retrieved context between `---` rules, the user's
//! question, and an answer cue.

use crate::intents::IntentTable;
use crate::rag::retriever::QueryContext;
use std::sync::Arc;

pub const DEFAULT_PERSONA: &str = "Ocean Bank";

/// A prompt ready for generation, with the intent that shaped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub intent: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PromptAssembler {
    intents: Arc<IntentTable>,
    persona: String,
}

impl PromptAssembler {
    pub fn new(intents: Arc<IntentTable>, persona: impl Into<String>) -> Self {
        Self {
            intents,
            persona: persona.into(),
        }
    }

    pub fn intents(&self) -> &IntentTable {
        &self.intents
    }

    /// Classify the question and build its prompt.
    pub fn assemble(&self, question: &str, context: &QueryContext) -> Prompt {
        let intent = self.intents.detect_intent(question);
        let text = self.render(self.intents.get_intent_prompt(intent), question, context);

        Prompt {
            intent: intent.to_string(),
            text,
        }
    }

    pub fn build_prompt(&self, question: &str, context: &QueryContext) -> String {
        self.assemble(question, context).text
    }

    fn render(&self, instructions: &str, question: &str, context: &QueryContext) -> String {
        format!(
            "{instructions}\n\n\
             Here is some context that might be relevant to the user's question. \
             Use it to provide a detailed and accurate answer. \
             If the context is not relevant, rely on your general knowledge but always \
             maintain the persona of an {persona} assistant.\n\n\
             **Context:**\n---\n{context}\n---\n\n\
             **User Question:** {question}\n\n\
             **Answer:**\n",
            persona = self.persona,
            context = context.render(),
        )
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(Arc::new(IntentTable::banking()), DEFAULT_PERSONA)
    }
}
