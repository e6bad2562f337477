//! The Nova request pipeline.
//!
//! Every learner message goes through the same steps:
//!
//! 1. **Classify** the message into intent flags ([`intent`])
//! 2. **Invoke** the helpers those flags call for ([`invoker`])
//! 3. **Compose** one prompt from subject, history, and helper output ([`prompt`])
//! 4. **Generate** a reply through the retrying model client
//! 5. **Persist** the exchange ([`memory`])
//!
//! [`KnowledgeBot`] ties the steps together for one session.

pub mod bot;
pub mod intent;
pub mod invoker;
pub mod memory;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use bot::{rate_limit_message, BotDeps, BotSettings, ChatOutcome, ChatReply, KnowledgeBot};
pub use intent::{classify, extract_expression, Intents, PromptTemplate};
pub use invoker::{InvokerLimits, ToolInvoker, ToolKind, ToolReport};
pub use memory::ConversationMemory;
pub use prompt::{PromptComposer, PromptInput};
