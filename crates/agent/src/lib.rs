//! Agent runtime - intent routing and response generation
//!
//! This crate is the "brain" of the maitred system - the pipeline that
//! turns one guest utterance into one assistant reply:
//! - Classifies the utterance into a task (`intent`)
//! - Extracts structured payment fields from free text (`extract`)
//! - Produces the reply, either from a fixed template or by delegating
//!   to the language model (`handlers`)
//! - Drives the single-pass dispatch and persistence ordering
//!   (`pipeline`, `runtime`)
//!
//! # Architecture
//!
//! One invocation is a straight line:
//! 1. **Classification** (`intent`) - keyword routing, total and
//!    deterministic, no error path
//! 2. **Dispatch** (`pipeline`) - exactly one of the payment, recipe,
//!    or general handlers runs
//! 3. **Finalization** (`pipeline`) - the last assistant turn is the
//!    reply; an empty turn list yields the fixed fallback
//!
//! # Safety principle
//!
//! The language model never decides payment amounts, methods, or table
//! assignments. Those come from deterministic extraction; the model
//! only writes prose for recipe and general conversation.

pub mod extract;
pub mod handlers;
pub mod intent;
pub mod llm;
pub mod pipeline;
pub mod runtime;

pub use intent::{classify, TaskKind};
pub use llm::{GenerationError, LlmClient, OpenAiChatClient};
pub use pipeline::{ConversationState, Pipeline, PipelineStage};
pub use runtime::{AgentError, AgentRuntime};
