use maitred_core::domain::conversation::{ConversationId, MessageRole, Turn};
use maitred_core::domain::payment::PaymentExtraction;

use crate::extract::extract_payment;
use crate::handlers::{general_reply, payment_reply, recipe_reply};
use crate::intent::{classify, TaskKind};
use crate::llm::{GenerationError, LlmClient};

/// Returned when the pipeline reaches finalization with nothing to
/// say. Never an error: the caller always gets a reply.
pub const FALLBACK_REPLY: &str = "Sorry, I was unable to process your request.";

/// Progress marker for one invocation. Transitions are unconditional
/// and single-hop; there is no loop and no re-classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    Classified,
    Dispatched,
    Finalized,
    Done,
}

/// Ephemeral per-invocation state: rebuilt from persisted history plus
/// the new user turn, mutated in memory, discarded once the reply is
/// handed back. `current_task` is assigned exactly once.
#[derive(Debug)]
pub struct ConversationState {
    pub conversation_id: ConversationId,
    pub user_id: Option<String>,
    pub restaurant_id: Option<String>,
    pub turns: Vec<Turn>,
    pub current_task: Option<TaskKind>,
    pub payment_context: Option<PaymentExtraction>,
    pub next_action: Option<&'static str>,
    stage: PipelineStage,
}

impl ConversationState {
    pub fn new(
        conversation_id: ConversationId,
        user_id: Option<String>,
        restaurant_id: Option<String>,
        turns: Vec<Turn>,
    ) -> Self {
        Self {
            conversation_id,
            user_id,
            restaurant_id,
            turns,
            current_task: None,
            payment_context: None,
            next_action: None,
            stage: PipelineStage::Start,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == MessageRole::User)
            .map(|turn| turn.content.as_str())
    }

    fn last_assistant_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == MessageRole::Assistant)
            .map(|turn| turn.content.as_str())
    }
}

/// Single-pass dispatch: classify, run exactly one handler, finalize.
pub struct Pipeline<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> Pipeline<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Run one invocation to completion and return the reply text.
    ///
    /// The only suspension point is the collaborator call inside the
    /// recipe and general branches; classification and extraction are
    /// pure. A generation failure is propagated without retry.
    pub async fn run(&self, state: &mut ConversationState) -> Result<String, GenerationError> {
        self.classify_stage(state);
        self.dispatch_stage(state).await?;
        Ok(self.finalize_stage(state))
    }

    fn classify_stage(&self, state: &mut ConversationState) {
        let task = match state.last_user_text() {
            Some(text) => classify(text),
            None => TaskKind::General,
        };
        state.current_task = Some(task);
        state.next_action = Some(match task {
            TaskKind::Payment => "handle_payment",
            TaskKind::Recipe => "handle_recipe",
            TaskKind::General => "handle_general",
        });
        state.stage = PipelineStage::Classified;
    }

    async fn dispatch_stage(
        &self,
        state: &mut ConversationState,
    ) -> Result<(), GenerationError> {
        // No utterance to respond to: fall through and let finalization
        // produce the fallback reply.
        let Some(user_text) = state.last_user_text().map(str::to_owned) else {
            state.stage = PipelineStage::Dispatched;
            return Ok(());
        };

        let reply = match state.current_task.unwrap_or(TaskKind::General) {
            TaskKind::Payment => {
                let extraction = extract_payment(&user_text);
                let reply = payment_reply(&extraction);
                state.payment_context = Some(extraction);
                reply
            }
            TaskKind::Recipe => recipe_reply(self.llm, &user_text).await?,
            TaskKind::General => general_reply(self.llm, &user_text).await?,
        };

        state.turns.push(Turn::new(MessageRole::Assistant, reply));
        state.stage = PipelineStage::Dispatched;
        Ok(())
    }

    fn finalize_stage(&self, state: &mut ConversationState) -> String {
        state.stage = PipelineStage::Finalized;
        let reply = state
            .last_assistant_text()
            .map(str::to_owned)
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());
        state.stage = PipelineStage::Done;
        reply
    }
}
