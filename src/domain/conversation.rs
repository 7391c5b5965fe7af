//! Per-turn conversation state and the turn phase machine.
//!
//! One [`ConversationState`] exists per in-flight request. The phase machine
//! bounds the router's legal transitions:
//!
//! ```text
//! ReceivedMessage -> Classified -> Dispatched -> Completed
//!                        \-> EscalatedToHuman
//! any step -> Failed
//! ```
//!
//! `EscalatedToHuman` and `Failed` are absorbing.

use super::stage::Stage;

/// Phase of one router pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    ReceivedMessage,
    Classified,
    Dispatched,
    Completed,
    EscalatedToHuman,
    Failed,
}

impl TurnPhase {
    /// Whether moving to `next` is a legal transition.
    pub fn can_transition(self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        match (self, next) {
            (ReceivedMessage, Classified) => true,
            (Classified, Dispatched) => true,
            (Classified, EscalatedToHuman) => true,
            (Dispatched, Completed) => true,
            (Dispatched, EscalatedToHuman) => true,
            (ReceivedMessage | Classified | Dispatched, Failed) => true,
            _ => false,
        }
    }

    /// True for states that end the turn.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TurnPhase::Completed | TurnPhase::EscalatedToHuman | TurnPhase::Failed
        )
    }
}

/// Ephemeral state for one in-flight turn.
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Opaque conversation identifier.
    pub chat_id: String,
    /// Current inbound text.
    pub message: String,
    /// Continuation token entering this turn, threaded through
    /// classification into the handler call.
    pub previous_response_id: Option<String>,
    /// Stage the turn resolved to; set when classified. Always a member of
    /// the closed vocabulary; an unknown stage cannot be represented.
    pub current_stage: Option<Stage>,
    /// Outbound text, set when the turn reaches a terminal phase.
    pub reply: Option<String>,
    /// Name of the handler that produced the reply (diagnostic).
    pub handled_by: Option<String>,
    phase: TurnPhase,
}

impl ConversationState {
    pub fn new(
        chat_id: impl Into<String>,
        message: impl Into<String>,
        previous_response_id: Option<String>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            message: message.into(),
            previous_response_id,
            current_stage: None,
            reply: None,
            handled_by: None,
            phase: TurnPhase::ReceivedMessage,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// `stage` is `None` only when classification itself escalated; every
    /// dispatch requires a concrete stage.
    pub fn mark_classified(&mut self, stage: Option<Stage>, threaded_token: Option<String>) {
        self.advance(TurnPhase::Classified);
        self.current_stage = stage;
        // Classification may have advanced the continuation token; the
        // handler must see the newest one.
        if threaded_token.is_some() {
            self.previous_response_id = threaded_token;
        }
    }

    pub fn mark_dispatched(&mut self) {
        debug_assert!(self.current_stage.is_some(), "dispatch requires a resolved stage");
        self.advance(TurnPhase::Dispatched);
    }

    pub fn mark_completed(&mut self, reply: impl Into<String>, handled_by: impl Into<String>) {
        self.advance(TurnPhase::Completed);
        self.reply = Some(reply.into());
        self.handled_by = Some(handled_by.into());
    }

    pub fn mark_escalated(&mut self, reply: impl Into<String>, handled_by: impl Into<String>) {
        self.advance(TurnPhase::EscalatedToHuman);
        self.reply = Some(reply.into());
        self.handled_by = Some(handled_by.into());
    }

    pub fn mark_failed(&mut self, reply: impl Into<String>) {
        self.advance(TurnPhase::Failed);
        self.reply = Some(reply.into());
    }

    fn advance(&mut self, next: TurnPhase) {
        debug_assert!(
            self.phase.can_transition(next),
            "illegal turn transition {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        use TurnPhase::*;
        assert!(ReceivedMessage.can_transition(Classified));
        assert!(Classified.can_transition(Dispatched));
        assert!(Dispatched.can_transition(Completed));
    }

    #[test]
    fn escalation_is_reachable_from_classified_and_dispatched() {
        use TurnPhase::*;
        assert!(Classified.can_transition(EscalatedToHuman));
        assert!(Dispatched.can_transition(EscalatedToHuman));
        assert!(!ReceivedMessage.can_transition(EscalatedToHuman));
    }

    #[test]
    fn terminal_states_absorb() {
        use TurnPhase::*;
        for terminal in [Completed, EscalatedToHuman, Failed] {
            assert!(terminal.is_terminal());
            for next in [ReceivedMessage, Classified, Dispatched, Completed, Failed] {
                assert!(!terminal.can_transition(next));
            }
        }
    }

    #[test]
    fn skipping_classification_is_illegal() {
        use TurnPhase::*;
        assert!(!ReceivedMessage.can_transition(Dispatched));
        assert!(!ReceivedMessage.can_transition(Completed));
        assert!(!Classified.can_transition(Completed));
    }

    #[test]
    fn classification_threads_the_advanced_token() {
        let mut state = ConversationState::new("chat-1", "hello", Some("R0".into()));
        state.mark_classified(Some(Stage::Greeting), Some("R0b".into()));

        assert_eq!(state.previous_response_id.as_deref(), Some("R0b"));
        assert_eq!(state.current_stage, Some(Stage::Greeting));
    }

    #[test]
    fn classification_without_token_advance_keeps_the_old_token() {
        let mut state = ConversationState::new("chat-1", "hello", Some("R0".into()));
        state.mark_classified(Some(Stage::Greeting), None);

        assert_eq!(state.previous_response_id.as_deref(), Some("R0"));
    }

    #[test]
    fn completed_turn_carries_reply_and_handler() {
        let mut state = ConversationState::new("chat-1", "hello", None);
        state.mark_classified(Some(Stage::Greeting), None);
        state.mark_dispatched();
        state.mark_completed("Welcome", "greeting_handler");

        assert_eq!(state.phase(), TurnPhase::Completed);
        assert_eq!(state.reply.as_deref(), Some("Welcome"));
        assert_eq!(state.handled_by.as_deref(), Some("greeting_handler"));
    }
}
