//! The dialogue router: one pass per inbound message.
//!
//! `ReceivedMessage -> Classified -> Dispatched -> Completed`, with
//! `EscalatedToHuman` and `Failed` as absorbing states. The router is the
//! single point translating internal failures into user-visible replies; a
//! turn always produces a well-formed reply string, never an error.
//!
//! Session state is written once, after the handler returns, and only on
//! success paths. Failure paths leave the stored record untouched so the
//! next turn retries from last-known-good state.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agents::{ClassifierDecision, HandlerRegistry, StageDetector};
use crate::domain::{ConversationState, SessionRecord, Stage, TurnPhase};
use crate::ports::SessionStore;

use super::locks::ChatLocks;

/// Reply for unrecoverable turn failures.
pub const APOLOGY_REPLY: &str =
    "Sorry, I couldn't process that. Please try again in a moment.";

/// Appended when the reply was produced but could not be persisted.
pub const MEMORY_NOTE: &str =
    "\n\n(Note: I may not remember this part of our conversation next time.)";

/// Confirmation for the reset command.
pub const RESET_REPLY: &str = "Context cleared. Let's start a new conversation!";

/// The reset command recognized in message text.
pub const RESET_COMMAND: &str = "/new";

/// How `Ambiguous` classifications resolve to a concrete stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Fall back to the session's last known stage; use `default` when the
    /// session has none.
    LastKnownStage { default: Stage },
    /// Always use a fixed stage.
    FixedDefault(Stage),
}

impl Default for AmbiguityPolicy {
    fn default() -> Self {
        AmbiguityPolicy::LastKnownStage {
            default: Stage::Greeting,
        }
    }
}

impl AmbiguityPolicy {
    fn resolve(&self, session: &SessionRecord) -> Stage {
        match *self {
            AmbiguityPolicy::LastKnownStage { default } => session.last_stage.unwrap_or(default),
            AmbiguityPolicy::FixedDefault(stage) => stage,
        }
    }
}

/// Report on one completed turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub reply: String,
    pub stage: Option<Stage>,
    pub handled_by: Option<String>,
    pub phase: TurnPhase,
}

/// The dialogue stage router.
pub struct Router {
    store: Arc<dyn SessionStore>,
    registry: Arc<HandlerRegistry>,
    detector: StageDetector,
    policy: AmbiguityPolicy,
    locks: ChatLocks,
}

impl Router {
    pub fn new(
        store: Arc<dyn SessionStore>,
        registry: Arc<HandlerRegistry>,
        detector: StageDetector,
        policy: AmbiguityPolicy,
    ) -> Self {
        Self {
            store,
            registry,
            detector,
            policy,
            locks: ChatLocks::new(),
        }
    }

    /// Process one inbound message and produce a reply.
    ///
    /// Holds the chat's lock for the whole pass; concurrent turns for the
    /// same chat are strictly sequential.
    pub async fn deliver(&self, chat_id: &str, message: &str) -> TurnReport {
        let _turn_guard = self.locks.acquire(chat_id).await;

        if let Some(rest) = reset_command(message) {
            let report = self.reset_locked(chat_id).await;
            match rest {
                // Bare "/new": confirm and stop.
                None => return report,
                // "/new <text>": reset, then run the text as a fresh pass.
                Some(rest) => return self.run_turn(chat_id, rest).await,
            }
        }

        self.run_turn(chat_id, message).await
    }

    /// Clear the chat's continuation state.
    pub async fn reset(&self, chat_id: &str) -> TurnReport {
        let _turn_guard = self.locks.acquire(chat_id).await;
        self.reset_locked(chat_id).await
    }

    async fn reset_locked(&self, chat_id: &str) -> TurnReport {
        match self.store.reset(chat_id).await {
            Ok(()) => {
                info!(chat_id, "session reset");
                TurnReport {
                    reply: RESET_REPLY.to_string(),
                    stage: None,
                    handled_by: None,
                    phase: TurnPhase::Completed,
                }
            }
            Err(err) => {
                warn!(chat_id, %err, "session reset failed");
                TurnReport {
                    reply: APOLOGY_REPLY.to_string(),
                    stage: None,
                    handled_by: None,
                    phase: TurnPhase::Failed,
                }
            }
        }
    }

    /// One full pass. The chat lock is already held.
    async fn run_turn(&self, chat_id: &str, message: &str) -> TurnReport {
        let session = self.load_session(chat_id).await;
        let mut turn = ConversationState::new(
            chat_id,
            message,
            session.previous_response_id.clone(),
        );

        // ReceivedMessage -> Classified
        let classification = self
            .detector
            .classify(message, turn.previous_response_id.as_deref(), chat_id)
            .await;

        let stage = match classification.decision {
            ClassifierDecision::Stage(stage) => stage,
            ClassifierDecision::Ambiguous => {
                let resolved = self.policy.resolve(&session);
                info!(chat_id, stage = %resolved, "ambiguous classification resolved by policy");
                resolved
            }
            ClassifierDecision::Escalate(escalation) => {
                // The turn ends here; continuation state stays untouched so
                // the human picks up from last-known-good context.
                turn.mark_classified(None, classification.response_id);
                turn.mark_escalated(escalation.user_message, "stage_detector");
                info!(chat_id, "turn escalated during classification");
                return report_from(&turn);
            }
        };
        turn.mark_classified(Some(stage), classification.response_id);

        // Classified -> Dispatched
        let handler = self.registry.get_or_create(stage).await;
        turn.mark_dispatched();

        let outcome = handler
            .handle(message, turn.previous_response_id.as_deref(), chat_id)
            .await;

        if let Some(escalation) = outcome.escalation {
            // Persist the advanced token when we have one: the hand-off is
            // part of the remote conversation and the next turn (possibly
            // back from a human) should continue from it.
            let mut reply = escalation.user_message;
            if let Some(response_id) = outcome.new_response_id {
                let mut updated = session.clone();
                updated.record_turn(response_id, stage);
                if !self.persist(&updated).await {
                    reply.push_str(MEMORY_NOTE);
                }
            }
            turn.mark_escalated(reply, outcome.handled_by);
            info!(chat_id, stage = %stage, "turn escalated by handler");
            return report_from(&turn);
        }

        // Dispatched -> Completed
        match outcome.new_response_id {
            Some(response_id) => {
                let mut updated = session.clone();
                updated.record_turn(response_id, stage);
                let mut reply = outcome.reply;
                if !self.persist(&updated).await {
                    // Reply is still delivered; state stays at
                    // last-known-good so the next turn retries cleanly.
                    reply.push_str(MEMORY_NOTE);
                }
                turn.mark_completed(reply, outcome.handled_by);
            }
            None => {
                // Handler failure path: fallback reply, no state mutation.
                turn.mark_completed(outcome.reply, outcome.handled_by);
            }
        }

        info!(
            chat_id,
            stage = %stage,
            handler = turn.handled_by.as_deref().unwrap_or(""),
            "turn completed"
        );
        report_from(&turn)
    }

    async fn load_session(&self, chat_id: &str) -> SessionRecord {
        match self.store.load(chat_id).await {
            Ok(Some(record)) => record,
            Ok(None) => SessionRecord::empty(chat_id),
            Err(err) => {
                // Treated as a fresh start, but this hides genuine
                // continuation state, so it is an anomaly worth flagging.
                warn!(chat_id, %err, "session load failed, starting fresh");
                SessionRecord::empty(chat_id)
            }
        }
    }

    /// Save with one retry. Returns whether the record was persisted.
    async fn persist(&self, record: &SessionRecord) -> bool {
        for attempt in 1..=2 {
            match self.store.save(record).await {
                Ok(()) => return true,
                Err(err) => {
                    warn!(
                        chat_id = %record.chat_id,
                        attempt,
                        %err,
                        "session save failed"
                    );
                }
            }
        }
        false
    }
}

/// Split a reset command from its optional trailing message.
fn reset_command(message: &str) -> Option<Option<&str>> {
    let trimmed = message.trim();
    if trimmed == RESET_COMMAND {
        return Some(None);
    }
    trimmed
        .strip_prefix(RESET_COMMAND)
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(|rest| Some(rest.trim()))
}

fn report_from(turn: &ConversationState) -> TurnReport {
    TurnReport {
        reply: turn
            .reply
            .clone()
            .unwrap_or_else(|| APOLOGY_REPLY.to_string()),
        stage: turn.current_stage,
        handled_by: turn.handled_by.clone(),
        phase: turn.phase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_command_parsing() {
        assert_eq!(reset_command("/new"), Some(None));
        assert_eq!(reset_command("  /new  "), Some(None));
        assert_eq!(reset_command("/new hello there"), Some(Some("hello there")));
        assert_eq!(reset_command("/newish"), None);
        assert_eq!(reset_command("hello"), None);
    }

    #[test]
    fn ambiguity_policy_prefers_last_known_stage() {
        let policy = AmbiguityPolicy::default();
        let mut session = SessionRecord::empty("chat-1");
        assert_eq!(policy.resolve(&session), Stage::Greeting);

        session.record_turn("R1", Stage::Booking);
        assert_eq!(policy.resolve(&session), Stage::Booking);
    }

    #[test]
    fn fixed_default_policy_ignores_session() {
        let policy = AmbiguityPolicy::FixedDefault(Stage::Greeting);
        let mut session = SessionRecord::empty("chat-1");
        session.record_turn("R1", Stage::Booking);
        assert_eq!(policy.resolve(&session), Stage::Greeting);
    }
}
