use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{ChatRequest, ChatResponse, ExercisePayload, QuizPayload, SessionRequest};
use crate::core::transport::{TransportError, TutorTransport};

/// The completed result of one request, delivered back to the event loop.
#[derive(Debug)]
pub enum ActionOutcome {
    Chat(Result<ChatResponse, TransportError>),
    Exercise(Result<ExercisePayload, TransportError>),
    Quiz(Result<QuizPayload, TransportError>),
}

/// Runs each request on its own task and reports completions over a channel,
/// tagged with a per-service sequence number.
///
/// Tasks never touch session state. Whoever owns the receiver applies the
/// outcomes one at a time, in completion order.
#[derive(Clone)]
pub struct ActionService {
    transport: Arc<dyn TutorTransport>,
    tx: mpsc::UnboundedSender<(ActionOutcome, u64)>,
}

impl ActionService {
    pub fn new(
        transport: Arc<dyn TutorTransport>,
    ) -> (Self, mpsc::UnboundedReceiver<(ActionOutcome, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { transport, tx }, rx)
    }

    pub fn spawn_chat(&self, request: ChatRequest, action_id: u64) {
        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = ActionOutcome::Chat(transport.chat(request).await);
            deliver(&tx, outcome, action_id);
        });
    }

    pub fn spawn_exercise(&self, request: SessionRequest, action_id: u64) {
        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = ActionOutcome::Exercise(transport.exercise(request).await);
            deliver(&tx, outcome, action_id);
        });
    }

    pub fn spawn_quiz(&self, request: SessionRequest, action_id: u64) {
        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = ActionOutcome::Quiz(transport.quiz(request).await);
            deliver(&tx, outcome, action_id);
        });
    }
}

fn deliver(tx: &mpsc::UnboundedSender<(ActionOutcome, u64)>, outcome: ActionOutcome, id: u64) {
    // Receiver gone means the front end already shut down.
    if tx.send((outcome, id)).is_err() {
        debug!(action_id = id, "dropping outcome after receiver closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{chat, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn outcomes_carry_their_action_id() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_chat(Ok(chat(json!({"response": "Hi!"}))));
        let (service, mut rx) = ActionService::new(transport.clone());

        service.spawn_chat(
            ChatRequest {
                message: "hello".to_string(),
                user: "user_1".to_string(),
            },
            7,
        );

        let (outcome, id) = rx.recv().await.expect("outcome delivered");
        assert_eq!(id, 7);
        match outcome {
            ActionOutcome::Chat(Ok(reply)) => assert_eq!(reply.response, "Hi!"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failures_are_delivered_not_raised() {
        let transport = Arc::new(ScriptedTransport::new());
        let (service, mut rx) = ActionService::new(transport);

        service.spawn_quiz(
            SessionRequest {
                user: "user_1".to_string(),
            },
            1,
        );

        let (outcome, _) = rx.recv().await.expect("outcome delivered");
        assert!(matches!(outcome, ActionOutcome::Quiz(Err(_))));
    }

    #[tokio::test]
    async fn closed_receiver_does_not_panic_the_task() {
        let transport = Arc::new(ScriptedTransport::new());
        let (service, rx) = ActionService::new(transport.clone());
        drop(rx);

        service.spawn_exercise(
            SessionRequest {
                user: "user_1".to_string(),
            },
            1,
        );
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(transport.request_count(), 1);
    }
}
