//! The client side of a tutoring session.
//!
//! [`TutorSession`] turns the three user actions (send a message, ask for an
//! exercise, ask for a quiz) into backend requests and renders each response
//! onto a [`DisplaySurface`]. Requests run in the background through
//! [`ActionService`]; their outcomes come back over a channel and are applied
//! with [`TutorSession::apply_outcome`] by whoever owns the surface.

use tracing::{debug, error};

use crate::api::{ChatRequest, ChatResponse, ExercisePayload, Progress, QuizPayload, SessionRequest};
use crate::core::actions::{ActionOutcome, ActionService};
use crate::core::session::SessionId;
use crate::core::transcript::{DisplaySurface, EntryKind, LogEntry};
use crate::core::transport::TransportError;

pub struct TutorSession {
    session_id: SessionId,
    actions: ActionService,
    next_action_id: u64,
    pending_exercise: Option<ExercisePayload>,
    pending_quiz: Option<QuizPayload>,
    last_progress: Option<Progress>,
}

impl TutorSession {
    pub fn new(session_id: SessionId, actions: ActionService) -> Self {
        Self {
            session_id,
            actions,
            next_action_id: 0,
            pending_exercise: None,
            pending_quiz: None,
            last_progress: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn pending_exercise(&self) -> Option<&ExercisePayload> {
        self.pending_exercise.as_ref()
    }

    pub fn pending_quiz(&self) -> Option<&QuizPayload> {
        self.pending_quiz.as_ref()
    }

    /// The summary most recently rendered, kept for display only.
    pub fn last_progress(&self) -> Option<&Progress> {
        self.last_progress.as_ref()
    }

    /// Send a chat message. Empty input does nothing and returns `None`.
    ///
    /// The `You:` entry is appended before the request is issued, so it always
    /// sits above the eventual reply. Returns the id the outcome will carry.
    pub fn send(&mut self, surface: &mut dyn DisplaySurface, message: &str) -> Option<u64> {
        if message.is_empty() {
            return None;
        }

        surface.append(LogEntry::new(EntryKind::You, message));

        let action_id = self.allocate_action_id();
        debug!(action_id, "sending chat message");
        self.actions.spawn_chat(
            ChatRequest {
                message: message.to_string(),
                user: self.session_id.to_string(),
            },
            action_id,
        );
        Some(action_id)
    }

    pub fn request_exercise(&mut self) -> u64 {
        let action_id = self.allocate_action_id();
        debug!(action_id, "requesting exercise");
        self.actions.spawn_exercise(self.session_request(), action_id);
        action_id
    }

    pub fn request_quiz(&mut self) -> u64 {
        let action_id = self.allocate_action_id();
        debug!(action_id, "requesting quiz");
        self.actions.spawn_quiz(self.session_request(), action_id);
        action_id
    }

    /// Render one completed request. Failures only reach the diagnostic log;
    /// the surface and the pending slots stay as they were.
    pub fn apply_outcome(&mut self, surface: &mut dyn DisplaySurface, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Chat(Ok(reply)) => self.apply_chat(surface, reply),
            ActionOutcome::Exercise(Ok(exercise)) => self.apply_exercise(surface, exercise),
            ActionOutcome::Quiz(Ok(quiz)) => self.apply_quiz(surface, quiz),
            ActionOutcome::Chat(Err(err))
            | ActionOutcome::Exercise(Err(err))
            | ActionOutcome::Quiz(Err(err)) => report_failure(&err),
        }
    }

    /// Overwrite the progress region. A surface without one is left alone.
    pub fn render_progress(&mut self, surface: &mut dyn DisplaySurface, progress: Progress) {
        if let Some(region) = surface.progress_region() {
            region.set(progress.summary_line());
        }
        self.last_progress = Some(progress);
    }

    fn apply_chat(&mut self, surface: &mut dyn DisplaySurface, reply: ChatResponse) {
        surface.append(LogEntry::new(EntryKind::Bot, reply.response));
        if let Some(progress) = reply.progress {
            self.render_progress(surface, progress);
        }
    }

    fn apply_exercise(&mut self, surface: &mut dyn DisplaySurface, exercise: ExercisePayload) {
        surface.append(LogEntry::new(EntryKind::Exercise, exercise.question.as_str()));
        self.pending_exercise = Some(exercise);
    }

    fn apply_quiz(&mut self, surface: &mut dyn DisplaySurface, quiz: QuizPayload) {
        surface.append(LogEntry::new(
            EntryKind::Quiz,
            format!("{} Options: {}", quiz.question, quiz.options_line()),
        ));
        self.pending_quiz = Some(quiz);
    }

    fn session_request(&self) -> SessionRequest {
        SessionRequest {
            user: self.session_id.to_string(),
        }
    }

    fn allocate_action_id(&mut self) -> u64 {
        self.next_action_id += 1;
        self.next_action_id
    }
}

fn report_failure(err: &TransportError) {
    error!(endpoint = %err.endpoint(), error = %err, "tutor request failed");
}
