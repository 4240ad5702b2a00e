//! TUI-less commands: send one message or fetch one exercise/quiz, print, exit.

use std::error::Error;
use std::sync::Arc;

use crate::core::actions::ActionService;
use crate::core::config::ResolvedSettings;
use crate::core::session::SessionId;
use crate::core::transcript::{MemorySurface, Transcript};
use crate::core::transport::{HttpTransport, TutorTransport};
use crate::core::tutor::TutorSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneShot {
    Say(String),
    Exercise,
    Quiz,
}

/// Everything a one-shot command rendered.
#[derive(Debug, Default, PartialEq)]
pub struct OneShotReport {
    pub lines: Vec<String>,
    pub progress: Option<String>,
    /// The pending exercise or quiz as JSON, when one was fetched.
    pub pending: Option<serde_json::Value>,
}

impl OneShotReport {
    pub fn print(&self, json: bool) -> Result<(), Box<dyn Error>> {
        for line in &self.lines {
            println!("{line}");
        }
        if let Some(progress) = &self.progress {
            println!("{progress}");
        }
        if json {
            if let Some(pending) = &self.pending {
                println!("{}", serde_json::to_string_pretty(pending)?);
            }
        }
        Ok(())
    }
}

/// Run one action against `transport` and wait for its outcome.
///
/// A failed request yields a report without the reply; the failure itself is
/// only visible in the diagnostic log.
pub async fn execute(
    transport: Arc<dyn TutorTransport>,
    action: OneShot,
    transcript: Transcript,
    show_progress: bool,
) -> Result<OneShotReport, Box<dyn Error>> {
    let (actions, mut rx) = ActionService::new(transport);
    let mut session = TutorSession::new(SessionId::generate(), actions);
    let mut surface = MemorySurface::new(transcript, show_progress);

    let issued = match &action {
        OneShot::Say(message) => session.send(&mut surface, message).is_some(),
        OneShot::Exercise => {
            session.request_exercise();
            true
        }
        OneShot::Quiz => {
            session.request_quiz();
            true
        }
    };

    if issued {
        if let Some((outcome, _)) = rx.recv().await {
            session.apply_outcome(&mut surface, outcome);
        }
    }

    let pending = match action {
        OneShot::Say(_) => None,
        OneShot::Exercise => session
            .pending_exercise()
            .map(serde_json::to_value)
            .transpose()?,
        OneShot::Quiz => session.pending_quiz().map(serde_json::to_value).transpose()?,
    };

    Ok(OneShotReport {
        lines: surface.transcript.lines(),
        progress: surface.progress_text().map(str::to_string),
        pending,
    })
}

pub async fn run_oneshot(
    settings: ResolvedSettings,
    action: OneShot,
    transcript: Transcript,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let transport = HttpTransport::with_timeout(settings.base_url, settings.request_timeout)?;
    let report = execute(Arc::new(transport), action, transcript, settings.show_progress).await?;
    report.print(json)
}
