//! Main event loop for the full-screen client.
//!
//! Terminal input and request completions arrive on two channels and are
//! handled one at a time on this task, which is the only owner of the
//! session and the screen.

use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::actions::{ActionOutcome, ActionService};
use crate::core::config::ResolvedSettings;
use crate::core::session::SessionId;
use crate::core::transcript::{MemorySurface, Transcript};
use crate::core::transport::HttpTransport;
use crate::core::tutor::TutorSession;
use crate::ui::renderer::ui;
use crate::ui::screen::{ChatScreen, KeyAction};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

type Backend = CrosstermBackend<io::Stdout>;

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(50)) {
            match event::read() {
                Ok(ev) => {
                    if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => continue,
            }
        } else if event_tx.is_closed() {
            break;
        }
    })
}

fn setup_terminal() -> Result<Terminal<Backend>, Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

pub async fn run_chat(
    settings: ResolvedSettings,
    transcript: Transcript,
) -> Result<(), Box<dyn Error>> {
    let transport = HttpTransport::with_timeout(settings.base_url.clone(), settings.request_timeout)?;
    let (actions, outcome_rx) = ActionService::new(Arc::new(transport));
    let session_id = SessionId::generate();
    info!(session = %session_id, base_url = %settings.base_url, "starting chat session");

    let mut session = TutorSession::new(session_id.clone(), actions);
    let mut screen = ChatScreen::new(
        MemorySurface::new(transcript, settings.show_progress),
        settings.base_url,
        session_id.to_string(),
    );

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut session, &mut screen, outcome_rx).await;
    let restored = restore_terminal(&mut terminal);

    result?;
    restored
}

async fn event_loop(
    terminal: &mut Terminal<Backend>,
    session: &mut TutorSession,
    screen: &mut ChatScreen,
    mut outcome_rx: mpsc::UnboundedReceiver<(ActionOutcome, u64)>,
) -> Result<(), Box<dyn Error>> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let reader = spawn_event_reader(event_tx);

    terminal.draw(|f| ui(f, screen))?;

    while !screen.exit_requested {
        tokio::select! {
            Some(UiEvent::Crossterm(ev)) = event_rx.recv() => {
                handle_terminal_event(session, screen, ev);
            }
            Some((outcome, action_id)) = outcome_rx.recv() => {
                screen.request_finished();
                debug!(action_id, "applying outcome");
                session.apply_outcome(screen, outcome);
            }
            else => {
                warn!("all event sources closed");
                break;
            }
        }
        terminal.draw(|f| ui(f, screen))?;
    }

    drop(event_rx);
    // The reader notices the closed channel on its next poll timeout.
    let _ = reader.await;
    Ok(())
}

fn handle_terminal_event(session: &mut TutorSession, screen: &mut ChatScreen, ev: Event) {
    let Event::Key(key) = ev else {
        return;
    };

    match screen.handle_key(key) {
        KeyAction::Send(message) => {
            if session.send(screen, &message).is_some() {
                screen.request_started();
            }
        }
        KeyAction::RequestExercise => {
            session.request_exercise();
            screen.request_started();
        }
        KeyAction::RequestQuiz => {
            session.request_quiz();
            screen.request_started();
        }
        KeyAction::Quit => screen.exit_requested = true,
        KeyAction::Redraw | KeyAction::Ignore => {}
    }
}
