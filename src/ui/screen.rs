//! State of the full-screen client: message log, progress line, input box.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_textarea::TextArea;

use crate::core::transcript::{DisplaySurface, LogEntry, MemorySurface, ProgressRegion};
use crate::ui::scroll::ScrollCalculator;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Send(String),
    RequestExercise,
    RequestQuiz,
    Quit,
    Redraw,
    Ignore,
}

pub struct ChatScreen {
    pub surface: MemorySurface,
    pub input: TextArea<'static>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub in_flight: usize,
    pub base_url: String,
    pub session_label: String,
    pub exit_requested: bool,
}

impl ChatScreen {
    pub fn new(surface: MemorySurface, base_url: String, session_label: String) -> Self {
        Self {
            surface,
            input: TextArea::default(),
            scroll_offset: 0,
            auto_scroll: true,
            in_flight: 0,
            base_url,
            session_label,
            exit_requested: false,
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        self.surface.transcript.entries()
    }

    pub fn progress_text(&self) -> Option<&str> {
        self.surface.progress_text()
    }

    pub fn has_progress_region(&self) -> bool {
        self.surface.progress.is_some()
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    /// Empty the input box and hand back what it held.
    pub fn take_input(&mut self) -> String {
        let text = self.input_text();
        self.input = TextArea::default();
        text
    }

    pub fn request_started(&mut self) {
        self.in_flight += 1;
    }

    pub fn request_finished(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight > 0
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::Ignore;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => KeyAction::Quit,
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('e') if ctrl => KeyAction::RequestExercise,
            KeyCode::Char('q') if ctrl => KeyAction::RequestQuiz,
            KeyCode::Enter => {
                // Empty input is left alone, like the send button on an empty box
                if self.input_text().is_empty() {
                    KeyAction::Ignore
                } else {
                    KeyAction::Send(self.take_input())
                }
            }
            KeyCode::Up => {
                self.scroll_up(1);
                KeyAction::Redraw
            }
            KeyCode::Down => {
                self.scroll_down(1);
                KeyAction::Redraw
            }
            KeyCode::PageUp => {
                self.scroll_up(10);
                KeyAction::Redraw
            }
            KeyCode::PageDown => {
                self.scroll_down(10);
                KeyAction::Redraw
            }
            _ => {
                self.input.input(tui_textarea::Input::from(key));
                KeyAction::Redraw
            }
        }
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows);
    }

    /// Clamp the offset for the current log area, following the newest entry
    /// while auto-scroll is on.
    pub fn sync_scroll(&mut self, width: u16, height: u16) -> u16 {
        let bottom = ScrollCalculator::calculate_scroll_to_bottom(self.entries(), width, height);
        if self.auto_scroll || self.scroll_offset >= bottom {
            self.scroll_offset = bottom;
            self.auto_scroll = true;
        }
        self.scroll_offset
    }
}

impl DisplaySurface for ChatScreen {
    fn append(&mut self, entry: LogEntry) {
        self.surface.append(entry);
    }

    fn progress_region(&mut self) -> Option<&mut ProgressRegion> {
        self.surface.progress_region()
    }
}
