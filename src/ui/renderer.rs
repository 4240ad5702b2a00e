use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::screen::ChatScreen;
use crate::ui::scroll::ScrollCalculator;

pub fn ui(f: &mut Frame, screen: &mut ChatScreen) {
    let progress_height = if screen.has_progress_region() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(progress_height),
            Constraint::Length(3), // input line + borders
        ])
        .split(f.area());

    let title = format!(
        "tutorchat v{} - {} ({})",
        env!("CARGO_PKG_VERSION"),
        screen.base_url,
        screen.session_label
    );

    // One row goes to the title
    let available_height = chunks[0].height.saturating_sub(1);
    let scroll_offset = screen.sync_scroll(chunks[0].width, available_height);
    let lines = ScrollCalculator::build_display_lines(screen.entries());

    let messages = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(messages, chunks[0]);

    if screen.has_progress_region() {
        let progress = Paragraph::new(screen.progress_text().unwrap_or_default().to_string())
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(progress, chunks[1]);
    }

    let input_title = if screen.is_waiting() {
        "Waiting for tutor… (Enter send, Ctrl+E exercise, Ctrl+Q quiz, Esc quit)"
    } else {
        "Type your message (Enter send, Ctrl+E exercise, Ctrl+Q quiz, Esc quit)"
    };
    screen.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(input_title)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(&screen.input, chunks[2]);
}
