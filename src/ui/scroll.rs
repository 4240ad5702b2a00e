use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::core::transcript::{EntryKind, LogEntry};

/// Handles line building and scroll math for the message log.
pub struct ScrollCalculator;

impl ScrollCalculator {
    pub fn build_display_lines(entries: &[LogEntry]) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for entry in entries {
            Self::add_entry_lines(&mut lines, entry);
        }
        lines
    }

    fn add_entry_lines(lines: &mut Vec<Line<'static>>, entry: &LogEntry) {
        let (label_style, body_style) = Self::styles(entry.kind);
        let mut body_lines = entry.body.lines();
        let first = body_lines.next().unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", entry.kind.label()), label_style),
            Span::styled(first.to_string(), body_style),
        ]));
        // Multi-line replies continue without repeating the label
        for rest in body_lines {
            lines.push(Line::from(Span::styled(rest.to_string(), body_style)));
        }
    }

    fn styles(kind: EntryKind) -> (Style, Style) {
        let color = match kind {
            EntryKind::You => Color::Cyan,
            EntryKind::Bot => Color::White,
            EntryKind::Exercise => Color::Yellow,
            EntryKind::Quiz => Color::Magenta,
        };
        (
            Style::default().fg(color).add_modifier(Modifier::BOLD),
            Style::default().fg(color),
        )
    }

    /// How many rows the lines occupy once wrapped to `terminal_width`.
    pub fn calculate_wrapped_line_count(lines: &[Line], terminal_width: u16) -> u16 {
        let mut total_wrapped_lines = 0u16;

        for line in lines {
            let line_text = line.to_string();
            // Matches ratatui's Wrap { trim: true }
            let trimmed_text = line_text.trim();

            if trimmed_text.is_empty() || terminal_width == 0 {
                total_wrapped_lines = total_wrapped_lines.saturating_add(1);
            } else {
                let wrapped_count = Self::calculate_word_wrapped_lines(trimmed_text, terminal_width);
                total_wrapped_lines = total_wrapped_lines.saturating_add(wrapped_count);
            }
        }

        total_wrapped_lines
    }

    fn calculate_word_wrapped_lines(text: &str, terminal_width: u16) -> u16 {
        let width = terminal_width as usize;
        let mut current_line_len = 0usize;
        let mut line_count = 1u16;

        for word in text.split_whitespace() {
            let word_len = word.width();

            if current_line_len > 0 && current_line_len + 1 + word_len > width {
                line_count = line_count.saturating_add(1);
                current_line_len = 0;
            } else if current_line_len > 0 {
                current_line_len += 1;
            }

            // Words wider than the screen are broken across rows
            if word_len > width {
                let extra_rows = (word_len - 1) / width;
                line_count = line_count.saturating_add(extra_rows as u16);
                current_line_len = word_len - extra_rows * width;
            } else {
                current_line_len += word_len;
            }
        }

        line_count
    }

    /// Scroll offset that shows the newest entry at the bottom.
    pub fn calculate_scroll_to_bottom(
        entries: &[LogEntry],
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        let lines = Self::build_display_lines(entries);
        let total_wrapped_lines = Self::calculate_wrapped_line_count(&lines, terminal_width);
        total_wrapped_lines.saturating_sub(available_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, body: &str) -> LogEntry {
        LogEntry::new(kind, body)
    }

    #[test]
    fn each_entry_starts_with_its_label() {
        let lines = ScrollCalculator::build_display_lines(&[
            entry(EntryKind::You, "hello"),
            entry(EntryKind::Bot, "Hi!\nHow can I help?"),
        ]);

        let rendered: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
        assert_eq!(rendered, vec!["You: hello", "Bot: Hi!", "How can I help?"]);
    }

    #[test]
    fn wrapped_line_count_breaks_on_words() {
        let lines = vec![Line::from("aaaa bbbb cccc")];
        assert_eq!(ScrollCalculator::calculate_wrapped_line_count(&lines, 9), 2);
        assert_eq!(ScrollCalculator::calculate_wrapped_line_count(&lines, 14), 1);
        assert_eq!(ScrollCalculator::calculate_wrapped_line_count(&lines, 4), 3);
    }

    #[test]
    fn long_words_take_multiple_rows() {
        let lines = vec![Line::from("abcdefghij")];
        assert_eq!(ScrollCalculator::calculate_wrapped_line_count(&lines, 4), 3);
    }

    #[test]
    fn scroll_to_bottom_is_zero_when_everything_fits() {
        let entries = vec![entry(EntryKind::You, "a"), entry(EntryKind::Bot, "b")];
        assert_eq!(ScrollCalculator::calculate_scroll_to_bottom(&entries, 80, 10), 0);

        let many: Vec<_> = (0..12).map(|i| entry(EntryKind::Bot, &i.to_string())).collect();
        assert_eq!(ScrollCalculator::calculate_scroll_to_bottom(&many, 80, 10), 2);
    }
}
