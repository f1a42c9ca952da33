use crate::session::QuizSession;
use crate::ui::key_span;
use crate::utils::estimate_line_count;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Editable view of the plain-text export. Returns the scroll offset actually
/// used, bounded by the content height.
pub fn draw_transcript(f: &mut Frame, session: &QuizSession, scroll: u16) -> u16 {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Text Export (editable)")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let visible_height = chunks[1].height.saturating_sub(2) as usize;
    let text_width = chunks[1].width.saturating_sub(2) as usize;
    let content_height = estimate_line_count(&session.transcript, text_width);
    let max_scroll = content_height.saturating_sub(visible_height) as u16;
    let scroll = scroll.min(max_scroll);

    let body = Paragraph::new(session.transcript.as_str())
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        key_span("↑/↓"),
        Span::from(" Scroll  "),
        key_span("Ctrl+Y"),
        Span::from(" Copy  "),
        key_span("Ctrl+S"),
        Span::from(" Save .txt  "),
        key_span("Ctrl+R"),
        Span::from(" Reset  "),
        key_span("Esc"),
        Span::from(" Back"),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    scroll
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_scroll_is_bounded() {
        let mut session = QuizSession::new(std::env::temp_dir());
        session.transcript = "Test name: Short\n\nQuestion 1: Why?\n".to_string();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut used = 99;
        terminal
            .draw(|f| used = draw_transcript(f, &session, 50))
            .unwrap();
        assert_eq!(used, 0);

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Test name: Short"));
    }
}
