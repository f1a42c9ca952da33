use crate::session::{Notice, NoticeKind};
use crate::ui::key_span;
use crate::ui::layout::centered_rect;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Draws `notice` as a popup over whatever screen is below it.
pub fn draw_notice(f: &mut Frame, notice: &Notice) {
    let (title, color) = match notice.kind {
        NoticeKind::Info => ("Info", Color::Green),
        NoticeKind::Warning => ("Warning", Color::Yellow),
        NoticeKind::Error => ("Error", Color::Red),
    };

    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            notice.message.clone(),
            Style::default().fg(color),
        )),
        Line::from(""),
        Line::from(vec![key_span("Enter"), Span::from(" Dismiss")]),
    ];
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(Span::styled(
                    title,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
        );
    f.render_widget(popup, area);
}
