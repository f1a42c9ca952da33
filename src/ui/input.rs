use crate::api::suggested_shape;
use crate::models::SourceStatus;
use crate::session::QuizSession;
use crate::ui::key_span;
use crate::ui::layout::{calculate_input_chunks, split_source_row};
use crate::utils::end_cursor_position;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Input box that receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Text,
    FilePath,
    Url,
}

impl InputField {
    pub fn next(self) -> Self {
        match self {
            Self::Text => Self::FilePath,
            Self::FilePath => Self::Url,
            Self::Url => Self::Text,
        }
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn status_line(status: &SourceStatus) -> Line<'static> {
    match status {
        SourceStatus::Idle => Line::from(""),
        SourceStatus::InProgress => Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )),
        SourceStatus::Success(msg) => Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(Color::Green),
        )),
        SourceStatus::Error(msg) => {
            Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red)))
        }
    }
}

fn draw_source_row(
    f: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    placeholder: &str,
    status: &SourceStatus,
    focused: bool,
) {
    let (input_area, status_area) = split_source_row(area);

    let content = if value.is_empty() {
        Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(value.to_string())
    };
    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(title.to_string()),
    );
    f.render_widget(input, input_area);

    let status = Paragraph::new(status_line(status))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, status_area);

    if focused {
        let x = input_area.x + 1 + value.chars().count().min(input_area.width.saturating_sub(2) as usize) as u16;
        f.set_cursor_position((x, input_area.y + 1));
    }
}

pub fn draw_input(f: &mut Frame, session: &QuizSession, focus: InputField) {
    let layout = calculate_input_chunks(f.area());

    let header_style = if session.is_generating() {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    };
    let header = Paragraph::new(format!("Text to Test  [{}]", session.generate_label()))
        .style(header_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let chars = session.input_text.chars().count();
    let (questions, options) = suggested_shape(chars);
    let title = format!(
        "Source text ({} chars, ~{} questions x {} options)",
        chars, questions, options
    );
    let text_focused = focus == InputField::Text;

    let visible_height = layout.text_area.height.saturating_sub(2) as usize;
    let text_width = layout.text_area.width.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) = end_cursor_position(&session.input_text, text_width);
    let scroll = cursor_line.saturating_sub(visible_height.saturating_sub(1)) as u16;

    let text = if session.input_text.is_empty() {
        Paragraph::new(Span::styled(
            "[Type or paste the source text here...]",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(session.input_text.as_str())
    };
    let text = text
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(text_focused))
                .title(title),
        );
    f.render_widget(text, layout.text_area);

    if text_focused {
        let x = layout.text_area.x + 1 + cursor_col as u16;
        let y = layout.text_area.y + 1 + (cursor_line as u16).saturating_sub(scroll);
        f.set_cursor_position((x, y));
    }

    let file_title = match &session.file_label {
        Some(label) => format!("File: {}", label),
        None => "File (.txt, .docx)".to_string(),
    };
    draw_source_row(
        f,
        layout.file_area,
        &file_title,
        &session.file_path_input,
        "path/to/file.txt",
        &session.file_status,
        focus == InputField::FilePath,
    );
    draw_source_row(
        f,
        layout.url_area,
        "Page URL",
        &session.url_input,
        "https://...",
        &session.url_status,
        focus == InputField::Url,
    );

    let help_text = vec![
        Line::from(vec![
            key_span("Tab"),
            Span::from(" Next Field  "),
            key_span("Enter"),
            Span::from(" Load File / Fetch URL  "),
            key_span("Ctrl+G"),
            Span::from(" Generate"),
        ]),
        Line::from(vec![
            key_span("Ctrl+T"),
            Span::from(" Open Quiz  "),
            key_span("Ctrl+H"),
            Span::from(" History  "),
            key_span("Ctrl+C"),
            Span::from(" Exit App"),
        ]),
    ];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
