use crate::models::Mark;
use crate::quiz::{non_empty_or, QuizView, OPTION_PLACEHOLDER, QUESTION_PLACEHOLDER};
use crate::session::QuizSession;
use crate::ui::key_span;
use crate::ui::layout::calculate_quiz_chunks;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SELECTED_MARKER: &str = "(•)";
const UNSELECTED_MARKER: &str = "( )";

/// Renders every question with its options as radio rows. Returns the text and
/// the index of the line holding the focused option.
pub fn quiz_lines(quiz: &QuizView) -> (Text<'static>, usize) {
    let mut text = Text::default();
    let mut focused_line = 0;
    let (focus_q, focus_o) = quiz.focus();

    for (q_index, question) in quiz.test().questions.iter().enumerate() {
        text.push_line(Line::from(Span::styled(
            format!(
                "{}. {}",
                q_index + 1,
                non_empty_or(&question.question_text, QUESTION_PLACEHOLDER)
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )));

        let selected = quiz.selections().selected(q_index);
        for (o_index, option) in question.options.iter().enumerate() {
            let marker = if selected == Some(o_index) {
                SELECTED_MARKER
            } else {
                UNSELECTED_MARKER
            };

            let mut style = match quiz.mark(q_index, o_index) {
                Some(Mark::Correct) => Style::default().fg(Color::Green),
                Some(Mark::Wrong) => Style::default().fg(Color::Red),
                None => Style::default(),
            };
            let is_focused = (q_index, o_index) == (focus_q, focus_o);
            if is_focused {
                style = style.add_modifier(Modifier::REVERSED);
                focused_line = text.lines.len();
            }

            let mut spans = vec![Span::styled(
                format!(
                    "   {} {}",
                    marker,
                    non_empty_or(&option.answer_text, OPTION_PLACEHOLDER)
                ),
                style,
            )];
            match quiz.mark(q_index, o_index) {
                Some(Mark::Correct) => spans.push(Span::styled(
                    " ✓",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )),
                Some(Mark::Wrong) => spans.push(Span::styled(
                    " ✗",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                None => {}
            }
            text.push_line(Line::from(spans));
        }
        text.push_line(Line::from(""));
    }

    (text, focused_line)
}

/// Visual row of `line_index` once every line is wrapped at `width` columns.
fn visual_row(text: &Text, line_index: usize, width: usize) -> usize {
    let width = width.max(1);
    text.lines
        .iter()
        .take(line_index)
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}

pub fn draw_quiz(f: &mut Frame, session: &mut QuizSession) {
    let layout = calculate_quiz_chunks(f.area());

    if let Some(error) = session.render_error() {
        let header = Paragraph::new("Test")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(header, layout.header_area);

        let message = Paragraph::new(Line::from(Span::styled(
            format!("Failed to display the test: {}", error),
            Style::default().fg(Color::Red),
        )))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(message, layout.questions_area);
        draw_help(f, layout.help_area, false);
        return;
    }

    let Some(quiz) = session.quiz_mut() else {
        let empty = Paragraph::new("No test yet. Generate one from the input screen.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, layout.questions_area);
        draw_help(f, layout.help_area, false);
        return;
    };

    let mut header_spans = vec![Span::styled(
        quiz.test().display_name().to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    let answered = quiz.selections().answered_count();
    let total = quiz.test().questions.len();
    match quiz.report() {
        Some(report) => header_spans.push(Span::styled(
            format!(
                "  Score: {}/{} ({}%)",
                report.correct_count, report.total, report.percentage
            ),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        None => header_spans.push(Span::from(format!("  Answered {}/{}", answered, total))),
    }
    let header = Paragraph::new(Line::from(header_spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let (text, focused_line) = quiz_lines(quiz);
    let visible_height = layout.questions_area.height.saturating_sub(2) as usize;
    let text_width = layout.questions_area.width.saturating_sub(2) as usize;
    let focus_row = visual_row(&text, focused_line, text_width);

    // Keep the focused option on screen.
    let mut scroll = quiz.scroll_y as usize;
    if focus_row < scroll {
        scroll = focus_row;
    } else if visible_height > 0 && focus_row >= scroll + visible_height {
        scroll = focus_row + 1 - visible_height;
    }
    quiz.scroll_y = scroll as u16;

    let questions = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((quiz.scroll_y, 0))
        .block(Block::default().borders(Borders::ALL).title("Questions"));
    f.render_widget(questions, layout.questions_area);

    draw_help(f, layout.help_area, true);
}

fn draw_help(f: &mut Frame, area: ratatui::layout::Rect, has_quiz: bool) {
    let mut help_text = Vec::new();
    if has_quiz {
        help_text.push(Line::from(vec![
            key_span("↑/↓"),
            Span::from(" Navigate  "),
            key_span("Space"),
            Span::from(" Select  "),
            key_span("c"),
            Span::from(" Check  "),
            key_span("r"),
            Span::from(" Retry  "),
            key_span("t"),
            Span::from(" Transcript"),
        ]));
    }
    help_text.push(Line::from(vec![
        key_span("y"),
        Span::from(" Copy  "),
        key_span("s"),
        Span::from(" Save .txt  "),
        key_span("p"),
        Span::from(" PDF  "),
        key_span("w"),
        Span::from(" Word  "),
        key_span("Esc"),
        Span::from(" Back  "),
        key_span("Ctrl+C"),
        Span::from(" Exit App"),
    ]));

    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

pub fn draw_quit_confirmation(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Quit")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new("Leave the application? The current test stays in history.")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Yes (Quit)  "),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(" No (Stay)"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
