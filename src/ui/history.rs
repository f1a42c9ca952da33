use crate::db::saved_test::TestSummary;
use crate::models::UNTITLED_TEST;
use crate::ui::key_span;
use crate::utils::truncate_string;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use std::time::{Duration, UNIX_EPOCH};

const DATE_FORMAT_TODAY: &str = "Today %H:%M";
const DATE_FORMAT_YESTERDAY: &str = "Yesterday %H:%M";
const DATE_FORMAT_OTHER: &str = "%Y-%m-%d";
const NAME_WIDTH: usize = 40;

pub fn format_history_date(timestamp: u64) -> String {
    let saved_time = UNIX_EPOCH + Duration::from_secs(timestamp);
    let datetime: chrono::DateTime<chrono::Local> = saved_time.into();

    let today = chrono::Local::now().date_naive();
    let saved_date = datetime.date_naive();

    if saved_date == today {
        datetime.format(DATE_FORMAT_TODAY).to_string()
    } else if saved_date == today - chrono::Duration::days(1) {
        datetime.format(DATE_FORMAT_YESTERDAY).to_string()
    } else {
        datetime.format(DATE_FORMAT_OTHER).to_string()
    }
}

fn format_history_item(summary: &TestSummary) -> String {
    let name = summary.name.as_deref().unwrap_or(UNTITLED_TEST);
    let score = match summary.last_percentage {
        Some(percentage) => format!("last {}%, {} attempts", percentage, summary.attempts),
        None => "not checked".to_string(),
    };
    format!(
        "{} - {} ({} questions, {})",
        format_history_date(summary.created_at),
        truncate_string(name, NAME_WIDTH),
        summary.question_count,
        score
    )
}

pub fn draw_history(f: &mut Frame, tests: &[TestSummary], selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Saved Tests")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = if tests.is_empty() {
        vec![ListItem::new("No saved tests").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        tests
            .iter()
            .enumerate()
            .map(|(i, summary)| {
                let style = if i == selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format_history_item(summary)).style(style)
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        key_span("↑/↓"),
        Span::from(" Navigate  "),
        key_span("Enter"),
        Span::from(" Open  "),
        key_span("d"),
        Span::from(" Delete  "),
        key_span("Esc"),
        Span::from(" Back"),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
