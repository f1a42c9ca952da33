mod history;
mod input;
pub mod layout;
mod notice;
mod quiz;
mod transcript;

pub use history::{draw_history, format_history_date};
pub use input::{draw_input, InputField};
pub use layout::{calculate_input_chunks, calculate_quiz_chunks};
pub use notice::draw_notice;
pub use quiz::{draw_quit_confirmation, draw_quiz, quiz_lines};
pub use transcript::draw_transcript;

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}
