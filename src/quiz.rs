use crate::error::Result;
use crate::models::{Mark, SelectionState, Test};
use crate::scoring::{score, ScoreReport};

pub const QUESTION_PLACEHOLDER: &str = "Question without text";
pub const OPTION_PLACEHOLDER: &str = "Option without text";

/// Interactive state of one rendered test: selections, keyboard focus and
/// the marks of the last check.
#[derive(Debug, Clone)]
pub struct QuizView {
    test: Test,
    selections: SelectionState,
    focused_question: usize,
    focused_option: usize,
    report: Option<ScoreReport>,
    pub scroll_y: u16,
}

impl QuizView {
    /// Builds a fresh view with empty selections.
    pub fn new(test: Test) -> Self {
        tracing::debug!(questions = test.questions.len(), "Rendering quiz");
        Self {
            test,
            selections: SelectionState::new(),
            focused_question: 0,
            focused_option: 0,
            report: None,
            scroll_y: 0,
        }
    }

    /// Rebuilds the view of the same test from scratch.
    pub fn retry(&mut self) {
        *self = Self::new(self.test.clone());
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    pub fn selections(&self) -> &SelectionState {
        &self.selections
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    pub fn focus(&self) -> (usize, usize) {
        (self.focused_question, self.focused_option)
    }

    /// Records a choice; only one option per question can be selected.
    /// Returns false when the indices do not address an existing option.
    pub fn select(&mut self, question_index: usize, option_index: usize) -> bool {
        let Some(question) = self.test.questions.get(question_index) else {
            return false;
        };
        if option_index >= question.options.len() {
            return false;
        }
        self.selections.select(question_index, option_index);
        self.report = None;
        true
    }

    pub fn select_focused(&mut self) -> bool {
        self.select(self.focused_question, self.focused_option)
    }

    /// Scores the current selections and keeps the resulting marks.
    pub fn check_answers(&mut self) -> Result<&ScoreReport> {
        let report = score(&self.test, &self.selections)?;
        tracing::info!(
            correct = report.correct_count,
            total = report.total,
            percentage = report.percentage,
            "Answers checked"
        );
        Ok(&*self.report.insert(report))
    }

    pub fn mark(&self, question_index: usize, option_index: usize) -> Option<Mark> {
        self.report
            .as_ref()
            .and_then(|r| r.mark(question_index, option_index))
    }

    /// Moves focus to the next option, rolling over into the next question.
    pub fn focus_next(&mut self) {
        let Some(question) = self.test.questions.get(self.focused_question) else {
            return;
        };
        if self.focused_option + 1 < question.options.len() {
            self.focused_option += 1;
        } else if self.focused_question + 1 < self.test.questions.len() {
            self.focused_question += 1;
            self.focused_option = 0;
        }
    }

    pub fn focus_prev(&mut self) {
        if self.focused_option > 0 {
            self.focused_option -= 1;
        } else if self.focused_question > 0 {
            self.focused_question -= 1;
            self.focused_option = self.test.questions[self.focused_question]
                .options
                .len()
                .saturating_sub(1);
        }
    }

    pub fn focus_next_question(&mut self) {
        if self.focused_question + 1 < self.test.questions.len() {
            self.focused_question += 1;
            self.focused_option = 0;
        }
    }

    pub fn focus_prev_question(&mut self) {
        if self.focused_question > 0 {
            self.focused_question -= 1;
            self.focused_option = 0;
        }
    }
}

/// Plain-text transcript of a test. Never reveals which option is correct.
pub fn format_as_text(test: &Test) -> String {
    let mut result = format!("Test name: {}\n\n", test.display_name());

    for (index, question) in test.questions.iter().enumerate() {
        result.push_str(&format!(
            "Question {}: {}\n",
            index + 1,
            non_empty_or(&question.question_text, QUESTION_PLACEHOLDER)
        ));

        for (opt_index, option) in question.options.iter().enumerate() {
            result.push_str(&format!(
                "  {}. {}\n",
                opt_index + 1,
                non_empty_or(&option.answer_text, OPTION_PLACEHOLDER)
            ));
        }

        result.push('\n');
    }

    result
}

pub fn non_empty_or<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}
