use std::collections::BTreeMap;

use crate::error::{QuizError, Result};
use crate::models::{Mark, SelectionState, Test};

/// Outcome of checking the answers of one rendered test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub correct_count: usize,
    pub total: usize,
    pub percentage: u32,
    /// (question index, option index) -> highlight.
    pub marks: BTreeMap<(usize, usize), Mark>,
}

impl ScoreReport {
    pub fn mark(&self, question_index: usize, option_index: usize) -> Option<Mark> {
        self.marks.get(&(question_index, option_index)).copied()
    }
}

/// Scores `selections` against `test`.
///
/// A question without any option flagged correct is unscoreable: it gets no
/// correct mark and a selection for it counts as wrong. Marks are rebuilt on
/// every call so repeated checks yield identical results.
pub fn score(test: &Test, selections: &SelectionState) -> Result<ScoreReport> {
    let total = test.questions.len();
    if total == 0 {
        return Err(QuizError::NoQuestions);
    }

    let mut correct_count = 0;
    let mut marks = BTreeMap::new();

    for (q_index, question) in test.questions.iter().enumerate() {
        let correct = question.correct_index();
        if let Some(c_index) = correct {
            marks.insert((q_index, c_index), Mark::Correct);
        }

        let Some(selected) = selections.selected(q_index) else {
            continue;
        };

        if Some(selected) == correct {
            correct_count += 1;
        } else if selected < question.options.len() {
            marks.insert((q_index, selected), Mark::Wrong);
        }
    }

    Ok(ScoreReport {
        correct_count,
        total,
        percentage: percentage(correct_count, total),
        marks,
    })
}

/// `round(100 * correct / total)`, halves rounded up. `total` must be non-zero.
fn percentage(correct: usize, total: usize) -> u32 {
    ((200 * correct + total) / (2 * total)) as u32
}
