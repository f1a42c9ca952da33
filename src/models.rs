use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ExportFormat, QuizError};

pub const UNTITLED_TEST: &str = "Untitled test";

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(rename = "answer")]
    pub answer_text: String,
    #[serde(rename = "correct")]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub question_text: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Index of the first option flagged correct. `None` makes the question
    /// unscoreable.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_correct)
    }
}

/// A generated test. Never mutated once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub questions: Vec<Question>,
}

impl Test {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNTITLED_TEST,
        }
    }
}

/// Which option the user picked for each question. Absent key = unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    choices: BTreeMap<usize, usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selecting an option replaces any earlier choice for the same question.
    pub fn select(&mut self, question_index: usize, option_index: usize) {
        self.choices.insert(question_index, option_index);
    }

    pub fn selected(&self, question_index: usize) -> Option<usize> {
        self.choices.get(&question_index).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Feedback highlight attached to an option after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Correct,
    Wrong,
}

/// Progress of one text source (manual, file or URL).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceStatus {
    #[default]
    Idle,
    InProgress,
    Success(String),
    Error(String),
}

/// Tag issued by the session for every background request.
pub type RequestId = u64;

#[derive(Debug)]
pub enum WorkerRequest {
    Generate {
        id: RequestId,
        text: String,
    },
    FetchUrl {
        id: RequestId,
        url: String,
    },
    Export {
        id: RequestId,
        format: ExportFormat,
        test: Test,
    },
}

#[derive(Debug)]
pub enum WorkerResponse {
    Generated {
        id: RequestId,
        result: Result<Test, QuizError>,
    },
    Fetched {
        id: RequestId,
        result: Result<String, QuizError>,
    },
    Exported {
        id: RequestId,
        format: ExportFormat,
        result: Result<Vec<u8>, QuizError>,
    },
}

/// Screen currently shown by the terminal UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Input,
    History,
    Quiz,
    Transcript,
    QuitConfirm,
}
