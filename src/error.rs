//! Error taxonomy shared by every action of the quiz client.

use std::fmt;

use thiserror::Error;

/// Target format of a binary export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Word,
}

impl ExportFormat {
    /// Fixed file name of the downloaded artifact.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Pdf => "test.pdf",
            Self::Word => "test.docx",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Errors produced by the quiz client. All of them are recoverable: the
/// action that raised one reports it and the session keeps running.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("please enter some text first")]
    EmptyInput,

    #[error("only .txt and .docx files are supported")]
    UnsupportedFileType,

    #[error("file is too large (max 5 MiB)")]
    FileTooLarge,

    #[error("the source contains no text or it is too short")]
    EmptyOrTooShort,

    #[error("URL must start with http:// or https://")]
    InvalidUrl,

    #[error("{0}")]
    RemoteFetchFailed(String),

    #[error("{0}")]
    GenerationFailed(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("the test contains no questions")]
    MalformedTest,

    #[error("Generate a test first")]
    NoTest,

    #[error("there are no questions to score")]
    NoQuestions,

    #[error("{format} export failed: {reason}")]
    ExportFailed {
        format: ExportFormat,
        reason: String,
    },

    #[error("copy failed: {0}")]
    CopyFailed(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    /// Message shown in the status line or notice popup.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExportFailed { format, .. } => match format {
                ExportFormat::Pdf => "Failed to create the PDF".to_string(),
                ExportFormat::Word => "Failed to create the Word document".to_string(),
            },
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
