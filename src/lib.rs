pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod docx;
pub mod error;
pub mod export;
pub mod logger;
pub mod models;
pub mod quiz;
pub mod scoring;
pub mod session;
pub mod source;
pub mod ui;
pub mod utils;
pub mod worker;

// Re-exports for convenience
pub use api::{HttpTestService, TestService};
pub use app::App;
pub use config::Config;
pub use error::{ExportFormat, QuizError, Result};
pub use models::{AnswerOption, AppState, Question, SelectionState, Test};
pub use quiz::{format_as_text, QuizView};
pub use scoring::{score, ScoreReport};
pub use session::{Phase, QuizSession};
pub use worker::spawn_worker;
