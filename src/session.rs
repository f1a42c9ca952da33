use std::collections::HashMap;
use std::path::PathBuf;

use crate::api::{parse_stored_test, TestService};
use crate::docx::TextExtractor;
use crate::error::{ExportFormat, QuizError};
use crate::export::{self, Clipboard};
use crate::models::{RequestId, SourceStatus, Test, WorkerRequest, WorkerResponse};
use crate::quiz::{format_as_text, QuizView};
use crate::scoring::ScoreReport;
use crate::source;

pub const GENERATE_LABEL: &str = "Generate test";
pub const GENERATING_LABEL: &str = "Generating...";

/// Lifecycle of the current test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    Rendered,
    Scored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Generate,
    FetchUrl,
    Export(ExportFormat),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Modal message shown on top of the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Side effects the caller has to carry out after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// A new test replaced the current one.
    TestGenerated { source_chars: usize },
    /// Answers were checked for the current test.
    Scored(ScoreReport),
}

/// Owner of the single current test and everything the screens display
/// around it. All mutation happens through the event methods below.
#[derive(Debug)]
pub struct QuizSession {
    phase: Phase,
    phase_before_generation: Phase,
    quiz: Option<QuizView>,
    render_error: Option<String>,
    history_id: Option<u64>,
    pending_source_chars: usize,
    pub input_text: String,
    pub url_input: String,
    pub file_path_input: String,
    pub file_label: Option<String>,
    pub file_status: SourceStatus,
    pub url_status: SourceStatus,
    pub transcript: String,
    pub notice: Option<Notice>,
    download_dir: PathBuf,
    next_request_id: RequestId,
    latest_requests: HashMap<RequestKind, RequestId>,
    pending: HashMap<RequestKind, RequestId>,
}

impl QuizSession {
    pub fn new(download_dir: PathBuf) -> Self {
        Self {
            phase: Phase::Idle,
            phase_before_generation: Phase::Idle,
            quiz: None,
            render_error: None,
            history_id: None,
            pending_source_chars: 0,
            input_text: String::new(),
            url_input: String::new(),
            file_path_input: String::new(),
            file_label: None,
            file_status: SourceStatus::Idle,
            url_status: SourceStatus::Idle,
            transcript: String::new(),
            notice: None,
            download_dir,
            next_request_id: 1,
            latest_requests: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn quiz(&self) -> Option<&QuizView> {
        self.quiz.as_ref()
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizView> {
        self.quiz.as_mut()
    }

    pub fn current_test(&self) -> Option<&Test> {
        self.quiz.as_ref().map(QuizView::test)
    }

    pub fn render_error(&self) -> Option<&str> {
        self.render_error.as_deref()
    }

    pub fn history_id(&self) -> Option<u64> {
        self.history_id
    }

    pub fn set_history_id(&mut self, id: Option<u64>) {
        self.history_id = id;
    }

    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Generating
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Label of the generate action; it is disabled while generating.
    pub fn generate_label(&self) -> &'static str {
        if self.is_generating() {
            GENERATING_LABEL
        } else {
            GENERATE_LABEL
        }
    }

    fn issue(&mut self, kind: RequestKind) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.latest_requests.insert(kind, id);
        self.pending.insert(kind, id);
        id
    }

    /// True when `id` is the newest request of its kind. Older responses are
    /// dropped.
    fn accept(&mut self, kind: RequestKind, id: RequestId) -> bool {
        let latest = self.latest_requests.get(&kind).copied().unwrap_or(0);
        if id < latest {
            tracing::debug!(?kind, id, latest, "Discarding stale response");
            return false;
        }
        self.pending.remove(&kind);
        true
    }

    // ----- text sources -------------------------------------------------

    /// Loads the file named in `file_path_input` into the text buffer. On
    /// failure the selection is cleared so the user can pick again.
    pub fn load_file(&mut self, extractor: &dyn TextExtractor) {
        let path = PathBuf::from(self.file_path_input.trim());
        self.file_status = SourceStatus::InProgress;

        match source::load_file(&path, extractor) {
            Ok(upload) => {
                self.input_text = upload.text;
                self.file_status = SourceStatus::Success("File loaded".to_string());
                self.file_label = Some(upload.file_name);
            }
            Err(e) => {
                tracing::error!(error = %e, "File load failed");
                self.file_status = SourceStatus::Error(e.user_message());
                self.file_path_input.clear();
                self.file_label = None;
            }
        }
    }

    /// Validates the URL and issues a fetch. Invalid URLs never reach the
    /// network.
    pub fn request_url_text(&mut self) -> Option<WorkerRequest> {
        if self.is_pending(RequestKind::FetchUrl) {
            return None;
        }
        let url = match source::validate_url(&self.url_input) {
            Ok(url) => url.to_string(),
            Err(QuizError::EmptyInput) => {
                self.url_status = SourceStatus::Error("Enter a page URL".to_string());
                return None;
            }
            Err(e) => {
                self.url_status = SourceStatus::Error(e.user_message());
                return None;
            }
        };

        self.url_status = SourceStatus::InProgress;
        let id = self.issue(RequestKind::FetchUrl);
        Some(WorkerRequest::FetchUrl { id, url })
    }

    fn url_text_received(&mut self, result: Result<String, QuizError>) {
        match result.and_then(source::accept_fetched_text) {
            Ok(text) => {
                self.input_text = text;
                self.url_status = SourceStatus::Success("Text loaded".to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "URL fetch failed");
                self.url_status = SourceStatus::Error(e.user_message());
            }
        }
    }

    // ----- generation ---------------------------------------------------

    /// `submitText`: starts a generation for the text buffer.
    pub fn submit_text(&mut self) -> Option<WorkerRequest> {
        if self.is_generating() {
            return None;
        }
        let text = match source::resolve_manual(&self.input_text) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                self.notice = Some(Notice::warning(e.user_message()));
                return None;
            }
        };

        self.pending_source_chars = text.chars().count();
        self.phase_before_generation = self.phase;
        self.phase = Phase::Generating;
        let id = self.issue(RequestKind::Generate);
        tracing::info!(id, chars = self.pending_source_chars, "Generation requested");
        Some(WorkerRequest::Generate { id, text })
    }

    /// `generationSucceeded`: the new test replaces the current one and is
    /// rendered with empty selections.
    pub fn generation_succeeded(&mut self, test: Test) -> SessionEffect {
        self.transcript = format_as_text(&test);
        self.quiz = Some(QuizView::new(test));
        self.render_error = None;
        self.history_id = None;
        self.phase = Phase::Rendered;
        SessionEffect::TestGenerated {
            source_chars: self.pending_source_chars,
        }
    }

    /// `generationFailed`: the current test, if any, stays as it was.
    pub fn generation_failed(&mut self, error: &QuizError) {
        tracing::error!(error = %error, "Generation failed");
        self.phase = match self.phase_before_generation {
            Phase::Generating => Phase::Idle,
            other => other,
        };
        self.notice = Some(Notice::error(error.user_message()));
    }

    // ----- quiz interaction ---------------------------------------------

    fn quiz_is_interactive(&self) -> bool {
        matches!(self.phase, Phase::Rendered | Phase::Scored) && self.quiz.is_some()
    }

    pub fn select_option(&mut self, question_index: usize, option_index: usize) -> bool {
        if !self.quiz_is_interactive() {
            return false;
        }
        let selected = self
            .quiz
            .as_mut()
            .is_some_and(|q| q.select(question_index, option_index));
        if selected {
            self.phase = Phase::Rendered;
        }
        selected
    }

    pub fn select_focused(&mut self) -> bool {
        let Some((question, option)) = self.quiz.as_ref().map(QuizView::focus) else {
            return false;
        };
        self.select_option(question, option)
    }

    /// `checkAnswers`: scores the current selections.
    pub fn check_answers(&mut self) -> Option<SessionEffect> {
        if !self.quiz_is_interactive() {
            self.notice = Some(Notice::warning(QuizError::NoTest.user_message()));
            return None;
        }
        let quiz = self.quiz.as_mut()?;
        match quiz.check_answers() {
            Ok(report) => {
                let report = report.clone();
                self.phase = Phase::Scored;
                Some(SessionEffect::Scored(report))
            }
            Err(e) => {
                self.notice = Some(Notice::warning(e.user_message()));
                None
            }
        }
    }

    /// `retry`: renders the same test again from scratch.
    pub fn retry(&mut self) {
        if !self.quiz_is_interactive() {
            return;
        }
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.retry();
            self.phase = Phase::Rendered;
            tracing::info!("Quiz reset");
        }
    }

    /// Shows a test stored earlier. Invalid JSON puts an error in place of
    /// the quiz instead.
    pub fn open_stored(&mut self, history_id: u64, json: &str) {
        if self.is_generating() {
            self.notice = Some(Notice::warning("Wait for the current generation to finish"));
            return;
        }
        match parse_stored_test(json) {
            Ok(test) => {
                self.transcript = format_as_text(&test);
                self.quiz = Some(QuizView::new(test));
                self.render_error = None;
                self.history_id = Some(history_id);
                self.phase = Phase::Rendered;
            }
            Err(e) => {
                self.quiz = None;
                self.transcript.clear();
                self.history_id = None;
                self.render_error = Some(e.user_message());
                self.phase = Phase::Idle;
            }
        }
    }

    // ----- exports ------------------------------------------------------

    /// Puts a freshly formatted transcript into the output view, dropping any
    /// edits made to it.
    pub fn export_text(&mut self) -> bool {
        match export::export_text(self.current_test()) {
            Ok(text) => {
                self.transcript = text;
                true
            }
            Err(e) => {
                self.notice = Some(Notice::warning(e.user_message()));
                false
            }
        }
    }

    /// Makes the output view available. The transcript is only rebuilt when it
    /// is empty, so user edits survive reopening it.
    pub fn open_transcript(&mut self) -> bool {
        if self.current_test().is_none() {
            self.notice = Some(Notice::warning(QuizError::NoTest.user_message()));
            return false;
        }
        if self.transcript.is_empty() {
            return self.export_text();
        }
        true
    }

    /// Copies the output view as it currently reads, edits included.
    pub fn copy_transcript(&mut self, clipboard: &mut dyn Clipboard) {
        if !self.open_transcript() {
            return;
        }
        self.notice = Some(match clipboard.copy(&self.transcript) {
            Ok(()) => Notice::info("Test copied to the clipboard"),
            Err(e) => Notice::error(e.user_message()),
        });
    }

    pub fn save_transcript(&mut self) {
        if !self.open_transcript() {
            return;
        }
        self.notice = Some(
            match export::save_transcript(&self.download_dir, &self.transcript) {
                Ok(path) => Notice::info(format!("Saved {}", path.display())),
                Err(e) => Notice::error(e.user_message()),
            },
        );
    }

    /// Asks the service for a PDF or Word rendering of the current test.
    pub fn request_export(&mut self, format: ExportFormat) -> Option<WorkerRequest> {
        let test = match export::require_test(self.current_test()) {
            Ok(test) => test.clone(),
            Err(e) => {
                self.notice = Some(Notice::warning(e.user_message()));
                return None;
            }
        };
        let id = self.issue(RequestKind::Export(format));
        tracing::info!(id, %format, "Export requested");
        Some(WorkerRequest::Export { id, format, test })
    }

    fn document_received(&mut self, format: ExportFormat, result: Result<Vec<u8>, QuizError>) {
        let delivered =
            result.and_then(|bytes| export::deliver_document(&self.download_dir, format, &bytes));
        self.notice = Some(match delivered {
            Ok(path) => Notice::info(format!("Saved {}", path.display())),
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                Notice::error(e.user_message())
            }
        });
    }

    // ----- worker responses ---------------------------------------------

    /// Rolls back a request the worker never received so its action can be
    /// triggered again.
    pub fn request_undelivered(&mut self, request: &WorkerRequest) {
        const WORKER_DOWN: &str = "Background worker is not running";
        match request {
            WorkerRequest::Generate { .. } => {
                self.pending.remove(&RequestKind::Generate);
                self.generation_failed(&QuizError::GenerationFailed(WORKER_DOWN.to_string()));
            }
            WorkerRequest::FetchUrl { .. } => {
                self.pending.remove(&RequestKind::FetchUrl);
                self.url_status = SourceStatus::Error(WORKER_DOWN.to_string());
            }
            WorkerRequest::Export { format, .. } => {
                self.pending.remove(&RequestKind::Export(*format));
                self.notice = Some(Notice::error(WORKER_DOWN));
            }
        }
    }

    /// Applies a worker response unless a newer request of the same kind has
    /// been issued since.
    pub fn handle_response(&mut self, response: WorkerResponse) -> Option<SessionEffect> {
        match response {
            WorkerResponse::Generated { id, result } => {
                if !self.accept(RequestKind::Generate, id) {
                    return None;
                }
                match result {
                    Ok(test) => Some(self.generation_succeeded(test)),
                    Err(e) => {
                        self.generation_failed(&e);
                        None
                    }
                }
            }
            WorkerResponse::Fetched { id, result } => {
                if self.accept(RequestKind::FetchUrl, id) {
                    self.url_text_received(result);
                }
                None
            }
            WorkerResponse::Exported { id, format, result } => {
                if self.accept(RequestKind::Export(format), id) {
                    self.document_received(format, result);
                }
                None
            }
        }
    }
}

/// Runs one request against the service and wraps the outcome.
pub async fn run_request(service: &dyn TestService, request: WorkerRequest) -> WorkerResponse {
    match request {
        WorkerRequest::Generate { id, text } => WorkerResponse::Generated {
            id,
            result: service.generate_test(&text).await,
        },
        WorkerRequest::FetchUrl { id, url } => WorkerResponse::Fetched {
            id,
            result: service.fetch_url_text(&url).await,
        },
        WorkerRequest::Export { id, format, test } => WorkerResponse::Exported {
            id,
            format,
            result: service.render_document(&test, format).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::{AnswerOption, Mark, Question};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory service answering with canned results.
    #[derive(Default)]
    struct FakeService {
        tests: Mutex<Vec<Result<Test>>>,
        page_text: Option<String>,
        document: Option<Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TestService for FakeService {
        async fn generate_test(&self, text: &str) -> Result<Test> {
            self.calls.lock().unwrap().push(format!("generate:{}", text));
            self.tests
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(QuizError::GenerationFailed("no test".to_string())))
        }

        async fn fetch_url_text(&self, url: &str) -> Result<String> {
            self.calls.lock().unwrap().push(format!("fetch:{}", url));
            self.page_text
                .clone()
                .ok_or_else(|| QuizError::RemoteFetchFailed("page returned 404".to_string()))
        }

        async fn render_document(&self, _test: &Test, format: ExportFormat) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(format!("render:{}", format));
            self.document.clone().ok_or(QuizError::ExportFailed {
                format,
                reason: "HTTP 500".to_string(),
            })
        }
    }

    struct MemoryClipboard(Option<String>);

    impl Clipboard for MemoryClipboard {
        fn copy(&mut self, text: &str) -> Result<()> {
            self.0 = Some(text.to_string());
            Ok(())
        }
    }

    struct DeniedClipboard;

    impl Clipboard for DeniedClipboard {
        fn copy(&mut self, _text: &str) -> Result<()> {
            Err(QuizError::CopyFailed("terminal refused".to_string()))
        }
    }

    fn biology_quiz() -> Test {
        Test {
            name: Some("Biology Quiz".to_string()),
            questions: vec![Question {
                question_text: "What does photosynthesis produce?".to_string(),
                options: vec![
                    AnswerOption {
                        answer_text: "Light".to_string(),
                        is_correct: false,
                    },
                    AnswerOption {
                        answer_text: "Chemical energy".to_string(),
                        is_correct: true,
                    },
                ],
            }],
        }
    }

    fn new_session() -> (tempfile::TempDir, QuizSession) {
        let dir = tempfile::tempdir().unwrap();
        let session = QuizSession::new(dir.path().to_path_buf());
        (dir, session)
    }

    async fn generate(session: &mut QuizSession, service: &FakeService) -> Option<SessionEffect> {
        let request = session.submit_text().expect("request issued");
        assert!(session.is_generating());
        assert_eq!(session.generate_label(), GENERATING_LABEL);
        let response = run_request(service, request).await;
        session.handle_response(response)
    }

    #[tokio::test]
    async fn test_biology_scenario_wrong_answer() {
        let (_dir, mut session) = new_session();
        let service = FakeService {
            tests: Mutex::new(vec![Ok(biology_quiz())]),
            ..Default::default()
        };
        session.input_text = "Photosynthesis converts light into chemical energy.".to_string();

        let effect = generate(&mut session, &service).await;
        assert!(matches!(
            effect,
            Some(SessionEffect::TestGenerated { source_chars: 51 })
        ));
        assert_eq!(session.phase(), Phase::Rendered);
        assert_eq!(session.generate_label(), GENERATE_LABEL);

        let quiz = session.quiz().unwrap();
        assert_eq!(quiz.test().questions.len(), 1);
        assert_eq!(quiz.test().questions[0].options.len(), 2);

        assert!(session.select_option(0, 0));
        let Some(SessionEffect::Scored(report)) = session.check_answers() else {
            panic!("expected a score");
        };
        assert_eq!(report.correct_count, 0);
        assert_eq!(report.total, 1);
        assert_eq!(report.percentage, 0);
        assert_eq!(session.phase(), Phase::Scored);
        let quiz = session.quiz().unwrap();
        assert_eq!(quiz.mark(0, 1), Some(Mark::Correct));
        assert_eq!(quiz.mark(0, 0), Some(Mark::Wrong));
    }

    #[tokio::test]
    async fn test_biology_scenario_right_answer() {
        let (_dir, mut session) = new_session();
        let service = FakeService {
            tests: Mutex::new(vec![Ok(biology_quiz())]),
            ..Default::default()
        };
        session.input_text = "Photosynthesis converts light into chemical energy.".to_string();
        generate(&mut session, &service).await;

        session.select_option(0, 1);
        let Some(SessionEffect::Scored(report)) = session.check_answers() else {
            panic!("expected a score");
        };
        assert_eq!(report.correct_count, 1);
        assert_eq!(report.percentage, 100);
    }

    #[tokio::test]
    async fn test_overloaded_service_keeps_state() {
        let (_dir, mut session) = new_session();
        let service = FakeService {
            tests: Mutex::new(vec![Err(QuizError::GenerationFailed("overloaded".to_string()))]),
            ..Default::default()
        };
        session.input_text = "Some text".to_string();

        let effect = generate(&mut session, &service).await;
        assert!(effect.is_none());
        assert!(!session.is_generating());
        assert_eq!(session.generate_label(), GENERATE_LABEL);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.current_test().is_none());
        assert_eq!(session.notice.as_ref().unwrap().message, "overloaded");
    }

    #[tokio::test]
    async fn test_failed_regeneration_keeps_previous_test() {
        let (_dir, mut session) = new_session();
        let service = FakeService {
            tests: Mutex::new(vec![
                Err(QuizError::GenerationFailed("overloaded".to_string())),
                Ok(biology_quiz()),
            ]),
            ..Default::default()
        };
        session.input_text = "Some text".to_string();
        generate(&mut session, &service).await;
        session.select_option(0, 1);

        generate(&mut session, &service).await;
        assert_eq!(session.phase(), Phase::Rendered);
        assert_eq!(session.current_test(), Some(&biology_quiz()));
        assert_eq!(session.quiz().unwrap().selections().selected(0), Some(1));
    }

    #[test]
    fn test_empty_input_is_not_sent() {
        let (_dir, mut session) = new_session();
        session.input_text = "   ".to_string();
        assert!(session.submit_text().is_none());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.notice.as_ref().unwrap().kind, NoticeKind::Warning);
    }

    #[test]
    fn test_generate_is_disabled_while_pending() {
        let (_dir, mut session) = new_session();
        session.input_text = "Some text".to_string();
        assert!(session.submit_text().is_some());
        assert!(session.submit_text().is_none());
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let (_dir, mut session) = new_session();
        session.input_text = "Some text".to_string();
        let Some(WorkerRequest::Generate { id: first, .. }) = session.submit_text() else {
            panic!("expected generate request");
        };
        session.generation_failed(&QuizError::GenerationFailed("x".to_string()));
        session.notice = None;
        let Some(WorkerRequest::Generate { id: second, .. }) = session.submit_text() else {
            panic!("expected generate request");
        };
        assert!(second > first);

        let stale = session.handle_response(WorkerResponse::Generated {
            id: first,
            result: Ok(biology_quiz()),
        });
        assert!(stale.is_none());
        assert!(session.current_test().is_none());
        assert!(session.is_generating());

        let fresh = session.handle_response(WorkerResponse::Generated {
            id: second,
            result: Ok(biology_quiz()),
        });
        assert!(fresh.is_some());
        assert_eq!(session.phase(), Phase::Rendered);
    }

    #[test]
    fn test_retry_resets_selection() {
        let (_dir, mut session) = new_session();
        session.generation_succeeded(biology_quiz());
        session.select_option(0, 0);
        session.check_answers();
        assert_eq!(session.phase(), Phase::Scored);

        session.retry();
        assert_eq!(session.phase(), Phase::Rendered);
        let quiz = session.quiz().unwrap();
        assert!(quiz.selections().is_empty());
        assert!(quiz.report().is_none());
    }

    #[test]
    fn test_check_answers_before_render() {
        let (_dir, mut session) = new_session();
        assert!(session.check_answers().is_none());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.notice.is_some());
    }

    #[test]
    fn test_check_answers_without_questions() {
        let (_dir, mut session) = new_session();
        session.generation_succeeded(Test {
            name: None,
            questions: vec![],
        });
        assert!(session.check_answers().is_none());
        assert_eq!(session.phase(), Phase::Rendered);
        assert_eq!(
            session.notice.as_ref().unwrap().message,
            QuizError::NoQuestions.user_message()
        );
    }

    #[test]
    fn test_selecting_after_scoring_returns_to_rendered() {
        let (_dir, mut session) = new_session();
        session.generation_succeeded(biology_quiz());
        session.select_option(0, 0);
        session.check_answers();
        session.select_option(0, 1);
        assert_eq!(session.phase(), Phase::Rendered);
        assert!(session.quiz().unwrap().report().is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_call() {
        let (_dir, mut session) = new_session();
        session.url_input = "ftp://example.com".to_string();
        assert!(session.request_url_text().is_none());
        assert_eq!(
            session.url_status,
            SourceStatus::Error(QuizError::InvalidUrl.user_message())
        );
    }

    #[tokio::test]
    async fn test_url_text_replaces_input() {
        let (_dir, mut session) = new_session();
        let service = FakeService {
            page_text: Some("A long article about photosynthesis.".to_string()),
            ..Default::default()
        };
        session.url_input = "https://example.com/article".to_string();
        let request = session.request_url_text().unwrap();
        assert_eq!(session.url_status, SourceStatus::InProgress);

        let response = run_request(&service, request).await;
        session.handle_response(response);
        assert_eq!(session.input_text, "A long article about photosynthesis.");
        assert!(matches!(session.url_status, SourceStatus::Success(_)));
        assert_eq!(
            service.calls.lock().unwrap().as_slice(),
            ["fetch:https://example.com/article"]
        );
    }

    #[tokio::test]
    async fn test_url_fetch_failure_message() {
        let (_dir, mut session) = new_session();
        let service = FakeService::default();
        session.url_input = "https://example.com/missing".to_string();
        let request = session.request_url_text().unwrap();
        session.handle_response(run_request(&service, request).await);
        assert_eq!(
            session.url_status,
            SourceStatus::Error("page returned 404".to_string())
        );
    }

    #[test]
    fn test_bad_file_clears_selection() {
        let (dir, mut session) = new_session();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b").unwrap();
        session.file_path_input = path.display().to_string();

        session.load_file(&crate::docx::DocxExtractor);
        assert!(session.file_path_input.is_empty());
        assert!(session.file_label.is_none());
        assert_eq!(
            session.file_status,
            SourceStatus::Error(QuizError::UnsupportedFileType.user_message())
        );
    }

    #[test]
    fn test_txt_file_fills_input() {
        let (dir, mut session) = new_session();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Photosynthesis converts light.").unwrap();
        session.file_path_input = path.display().to_string();

        session.load_file(&crate::docx::DocxExtractor);
        assert_eq!(session.input_text, "Photosynthesis converts light.");
        assert_eq!(session.file_label.as_deref(), Some("notes.txt"));
        assert!(matches!(session.file_status, SourceStatus::Success(_)));
    }

    #[test]
    fn test_exports_without_test_warn() {
        let (_dir, mut session) = new_session();
        assert!(session.request_export(ExportFormat::Pdf).is_none());
        assert_eq!(session.notice.as_ref().unwrap().kind, NoticeKind::Warning);
        session.notice = None;
        assert!(!session.export_text());
        assert!(session.notice.is_some());
    }

    #[tokio::test]
    async fn test_pdf_export_written_to_download_dir() {
        let (dir, mut session) = new_session();
        let service = FakeService {
            document: Some(b"%PDF-1.4".to_vec()),
            ..Default::default()
        };
        session.generation_succeeded(biology_quiz());

        let request = session.request_export(ExportFormat::Pdf).unwrap();
        assert!(session.is_pending(RequestKind::Export(ExportFormat::Pdf)));
        session.handle_response(run_request(&service, request).await);
        assert!(!session.is_pending(RequestKind::Export(ExportFormat::Pdf)));

        assert_eq!(session.notice.as_ref().unwrap().kind, NoticeKind::Info);
        assert_eq!(
            std::fs::read(dir.path().join("test.pdf")).unwrap(),
            b"%PDF-1.4"
        );
    }

    #[tokio::test]
    async fn test_word_export_failure() {
        let (dir, mut session) = new_session();
        let service = FakeService::default();
        session.generation_succeeded(biology_quiz());

        let request = session.request_export(ExportFormat::Word).unwrap();
        session.handle_response(run_request(&service, request).await);

        let notice = session.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Failed to create the Word document");
        assert!(!dir.path().join("test.docx").exists());
    }

    #[test]
    fn test_copy_reports_distinct_outcomes() {
        let (_dir, mut session) = new_session();
        session.generation_succeeded(biology_quiz());

        let mut clipboard = MemoryClipboard(None);
        session.copy_transcript(&mut clipboard);
        assert!(clipboard.0.unwrap().starts_with("Test name: Biology Quiz"));
        assert_eq!(session.notice.as_ref().unwrap().kind, NoticeKind::Info);

        session.copy_transcript(&mut DeniedClipboard);
        let notice = session.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("copy failed"));
    }

    #[test]
    fn test_edited_transcript_is_copied_and_saved() {
        let (dir, mut session) = new_session();
        session.generation_succeeded(biology_quiz());
        session.transcript.push_str("Notes: bring a pencil\n");

        assert!(session.open_transcript());
        assert!(session.transcript.ends_with("Notes: bring a pencil\n"));

        let mut clipboard = MemoryClipboard(None);
        session.copy_transcript(&mut clipboard);
        assert!(clipboard.0.unwrap().ends_with("Notes: bring a pencil\n"));

        session.save_transcript();
        let saved = std::fs::read_to_string(dir.path().join("test.txt")).unwrap();
        assert!(saved.starts_with("Test name: Biology Quiz"));
        assert!(saved.ends_with("Notes: bring a pencil\n"));

        assert!(session.export_text());
        assert!(!session.transcript.contains("pencil"));
    }

    #[test]
    fn test_open_transcript_rebuilds_when_cleared() {
        let (_dir, mut session) = new_session();
        assert!(!session.open_transcript());
        assert_eq!(session.notice.as_ref().unwrap().kind, NoticeKind::Warning);

        session.generation_succeeded(biology_quiz());
        session.transcript.clear();
        assert!(session.open_transcript());
        assert!(session.transcript.starts_with("Test name: Biology Quiz"));
    }

    #[test]
    fn test_undelivered_generation_reenables_generate() {
        let (_dir, mut session) = new_session();
        session.input_text = "Some text".to_string();
        let request = session.submit_text().unwrap();
        assert!(session.is_generating());

        session.request_undelivered(&request);
        assert!(!session.is_generating());
        assert!(!session.is_pending(RequestKind::Generate));
        assert_eq!(session.generate_label(), GENERATE_LABEL);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.notice.as_ref().unwrap().kind, NoticeKind::Error);

        session.notice = None;
        assert!(session.submit_text().is_some());
    }

    #[test]
    fn test_undelivered_generation_keeps_previous_test() {
        let (_dir, mut session) = new_session();
        session.generation_succeeded(biology_quiz());
        session.input_text = "Some text".to_string();
        let request = session.submit_text().unwrap();

        session.request_undelivered(&request);
        assert_eq!(session.phase(), Phase::Rendered);
        assert_eq!(session.current_test(), Some(&biology_quiz()));
    }

    #[test]
    fn test_undelivered_fetch_and_export() {
        let (_dir, mut session) = new_session();
        session.url_input = "https://example.com".to_string();
        let request = session.request_url_text().unwrap();
        session.request_undelivered(&request);
        assert!(!session.is_pending(RequestKind::FetchUrl));
        assert!(matches!(session.url_status, SourceStatus::Error(_)));
        assert!(session.request_url_text().is_some());

        session.generation_succeeded(biology_quiz());
        let request = session.request_export(ExportFormat::Word).unwrap();
        session.request_undelivered(&request);
        assert!(!session.is_pending(RequestKind::Export(ExportFormat::Word)));
        assert_eq!(session.notice.as_ref().unwrap().kind, NoticeKind::Error);
    }

    #[test]
    fn test_open_stored_malformed() {
        let (_dir, mut session) = new_session();
        session.open_stored(3, r#"{"name": "broken"}"#);
        assert!(session.quiz().is_none());
        assert_eq!(
            session.render_error(),
            Some(QuizError::MalformedTest.user_message().as_str())
        );
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_open_stored_renders() {
        let (_dir, mut session) = new_session();
        let json = serde_json::to_string(&biology_quiz()).unwrap();
        session.open_stored(3, &json);
        assert_eq!(session.phase(), Phase::Rendered);
        assert_eq!(session.history_id(), Some(3));
        assert!(session.transcript.starts_with("Test name: Biology Quiz"));
    }
}
