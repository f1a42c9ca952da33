//! Screen routing and key handling on top of [`QuizSession`].

use crossbeam_channel::{Receiver, Sender};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::attempt::record_attempt;
use crate::db::saved_test::{delete_test, list_tests, load_test_json, save_test, TestSummary};
use crate::docx::TextExtractor;
use crate::error::{ExportFormat, QuizError};
use crate::export::Clipboard;
use crate::models::{AppState, WorkerRequest, WorkerResponse};
use crate::session::{Notice, QuizSession, SessionEffect};
use crate::ui::{self, InputField};

const HISTORY_LIMIT: usize = 50;

pub struct App {
    pub session: QuizSession,
    pub state: AppState,
    pub focus: InputField,
    pub history: Vec<TestSummary>,
    pub history_index: usize,
    pub transcript_scroll: u16,
    pub should_quit: bool,
    state_before_quit: AppState,
    conn: Connection,
    requests: Sender<WorkerRequest>,
    responses: Receiver<WorkerResponse>,
    clipboard: Box<dyn Clipboard>,
    extractor: Box<dyn TextExtractor>,
}

impl App {
    pub fn new(
        session: QuizSession,
        conn: Connection,
        requests: Sender<WorkerRequest>,
        responses: Receiver<WorkerResponse>,
        clipboard: Box<dyn Clipboard>,
        extractor: Box<dyn TextExtractor>,
    ) -> Self {
        Self {
            session,
            state: AppState::Input,
            focus: InputField::Text,
            history: Vec::new(),
            history_index: 0,
            transcript_scroll: 0,
            should_quit: false,
            state_before_quit: AppState::Input,
            conn,
            requests,
            responses,
            clipboard,
            extractor,
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        match self.state {
            AppState::Input => ui::draw_input(f, &self.session, self.focus),
            AppState::Quiz => ui::draw_quiz(f, &mut self.session),
            AppState::Transcript => {
                self.transcript_scroll =
                    ui::draw_transcript(f, &self.session, self.transcript_scroll);
            }
            AppState::History => ui::draw_history(f, &self.history, self.history_index),
            AppState::QuitConfirm => ui::draw_quit_confirmation(f),
        }
        if let Some(notice) = &self.session.notice {
            ui::draw_notice(f, notice);
        }
    }

    fn send(&mut self, request: Option<WorkerRequest>) {
        let Some(request) = request else {
            return;
        };
        if let Err(crossbeam_channel::SendError(request)) = self.requests.send(request) {
            tracing::error!("Worker channel closed");
            self.session.request_undelivered(&request);
        }
    }

    /// Applies every response the worker has delivered so far.
    pub fn poll_responses(&mut self) {
        while let Ok(response) = self.responses.try_recv() {
            if let Some(effect) = self.session.handle_response(response) {
                self.apply_effect(effect);
            }
        }
    }

    fn apply_effect(&mut self, effect: SessionEffect) {
        match effect {
            SessionEffect::TestGenerated { source_chars } => {
                if let Some(test) = self.session.current_test() {
                    match save_test(&self.conn, test, source_chars) {
                        Ok(id) => self.session.set_history_id(Some(id)),
                        Err(e) => {
                            tracing::warn!(error = %QuizError::from(e), "Failed to store test")
                        }
                    }
                }
                if matches!(self.state, AppState::Input | AppState::History) {
                    self.state = AppState::Quiz;
                }
            }
            SessionEffect::Scored(report) => {
                let Some(test_id) = self.session.history_id() else {
                    return;
                };
                if let Err(e) = record_attempt(
                    &self.conn,
                    test_id,
                    report.correct_count,
                    report.total,
                    report.percentage,
                ) {
                    tracing::warn!(error = %QuizError::from(e), test_id, "Failed to record attempt");
                }
            }
        }
    }

    pub fn refresh_history(&mut self) {
        match list_tests(&self.conn, HISTORY_LIMIT) {
            Ok(tests) => self.history = tests,
            Err(e) => {
                let e = QuizError::from(e);
                tracing::error!(error = %e, "Failed to list saved tests");
                self.session.notice = Some(Notice::error(e.user_message()));
            }
        }
        self.history_index = self.history_index.min(self.history.len().saturating_sub(1));
    }

    /// Pasted text goes into the focused input box or the transcript.
    pub fn handle_paste(&mut self, text: &str) {
        if self.session.notice.is_some() {
            return;
        }
        match self.state {
            AppState::Input => self.focused_buffer().push_str(text),
            AppState::Transcript => self.session.transcript.push_str(text),
            _ => {}
        }
    }

    fn focused_buffer(&mut self) -> &mut String {
        match self.focus {
            InputField::Text => &mut self.session.input_text,
            InputField::FilePath => &mut self.session.file_path_input,
            InputField::Url => &mut self.session.url_input,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.session.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.session.notice = None;
            }
            return;
        }

        match self.state {
            AppState::Input => self.handle_input_key(key),
            AppState::Quiz => self.handle_quiz_key(key),
            AppState::Transcript => self.handle_transcript_key(key),
            AppState::History => self.handle_history_key(key),
            AppState::QuitConfirm => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.should_quit = true,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state = self.state_before_quit;
                }
                _ => {}
            },
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('g') => {
                    let request = self.session.submit_text();
                    self.send(request);
                }
                KeyCode::Char('t') => {
                    if self.session.quiz().is_some() || self.session.render_error().is_some() {
                        self.state = AppState::Quiz;
                    }
                }
                KeyCode::Char('h') => {
                    self.refresh_history();
                    self.state = AppState::History;
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.state_before_quit = AppState::Input;
                self.state = AppState::QuitConfirm;
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Enter => match self.focus {
                InputField::Text => self.session.input_text.push('\n'),
                InputField::FilePath => self.session.load_file(self.extractor.as_ref()),
                InputField::Url => {
                    let request = self.session.request_url_text();
                    self.send(request);
                }
            },
            KeyCode::Backspace => {
                self.focused_buffer().pop();
            }
            KeyCode::Char(c) => self.focused_buffer().push(c),
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state = AppState::Input,
            KeyCode::Down => {
                if let Some(quiz) = self.session.quiz_mut() {
                    quiz.focus_next();
                }
            }
            KeyCode::Up => {
                if let Some(quiz) = self.session.quiz_mut() {
                    quiz.focus_prev();
                }
            }
            KeyCode::Right | KeyCode::PageDown => {
                if let Some(quiz) = self.session.quiz_mut() {
                    quiz.focus_next_question();
                }
            }
            KeyCode::Left | KeyCode::PageUp => {
                if let Some(quiz) = self.session.quiz_mut() {
                    quiz.focus_prev_question();
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.session.select_focused();
            }
            KeyCode::Char('c') => {
                if let Some(effect) = self.session.check_answers() {
                    self.apply_effect(effect);
                }
            }
            KeyCode::Char('r') => self.session.retry(),
            KeyCode::Char('t') => {
                if self.session.open_transcript() {
                    self.transcript_scroll = 0;
                    self.state = AppState::Transcript;
                }
            }
            _ => self.handle_export_key(key),
        }
    }

    /// The transcript is editable; actions move to Ctrl chords.
    fn handle_transcript_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('y') => self.session.copy_transcript(self.clipboard.as_mut()),
                KeyCode::Char('s') => self.session.save_transcript(),
                KeyCode::Char('r') => {
                    self.session.export_text();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.state = AppState::Quiz,
            KeyCode::Down => self.transcript_scroll = self.transcript_scroll.saturating_add(1),
            KeyCode::Up => self.transcript_scroll = self.transcript_scroll.saturating_sub(1),
            KeyCode::Enter => self.session.transcript.push('\n'),
            KeyCode::Backspace => {
                self.session.transcript.pop();
            }
            KeyCode::Char(c) => self.session.transcript.push(c),
            _ => {}
        }
    }

    fn handle_export_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') => self.session.copy_transcript(self.clipboard.as_mut()),
            KeyCode::Char('s') => self.session.save_transcript(),
            KeyCode::Char('p') => {
                let request = self.session.request_export(ExportFormat::Pdf);
                self.send(request);
            }
            KeyCode::Char('w') => {
                let request = self.session.request_export(ExportFormat::Word);
                self.send(request);
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state = AppState::Input,
            KeyCode::Up => self.history_index = self.history_index.saturating_sub(1),
            KeyCode::Down => {
                if self.history_index + 1 < self.history.len() {
                    self.history_index += 1;
                }
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            _ => {}
        }
    }

    fn open_selected(&mut self) {
        let Some(id) = self.history.get(self.history_index).map(|s| s.id) else {
            return;
        };
        match load_test_json(&self.conn, id) {
            Ok(Some(json)) => {
                self.session.open_stored(id, &json);
                if self.session.notice.is_none() {
                    self.state = AppState::Quiz;
                }
            }
            Ok(None) => {
                self.session.notice = Some(Notice::warning("That test no longer exists"));
                self.refresh_history();
            }
            Err(e) => {
                let e = QuizError::from(e);
                tracing::error!(error = %e, id, "Failed to load saved test");
                self.session.notice = Some(Notice::error(e.user_message()));
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.history.get(self.history_index).map(|s| s.id) else {
            return;
        };
        if let Err(e) = delete_test(&mut self.conn, id) {
            let e = QuizError::from(e);
            tracing::error!(error = %e, id, "Failed to delete saved test");
            self.session.notice = Some(Notice::error(e.user_message()));
            return;
        }
        if self.session.history_id() == Some(id) {
            self.session.set_history_id(None);
        }
        tracing::info!(id, "Saved test deleted");
        self.refresh_history();
    }
}
