//! Delivery of exported artifacts: transcript text, clipboard, and the binary
//! documents rendered by the service.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tempfile::NamedTempFile;

use crate::error::{ExportFormat, QuizError, Result};
use crate::models::Test;
use crate::quiz::format_as_text;

pub const TRANSCRIPT_FILE: &str = "test.txt";

/// Export actions need a generated test; without one nothing is sent.
pub fn require_test(test: Option<&Test>) -> Result<&Test> {
    test.ok_or(QuizError::NoTest)
}

/// Transcript shown in the output view and copied to the clipboard.
pub fn export_text(test: Option<&Test>) -> Result<String> {
    require_test(test).map(format_as_text)
}

/// Writes `bytes` to `dir/file_name` through a temporary sibling file. The
/// temporary file is removed whenever the write or the rename fails.
pub fn write_download(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;

    let target = dir.join(file_name);
    temp.persist(&target).map_err(|e| e.error)?;
    Ok(target)
}

/// Stores a rendered PDF or Word document under its fixed name.
pub fn deliver_document(dir: &Path, format: ExportFormat, bytes: &[u8]) -> Result<PathBuf> {
    let path = write_download(dir, format.file_name(), bytes).map_err(|e| {
        QuizError::ExportFailed {
            format,
            reason: e.to_string(),
        }
    })?;
    tracing::info!(%format, path = %path.display(), bytes = bytes.len(), "Document saved");
    Ok(path)
}

/// Saves the transcript as `test.txt`.
pub fn save_transcript(dir: &Path, text: &str) -> Result<PathBuf> {
    let path = write_download(dir, TRANSCRIPT_FILE, text.as_bytes())?;
    tracing::info!(path = %path.display(), "Transcript saved");
    Ok(path)
}

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Copies through the OSC 52 terminal escape sequence.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(QuizError::CopyFailed("nothing to copy".to_string()));
        }
        let encoded = STANDARD.encode(text.as_bytes());
        write!(self.out, "\x1b]52;c;{}\x07", encoded)
            .and_then(|_| self.out.flush())
            .map_err(|e| QuizError::CopyFailed(e.to_string()))
    }
}
